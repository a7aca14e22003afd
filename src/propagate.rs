// Copyright 2026 QOC Engine Contributors
// SPDX-License-Identifier: Apache-2.0

//! Discrete-time state propagation and its reverse pass.
//!
//! The forward scan applies, for each step `s` on the grid
//! `dt = evolution_time / step_count`, `t_s = s·dt`:
//!
//! ```text
//! H_s = model.evaluate(controls[s], t_s)
//! U_s = exp(-i · H_s · dt)
//! S_{s+1} = U_s · S_s          (S is the (n, B) state batch)
//! ```
//!
//! The `exp(-i·H·dt)` sign/scaling convention is fixed here, crate-wide;
//! problem definitions supply `H` in units matching the time grid and
//! never re-scale the generator themselves.
//!
//! Each step leaves a [`StepRecord`] on the [`EvolutionTape`]: the
//! generator, its exponential, and the entering batch. The tape is owned
//! by one forward/backward evaluation and dropped when it ends; controls
//! change every optimizer iteration, so records are never reused.
//!
//! # Cotangent convention
//!
//! Throughout the engine the cotangent of a complex quantity `z` is
//! `G = ∂J/∂Re(z) − i·∂J/∂Im(z)`, so a perturbation `dz` moves the final
//! scalar by `dJ = Re(Σ G ∘ dz)`. Holomorphic linear maps then pull back
//! through plain transposes — for `y = U·s`: `G_s = Uᵀ·G_y` and
//! `G_U = G_y·sᵀ`, with no conjugation — and the exponential rule takes
//! the conj-free form implemented in [`crate::expm::expm_vjp`]. Cost terms
//! carry whatever conjugations their definitions need in their seeds.
//!
//! The scan is inherently sequential: step `s+1` consumes the batch
//! produced by step `s`, forward, and symmetrically backward. Only the
//! batch columns and the entries of the exponential's gradient rule are
//! data-parallel.

use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;
use tracing::debug;

use crate::backend::LinearAlgebra;
use crate::hamiltonian::HamiltonianModel;

/// One time step's worth of cached forward results.
pub struct StepRecord {
    /// Time `t_s` at which the Hamiltonian was evaluated.
    pub time: f64,
    /// The exponentiated generator `M_s = -i · H_s · dt`.
    pub generator: Array2<Complex64>,
    /// `U_s = exp(M_s)`.
    pub propagator: Array2<Complex64>,
    /// The state batch entering this step (pre-update).
    pub entering_states: Array2<Complex64>,
}

/// The recorded forward pass: one record per step plus the final batch.
pub struct EvolutionTape {
    /// Per-step records, in forward order.
    pub records: Vec<StepRecord>,
    /// The batch after the last step.
    pub final_states: Array2<Complex64>,
    /// Grid spacing used for every step.
    pub dt: f64,
}

impl EvolutionTape {
    /// Number of recorded steps.
    pub fn step_count(&self) -> usize {
        self.records.len()
    }

    /// The state batch after step `step` completed.
    pub fn states_after(&self, step: usize) -> &Array2<Complex64> {
        if step + 1 < self.records.len() {
            &self.records[step + 1].entering_states
        } else {
            &self.final_states
        }
    }
}

/// Run the forward scan and record the tape.
///
/// `controls` is `(step_count, param_count)`; `initial_states` is the
/// `(n, B)` batch. Shape agreement with the problem definition is the
/// caller's responsibility ([`crate::objective`] checks before calling).
pub fn propagate_forward(
    model: &dyn HamiltonianModel,
    controls: ArrayView2<'_, f64>,
    initial_states: &Array2<Complex64>,
    evolution_time: f64,
    linalg: &dyn LinearAlgebra,
) -> EvolutionTape {
    let step_count = controls.nrows();
    let dt = evolution_time / step_count as f64;
    debug!(
        step_count,
        dt,
        batch = initial_states.ncols(),
        "Starting forward propagation"
    );

    let mut records = Vec::with_capacity(step_count);
    let mut states = initial_states.clone();

    for step in 0..step_count {
        let time = step as f64 * dt;
        let hamiltonian = model.evaluate(controls.row(step), time);
        let generator = &hamiltonian * Complex64::new(0.0, -dt);
        let propagator = linalg.expm(&generator);
        let advanced = linalg.matmul(propagator.view(), states.view());

        records.push(StepRecord {
            time,
            generator,
            propagator,
            entering_states: states,
        });
        states = advanced;
    }

    EvolutionTape {
        records,
        final_states: states,
        dt,
    }
}

/// Walk the tape backward and accumulate the control gradient.
///
/// `seed_for_step(s, states_after_s)` returns the summed cost cotangent
/// injected at step `s` (costs scheduled every step, plus the final-step
/// costs at `s = step_count - 1`), or `None` when no cost touches the
/// states there. The returned array is `(step_count, param_count)` and
/// contains only the state-mediated gradient; control-only cost terms add
/// their vjps separately.
pub fn propagate_backward<F>(
    model: &dyn HamiltonianModel,
    controls: ArrayView2<'_, f64>,
    tape: &EvolutionTape,
    mut seed_for_step: F,
    linalg: &dyn LinearAlgebra,
) -> Array2<f64>
where
    F: FnMut(usize, &Array2<Complex64>) -> Option<Array2<Complex64>>,
{
    let step_count = tape.step_count();
    let param_count = controls.ncols();
    let mut gradient = Array2::<f64>::zeros((step_count, param_count));

    let (dim, batch) = tape.final_states.dim();
    let mut cotangent = Array2::<Complex64>::zeros((dim, batch));

    for step in (0..step_count).rev() {
        if let Some(seed) = seed_for_step(step, tape.states_after(step)) {
            cotangent = cotangent + seed;
        }

        let record = &tape.records[step];

        // Adjoints of S_{s+1} = U_s · S_s under the conj-free convention.
        let propagator_cotangent =
            linalg.matmul(cotangent.view(), record.entering_states.t());
        let entering_cotangent = linalg.matmul(record.propagator.t(), cotangent.view());

        // Through the exponential, then through M = -i·dt·H (holomorphic
        // linear, so the factor rides along unconjugated).
        let generator_cotangent = linalg.expm_vjp(&propagator_cotangent, &record.propagator);
        let hamiltonian_cotangent = &generator_cotangent * Complex64::new(0.0, -tape.dt);

        let step_gradient =
            model.vjp(&hamiltonian_cotangent, controls.row(step), record.time);
        gradient.row_mut(step).assign(&step_gradient);

        cotangent = entering_cotangent;
    }

    gradient
}
