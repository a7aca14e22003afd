// Copyright 2026 QOC Engine Contributors
// SPDX-License-Identifier: Apache-2.0

//! The differentiable objective.
//!
//! [`SchrodingerObjective`] composes the Hamiltonian model, the
//! propagation scan, and the registered cost terms into the single entry
//! point an optimizer loop consumes: controls in, weighted total cost and
//! its gradient out. One call performs one forward pass, one cost
//! evaluation sweep, and one backward pass over the recorded tape; the
//! tape is dropped before the call returns.
//!
//! Evaluation is side-effect-free: the problem definition is immutable
//! and no state survives between calls. Shape mismatches fail fast before
//! any propagation; non-finite totals are surfaced to the caller, never
//! corrected.

use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::backend::{self, LinearAlgebra};
use crate::config::EvolutionConfig;
use crate::cost::{CostAccumulator, CostFn, CostRecord, EvaluationSchedule};
use crate::error::{Result, ShapeError};
use crate::hamiltonian::HamiltonianModel;
use crate::propagate::{propagate_backward, propagate_forward};

/// Result of one objective evaluation.
#[derive(Debug)]
pub struct Evaluation {
    /// Weighted sum over all registered cost terms.
    pub total_cost: f64,
    /// Per-term breakdown.
    pub terms: Vec<CostRecord>,
    /// Gradient of the total with respect to the controls, shaped like
    /// the input trajectory.
    pub gradient: Array2<f64>,
}

/// A fixed control problem exposed as a differentiable function of the
/// control trajectory.
pub struct SchrodingerObjective {
    model: Box<dyn HamiltonianModel>,
    costs: Vec<Box<dyn CostFn>>,
    initial_states: Array2<Complex64>,
    step_count: usize,
    param_count: usize,
    evolution_time: f64,
    linalg: Arc<dyn LinearAlgebra>,
}

impl SchrodingerObjective {
    /// Assemble a problem from its immutable parts.
    ///
    /// Validates the configuration, checks every dimension against it,
    /// and selects the linear-algebra backend — all failures here are
    /// configuration errors caught before any optimizer iteration runs.
    pub fn new(
        config: &EvolutionConfig,
        model: Box<dyn HamiltonianModel>,
        costs: Vec<Box<dyn CostFn>>,
        initial_states: Array2<Complex64>,
    ) -> Result<Self> {
        config.validate()?;

        if model.dimension() != config.hilbert_size {
            return Err(ShapeError::Hamiltonian {
                expected_dim: config.hilbert_size,
                got_rows: model.dimension(),
                got_cols: model.dimension(),
            }
            .into());
        }
        if initial_states.nrows() != config.hilbert_size {
            return Err(ShapeError::StateBatch {
                expected_dim: config.hilbert_size,
                got_dim: initial_states.nrows(),
            }
            .into());
        }
        if initial_states.ncols() == 0 {
            return Err(ShapeError::BatchSize {
                expected: 1,
                got: 0,
            }
            .into());
        }
        for cost in &costs {
            cost.validate(config.hilbert_size, initial_states.ncols())?;
        }

        let linalg = backend::select(config.backend)?;

        Ok(Self {
            model,
            costs,
            initial_states,
            step_count: config.step_count,
            param_count: config.param_count,
            evolution_time: config.evolution_time,
            linalg,
        })
    }

    /// Number of independent initial states.
    pub fn batch_size(&self) -> usize {
        self.initial_states.ncols()
    }

    /// Grid spacing.
    pub fn dt(&self) -> f64 {
        self.evolution_time / self.step_count as f64
    }

    /// Evaluate the total cost and its gradient for one control
    /// trajectory. Called once per optimizer iteration.
    pub fn evaluate(&self, controls: ArrayView2<'_, f64>) -> Result<Evaluation> {
        let (rows, cols) = controls.dim();
        if rows != self.step_count || cols != self.param_count {
            return Err(ShapeError::ControlTrajectory {
                expected_steps: self.step_count,
                expected_params: self.param_count,
                got_rows: rows,
                got_cols: cols,
            }
            .into());
        }

        // Forward scan, recording the tape.
        let tape = propagate_forward(
            self.model.as_ref(),
            controls,
            &self.initial_states,
            self.evolution_time,
            self.linalg.as_ref(),
        );

        // Cost sweep.
        let final_step = self.step_count - 1;
        let mut accumulator = CostAccumulator::new();
        for cost in &self.costs {
            let raw = match cost.schedule() {
                EvaluationSchedule::FinalStep => cost.cost(
                    controls,
                    tape.states_after(final_step),
                    final_step,
                    self.linalg.as_ref(),
                ),
                EvaluationSchedule::EveryStep => (0..self.step_count)
                    .map(|step| {
                        cost.cost(
                            controls,
                            tape.states_after(step),
                            step,
                            self.linalg.as_ref(),
                        )
                    })
                    .sum(),
            };
            accumulator.add(cost.name(), raw, cost.multiplier());
        }

        // Backward pass: state-mediated gradient first, seeding each step
        // with the weighted cost cotangents that touch its states.
        let mut gradient = propagate_backward(
            self.model.as_ref(),
            controls,
            &tape,
            |step, states| {
                let mut seed: Option<Array2<Complex64>> = None;
                for cost in &self.costs {
                    let scheduled = match cost.schedule() {
                        EvaluationSchedule::EveryStep => true,
                        EvaluationSchedule::FinalStep => step == final_step,
                    };
                    if !scheduled {
                        continue;
                    }
                    if let Some(raw) = cost.state_vjp(controls, states, step) {
                        let weighted = raw * Complex64::new(cost.multiplier(), 0.0);
                        seed = Some(match seed {
                            Some(acc) => acc + weighted,
                            None => weighted,
                        });
                    }
                }
                seed
            },
            self.linalg.as_ref(),
        );

        // Control-only contributions.
        for cost in &self.costs {
            match cost.schedule() {
                EvaluationSchedule::FinalStep => {
                    if let Some(raw) =
                        cost.control_vjp(controls, tape.states_after(final_step), final_step)
                    {
                        gradient = gradient + raw * cost.multiplier();
                    }
                }
                EvaluationSchedule::EveryStep => {
                    for step in 0..self.step_count {
                        if let Some(raw) =
                            cost.control_vjp(controls, tape.states_after(step), step)
                        {
                            gradient = gradient + raw * cost.multiplier();
                        }
                    }
                }
            }
        }

        let total_cost = accumulator.total();
        if !total_cost.is_finite() {
            // Surfaced, not corrected: the optimizer loop owns the abort
            // decision.
            warn!(total_cost, "Objective evaluated to a non-finite value");
        }
        debug!(total_cost, "Objective evaluation complete");

        Ok(Evaluation {
            total_cost,
            terms: accumulator.into_records(),
            gradient,
        })
    }
}
