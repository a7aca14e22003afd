// Copyright 2026 QOC Engine Contributors
// SPDX-License-Identifier: Apache-2.0

//! Cost-term capability and accumulation.
//!
//! A cost term is a pure, differentiable function of the control
//! trajectory and/or the propagated states, with a fixed normalization so
//! its magnitude is comparable across problem sizes. Terms declare when
//! they are evaluated ([`EvaluationSchedule`]) and expose reverse-mode
//! duals alongside the forward value — the same dual-function contract the
//! Hamiltonian model uses.
//!
//! Provided terms:
//!
//! - [`ControlArea`]: penalizes the area under the control pulse
//! - [`TargetInfidelity`]: distance of the final batch from target states

pub mod control_area;
pub mod target_infidelity;

use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;

use crate::backend::LinearAlgebra;
use crate::error::Result;

pub use control_area::ControlArea;
pub use target_infidelity::TargetInfidelity;

/// When a cost term is evaluated during one objective pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationSchedule {
    /// Once per time step, on the states after that step.
    EveryStep,
    /// Once, after the last step.
    FinalStep,
}

/// A single cost functional.
///
/// Vjp methods return *raw* (unweighted) sensitivities; the evaluation
/// applies [`multiplier`](CostFn::multiplier) uniformly when summing.
/// Terms that do not depend on states (or controls) keep the respective
/// default `None`.
pub trait CostFn: Send + Sync {
    /// Stable identifier used in cost breakdowns.
    fn name(&self) -> &'static str;

    /// Weight of this term in the total objective.
    fn multiplier(&self) -> f64;

    /// Evaluation schedule.
    fn schedule(&self) -> EvaluationSchedule;

    /// Check this term's own dimensions against the problem's before any
    /// propagation runs. Terms without fixed state dimensions keep the
    /// default.
    fn validate(&self, _hilbert_size: usize, _batch_size: usize) -> Result<()> {
        Ok(())
    }

    /// Raw (pre-multiplier) value of the term at `step`.
    fn cost(
        &self,
        controls: ArrayView2<'_, f64>,
        states: &Array2<Complex64>,
        step: usize,
        linalg: &dyn LinearAlgebra,
    ) -> f64;

    /// Raw cotangent of the states at `step` (crate convention, see
    /// [`crate::propagate`]).
    fn state_vjp(
        &self,
        _controls: ArrayView2<'_, f64>,
        _states: &Array2<Complex64>,
        _step: usize,
    ) -> Option<Array2<Complex64>> {
        None
    }

    /// Raw gradient with respect to the full control trajectory.
    fn control_vjp(
        &self,
        _controls: ArrayView2<'_, f64>,
        _states: &Array2<Complex64>,
        _step: usize,
    ) -> Option<Array2<f64>> {
        None
    }
}

/// One evaluated cost term in a breakdown.
#[derive(Debug, Clone)]
pub struct CostRecord {
    /// Term identifier.
    pub name: String,
    /// Raw value before weighting.
    pub raw: f64,
    /// Weight applied.
    pub multiplier: f64,
    /// `raw * multiplier`.
    pub weighted: f64,
}

/// Weighted sum of cost terms, built fresh for every evaluation.
#[derive(Debug, Default)]
pub struct CostAccumulator {
    terms: Vec<CostRecord>,
    total: f64,
}

impl CostAccumulator {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one term's raw value and fold its weighted value into the
    /// total.
    pub fn add(&mut self, name: &str, raw: f64, multiplier: f64) {
        let weighted = raw * multiplier;
        self.total += weighted;
        self.terms.push(CostRecord {
            name: name.to_string(),
            raw,
            multiplier,
            weighted,
        });
    }

    /// Weighted total over all recorded terms.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Consume the accumulator, yielding the per-term breakdown.
    pub fn into_records(self) -> Vec<CostRecord> {
        self.terms
    }
}
