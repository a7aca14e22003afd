// Copyright 2026 QOC Engine Contributors
// SPDX-License-Identifier: Apache-2.0

//! Target-state infidelity.
//!
//! Measures how far the propagated batch is from a declared target batch:
//!
//! ```text
//! cost = 1 − (1/B) · Σ_b |⟨target_b | ψ_b⟩|²
//! ```
//!
//! Zero when every state coincides with its target up to a global phase,
//! one when every overlap vanishes.

use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;

use super::{CostFn, EvaluationSchedule};
use crate::backend::LinearAlgebra;
use crate::error::{Result, ShapeError};

/// Infidelity of the final states against a fixed target batch.
pub struct TargetInfidelity {
    targets: Array2<Complex64>,
    multiplier: f64,
}

impl TargetInfidelity {
    /// Create the term from an `(n, B)` target batch.
    pub fn new(targets: Array2<Complex64>, multiplier: f64) -> Self {
        Self {
            targets,
            multiplier,
        }
    }

    /// Check the target batch against a problem's dimensions.
    pub fn validate_against(&self, hilbert_size: usize, batch_size: usize) -> Result<()> {
        if self.targets.nrows() != hilbert_size {
            return Err(ShapeError::StateBatch {
                expected_dim: hilbert_size,
                got_dim: self.targets.nrows(),
            }
            .into());
        }
        if self.targets.ncols() != batch_size {
            return Err(ShapeError::BatchSize {
                expected: batch_size,
                got: self.targets.ncols(),
            }
            .into());
        }
        Ok(())
    }

    /// Per-column overlaps `o_b = ⟨target_b | ψ_b⟩`.
    fn overlaps(&self, states: &Array2<Complex64>) -> Vec<Complex64> {
        (0..self.targets.ncols())
            .map(|b| {
                self.targets
                    .column(b)
                    .iter()
                    .zip(states.column(b).iter())
                    .map(|(target, psi)| target.conj() * psi)
                    .sum()
            })
            .collect()
    }
}

impl CostFn for TargetInfidelity {
    fn name(&self) -> &'static str {
        "target_infidelity"
    }

    fn multiplier(&self) -> f64 {
        self.multiplier
    }

    fn schedule(&self) -> EvaluationSchedule {
        EvaluationSchedule::FinalStep
    }

    fn validate(&self, hilbert_size: usize, batch_size: usize) -> Result<()> {
        self.validate_against(hilbert_size, batch_size)
    }

    fn cost(
        &self,
        _controls: ArrayView2<'_, f64>,
        states: &Array2<Complex64>,
        _step: usize,
        _linalg: &dyn LinearAlgebra,
    ) -> f64 {
        let batch = self.targets.ncols() as f64;
        let fidelity_sum: f64 = self
            .overlaps(states)
            .iter()
            .map(|overlap| overlap.norm_sqr())
            .sum();
        1.0 - fidelity_sum / batch
    }

    fn state_vjp(
        &self,
        _controls: ArrayView2<'_, f64>,
        states: &Array2<Complex64>,
        _step: usize,
    ) -> Option<Array2<Complex64>> {
        // d(1 − |o_b|²/B) under the conj-free cotangent convention:
        // G[:, b] = −(2/B) · conj(o_b) · conj(target[:, b]).
        let (dim, batch) = states.dim();
        let overlaps = self.overlaps(states);
        let scale = -2.0 / batch as f64;

        let mut seed = Array2::<Complex64>::zeros((dim, batch));
        for b in 0..batch {
            let factor = scale * overlaps[b].conj();
            for i in 0..dim {
                seed[[i, b]] = factor * self.targets[[i, b]].conj();
            }
        }
        Some(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DenseCpu;
    use crate::test_utils::ket;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    fn empty_controls() -> Array2<f64> {
        Array2::zeros((1, 1))
    }

    #[test]
    fn test_matching_state_has_zero_cost() {
        let cost = TargetInfidelity::new(ket(2, 1), 1.0);
        let value = cost.cost(empty_controls().view(), &ket(2, 1), 0, &DenseCpu);
        assert_relative_eq!(value, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_global_phase_is_ignored() {
        let cost = TargetInfidelity::new(ket(2, 0), 1.0);
        let phased = ket(2, 0).mapv(|z| z * Complex64::from_polar(1.0, 1.3));
        let value = cost.cost(empty_controls().view(), &phased, 0, &DenseCpu);
        assert_relative_eq!(value, 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_orthogonal_state_has_unit_cost() {
        let cost = TargetInfidelity::new(ket(2, 1), 1.0);
        let value = cost.cost(empty_controls().view(), &ket(2, 0), 0, &DenseCpu);
        assert_relative_eq!(value, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_batch_average() {
        // One matching and one orthogonal state: cost = 1 − (1 + 0)/2.
        let mut targets = Array2::<Complex64>::zeros((2, 2));
        targets[[0, 0]] = Complex64::new(1.0, 0.0);
        targets[[1, 1]] = Complex64::new(1.0, 0.0);

        let mut states = Array2::<Complex64>::zeros((2, 2));
        states[[0, 0]] = Complex64::new(1.0, 0.0);
        states[[0, 1]] = Complex64::new(1.0, 0.0);

        let cost = TargetInfidelity::new(targets, 1.0);
        let value = cost.cost(empty_controls().view(), &states, 0, &DenseCpu);
        assert_relative_eq!(value, 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_state_vjp_matches_finite_differences() {
        // Perturb real and imaginary parts independently; the seed's real
        // and negated imaginary parts must match the numeric gradients.
        let mut targets = Array2::<Complex64>::zeros((2, 1));
        targets[[0, 0]] = Complex64::new(0.6, 0.0);
        targets[[1, 0]] = Complex64::new(0.0, 0.8);
        let cost = TargetInfidelity::new(targets, 1.0);

        let mut states = Array2::<Complex64>::zeros((2, 1));
        states[[0, 0]] = Complex64::new(0.3, -0.4);
        states[[1, 0]] = Complex64::new(0.5, 0.2);

        let seed = cost
            .state_vjp(empty_controls().view(), &states, 0)
            .unwrap();

        let eps = 1e-7;
        for i in 0..2 {
            let mut plus = states.clone();
            plus[[i, 0]] += Complex64::new(eps, 0.0);
            let mut minus = states.clone();
            minus[[i, 0]] -= Complex64::new(eps, 0.0);
            let d_re = (cost.cost(empty_controls().view(), &plus, 0, &DenseCpu)
                - cost.cost(empty_controls().view(), &minus, 0, &DenseCpu))
                / (2.0 * eps);

            let mut plus = states.clone();
            plus[[i, 0]] += Complex64::new(0.0, eps);
            let mut minus = states.clone();
            minus[[i, 0]] -= Complex64::new(0.0, eps);
            let d_im = (cost.cost(empty_controls().view(), &plus, 0, &DenseCpu)
                - cost.cost(empty_controls().view(), &minus, 0, &DenseCpu))
                / (2.0 * eps);

            assert_relative_eq!(seed[[i, 0]].re, d_re, epsilon = 1e-8);
            assert_relative_eq!(seed[[i, 0]].im, -d_im, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_validate_against_dimensions() {
        let cost = TargetInfidelity::new(ket(2, 1), 1.0);
        assert!(cost.validate_against(2, 1).is_ok());
        assert!(cost.validate_against(3, 1).is_err());
        assert!(cost.validate_against(2, 2).is_err());
    }
}
