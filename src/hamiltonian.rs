// Copyright 2026 QOC Engine Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hamiltonian evaluation.
//!
//! The engine treats the Hamiltonian as an opaque differentiable function
//! of the control parameters at one time step. Instead of a global
//! autodiff registry, every model carries its own dual-function pair:
//! a forward [`evaluate`] and a reverse-mode [`vjp`] mapping a sensitivity
//! with respect to the evaluated matrix back to a sensitivity with respect
//! to the parameters.
//!
//! [`evaluate`]: HamiltonianModel::evaluate
//! [`vjp`]: HamiltonianModel::vjp

use ndarray::{Array1, Array2, ArrayView1};
use num_complex::Complex64;

use crate::error::{Result, ShapeError};

/// A parameterized, time-local Hamiltonian.
///
/// Implementations must be pure: the same `(params, time)` pair always
/// yields the same matrix, and no state is kept across calls.
pub trait HamiltonianModel: Send + Sync {
    /// Hilbert-space dimension of the evaluated matrices.
    fn dimension(&self) -> usize;

    /// Build the effective Hamiltonian for one time step.
    fn evaluate(&self, params: ArrayView1<'_, f64>, time: f64) -> Array2<Complex64>;

    /// Pull a sensitivity with respect to the evaluated matrix back to the
    /// control parameters.
    ///
    /// `sensitivity` follows the crate cotangent convention (see
    /// [`crate::propagate`]): for a real parameter `u_p`,
    /// `g_p = Re(Σ_ij sensitivity[i][j] · ∂H[i][j]/∂u_p)`.
    fn vjp(
        &self,
        sensitivity: &Array2<Complex64>,
        params: ArrayView1<'_, f64>,
        time: f64,
    ) -> Array1<f64>;
}

/// Drift plus linear control terms: `H(u, t) = H_drift + Σ_p u_p · H_p`.
///
/// Covers the standard GRAPE setup; anything fancier (nonlinear parameter
/// maps, explicit time dependence in the generators) implements
/// [`HamiltonianModel`] directly.
pub struct LinearHamiltonian {
    drift: Array2<Complex64>,
    control_generators: Vec<Array2<Complex64>>,
}

impl LinearHamiltonian {
    /// Create a linear model from a drift term and one fixed generator per
    /// control parameter.
    ///
    /// Fails fast if any term is not square or disagrees with the drift
    /// dimension.
    pub fn new(
        drift: Array2<Complex64>,
        control_generators: Vec<Array2<Complex64>>,
    ) -> Result<Self> {
        let dim = drift.nrows();
        if drift.ncols() != dim {
            return Err(ShapeError::Hamiltonian {
                expected_dim: dim,
                got_rows: drift.nrows(),
                got_cols: drift.ncols(),
            }
            .into());
        }
        for generator in &control_generators {
            if generator.nrows() != dim || generator.ncols() != dim {
                return Err(ShapeError::Hamiltonian {
                    expected_dim: dim,
                    got_rows: generator.nrows(),
                    got_cols: generator.ncols(),
                }
                .into());
            }
        }
        Ok(Self {
            drift,
            control_generators,
        })
    }

    /// Number of control parameters this model consumes per step.
    pub fn param_count(&self) -> usize {
        self.control_generators.len()
    }
}

impl HamiltonianModel for LinearHamiltonian {
    fn dimension(&self) -> usize {
        self.drift.nrows()
    }

    fn evaluate(&self, params: ArrayView1<'_, f64>, _time: f64) -> Array2<Complex64> {
        debug_assert_eq!(params.len(), self.control_generators.len());
        let mut h = self.drift.clone();
        for (generator, &amplitude) in self.control_generators.iter().zip(params.iter()) {
            h = h + generator * Complex64::new(amplitude, 0.0);
        }
        h
    }

    fn vjp(
        &self,
        sensitivity: &Array2<Complex64>,
        params: ArrayView1<'_, f64>,
        _time: f64,
    ) -> Array1<f64> {
        debug_assert_eq!(params.len(), self.control_generators.len());
        // dH/du_p is the constant generator H_p, so each component is a
        // single real-part contraction.
        Array1::from_iter(self.control_generators.iter().map(|generator| {
            sensitivity
                .iter()
                .zip(generator.iter())
                .map(|(g, h)| (g * h).re)
                .sum::<f64>()
        }))
    }
}
