// Copyright 2026 QOC Engine Contributors
// SPDX-License-Identifier: Apache-2.0

//! Linear-algebra capability trait.

use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;

use super::Backend;

/// The operations every compute backend must provide.
///
/// The engine calls exactly these entry points; everything else is built
/// from them. Implementations must tolerate arbitrary complex square
/// matrices (including non-Hermitian and singular inputs) in [`expm`] and
/// let non-finite values propagate rather than raising errors.
///
/// [`expm`]: LinearAlgebra::expm
pub trait LinearAlgebra: Send + Sync {
    /// The tag this implementation serves.
    fn backend(&self) -> Backend;

    /// Matrix exponential `exp(M)` of a complex square matrix.
    fn expm(&self, generator: &Array2<Complex64>) -> Array2<Complex64>;

    /// Reverse-mode rule for [`expm`](LinearAlgebra::expm).
    ///
    /// Maps the upstream sensitivity with respect to `exp(M)` to the
    /// sensitivity with respect to `M`, using the cached exponential from
    /// the forward pass. See [`crate::expm::expm_vjp`] for the contract.
    fn expm_vjp(
        &self,
        upstream: &Array2<Complex64>,
        exp_matrix: &Array2<Complex64>,
    ) -> Array2<Complex64>;

    /// Matrix product `A · B`. With `B` an `(n, B)` state batch this is
    /// the batched matrix-vector product across the batch dimension.
    fn matmul(&self, a: ArrayView2<'_, Complex64>, b: ArrayView2<'_, Complex64>)
        -> Array2<Complex64>;

    /// Sum of all entries of a real array (cost-term reductions).
    fn reduce_sum(&self, values: ArrayView2<'_, f64>) -> f64;
}
