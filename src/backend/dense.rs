// Copyright 2026 QOC Engine Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense-CPU linear algebra.

use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;

use super::{Backend, LinearAlgebra};
use crate::expm;

/// Dense complex arithmetic on the CPU via `ndarray`.
#[derive(Debug, Clone, Copy)]
pub struct DenseCpu;

impl LinearAlgebra for DenseCpu {
    fn backend(&self) -> Backend {
        Backend::DenseCpu
    }

    fn expm(&self, generator: &Array2<Complex64>) -> Array2<Complex64> {
        expm::matrix_exp(generator)
    }

    fn expm_vjp(
        &self,
        upstream: &Array2<Complex64>,
        exp_matrix: &Array2<Complex64>,
    ) -> Array2<Complex64> {
        expm::expm_vjp(upstream, exp_matrix)
    }

    fn matmul(
        &self,
        a: ArrayView2<'_, Complex64>,
        b: ArrayView2<'_, Complex64>,
    ) -> Array2<Complex64> {
        a.dot(&b)
    }

    fn reduce_sum(&self, values: ArrayView2<'_, f64>) -> f64 {
        values.sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_matmul_identity() {
        let eye = Array2::from_diag_elem(3, Complex64::new(1.0, 0.0));
        let m = Array2::from_shape_fn((3, 3), |(i, j)| Complex64::new(i as f64, j as f64));
        let product = DenseCpu.matmul(eye.view(), m.view());
        assert_eq!(product, m);
    }

    #[test]
    fn test_matmul_batched_states() {
        // (2x2) x (2x3) batch — three states advanced in one product
        let u = array![
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
        ];
        let batch = array![
            [
                Complex64::new(1.0, 0.0),
                Complex64::new(0.0, 0.0),
                Complex64::new(0.5, 0.0)
            ],
            [
                Complex64::new(0.0, 0.0),
                Complex64::new(1.0, 0.0),
                Complex64::new(0.5, 0.0)
            ],
        ];
        let advanced = DenseCpu.matmul(u.view(), batch.view());
        // Row swap: column 0 becomes |1>, column 1 becomes |0>
        assert_eq!(advanced[[1, 0]], Complex64::new(1.0, 0.0));
        assert_eq!(advanced[[0, 1]], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_reduce_sum() {
        let values = array![[1.0, 2.0], [3.0, 4.0]];
        assert_relative_eq!(DenseCpu.reduce_sum(values.view()), 10.0, epsilon = 1e-15);
    }
}
