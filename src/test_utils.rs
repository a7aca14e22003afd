// Copyright 2026 QOC Engine Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared fixtures for the test suites.

use ndarray::Array2;
use num_complex::Complex64;

/// Pauli X.
pub fn pauli_x() -> Array2<Complex64> {
    let mut m = Array2::zeros((2, 2));
    m[[0, 1]] = Complex64::new(1.0, 0.0);
    m[[1, 0]] = Complex64::new(1.0, 0.0);
    m
}

/// Pauli Z.
pub fn pauli_z() -> Array2<Complex64> {
    let mut m = Array2::zeros((2, 2));
    m[[0, 0]] = Complex64::new(1.0, 0.0);
    m[[1, 1]] = Complex64::new(-1.0, 0.0);
    m
}

/// Annihilation operator on an `n`-level truncation.
pub fn annihilation(n: usize) -> Array2<Complex64> {
    let mut m = Array2::zeros((n, n));
    for k in 1..n {
        m[[k - 1, k]] = Complex64::new((k as f64).sqrt(), 0.0);
    }
    m
}

/// Creation operator on an `n`-level truncation.
pub fn creation(n: usize) -> Array2<Complex64> {
    annihilation(n).t().to_owned()
}

/// Computational basis state `|index⟩` as a one-column batch.
pub fn ket(dim: usize, index: usize) -> Array2<Complex64> {
    let mut state = Array2::zeros((dim, 1));
    state[[index, 0]] = Complex64::new(1.0, 0.0);
    state
}

/// Deterministic dense complex matrix with entries spread by low-discrepancy
/// irrational multiples, so tests stay reproducible without a random-number
/// dependency. The real and imaginary sequences use unrelated irrationals;
/// phi and phi^2 share a fractional part (phi^2 = phi + 1), which would tie
/// the two parts together.
pub fn golden_complex_matrix(n: usize, scale: f64, seed_offset: usize) -> Array2<Complex64> {
    const PHI: f64 = 1.618_033_988_749_895;
    Array2::from_shape_fn((n, n), |(i, j)| {
        let k = (seed_offset + i * n + j + 1) as f64;
        let re = (k * PHI).fract() - 0.5;
        let im = (k * std::f64::consts::SQRT_2).fract() - 0.5;
        Complex64::new(re * scale, im * scale)
    })
}

/// Assert element-wise closeness of two complex matrices. `tol = 0.0`
/// demands exact equality.
pub fn assert_matrix_close(actual: &Array2<Complex64>, expected: &Array2<Complex64>, tol: f64) {
    assert_eq!(actual.dim(), expected.dim(), "matrix shapes differ");
    for ((i, j), a) in actual.indexed_iter() {
        let e = expected[[i, j]];
        assert!(
            (a - e).norm() <= tol,
            "entry ({}, {}): {} vs {} (tol {})",
            i,
            j,
            a,
            e,
            tol
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_matrix_close_accepts_exact_equality_at_zero_tol() {
        let m = golden_complex_matrix(3, 1.0, 2);
        assert_matrix_close(&m, &m.clone(), 0.0);
    }

    #[test]
    fn test_golden_matrix_parts_are_independent() {
        // The real and imaginary sequences must not be scalar multiples of
        // each other, or complex test inputs degenerate.
        let m = golden_complex_matrix(4, 1.0, 0);
        assert!(m.iter().any(|z| (z.re - z.im).abs() > 1e-3));
        assert!(m.iter().any(|z| (z.re + z.im).abs() > 1e-3));
    }
}
