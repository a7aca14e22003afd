// Copyright 2026 QOC Engine Contributors
// SPDX-License-Identifier: Apache-2.0

//! Matrix exponential and its reverse-mode gradient rule.
//!
//! The forward operation is scaling-and-squaring with a Padé(13)
//! approximant, following Higham (2005), "The Scaling and Squaring Method
//! for the Matrix Exponential Revisited", SIAM J. Matrix Anal. Appl.
//! 26(4), 1179. It accepts any complex square matrix; the per-step
//! Schrödinger generator is not Hermitian in general once control terms
//! enter, and nothing here assumes normality.
//!
//! The backward operation [`expm_vjp`] is the engine's core gradient rule.
//! The exact Fréchet derivative of the exponential in a unit direction
//! `E_ij` is the integral `∫₀¹ exp(sM)·E_ij·exp((1-s)M) ds`, which has no
//! cheap closed form. This engine uses the first-order approximation
//!
//! ```text
//! d exp(M)[E_ij] ≈ E_ij · exp(M)
//! ```
//!
//! valid when ‖M‖ is small — the usual regime, since the propagator
//! generator is `-i·H·dt` with `dt` chosen to resolve the dynamics. The
//! approximation is intentional; substituting the exact Fréchet derivative
//! would change reference behavior.

use ndarray::parallel::prelude::*;
use ndarray::{s, Array2, Axis};
use num_complex::Complex64;

/// Padé(13,13) numerator/denominator coefficients, Higham (2005) eq. (10.33).
const PADE13_COEFFS: [f64; 14] = [
    1.0,
    0.5,
    0.12,
    1.833_333_333_333_333_4e-2,
    1.992_753_623_188_405_8e-3,
    1.630_434_782_608_696e-4,
    1.035_196_687_401_6e-5,
    5.175_983_437_008_01e-7,
    2.043_151_356_652_5e-8,
    6.306_022_705_717_593e-10,
    1.483_770_048_404_14e-11,
    2.529_153_491_597_966e-13,
    2.810_170_546_219_962_4e-15,
    1.544_049_750_670_309e-17,
];

/// Padé(13) validity bound theta_13 from Higham Table 10.2.
const THETA_13: f64 = 5.371_920_351_148_152;

/// Compute the matrix exponential `exp(M)` of a complex square matrix.
///
/// # Panics
/// Panics if `m` is not square.
pub fn matrix_exp(m: &Array2<Complex64>) -> Array2<Complex64> {
    let n = m.nrows();
    assert_eq!(n, m.ncols(), "matrix_exp requires a square matrix");

    match n {
        0 => return Array2::zeros((0, 0)),
        1 => {
            let mut out = Array2::zeros((1, 1));
            out[[0, 0]] = m[[0, 0]].exp();
            return out;
        }
        _ => {}
    }

    // Scale so that ||M / 2^s||_1 <= theta_13, approximate, then undo the
    // scaling by repeated squaring.
    let norm = one_norm(m);
    let squarings = if norm > THETA_13 {
        (norm / THETA_13).log2().ceil() as u32
    } else {
        0
    };

    let scale = Complex64::new((0.5f64).powi(squarings as i32), 0.0);
    let scaled = m * scale;

    let (u, v) = pade13_terms(&scaled);
    // exp(A) ≈ (V - U)^{-1} (V + U)
    let mut result = solve(&v - &u, &v + &u);

    for _ in 0..squarings {
        result = result.dot(&result);
    }
    result
}

/// Numerator-odd (`U`) and numerator-even (`V`) polynomial terms of the
/// Padé(13) approximant evaluated at `a`.
fn pade13_terms(a: &Array2<Complex64>) -> (Array2<Complex64>, Array2<Complex64>) {
    let n = a.nrows();
    let b = |k: usize| Complex64::new(PADE13_COEFFS[k], 0.0);
    let eye = Array2::from_diag_elem(n, Complex64::new(1.0, 0.0));

    let a2 = a.dot(a);
    let a4 = a2.dot(&a2);
    let a6 = a2.dot(&a4);

    // U = A · [ (b13·A6 + b11·A4 + b9·A2) · A6 + b7·A6 + b5·A4 + b3·A2 + b1·I ]
    let u_high = &a6 * b(13) + &a4 * b(11) + &a2 * b(9);
    let u_poly = u_high.dot(&a6) + &a6 * b(7) + &a4 * b(5) + &a2 * b(3) + &eye * b(1);
    let u = a.dot(&u_poly);

    // V = (b12·A6 + b10·A4 + b8·A2) · A6 + b6·A6 + b4·A4 + b2·A2 + b0·I
    let v_high = &a6 * b(12) + &a4 * b(10) + &a2 * b(8);
    let v = v_high.dot(&a6) + &a6 * b(6) + &a4 * b(4) + &a2 * b(2) + &eye * b(0);

    (u, v)
}

/// Solve `A · X = B` by Gaussian elimination with partial pivoting.
///
/// The Padé denominator is nonsingular for any input the scaling step
/// admits, so no singularity handling exists here; a degenerate pivot from
/// non-finite input propagates as NaN/Inf per the engine's error policy.
fn solve(a: Array2<Complex64>, b: Array2<Complex64>) -> Array2<Complex64> {
    let n = a.nrows();
    let m = b.ncols();
    debug_assert_eq!(n, a.ncols());
    debug_assert_eq!(n, b.nrows());

    let mut aug = Array2::zeros((n, n + m));
    aug.slice_mut(s![.., ..n]).assign(&a);
    aug.slice_mut(s![.., n..]).assign(&b);

    for col in 0..n {
        // Partial pivot: largest magnitude on or below the diagonal.
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| {
                aug[[r1, col]]
                    .norm_sqr()
                    .total_cmp(&aug[[r2, col]].norm_sqr())
            })
            .unwrap_or(col);
        if pivot_row != col {
            for j in 0..(n + m) {
                aug.swap([col, j], [pivot_row, j]);
            }
        }

        let pivot = aug[[col, col]];
        for row in (col + 1)..n {
            let factor = aug[[row, col]] / pivot;
            for j in col..(n + m) {
                let above = aug[[col, j]];
                aug[[row, j]] -= factor * above;
            }
        }
    }

    let mut x = Array2::<Complex64>::zeros((n, m));
    for col in (0..n).rev() {
        let pivot = aug[[col, col]];
        for j in 0..m {
            let mut acc = aug[[col, n + j]];
            for k in (col + 1)..n {
                acc -= aug[[col, k]] * x[[k, j]];
            }
            x[[col, j]] = acc / pivot;
        }
    }
    x
}

/// 1-norm (maximum absolute column sum) of a complex matrix.
fn one_norm(m: &Array2<Complex64>) -> f64 {
    m.axis_iter(Axis(1))
        .map(|col| col.iter().map(|z| z.norm()).sum::<f64>())
        .fold(0.0f64, f64::max)
}

/// Reverse-mode rule for [`matrix_exp`].
///
/// `upstream` is the sensitivity of the final scalar with respect to each
/// element of `exp(M)`; `exp_matrix` is the cached forward output. Under
/// the engine's cotangent convention (see [`crate::propagate`]) the
/// first-order approximation `d exp(M)[E_ij] ≈ E_ij · exp(M)` reduces to
///
/// ```text
/// grad[i][j] = Σ_k upstream[i][k] · exp_matrix[j][k]
/// ```
///
/// i.e. the partial with respect to element `(i, j)` of the input touches
/// only row `i` of the upstream sensitivity and row `j` of the cached
/// exponential. Rows of the output are independent, so the kernel runs
/// them in parallel; the inner contraction is a plain dot over `k`.
///
/// # Panics
/// Panics if the two arguments differ in shape.
pub fn expm_vjp(
    upstream: &Array2<Complex64>,
    exp_matrix: &Array2<Complex64>,
) -> Array2<Complex64> {
    let n = exp_matrix.nrows();
    assert_eq!(
        upstream.dim(),
        exp_matrix.dim(),
        "expm_vjp requires matching sensitivity and exponential shapes"
    );

    let mut grad = Array2::zeros((n, n));
    grad.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut grad_row)| {
            let upstream_row = upstream.row(i);
            for j in 0..n {
                let exp_row = exp_matrix.row(j);
                let mut acc = Complex64::new(0.0, 0.0);
                for k in 0..n {
                    acc += upstream_row[k] * exp_row[k];
                }
                grad_row[j] = acc;
            }
        });
    grad
}
