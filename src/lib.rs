// Copyright 2026 QOC Engine Contributors
// SPDX-License-Identifier: Apache-2.0

//! Differentiable discrete-time Schrödinger propagation engine.
//!
//! This crate is the numerical core of a GRAPE-style quantum optimal
//! control stack: given a parameterized time-dependent Hamiltonian, it
//! propagates a batch of quantum states across a discrete time grid and
//! returns the reverse-mode gradient of a weighted cost total with
//! respect to every control parameter at every time step.
//!
//! # Architecture
//!
//! ```text
//! controls ──► HamiltonianModel ──► matrix_exp ──► state batch ──► CostFn Σ
//!    ▲                                                                │
//!    └──────────────── backward pass over the EvolutionTape ◄─────────┘
//! ```
//!
//! The engine is split into small, pure pieces:
//!
//! - [`expm`]: matrix exponential (Padé-13 scaling-and-squaring) and its
//!   custom reverse-mode rule (first-order Fréchet approximation)
//! - [`hamiltonian`]: the user-supplied generator and its parameter vjp
//! - [`propagate`]: sequential forward scan, per-step tape, backward pass
//! - [`cost`]: cost-term capability and the provided penalty terms
//! - [`objective`]: the single entry point consumed by an optimizer loop
//! - [`backend`]: linear-algebra capability selection (dense/sparse, CPU/GPU)
//!
//! # References
//!
//! - Khaneja et al. (2005), "Optimal control of coupled spin dynamics",
//!   J. Magn. Reson. 172, 296. doi:10.1016/j.jmr.2004.11.004
//! - Higham (2005), "The Scaling and Squaring Method for the Matrix
//!   Exponential Revisited", SIAM J. Matrix Anal. Appl. 26(4), 1179.

pub mod backend;
pub mod config;
pub mod cost;
pub mod error;
pub mod expm;
pub mod hamiltonian;
pub mod objective;
pub mod propagate;

pub use backend::Backend;
pub use config::EvolutionConfig;
pub use error::{Error, Result};
pub use objective::{Evaluation, SchrodingerObjective};

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
