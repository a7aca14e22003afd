// Copyright 2026 QOC Engine Contributors
// SPDX-License-Identifier: Apache-2.0

//! Compute-backend selection.
//!
//! Every numeric operation in the engine is dispatched through a
//! [`LinearAlgebra`] capability handle selected once per run from a
//! [`Backend`] tag. The rest of the engine is backend-agnostic: it holds
//! an `Arc<dyn LinearAlgebra>` and never inspects the tag again.
//!
//! This build ships the dense-CPU implementation. The remaining tags are
//! reserved; selecting one fails fast with a configuration error rather
//! than silently falling back to dense arithmetic.

pub mod dense;
pub mod linalg;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BackendError, Error, Result};

pub use dense::DenseCpu;
pub use linalg::LinearAlgebra;

/// Enumerated compute-backend tag.
///
/// The tag must be consistent across the Hamiltonian evaluator, the
/// exponential operator, and every cost term for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Dense matrices on the CPU
    DenseCpu,
    /// Dense matrices on an accelerator
    DenseGpu,
    /// Sparse matrices on the CPU
    SparseCpu,
    /// Sparse matrices on an accelerator
    SparseGpu,
}

impl Default for Backend {
    fn default() -> Self {
        Backend::DenseCpu
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::DenseCpu => write!(f, "dense-cpu"),
            Backend::DenseGpu => write!(f, "dense-gpu"),
            Backend::SparseCpu => write!(f, "sparse-cpu"),
            Backend::SparseGpu => write!(f, "sparse-gpu"),
        }
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dense-cpu" => Ok(Backend::DenseCpu),
            "dense-gpu" => Ok(Backend::DenseGpu),
            "sparse-cpu" => Ok(Backend::SparseCpu),
            "sparse-gpu" => Ok(Backend::SparseGpu),
            other => Err(Error::Config(format!("unknown backend tag: {}", other))),
        }
    }
}

/// Select the linear-algebra implementation for a backend tag.
///
/// Returns [`BackendError::Unsupported`] for tags without an
/// implementation in this build.
pub fn select(tag: Backend) -> Result<Arc<dyn LinearAlgebra>> {
    match tag {
        Backend::DenseCpu => {
            debug!(backend = %tag, "Selected linear-algebra backend");
            Ok(Arc::new(DenseCpu))
        }
        other => Err(BackendError::Unsupported(other).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_through_from_str() {
        for tag in [
            Backend::DenseCpu,
            Backend::DenseGpu,
            Backend::SparseCpu,
            Backend::SparseGpu,
        ] {
            let parsed: Backend = tag.to_string().parse().unwrap();
            assert_eq!(parsed, tag);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown_tag() {
        let result: Result<Backend> = "dense-tpu".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_default_is_dense_cpu() {
        assert_eq!(Backend::default(), Backend::DenseCpu);
    }

    #[test]
    fn test_select_dense_cpu() {
        let linalg = select(Backend::DenseCpu).unwrap();
        assert_eq!(linalg.backend(), Backend::DenseCpu);
    }

    #[test]
    fn test_select_unimplemented_tags_fail_fast() {
        for tag in [Backend::DenseGpu, Backend::SparseCpu, Backend::SparseGpu] {
            let result = select(tag);
            assert!(matches!(
                result,
                Err(Error::Backend(BackendError::Unsupported(t))) if t == tag
            ));
        }
    }

    #[test]
    fn test_serde_kebab_case() {
        let yaml = serde_yml::to_string(&Backend::SparseCpu).unwrap();
        assert_eq!(yaml.trim(), "sparse-cpu");
        let parsed: Backend = serde_yml::from_str("dense-cpu").unwrap();
        assert_eq!(parsed, Backend::DenseCpu);
    }
}
