// Copyright 2026 QOC Engine Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the propagation engine.
//!
//! The engine recognizes three failure kinds: shape mismatches (detected
//! before any propagation step), backend configuration errors (detected at
//! selection or dispatch time), and non-finite numerics — which are *not*
//! errors here. NaN/Inf values propagate through the objective and are
//! surfaced in the returned total for the optimizer loop to act on.

use std::fmt;

use crate::backend::Backend;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Engine error types.
#[derive(Debug)]
pub enum Error {
    /// Configuration error
    Config(String),
    /// Dimension inconsistency in a problem definition or evaluation input
    Shape(ShapeError),
    /// Backend selection or dispatch error
    Backend(BackendError),
    /// IO error
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Shape(e) => write!(f, "Shape error: {}", e),
            Error::Backend(e) => write!(f, "Backend error: {}", e),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Shape(e) => Some(e),
            Error::Backend(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ShapeError> for Error {
    fn from(e: ShapeError) -> Self {
        Error::Shape(e)
    }
}

impl From<BackendError> for Error {
    fn from(e: BackendError) -> Self {
        Error::Backend(e)
    }
}

impl From<serde_yml::Error> for Error {
    fn from(e: serde_yml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Dimension inconsistencies, reported before any numeric work starts.
#[derive(Debug)]
pub enum ShapeError {
    /// Control trajectory does not match the declared time grid / parameter count
    ControlTrajectory {
        expected_steps: usize,
        expected_params: usize,
        got_rows: usize,
        got_cols: usize,
    },
    /// State batch rows do not match the Hilbert-space dimension
    StateBatch { expected_dim: usize, got_dim: usize },
    /// Two state batches declared for the same problem disagree in size
    BatchSize { expected: usize, got: usize },
    /// A Hamiltonian term is not square or does not match the Hilbert dimension
    Hamiltonian {
        expected_dim: usize,
        got_rows: usize,
        got_cols: usize,
    },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::ControlTrajectory {
                expected_steps,
                expected_params,
                got_rows,
                got_cols,
            } => write!(
                f,
                "control trajectory must be {} steps x {} params, got {} x {}",
                expected_steps, expected_params, got_rows, got_cols
            ),
            ShapeError::StateBatch {
                expected_dim,
                got_dim,
            } => write!(
                f,
                "state batch must have Hilbert dimension {}, got {}",
                expected_dim, got_dim
            ),
            ShapeError::BatchSize { expected, got } => {
                write!(f, "state batch size must be {}, got {}", expected, got)
            }
            ShapeError::Hamiltonian {
                expected_dim,
                got_rows,
                got_cols,
            } => write!(
                f,
                "Hamiltonian term must be {0} x {0}, got {1} x {2}",
                expected_dim, got_rows, got_cols
            ),
        }
    }
}

impl std::error::Error for ShapeError {}

/// Backend selection and dispatch errors.
#[derive(Debug)]
pub enum BackendError {
    /// The requested backend tag has no implementation in this build
    Unsupported(Backend),
    /// An operation was dispatched with a tag its storage form cannot
    /// serve. Reserved taxonomy arm: only sparse/GPU implementations have
    /// dispatch paths that can raise it; the dense-CPU build does not.
    Mismatch { operation: String, backend: Backend },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Unsupported(tag) => {
                write!(f, "Backend not available in this build: {}", tag)
            }
            BackendError::Mismatch { operation, backend } => {
                write!(
                    f,
                    "Operation '{}' is incompatible with backend {}",
                    operation, backend
                )
            }
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_error_display_config() {
        let e = Error::Config("step_count must be > 0".into());
        assert_eq!(
            e.to_string(),
            "Configuration error: step_count must be > 0"
        );
    }

    #[test]
    fn test_error_display_shape_control_trajectory() {
        let e = Error::Shape(ShapeError::ControlTrajectory {
            expected_steps: 100,
            expected_params: 1,
            got_rows: 50,
            got_cols: 1,
        });
        assert_eq!(
            e.to_string(),
            "Shape error: control trajectory must be 100 steps x 1 params, got 50 x 1"
        );
    }

    #[test]
    fn test_error_display_shape_state_batch() {
        let e = Error::Shape(ShapeError::StateBatch {
            expected_dim: 2,
            got_dim: 3,
        });
        assert_eq!(
            e.to_string(),
            "Shape error: state batch must have Hilbert dimension 2, got 3"
        );
    }

    #[test]
    fn test_error_display_shape_batch_size() {
        let e = ShapeError::BatchSize {
            expected: 3,
            got: 2,
        };
        assert_eq!(e.to_string(), "state batch size must be 3, got 2");
    }

    #[test]
    fn test_error_display_shape_hamiltonian() {
        let e = ShapeError::Hamiltonian {
            expected_dim: 2,
            got_rows: 2,
            got_cols: 3,
        };
        assert_eq!(e.to_string(), "Hamiltonian term must be 2 x 2, got 2 x 3");
    }

    #[test]
    fn test_error_display_backend_unsupported() {
        let e = Error::Backend(BackendError::Unsupported(Backend::SparseGpu));
        assert_eq!(
            e.to_string(),
            "Backend error: Backend not available in this build: sparse-gpu"
        );
    }

    #[test]
    fn test_error_display_backend_mismatch() {
        let e = BackendError::Mismatch {
            operation: "expm".into(),
            backend: Backend::SparseCpu,
        };
        assert_eq!(
            e.to_string(),
            "Operation 'expm' is incompatible with backend sparse-cpu"
        );
    }

    #[test]
    fn test_error_display_io() {
        let e = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(e.to_string(), "IO error: gone");
    }

    #[test]
    fn test_error_source_shape() {
        let e = Error::Shape(ShapeError::BatchSize {
            expected: 1,
            got: 2,
        });
        assert!(e.source().is_some());
    }

    #[test]
    fn test_error_source_backend() {
        let e = Error::Backend(BackendError::Unsupported(Backend::DenseGpu));
        assert!(e.source().is_some());
    }

    #[test]
    fn test_error_source_none_for_config() {
        let e = Error::Config("x".into());
        assert!(e.source().is_none());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
    }

    #[test]
    fn test_from_shape_error() {
        let se = ShapeError::StateBatch {
            expected_dim: 2,
            got_dim: 4,
        };
        let e: Error = se.into();
        assert!(matches!(e, Error::Shape(ShapeError::StateBatch { .. })));
    }

    #[test]
    fn test_from_backend_error() {
        let be = BackendError::Unsupported(Backend::DenseGpu);
        let e: Error = be.into();
        assert!(matches!(e, Error::Backend(BackendError::Unsupported(_))));
    }

    #[test]
    fn test_from_serde_yml_error() {
        let yaml_err = serde_yml::from_str::<serde_yml::Value>("{{{{").unwrap_err();
        let e: Error = yaml_err.into();
        assert!(matches!(e, Error::Serialization(_)));
    }
}
