//! Error types for the numerical core.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolveError>;

/// Failures reported by the Cholesky-based solver layer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    #[error("matrix is not symmetric positive-definite")]
    NotSpd,

    #[error("least-squares system is singular to working precision")]
    Singular,
}

/// Failures surfaced by the Oneka engine to its caller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    #[error("piezometer set produced a singular regression system")]
    Singular,
}

impl From<SolveError> for EngineError {
    fn from(_: SolveError) -> Self {
        EngineError::Singular
    }
}
