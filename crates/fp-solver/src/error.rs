//! Error types for solver operations.

use fp_core::error::FpError;
use thiserror::Error;

/// Errors that can occur while solving a linear program.
///
/// Infeasible, unbounded and non-unique problems are not errors; they are
/// reported through [`SolveRes`](crate::SolveRes).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Pivot limit of {limit} reached")]
    PivotLimit { limit: usize },

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for FpError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::ProblemSetup { what: _ } => FpError::InvalidArg {
                what: "problem setup",
            },
            SolverError::PivotLimit { limit: _ } => FpError::InvalidArg { what: "pivot limit" },
            SolverError::Numeric { what: _ } => FpError::Invariant { what: "numeric" },
        }
    }
}
