//! Error types for container construction and solving.

use fp_core::FpError;
use fp_flow::FlowError;
use fp_solver::SolverError;
use thiserror::Error;

/// Errors raised while declaring or solving a container.
///
/// Infeasible or non-unique plans are not errors; see [`SolveRes`](crate::SolveRes).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Container {name:?} has no units to solve")]
    EmptyStructure { name: String },

    #[error(transparent)]
    Core(#[from] FpError),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

pub type PlanResult<T> = Result<T, PlanError>;

pub(crate) fn config_err(what: impl Into<String>) -> PlanError {
    PlanError::Configuration { what: what.into() }
}
