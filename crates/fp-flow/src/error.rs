//! Flow-model error types.

use fp_core::{FpError, Rational, UnitId};
use thiserror::Error;

use crate::key::FlowKey;

pub type FlowResult<T> = Result<T, FlowError>;

/// Unit construction and composite errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("Unit {0} is not in the plant")]
    UnknownUnit(UnitId),

    #[error("Unit {unit:?} lists flow {key} more than once")]
    DuplicateKey { unit: String, key: FlowKey },

    #[error("Unit name must not be empty")]
    EmptyName,

    #[error("Invalid multiplier {value}: {reason}")]
    InvalidMultiplier {
        value: Rational,
        reason: &'static str,
    },

    #[error("Throttle {value} is out of range for unit {unit:?}")]
    ThrottleOutOfRange { unit: String, value: Rational },

    #[error(transparent)]
    Core(#[from] FpError),
}
