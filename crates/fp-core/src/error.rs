use thiserror::Error;

pub type FpResult<T> = Result<T, FpError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FpError {
    #[error("Division by zero")]
    DivideByZero,

    #[error("Cannot parse {input:?} as an exact number: {reason}")]
    Parse { input: String, reason: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
