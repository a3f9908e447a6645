//! fp-core: stable foundation for flowplan.
//!
//! Contains:
//! - rational (exact arbitrary-precision numbers, the only numeric type used downstream)
//! - ids (stable compact IDs for arena objects)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod rational;

// Re-exports: nice ergonomics for downstream crates
pub use error::{FpError, FpResult};
pub use ids::*;
pub use rational::Rational;
