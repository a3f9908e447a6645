//! fp-flow: flow model layer for flowplan.
//!
//! Provides:
//! - Flow keys, per-key gross/net flows and aggregated flow reports
//! - Production units stored in a `Plant` arena, addressed by `UnitId`
//! - Composites: weighted, nestable groupings of units
//! - Stable indexing of reachable units for solver integration
//!
//! # Example
//!
//! ```
//! use fp_core::Rational;
//! use fp_flow::{FlowKey, Plant, combine};
//!
//! let mut plant = Plant::new();
//! let a = plant
//!     .add_unit("a", [("x", Rational::from(2)), ("y", Rational::from(-6))])
//!     .unwrap();
//! let b = plant.add_unit("b", [("y", Rational::from(5))]).unwrap();
//!
//! let both = combine(a, b);
//! let flows = both.flows(&plant).unwrap();
//! assert_eq!(flows.net(&FlowKey::from("y")), Rational::from(-1));
//! ```

pub mod composite;
pub mod error;
pub mod flow;
pub mod indexing;
pub mod key;
pub mod plant;
pub mod unit;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use composite::{Child, Composite, combine, scale};
pub use error::{FlowError, FlowResult};
pub use flow::{Flow, FlowReport};
pub use indexing::UnitIndex;
pub use key::FlowKey;
pub use plant::Plant;
pub use unit::Unit;
