//! Production planning over an exact flow model.
//!
//! A [`Container`] wraps a [`Composite`](fp_flow::Composite) with declared
//! outputs, inputs, constraints and priorities. Solving builds a tiered linear
//! program, runs the exact simplex in `fp-solver` and writes each unit's
//! throttle back into the [`Plant`](fp_flow::Plant).
//!
//! ```
//! use fp_core::Rational;
//! use fp_flow::{Plant, combine};
//! use fp_plan::{Container, ContainerConfig, SolveRes};
//!
//! let mut plant = Plant::new();
//! let a = plant.add_unit("a", [("x", Rational::from(2)), ("y", Rational::from(-6))]).unwrap();
//! let b = plant.add_unit("b", [("y", Rational::from(5))]).unwrap();
//!
//! let container = Container::new(combine(a, b), ContainerConfig::new(), &plant).unwrap();
//! assert_eq!(container.solve(&mut plant).unwrap(), SolveRes::Unique);
//! assert_eq!(plant.unit(a).unwrap().throttle(), &Rational::new(5, 6).unwrap());
//! ```

pub mod config;
pub mod constraint;
pub mod container;
pub mod error;
pub mod target;
pub mod union;

mod builder;
mod summary;

pub use config::{ContainerConfig, Declarations, OutputTarget, PriorityKey};
pub use constraint::FlowConstraint;
pub use container::{Bottleneck, Container, FinalizeReport, Rounding, SolveReport};
pub use error::{PlanError, PlanResult};
pub use fp_solver::{Relation, Shortfall, SimplexConfig, SolveRes};
pub use target::{Priority, RateSpec, Target, with_rate};
pub use union::union;
