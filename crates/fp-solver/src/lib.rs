//! Exact linear-program solver for production planning.
//!
//! This crate provides a dense-tableau, two-phase primal simplex over
//! [`fp_core::Rational`]. Objectives are organized in lexicographic tiers:
//! each tier is optimized with all earlier optima held fixed, and the outcome
//! is classified as unique, optimal (non-unique), OK (a lower-priority term
//! could do better), unbounded or infeasible.

pub mod error;
pub mod problem;
pub mod simplex;
pub(crate) mod tableau;

pub use error::{SolverError, SolverResult};
pub use problem::{Constraint, LinearProgram, Objective, Relation, Tier, Variable};
pub use simplex::{LpSolution, Shortfall, SimplexConfig, SolveRes, solve};
