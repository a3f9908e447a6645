//! fp-project: declarative plan files, the unit registry and plan construction.

pub mod build;
pub mod config;
pub mod registry;
pub mod schema;
pub mod validate;

pub use build::{BuiltPlan, build_plan};
pub use config::BuildConfig;
pub use registry::Registry;
pub use schema::*;
pub use validate::{ValidationError, validate_plan};

use fp_core::FpError;
use fp_flow::FlowError;
use fp_plan::PlanError;
use tracing::debug;

pub const LATEST_VERSION: u32 = 1;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Build error: {what}")]
    Build { what: String },

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Value error: {0}")]
    Core(#[from] FpError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn from_yaml_str(content: &str) -> ProjectResult<PlanFile> {
    let plan: PlanFile = serde_yaml::from_str(content)?;
    validate_plan(&plan)?;
    Ok(plan)
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<PlanFile> {
    let content = std::fs::read_to_string(path)?;
    let plan = from_yaml_str(&content)?;
    debug!(path = %path.display(), plan = %plan.name, "loaded plan");
    Ok(plan)
}

pub fn save_yaml(path: &std::path::Path, plan: &PlanFile) -> ProjectResult<()> {
    validate_plan(plan)?;
    let content = serde_yaml::to_string(plan)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<PlanFile> {
    let content = std::fs::read_to_string(path)?;
    let plan: PlanFile = serde_json::from_str(&content)?;
    validate_plan(&plan)?;
    debug!(path = %path.display(), plan = %plan.name, "loaded plan");
    Ok(plan)
}

pub fn save_json(path: &std::path::Path, plan: &PlanFile) -> ProjectResult<()> {
    validate_plan(plan)?;
    let content = serde_json::to_string_pretty(plan)?;
    std::fs::write(path, content)?;
    Ok(())
}
