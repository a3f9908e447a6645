//! Plan file validation logic.

use std::collections::HashSet;

use fp_plan::Priority;

use crate::schema::{ChildDef, ContainerDef, PlanFile, UnitDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_plan(plan: &PlanFile) -> Result<(), ValidationError> {
    if plan.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: plan.version,
        });
    }

    let mut unit_ids = HashSet::new();
    for unit in &plan.units {
        if !unit_ids.insert(unit.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: unit.id.clone(),
                context: "units".to_string(),
            });
        }
        validate_unit(unit)?;
    }

    for (name, id) in &plan.locale {
        if !unit_ids.contains(id.as_str()) {
            return Err(ValidationError::MissingReference {
                id: id.clone(),
                context: format!("locale entry '{name}'"),
            });
        }
    }

    let mut container_ids = HashSet::new();
    for container in &plan.containers {
        if !container_ids.insert(&container.id) {
            return Err(ValidationError::DuplicateId {
                id: container.id.clone(),
                context: "containers".to_string(),
            });
        }
        validate_container(container, plan, &unit_ids)?;
    }

    Ok(())
}

fn validate_unit(unit: &UnitDef) -> Result<(), ValidationError> {
    if !unit.time.is_positive() {
        return Err(ValidationError::InvalidValue {
            field: format!("unit '{}' time", unit.id),
            value: unit.time.to_string(),
            reason: "must be positive".to_string(),
        });
    }
    for (side, amounts) in [("inputs", &unit.inputs), ("outputs", &unit.outputs)] {
        for (key, amount) in amounts {
            if !amount.is_positive() {
                return Err(ValidationError::InvalidValue {
                    field: format!("unit '{}' {side}.{key}", unit.id),
                    value: amount.to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        }
    }
    Ok(())
}

fn validate_container(
    container: &ContainerDef,
    plan: &PlanFile,
    unit_ids: &HashSet<&str>,
) -> Result<(), ValidationError> {
    let context = format!("container '{}'", container.id);
    validate_children(&container.children, plan, unit_ids, &context)?;

    for priority in &container.priorities {
        let field = format!("{context} priority");
        match (&priority.key, &priority.recipe) {
            (Some(_), None) => {}
            (None, Some(recipe)) => {
                if !unit_ids.contains(recipe.as_str()) {
                    return Err(ValidationError::MissingReference {
                        id: recipe.clone(),
                        context: field,
                    });
                }
            }
            _ => {
                return Err(ValidationError::InvalidValue {
                    field,
                    value: format!("{:?}/{:?}", priority.key, priority.recipe),
                    reason: "exactly one of key and recipe is required".to_string(),
                });
            }
        }
        if !(Priority::MIN..=Priority::MAX).contains(&priority.priority) {
            return Err(ValidationError::InvalidValue {
                field,
                value: priority.priority.to_string(),
                reason: format!("must be within [{}, {}]", Priority::MIN, Priority::MAX),
            });
        }
    }

    for (i, constraint) in container.constraints.iter().enumerate() {
        if constraint.terms.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("{context} constraints[{i}]"),
                value: "{}".to_string(),
                reason: "needs at least one term".to_string(),
            });
        }
    }

    Ok(())
}

fn validate_children(
    children: &[ChildDef],
    plan: &PlanFile,
    unit_ids: &HashSet<&str>,
    context: &str,
) -> Result<(), ValidationError> {
    for (i, child) in children.iter().enumerate() {
        let field = format!("{context} children[{i}]");
        if !child.count.is_positive() {
            return Err(ValidationError::InvalidValue {
                field: format!("{field} count"),
                value: child.count.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        match (&child.unit, &child.children) {
            (Some(unit), None) => {
                if !unit_ids.contains(unit.as_str()) && !plan.locale.contains_key(unit) {
                    return Err(ValidationError::MissingReference {
                        id: unit.clone(),
                        context: field,
                    });
                }
            }
            (None, Some(nested)) => validate_children(nested, plan, unit_ids, &field)?,
            _ => {
                return Err(ValidationError::InvalidValue {
                    field,
                    value: format!("unit: {:?}", child.unit),
                    reason: "exactly one of unit and children is required".to_string(),
                });
            }
        }
    }
    Ok(())
}
