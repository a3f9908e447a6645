//! Turning a plan file into a plant and its containers.

use fp_core::Rational;
use fp_flow::{Composite, FlowKey, Plant};
use fp_plan::{
    Container, ContainerConfig, FlowConstraint, PriorityKey, RateSpec, Relation, with_rate,
};
use tracing::debug;

use crate::config::BuildConfig;
use crate::registry::Registry;
use crate::schema::{ChildDef, ContainerDef, PlanFile, RateDef, RelationDef};
use crate::validate::validate_plan;
use crate::{ProjectError, ProjectResult};

/// A plant and the named containers built over it.
#[derive(Debug, Clone)]
pub struct BuiltPlan {
    pub plant: Plant,
    pub containers: Vec<Container>,
}

impl BuiltPlan {
    pub fn container(&self, id: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.name() == id)
    }

    /// Solve one container against the shared plant.
    pub fn solve(&mut self, id: &str) -> ProjectResult<fp_plan::SolveRes> {
        let container = self
            .containers
            .iter()
            .find(|c| c.name() == id)
            .ok_or_else(|| ProjectError::Build {
                what: format!("unknown container {id:?}"),
            })?;
        Ok(container.solve(&mut self.plant)?)
    }
}

/// Every child reference gets its own unit in the new plant.
pub fn build_plan(plan: &PlanFile, config: &BuildConfig) -> ProjectResult<BuiltPlan> {
    validate_plan(plan)?;
    let registry = Registry::from_plan(plan);
    let mut plant = Plant::new();

    let mut containers = Vec::with_capacity(plan.containers.len());
    for def in &plan.containers {
        let inner = build_children(&def.children, &registry, &mut plant, config)?;
        let container = Container::new(inner, container_config(def)?, &plant)?.named(&def.id);
        debug!(plan = %plan.name, container = %def.id, units = plant.len(), "built container");
        containers.push(container);
    }

    Ok(BuiltPlan { plant, containers })
}

fn build_children(
    children: &[ChildDef],
    registry: &Registry,
    plant: &mut Plant,
    config: &BuildConfig,
) -> ProjectResult<Composite> {
    let mut composite = Composite::new();
    for child in children {
        match (&child.unit, &child.children) {
            (Some(reference), None) => {
                let id = registry.instantiate(plant, reference, config)?;
                if child.unbounded {
                    plant.mark_unbounded(id)?;
                }
                composite.push(child.count.clone(), id)?;
            }
            (None, Some(nested)) => {
                let group = build_children(nested, registry, plant, config)?;
                if child.unbounded {
                    group.mark_unbounded(plant)?;
                }
                composite.push(child.count.clone(), group)?;
            }
            _ => {
                return Err(ProjectError::Build {
                    what: "child needs exactly one of unit and children".to_string(),
                });
            }
        }
    }
    Ok(composite)
}

fn container_config(def: &ContainerDef) -> ProjectResult<ContainerConfig> {
    let mut config = ContainerConfig::new();

    if let Some(outputs) = &def.outputs {
        let mut specs = Vec::with_capacity(outputs.len());
        for (key, rate) in outputs {
            specs.push(match rate {
                RateDef::Integer(n) => RateSpec::rate(key.as_str(), Rational::from(*n)),
                RateDef::Text(text) => with_rate(key.as_str(), text)?,
            });
        }
        config.outputs = Some(specs);
    }

    if let Some(inputs) = &def.inputs {
        config.inputs = Some(
            inputs
                .iter()
                .map(|(key, max)| (FlowKey::from(key.as_str()), max.clone()))
                .collect(),
        );
    }

    for constraint in &def.constraints {
        let relation = match constraint.relation {
            RelationDef::Le => Relation::Le,
            RelationDef::Ge => Relation::Ge,
            RelationDef::Eq => Relation::Eq,
        };
        let terms = constraint
            .terms
            .iter()
            .map(|(key, coeff)| (coeff.clone(), FlowKey::from(key.as_str())))
            .collect();
        config = config.constraint(FlowConstraint::new(terms, relation, constraint.rhs.clone()));
    }

    for priority in &def.priorities {
        let key = match (&priority.key, &priority.recipe) {
            (Some(key), None) => PriorityKey::Flow(FlowKey::from(key.as_str())),
            (None, Some(recipe)) => PriorityKey::Recipe(recipe.clone()),
            _ => {
                return Err(ProjectError::Build {
                    what: format!("priority in {:?} needs exactly one of key and recipe", def.id),
                });
            }
        };
        config = config.priority(key, priority.priority);
    }

    for key in &def.unconstrained {
        config = config.unconstrained(key.as_str());
    }

    Ok(config)
}
