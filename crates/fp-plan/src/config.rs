//! Container declarations: the typed builder callers fill in, and the resolved
//! form the constraint builder reads.

use std::collections::{BTreeMap, BTreeSet};

use fp_core::{Rational, UnitId};
use fp_flow::{Composite, FlowKey, FlowReport, Plant};

use crate::constraint::FlowConstraint;
use crate::error::{PlanResult, config_err};
use crate::target::{Priority, RateSpec, Target};

/// What a priority is attached to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PriorityKey {
    Flow(FlowKey),
    Unit(UnitId),
    /// Every unit whose display name matches.
    Recipe(String),
}

/// Caller-facing declarations for one container.
///
/// `outputs` and `inputs` left at `None` are derived from the composite's flows at
/// construction; `Some(vec![])` declares that there are none.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerConfig {
    pub outputs: Option<Vec<RateSpec>>,
    /// Key and optional maximum consumption magnitude.
    pub inputs: Option<Vec<(FlowKey, Option<Rational>)>>,
    pub constraints: Vec<FlowConstraint>,
    pub priorities: Vec<(PriorityKey, i32)>,
    pub unconstrained: Vec<FlowKey>,
}

impl ContainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(self, key: impl Into<FlowKey>) -> Self {
        self.with_output(RateSpec::maximize(key))
    }

    pub fn output_rate(self, key: impl Into<FlowKey>, rate: Rational) -> Self {
        self.with_output(RateSpec::rate(key, rate))
    }

    pub fn with_output(mut self, spec: RateSpec) -> Self {
        self.outputs.get_or_insert_with(Vec::new).push(spec);
        self
    }

    pub fn no_outputs(mut self) -> Self {
        self.outputs = Some(Vec::new());
        self
    }

    pub fn input(mut self, key: impl Into<FlowKey>, max: Option<Rational>) -> Self {
        self.inputs
            .get_or_insert_with(Vec::new)
            .push((key.into(), max));
        self
    }

    pub fn no_inputs(mut self) -> Self {
        self.inputs = Some(Vec::new());
        self
    }

    pub fn constraint(mut self, constraint: FlowConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn priority(mut self, key: PriorityKey, priority: i32) -> Self {
        self.priorities.push((key, priority));
        self
    }

    pub fn unconstrained(mut self, key: impl Into<FlowKey>) -> Self {
        self.unconstrained.push(key.into());
        self
    }
}

/// Resolved output target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputTarget {
    Rate(Rational),
    Maximize,
}

/// Declarations after derivation and validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Declarations {
    pub outputs: BTreeMap<FlowKey, OutputTarget>,
    pub inputs: BTreeMap<FlowKey, Option<Rational>>,
    pub constraints: Vec<FlowConstraint>,
    pub key_priorities: BTreeMap<FlowKey, Priority>,
    pub unit_priorities: BTreeMap<UnitId, Priority>,
    pub unconstrained: BTreeSet<FlowKey>,
    /// Units held at throttle 0. Shared views use this for the units their own
    /// container does not reach.
    pub idle: BTreeSet<UnitId>,
}

impl Declarations {
    pub(crate) fn resolve(
        config: ContainerConfig,
        inner: &Composite,
        plant: &Plant,
    ) -> PlanResult<Self> {
        let base = inner.base_flows(plant)?;
        let mut decl = Declarations {
            unconstrained: config.unconstrained.into_iter().collect(),
            constraints: config.constraints,
            ..Declarations::default()
        };

        match config.outputs {
            Some(specs) => {
                for spec in specs {
                    let target = match spec.target {
                        Target::Rate(rate) => {
                            if rate.is_negative() {
                                return Err(config_err(format!(
                                    "output {} has negative rate {rate}",
                                    spec.key
                                )));
                            }
                            OutputTarget::Rate(rate)
                        }
                        Target::Maximize => OutputTarget::Maximize,
                        Target::Priority(priority) => {
                            decl.key_priorities.insert(spec.key.clone(), priority);
                            OutputTarget::Maximize
                        }
                    };
                    if decl.outputs.insert(spec.key.clone(), target).is_some() {
                        return Err(config_err(format!("output {} declared twice", spec.key)));
                    }
                }
            }
            None => {
                for flow in base.iter() {
                    if flow.consumed.is_zero() && !decl.unconstrained.contains(&flow.key) {
                        decl.outputs.insert(flow.key.clone(), OutputTarget::Maximize);
                    }
                }
            }
        }

        match config.inputs {
            Some(inputs) => {
                for (key, max) in inputs {
                    let max = max.map(|m| m.abs());
                    if decl.inputs.insert(key.clone(), max).is_some() {
                        return Err(config_err(format!("input {key} declared twice")));
                    }
                }
            }
            None => {
                for flow in base.iter() {
                    if flow.produced.is_zero()
                        && !decl.outputs.contains_key(&flow.key)
                        && !decl.unconstrained.contains(&flow.key)
                    {
                        decl.inputs.insert(flow.key.clone(), None);
                    }
                }
            }
        }

        for (key, value) in config.priorities {
            let priority = Priority::new(value)?;
            match key {
                PriorityKey::Flow(key) => {
                    decl.key_priorities.insert(key, priority);
                }
                PriorityKey::Unit(id) => {
                    if !inner.units().contains(&id) {
                        return Err(config_err(format!(
                            "priority for unit {id}, which is not in the container"
                        )));
                    }
                    decl.unit_priorities.insert(id, priority);
                }
                PriorityKey::Recipe(name) => {
                    let mut matched = false;
                    for id in inner.units() {
                        if plant.unit(id)?.name() == name {
                            decl.unit_priorities.insert(id, priority);
                            matched = true;
                        }
                    }
                    if !matched {
                        return Err(config_err(format!("unknown recipe {name:?}")));
                    }
                }
            }
        }

        decl.validate(&base)?;
        Ok(decl)
    }

    /// Check the declarations against a composite's base flows.
    pub(crate) fn validate(&self, base: &FlowReport) -> PlanResult<()> {
        let known = |key: &FlowKey, role: &str| {
            if base.contains(key.as_str()) {
                Ok(())
            } else {
                Err(config_err(format!("unknown flow key {key} in {role}")))
            }
        };

        for key in self.outputs.keys() {
            known(key, "outputs")?;
            if self.inputs.contains_key(key) {
                return Err(config_err(format!("{key} is both an output and an input")));
            }
        }
        for key in self.inputs.keys() {
            known(key, "inputs")?;
        }
        for key in &self.unconstrained {
            known(key, "unconstrained")?;
            if self.is_declared(key) {
                return Err(config_err(format!(
                    "{key} is unconstrained and also an output or input"
                )));
            }
        }
        for key in self.key_priorities.keys() {
            known(key, "priorities")?;
            if !self.is_declared(key) {
                return Err(config_err(format!(
                    "priority on {key}, which is not an output or input"
                )));
            }
        }
        for constraint in &self.constraints {
            if constraint.terms.is_empty() {
                return Err(config_err("constraint without terms"));
            }
            for key in constraint.keys() {
                known(key, "constraints")?;
            }
        }
        Ok(())
    }

    /// Declared as an output or an input.
    pub fn is_declared(&self, key: &FlowKey) -> bool {
        self.outputs.contains_key(key) || self.inputs.contains_key(key)
    }

    pub fn priority_of(&self, key: &FlowKey) -> Priority {
        self.key_priorities.get(key).copied().unwrap_or_default()
    }
}
