//! Plan file schema definitions.

use std::collections::BTreeMap;

use fp_core::Rational;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanFile {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub units: Vec<UnitDef>,
    /// Translated display name to unit id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub locale: BTreeMap<String, String>,
    #[serde(default)]
    pub containers: Vec<ContainerDef>,
}

/// A recipe: amounts per cycle of `time` seconds at speed 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnitDef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default = "Rational::one")]
    pub time: Rational,
    #[serde(default)]
    pub inputs: BTreeMap<String, Rational>,
    #[serde(default)]
    pub outputs: BTreeMap<String, Rational>,
}

impl UnitDef {
    /// Signed rates per second at `speed`. A key on both sides nets out.
    pub fn rates(&self, speed: &Rational) -> fp_core::FpResult<Vec<(String, Rational)>> {
        let per_cycle = speed.checked_div(&self.time)?;
        let mut net: BTreeMap<&str, Rational> = BTreeMap::new();
        for (key, amount) in &self.outputs {
            *net.entry(key.as_str()).or_default() += amount * &per_cycle;
        }
        for (key, amount) in &self.inputs {
            *net.entry(key.as_str()).or_default() -= amount * &per_cycle;
        }
        Ok(net
            .into_iter()
            .filter(|(_, rate)| !rate.is_zero())
            .map(|(key, rate)| (key.to_string(), rate))
            .collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContainerDef {
    pub id: String,
    #[serde(default)]
    pub children: Vec<ChildDef>,
    /// Omitted means "derive from the flows".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<BTreeMap<String, RateDef>>,
    /// Key to optional maximum consumption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<BTreeMap<String, Option<Rational>>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub priorities: Vec<PriorityDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unconstrained: Vec<String>,
}

/// Either a unit reference or a nested group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChildDef {
    #[serde(default = "Rational::one")]
    pub count: Rational,
    /// Unit id or translated name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ChildDef>>,
    #[serde(default)]
    pub unbounded: bool,
}

/// An exact rate, or target text such as `max`, `p:3` or `5/3`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RateDef {
    Integer(i64),
    Text(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RelationDef {
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "=")]
    Eq,
}

/// `sum(coefficient * net(key)) relation rhs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstraintDef {
    pub terms: BTreeMap<String, Rational>,
    pub relation: RelationDef,
    #[serde(default)]
    pub rhs: Rational,
}

/// Exactly one of `key` and `recipe` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriorityDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    pub priority: i32,
}
