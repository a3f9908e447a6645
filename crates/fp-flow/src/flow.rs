//! Per-key flows and aggregated flow reports.

use core::fmt;
use std::collections::BTreeMap;

use fp_core::Rational;

use crate::key::FlowKey;

/// Gross production and consumption of one key. Both sides are non-negative
/// magnitudes; `net()` is positive for net production.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flow {
    pub key: FlowKey,
    pub produced: Rational,
    pub consumed: Rational,
}

impl Flow {
    pub fn new(key: FlowKey) -> Self {
        Self {
            key,
            produced: Rational::zero(),
            consumed: Rational::zero(),
        }
    }

    /// A signed rate: positive rates are production, negative are consumption.
    pub fn from_rate(key: FlowKey, rate: &Rational) -> Self {
        let mut flow = Self::new(key);
        flow.add_rate(rate);
        flow
    }

    pub fn net(&self) -> Rational {
        &self.produced - &self.consumed
    }

    /// Both produced and consumed, without balancing out.
    pub fn is_partial(&self) -> bool {
        !self.produced.is_zero() && !self.consumed.is_zero() && self.produced != self.consumed
    }

    pub fn scaled(&self, factor: &Rational) -> Self {
        Self {
            key: self.key.clone(),
            produced: &self.produced * factor,
            consumed: &self.consumed * factor,
        }
    }

    pub(crate) fn add_rate(&mut self, rate: &Rational) {
        if rate.is_negative() {
            self.consumed -= rate;
        } else {
            self.produced += rate;
        }
    }

    fn absorb(&mut self, other: &Flow, factor: &Rational) {
        self.produced += &other.produced * factor;
        self.consumed += &other.consumed * factor;
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let net = self.net();
        let sign = if net.is_positive() { "+" } else { "" };
        write!(f, "{} {sign}{net}", self.key)?;
        if !self.produced.is_zero() && !self.consumed.is_zero() {
            write!(f, " ({} - {})", self.produced, self.consumed)?;
        }
        Ok(())
    }
}

/// Aggregated flows keyed by `FlowKey`, iterated in key order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowReport {
    flows: BTreeMap<FlowKey, Flow>,
}

impl FlowReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rate(&mut self, key: &FlowKey, rate: &Rational) {
        self.flows
            .entry(key.clone())
            .or_insert_with(|| Flow::new(key.clone()))
            .add_rate(rate);
    }

    /// Add `factor` times every flow of `other`, keeping gross sides separate.
    pub fn merge(&mut self, other: &FlowReport, factor: &Rational) {
        for (key, flow) in &other.flows {
            self.flows
                .entry(key.clone())
                .or_insert_with(|| Flow::new(key.clone()))
                .absorb(flow, factor);
        }
    }

    pub fn scaled(&self, factor: &Rational) -> Self {
        let mut out = Self::new();
        out.merge(self, factor);
        out
    }

    pub fn get(&self, key: &str) -> Option<&Flow> {
        self.flows.get(key)
    }

    /// Net rate of `key`, zero when absent.
    pub fn net(&self, key: &FlowKey) -> Rational {
        self.flows
            .get(key)
            .map(Flow::net)
            .unwrap_or_else(Rational::zero)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.flows.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &FlowKey> {
        self.flows.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flow> {
        self.flows.values()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&Flow) -> bool) {
        self.flows.retain(|_, flow| keep(flow));
    }
}

impl fmt::Display for FlowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, flow) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{flow}")?;
        }
        Ok(())
    }
}
