use std::collections::BTreeMap;

use fp_core::{Rational, UnitId};

use crate::flow::FlowReport;
use crate::key::FlowKey;

/// A production unit: fixed base rates at throttle 1, scaled by a mutable throttle.
///
/// The throttle stays in `[0, 1]` unless the unit is marked unbounded, in which
/// case any non-negative value is allowed. Units are owned by a
/// [`Plant`](crate::Plant) and shared by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    pub(crate) id: UnitId,
    pub(crate) name: String,
    pub(crate) base: BTreeMap<FlowKey, Rational>,
    pub(crate) throttle: Rational,
    pub(crate) unbounded: bool,
}

impl Unit {
    pub fn id(&self) -> UnitId {
        self.id
    }

    /// Display name; units built from the same recipe share it.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn throttle(&self) -> &Rational {
        &self.throttle
    }

    pub fn is_unbounded(&self) -> bool {
        self.unbounded
    }

    pub fn base_rates(&self) -> impl Iterator<Item = (&FlowKey, &Rational)> {
        self.base.iter()
    }

    pub fn base_rate(&self, key: &str) -> Option<&Rational> {
        self.base.get(key)
    }

    /// Flows at the current throttle.
    pub fn flows(&self) -> FlowReport {
        self.flows_at(&self.throttle)
    }

    /// Flows at throttle 1.
    pub fn base_flows(&self) -> FlowReport {
        self.flows_at(&Rational::one())
    }

    fn flows_at(&self, throttle: &Rational) -> FlowReport {
        let mut report = FlowReport::new();
        for (key, rate) in &self.base {
            report.add_rate(key, &(rate * throttle));
        }
        report
    }
}
