//! Weighted, nestable groupings of units.

use std::collections::HashMap;

use fp_core::{Rational, UnitId};

use crate::error::{FlowError, FlowResult};
use crate::flow::FlowReport;
use crate::plant::Plant;
use crate::validate;

/// A composite's child: a unit in the plant or a nested composite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Child {
    Unit(UnitId),
    Composite(Composite),
}

impl From<UnitId> for Child {
    fn from(id: UnitId) -> Self {
        Child::Unit(id)
    }
}

impl From<Composite> for Child {
    fn from(composite: Composite) -> Self {
        Child::Composite(composite)
    }
}

/// Ordered (multiplier, child) pairs. Aggregated flow is the multiplier-weighted
/// sum of the children's flows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Composite {
    children: Vec<(Rational, Child)>,
}

/// `count` copies of `child`. `count` must be a positive integer.
pub fn scale(child: impl Into<Child>, count: u32) -> FlowResult<Composite> {
    Composite::new().with(Rational::from(count), child)
}

/// Both children side by side, each with multiplier 1.
pub fn combine(a: impl Into<Child>, b: impl Into<Child>) -> Composite {
    Composite {
        children: vec![(Rational::one(), a.into()), (Rational::one(), b.into())],
    }
}

impl Composite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, multiplier: Rational, child: impl Into<Child>) -> FlowResult<()> {
        validate::check_multiplier(&multiplier)?;
        self.children.push((multiplier, child.into()));
        Ok(())
    }

    pub fn with(mut self, multiplier: Rational, child: impl Into<Child>) -> FlowResult<Self> {
        self.push(multiplier, child)?;
        Ok(self)
    }

    pub fn children(&self) -> &[(Rational, Child)] {
        &self.children
    }

    /// No reachable units at any depth.
    pub fn is_empty(&self) -> bool {
        self.children.iter().all(|(_, child)| match child {
            Child::Unit(_) => false,
            Child::Composite(inner) => inner.is_empty(),
        })
    }

    /// Each reachable unit once, in first-seen order, with the sum of the
    /// multiplier chains leading to it.
    pub fn unit_multipliers(&self) -> Vec<(UnitId, Rational)> {
        let mut order = Vec::new();
        let mut slots: HashMap<UnitId, usize> = HashMap::new();
        self.collect_units(&Rational::one(), &mut order, &mut slots);
        order
    }

    fn collect_units(
        &self,
        ambient: &Rational,
        order: &mut Vec<(UnitId, Rational)>,
        slots: &mut HashMap<UnitId, usize>,
    ) {
        for (multiplier, child) in &self.children {
            let chain = ambient * multiplier;
            match child {
                Child::Unit(id) => match slots.get(id) {
                    Some(&slot) => order[slot].1 += chain,
                    None => {
                        slots.insert(*id, order.len());
                        order.push((*id, chain));
                    }
                },
                Child::Composite(inner) => inner.collect_units(&chain, order, slots),
            }
        }
    }

    pub fn units(&self) -> Vec<UnitId> {
        self.unit_multipliers()
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }

    /// Aggregated flows at the units' current throttles.
    pub fn flows(&self, plant: &Plant) -> FlowResult<FlowReport> {
        let mut report = FlowReport::new();
        for (id, multiplier) in self.unit_multipliers() {
            report.merge(&plant.unit(id)?.flows(), &multiplier);
        }
        Ok(report)
    }

    /// Aggregated flows with every unit at throttle 1.
    pub fn base_flows(&self, plant: &Plant) -> FlowResult<FlowReport> {
        let mut report = FlowReport::new();
        for (id, multiplier) in self.unit_multipliers() {
            report.merge(&plant.unit(id)?.base_flows(), &multiplier);
        }
        Ok(report)
    }

    pub fn mark_unbounded(&self, plant: &mut Plant) -> FlowResult<()> {
        for id in self.units() {
            plant.mark_unbounded(id)?;
        }
        Ok(())
    }

    pub fn reset_throttle(&self, plant: &mut Plant) -> FlowResult<()> {
        for id in self.units() {
            plant.reset_throttle(id)?;
        }
        Ok(())
    }

    /// Rewrite the multiplier of every unit edge, at any depth. `rewrite` gets the
    /// unit and its current edge multiplier and returns the new multiplier, or
    /// `None` to drop the edge.
    pub fn rescale_units(
        &mut self,
        mut rewrite: impl FnMut(UnitId, &Rational) -> Option<Rational>,
    ) -> FlowResult<()> {
        self.rescale_with(&mut rewrite)
    }

    fn rescale_with(
        &mut self,
        rewrite: &mut dyn FnMut(UnitId, &Rational) -> Option<Rational>,
    ) -> FlowResult<()> {
        let mut kept = Vec::with_capacity(self.children.len());
        for (multiplier, child) in self.children.drain(..) {
            match child {
                Child::Unit(id) => {
                    if let Some(next) = rewrite(id, &multiplier) {
                        validate::check_multiplier(&next)?;
                        kept.push((next, Child::Unit(id)));
                    }
                }
                Child::Composite(mut inner) => {
                    inner.rescale_with(rewrite)?;
                    kept.push((multiplier, Child::Composite(inner)));
                }
            }
        }
        self.children = kept;
        Ok(())
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }
}

impl TryFrom<Vec<(Rational, Child)>> for Composite {
    type Error = FlowError;

    fn try_from(children: Vec<(Rational, Child)>) -> FlowResult<Self> {
        for (multiplier, _) in &children {
            validate::check_multiplier(multiplier)?;
        }
        Ok(Self { children })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::key::FlowKey;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn scaling_is_linear(
            rates in prop::collection::vec(-50_i64..50, 1..4),
            k in 1_u32..20,
            throttle_num in 0_i64..=8,
        ) {
            let mut plant = Plant::new();
            let keys = ["a", "b", "c", "d"];
            let unit = plant
                .add_unit("u", rates.iter().enumerate().map(|(i, &v)| (keys[i], Rational::from(v))))
                .unwrap();
            plant.set_throttle(unit, Rational::new(throttle_num, 8).unwrap()).unwrap();

            let single = plant.unit(unit).unwrap().flows();
            let scaled = scale(unit, k).unwrap().flows(&plant).unwrap();

            prop_assert_eq!(scaled.clone(), single.scaled(&Rational::from(k)));
            for key in keys.iter().take(rates.len()) {
                let key = FlowKey::from(*key);
                prop_assert_eq!(scaled.net(&key), single.net(&key) * Rational::from(k));
            }
        }
    }
}
