//! Arena owning every production unit.

use fp_core::{Rational, UnitId};

use crate::error::{FlowError, FlowResult};
use crate::key::FlowKey;
use crate::unit::Unit;
use crate::validate;

/// Owns all units. Composites and containers refer to units by `UnitId`, so the
/// same unit can appear in several groupings and a throttle written through one
/// is seen by all of them.
#[derive(Debug, Default, Clone)]
pub struct Plant {
    units: Vec<Unit>,
}

impl Plant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit with the given base rates (positive = produced, negative =
    /// consumed) and throttle 1.
    pub fn add_unit<K: Into<FlowKey>>(
        &mut self,
        name: impl Into<String>,
        rates: impl IntoIterator<Item = (K, Rational)>,
    ) -> FlowResult<UnitId> {
        let name = name.into();
        let base = validate::collect_rates(
            &name,
            rates.into_iter().map(|(key, rate)| (key.into(), rate)),
        )?;

        let id = UnitId::from_index(self.units.len() as u32);
        self.units.push(Unit {
            id,
            name,
            base,
            throttle: Rational::one(),
            unbounded: false,
        });
        Ok(id)
    }

    pub fn unit(&self, id: UnitId) -> FlowResult<&Unit> {
        self.units
            .get(id.index() as usize)
            .ok_or(FlowError::UnknownUnit(id))
    }

    fn unit_mut(&mut self, id: UnitId) -> FlowResult<&mut Unit> {
        self.units
            .get_mut(id.index() as usize)
            .ok_or(FlowError::UnknownUnit(id))
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Set a throttle. Negative values are rejected, as are values above 1 on a
    /// bounded unit.
    pub fn set_throttle(&mut self, id: UnitId, throttle: Rational) -> FlowResult<()> {
        let unit = self.unit_mut(id)?;
        if throttle.is_negative() || (!unit.unbounded && throttle > 1_i64) {
            return Err(FlowError::ThrottleOutOfRange {
                unit: unit.name.clone(),
                value: throttle,
            });
        }
        unit.throttle = throttle;
        Ok(())
    }

    pub fn reset_throttle(&mut self, id: UnitId) -> FlowResult<()> {
        self.unit_mut(id)?.throttle = Rational::one();
        Ok(())
    }

    /// Allow the unit's throttle to exceed 1. Returns the id for chaining.
    pub fn mark_unbounded(&mut self, id: UnitId) -> FlowResult<UnitId> {
        self.unit_mut(id)?.unbounded = true;
        Ok(id)
    }

    /// Restore the `[0, 1]` throttle range, clamping a throttle above 1.
    pub fn mark_bounded(&mut self, id: UnitId) -> FlowResult<()> {
        let unit = self.unit_mut(id)?;
        unit.unbounded = false;
        if unit.throttle > 1_i64 {
            unit.throttle = Rational::one();
        }
        Ok(())
    }
}
