//! Stable indexing for solver integration.
//!
//! Maps the units reachable from a composite to contiguous decision-variable
//! indices (0..N) and back.

use fp_core::{Rational, UnitId};

use crate::composite::Composite;
use crate::error::{FlowError, FlowResult};

/// Contiguous indices for the units reachable from one composite.
///
/// Index order is the composite's first-seen order, so it is deterministic for a
/// given structure. Each entry also carries the unit's total multiplier.
#[derive(Debug, Clone)]
pub struct UnitIndex {
    /// index -> (UnitId, total multiplier)
    units: Vec<(UnitId, Rational)>,

    /// Reverse lookup: UnitId slot -> index.
    /// Sized to max(UnitId.index) + 1; None if that unit is not reachable.
    unit_to_idx: Vec<Option<usize>>,
}

impl UnitIndex {
    pub fn from_composite(composite: &Composite) -> Self {
        let units = composite.unit_multipliers();

        let max_slot = units
            .iter()
            .map(|(id, _)| id.index() as usize)
            .max()
            .unwrap_or(0);
        let mut unit_to_idx = vec![None; max_slot + 1];
        for (i, (id, _)) in units.iter().enumerate() {
            unit_to_idx[id.index() as usize] = Some(i);
        }

        Self { units, unit_to_idx }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn idx(&self, id: UnitId) -> FlowResult<usize> {
        self.unit_to_idx
            .get(id.index() as usize)
            .and_then(|&opt| opt)
            .ok_or(FlowError::UnknownUnit(id))
    }

    /// Unit at a contiguous index (panics if out of bounds).
    pub fn unit_id(&self, i: usize) -> UnitId {
        self.units[i].0
    }

    /// Total multiplier of the unit at a contiguous index (panics if out of bounds).
    pub fn multiplier(&self, i: usize) -> &Rational {
        &self.units[i].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, UnitId, &Rational)> {
        self.units
            .iter()
            .enumerate()
            .map(|(i, (id, multiplier))| (i, *id, multiplier))
    }
}
