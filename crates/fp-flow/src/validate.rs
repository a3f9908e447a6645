//! Unit and multiplier validation.

use std::collections::BTreeMap;

use fp_core::Rational;

use crate::error::{FlowError, FlowResult};
use crate::key::FlowKey;

/// Collect a unit's base rates, rejecting repeated keys and dropping zero rates.
pub(crate) fn collect_rates(
    name: &str,
    rates: impl IntoIterator<Item = (FlowKey, Rational)>,
) -> FlowResult<BTreeMap<FlowKey, Rational>> {
    if name.trim().is_empty() {
        return Err(FlowError::EmptyName);
    }

    let mut base = BTreeMap::new();
    for (key, rate) in rates {
        if base.contains_key(&key) {
            return Err(FlowError::DuplicateKey {
                unit: name.to_string(),
                key,
            });
        }
        base.insert(key, rate);
    }
    base.retain(|_, rate| !rate.is_zero());
    Ok(base)
}

/// Composite multipliers must be strictly positive.
pub(crate) fn check_multiplier(value: &Rational) -> FlowResult<()> {
    if !value.is_positive() {
        return Err(FlowError::InvalidMultiplier {
            value: value.clone(),
            reason: "must be positive",
        });
    }
    Ok(())
}
