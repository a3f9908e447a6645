//! Construction-time configuration.

use std::collections::BTreeMap;

use fp_core::Rational;
use serde::{Deserialize, Serialize};

/// Crafting speed per unit category, passed to every instantiation.
///
/// A unit whose category has no entry runs at `default_speed`, or 1 when that
/// is unset too.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BuildConfig {
    #[serde(default)]
    pub speeds: BTreeMap<String, Rational>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_speed: Option<Rational>,
}

impl BuildConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_speed(mut self, category: impl Into<String>, speed: Rational) -> Self {
        self.speeds.insert(category.into(), speed);
        self
    }

    pub fn with_default_speed(mut self, speed: Rational) -> Self {
        self.default_speed = Some(speed);
        self
    }

    pub fn speed_for(&self, category: Option<&str>) -> Rational {
        category
            .and_then(|c| self.speeds.get(c))
            .or(self.default_speed.as_ref())
            .cloned()
            .unwrap_or_else(Rational::one)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_lookup_falls_back() {
        let config = BuildConfig::new().with_speed("smelting", Rational::from(2));
        assert_eq!(config.speed_for(Some("smelting")), Rational::from(2));
        assert_eq!(config.speed_for(Some("crafting")), Rational::one());

        let config = config.with_default_speed(Rational::new(3, 4).unwrap());
        assert_eq!(config.speed_for(None), Rational::new(3, 4).unwrap());
        assert_eq!(config.speed_for(Some("smelting")), Rational::from(2));
    }
}
