//! Static unit registry with a locale table.

use std::collections::BTreeMap;

use fp_core::UnitId;
use fp_flow::Plant;

use crate::config::BuildConfig;
use crate::schema::{PlanFile, UnitDef};
use crate::{ProjectError, ProjectResult};

/// Unit definitions by id, plus translated display names.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    units: BTreeMap<String, UnitDef>,
    locale: BTreeMap<String, String>,
}

impl Registry {
    pub fn new(
        units: impl IntoIterator<Item = UnitDef>,
        locale: BTreeMap<String, String>,
    ) -> Self {
        Self {
            units: units.into_iter().map(|u| (u.id.clone(), u)).collect(),
            locale,
        }
    }

    pub fn from_plan(plan: &PlanFile) -> Self {
        Self::new(plan.units.iter().cloned(), plan.locale.clone())
    }

    pub fn get(&self, id: &str) -> Option<&UnitDef> {
        self.units.get(id)
    }

    pub fn find_by_translated_name(&self, name: &str) -> Option<&UnitDef> {
        self.locale.get(name).and_then(|id| self.units.get(id))
    }

    /// By id first, then by translated name.
    pub fn resolve(&self, reference: &str) -> Option<&UnitDef> {
        self.get(reference)
            .or_else(|| self.find_by_translated_name(reference))
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Add a fresh unit for `reference` to `plant`, at the speed `config` gives
    /// its category.
    pub fn instantiate(
        &self,
        plant: &mut Plant,
        reference: &str,
        config: &BuildConfig,
    ) -> ProjectResult<UnitId> {
        let def = self.resolve(reference).ok_or_else(|| ProjectError::Build {
            what: format!("unknown unit {reference:?}"),
        })?;
        let speed = config.speed_for(def.category.as_deref());
        if !speed.is_positive() {
            return Err(ProjectError::Build {
                what: format!("speed {speed} for unit {:?} is not positive", def.id),
            });
        }
        let rates = def.rates(&speed)?;
        Ok(plant.add_unit(def.id.clone(), rates)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_core::Rational;

    fn registry() -> Registry {
        let gear = UnitDef {
            id: "gear".to_string(),
            category: Some("crafting".to_string()),
            time: Rational::new(1, 2).unwrap(),
            inputs: [("plate".to_string(), Rational::from(2))].into(),
            outputs: [("gear".to_string(), Rational::one())].into(),
        };
        let locale = [("Iron gear wheel".to_string(), "gear".to_string())].into();
        Registry::new([gear], locale)
    }

    #[test]
    fn translated_lookup_is_a_map_query() {
        let registry = registry();
        assert_eq!(
            registry.find_by_translated_name("Iron gear wheel").map(|u| u.id.as_str()),
            Some("gear")
        );
        assert!(registry.find_by_translated_name("gear").is_none());
        assert!(registry.resolve("Iron gear wheel").is_some());
    }

    #[test]
    fn instantiation_applies_category_speed() {
        let registry = registry();
        let mut plant = Plant::new();
        let config = BuildConfig::new().with_speed("crafting", Rational::new(3, 4).unwrap());
        let id = registry.instantiate(&mut plant, "gear", &config).unwrap();

        let unit = plant.unit(id).unwrap();
        assert_eq!(unit.name(), "gear");
        assert_eq!(unit.base_rate("gear"), Some(&Rational::new(3, 2).unwrap()));
        assert_eq!(unit.base_rate("plate"), Some(&Rational::from(-3)));
    }

    #[test]
    fn unknown_unit_is_a_build_error() {
        let mut plant = Plant::new();
        let err = registry()
            .instantiate(&mut plant, "nope", &BuildConfig::new())
            .unwrap_err();
        assert!(matches!(err, ProjectError::Build { .. }));
    }
}
