//! Shared views: one combined container over several containers' units.

use std::collections::{BTreeMap, BTreeSet};

use fp_core::{Rational, UnitId};
use fp_flow::{Child, Composite, Plant};

use crate::config::{Declarations, OutputTarget};
use crate::container::Container;
use crate::error::{PlanResult, config_err};

/// Combine `containers` into one container over every distinct unit they reach,
/// plus one view per input container over that same combined composite.
///
/// Units are shared by id, never copied. Solving any of the returned containers
/// writes the throttles all of them read.
pub fn union(containers: &[&Container], plant: &Plant) -> PlanResult<(Container, Vec<Container>)> {
    if containers.is_empty() {
        return Err(config_err("union of no containers"));
    }

    let mut edges: Vec<(UnitId, Rational)> = Vec::new();
    for container in containers {
        for (id, multiplier) in container.inner().unit_multipliers() {
            match edges.iter_mut().find(|(unit, _)| *unit == id) {
                Some((_, widest)) => {
                    if multiplier > *widest {
                        *widest = multiplier;
                    }
                }
                None => edges.push((id, multiplier)),
            }
        }
    }
    let inner = Composite::try_from(
        edges
            .into_iter()
            .map(|(id, multiplier)| (multiplier, Child::Unit(id)))
            .collect::<Vec<_>>(),
    )?;

    let decls: Vec<&Declarations> = containers.iter().map(|c| c.declarations()).collect();
    let mut combined = Declarations {
        outputs: agreed(decls.iter().map(|d| &d.outputs), OutputTarget::Maximize),
        inputs: agreed(decls.iter().map(|d| &d.inputs), None),
        ..Declarations::default()
    };
    // A key one container makes and another uses is internal to the union.
    let crossed: Vec<_> = combined
        .outputs
        .keys()
        .filter(|key| combined.inputs.contains_key(*key))
        .cloned()
        .collect();
    for key in &crossed {
        combined.outputs.remove(key);
        combined.inputs.remove(key);
    }
    let unconstrained: Vec<_> = decls
        .iter()
        .flat_map(|decl| decl.unconstrained.iter())
        .filter(|key| !combined.is_declared(key))
        .cloned()
        .collect();
    combined.unconstrained.extend(unconstrained);

    let all = inner.units();
    let views = containers
        .iter()
        .map(|c| {
            let own = c.inner().units();
            let mut decl = c.declarations().clone();
            decl.idle = all.iter().filter(|id| !own.contains(id)).copied().collect();
            Container::from_declarations(inner.clone(), decl, plant)
                .map(|view| view.named(c.name()))
        })
        .collect::<PlanResult<Vec<_>>>()?;
    let combined = Container::from_declarations(inner, combined, plant)?.named("union");

    Ok((combined, views))
}

/// Keys declared by any map. A value survives only when every map gives it; a map
/// that leaves the key out counts as `fallback`.
fn agreed<'a, K, V>(maps: impl Iterator<Item = &'a BTreeMap<K, V>>, fallback: V) -> BTreeMap<K, V>
where
    K: Ord + Clone + 'a,
    V: PartialEq + Clone + 'a,
{
    let maps: Vec<&BTreeMap<K, V>> = maps.collect();
    let keys: BTreeSet<&K> = maps.iter().flat_map(|map| map.keys()).collect();
    keys.into_iter()
        .map(|key| {
            let mut values = maps.iter().map(|map| map.get(key).unwrap_or(&fallback));
            let first = values.next().unwrap_or(&fallback);
            let value = if values.all(|v| v == first) {
                first.clone()
            } else {
                fallback.clone()
            };
            (key.clone(), value)
        })
        .collect()
}
