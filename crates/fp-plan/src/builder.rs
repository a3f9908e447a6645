//! Translation of a container into a tiered linear program.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use fp_core::Rational;
use fp_flow::{Composite, FlowKey, Plant, UnitIndex};
use fp_solver::{Constraint, LinearProgram, Objective, Relation, Tier};

use crate::config::{Declarations, OutputTarget};
use crate::error::{PlanResult, config_err};
use crate::target::Priority;

/// A built program and the unit order of its variables.
#[derive(Debug)]
pub(crate) struct Model {
    pub program: LinearProgram,
    pub index: UnitIndex,
}

/// Per-key coefficients: `(variable, multiplier chain * base rate)`.
type Table = BTreeMap<FlowKey, Vec<(usize, Rational)>>;

pub(crate) fn build(inner: &Composite, decl: &Declarations, plant: &Plant) -> PlanResult<Model> {
    let index = UnitIndex::from_composite(inner);
    let mut program = LinearProgram::new();
    let mut table = Table::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for (i, id, multiplier) in index.iter() {
        let unit = plant.unit(id)?;
        let count = seen.entry(unit.name()).or_insert(0);
        *count += 1;
        let name = if *count == 1 {
            unit.name().to_string()
        } else {
            format!("{}#{count}", unit.name())
        };
        let upper = if decl.idle.contains(&id) {
            Some(Rational::zero())
        } else {
            (!unit.is_unbounded()).then(Rational::one)
        };
        let var = program.add_variable(name, upper);
        debug_assert_eq!(var, i);

        for (key, rate) in unit.base_rates() {
            table
                .entry(key.clone())
                .or_default()
                .push((i, multiplier * rate));
        }
    }

    for (key, terms) in &table {
        let row = |label: String, relation, rhs| {
            Constraint::new(label, terms.clone(), relation, rhs)
        };
        if let Some(target) = decl.outputs.get(key) {
            match target {
                OutputTarget::Rate(rate) => {
                    program.add_constraint(row(
                        format!("output {key}"),
                        Relation::Eq,
                        rate.clone(),
                    ));
                }
                // consumed inside too: never a net import
                OutputTarget::Maximize if has_consumer(terms) => {
                    program.add_constraint(row(
                        format!("output {key} not imported"),
                        Relation::Ge,
                        Rational::zero(),
                    ));
                }
                OutputTarget::Maximize => {}
            }
        } else if let Some(limit) = decl.inputs.get(key) {
            if let Some(max) = limit {
                program.add_constraint(row(format!("input {key}"), Relation::Ge, -max));
            }
            if has_producer(terms) {
                program.add_constraint(row(
                    format!("input {key} not exported"),
                    Relation::Le,
                    Rational::zero(),
                ));
            }
        } else if !decl.unconstrained.contains(key) && has_producer(terms) && has_consumer(terms)
        {
            program.add_constraint(row(
                format!("internal {key}"),
                Relation::Eq,
                Rational::zero(),
            ));
        }
    }

    for (n, constraint) in decl.constraints.iter().enumerate() {
        let mut coeffs = Vec::new();
        for (coeff, key) in &constraint.terms {
            let terms = table
                .get(key)
                .ok_or_else(|| config_err(format!("unknown flow key {key} in constraints")))?;
            coeffs.extend(terms.iter().map(|(i, a)| (*i, coeff * a)));
        }
        program.add_constraint(Constraint::new(
            format!("constraint {n}: {constraint}"),
            coeffs,
            constraint.relation,
            constraint.rhs.clone(),
        ));
    }

    add_tiers(&mut program, &table, decl, &index)?;
    Ok(Model { program, index })
}

fn has_producer(terms: &[(usize, Rational)]) -> bool {
    terms.iter().any(|(_, a)| a.is_positive())
}

fn has_consumer(terms: &[(usize, Rational)]) -> bool {
    terms.iter().any(|(_, a)| a.is_negative())
}

#[derive(Default)]
struct Level {
    maximize: BTreeSet<usize>,
    aux: Vec<Objective>,
    minimize: BTreeSet<usize>,
}

fn unit_terms(vars: impl IntoIterator<Item = usize>, coeff: &Rational) -> Vec<(usize, Rational)> {
    vars.into_iter().map(|i| (i, coeff.clone())).collect()
}

fn add_tiers(
    program: &mut LinearProgram,
    table: &Table,
    decl: &Declarations,
    index: &UnitIndex,
) -> PlanResult<()> {
    let one = Rational::one();
    let mut levels: BTreeMap<Priority, Level> = BTreeMap::new();
    let mut byproducts = Vec::new();

    for (key, target) in &decl.outputs {
        if *target != OutputTarget::Maximize {
            continue;
        }
        let Some(terms) = table.get(key) else {
            continue;
        };
        let priority = decl.priority_of(key);
        if priority.is_ignore() {
            byproducts.extend(terms.iter().map(|(i, a)| (*i, -a)));
            continue;
        }

        let producers: Vec<usize> = terms
            .iter()
            .filter(|(_, a)| a.is_positive())
            .map(|(i, _)| *i)
            .collect();
        let level = levels.entry(priority).or_default();
        level.maximize.extend(&producers);
        if !producers.is_empty() {
            level
                .aux
                .push(Objective::new(key.to_string(), unit_terms(producers, &one)));
        }
        level.minimize.extend(
            terms
                .iter()
                .filter(|(_, a)| a.is_negative())
                .map(|(i, _)| *i),
        );
    }

    for (id, priority) in &decl.unit_priorities {
        if priority.is_ignore() {
            continue;
        }
        let i = index.idx(*id)?;
        let level = levels.entry(*priority).or_default();
        level.maximize.insert(i);
        level.aux.push(Objective::new(
            format!("unit {}", program.variables[i].name),
            vec![(i, one.clone())],
        ));
    }

    let minus = -&one;
    for (priority, level) in levels.into_iter().rev() {
        if !level.maximize.is_empty() {
            let mut tier = Tier::new(Objective::new(
                format!("priority {priority} maximize"),
                unit_terms(level.maximize.iter().copied(), &one),
            ));
            for aux in level.aux {
                tier = tier.with_aux(aux);
            }
            program.add_tier(tier);
        }
        let consumers: Vec<usize> = level
            .minimize
            .difference(&level.maximize)
            .copied()
            .collect();
        if !consumers.is_empty() {
            program.add_tier(Tier::new(Objective::new(
                format!("priority {priority} minimize"),
                unit_terms(consumers, &minus),
            )));
        }
    }

    if !byproducts.is_empty() {
        program.add_tier(Tier::new(Objective::new("byproducts", byproducts)));
    }

    // Ignored inputs are covered from inside as far as possible: their producers
    // run flat out, each key's net flow is an auxiliary term.
    let mut covering = BTreeSet::new();
    let mut covered = Vec::new();
    let mut inputs = Vec::new();
    for key in decl.inputs.keys() {
        let Some(terms) = table.get(key) else {
            continue;
        };
        if decl.priority_of(key).is_ignore() {
            covering.extend(
                terms
                    .iter()
                    .filter(|(_, a)| a.is_positive())
                    .map(|(i, _)| *i),
            );
            covered.push(Objective::new(key.to_string(), terms.clone()));
        } else {
            inputs.extend(terms.iter().cloned());
        }
    }
    if !covering.is_empty() {
        let mut tier = Tier::new(Objective::new("ignored inputs", unit_terms(covering, &one)));
        for aux in covered {
            tier = tier.with_aux(aux);
        }
        program.add_tier(tier);
    }
    if !inputs.is_empty() {
        program.add_tier(Tier::new(Objective::new("inputs", inputs)));
    }
    Ok(())
}
