//! Bounded containers: a composite plus the declarations that turn it into a
//! planning problem.

use std::collections::{BTreeMap, BTreeSet};

use fp_core::{Rational, UnitId};
use fp_flow::{Composite, FlowKey, FlowReport, Plant};
use fp_solver::{Shortfall, SimplexConfig, SolveRes};
use tracing::{debug, trace, warn};

use crate::builder;
use crate::config::{ContainerConfig, Declarations};
use crate::constraint::FlowConstraint;
use crate::error::{PlanError, PlanResult, config_err};

/// How [`Container::finalize`] turns throttled unbounded units into counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rounding {
    /// Round up to the next whole count.
    #[default]
    Up,
    /// Round down, keeping at least one.
    Down,
    /// Keep the exact fractional count.
    Fractional,
}

impl Rounding {
    fn apply(self, count: &Rational) -> Rational {
        match self {
            Rounding::Up => count.ceil(),
            Rounding::Down => count.floor().max(Rational::one()),
            Rounding::Fractional => count.clone(),
        }
    }
}

/// Everything a solve found out, beyond the throttles written to the plant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolveReport {
    pub res: SolveRes,
    pub shortfalls: Vec<Shortfall>,
    /// Columns that could move without changing any objective.
    pub alternates: Vec<String>,
    /// Unbounded units that had to be held at zero.
    pub unbounded: Vec<UnitId>,
    pub pivots: usize,
}

/// What [`Container::finalize`] did besides re-solving.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FinalizeReport {
    /// Result of the re-solve; `None` when nothing was unbounded.
    pub res: Option<SolveRes>,
    /// Ignored outputs that still carry flow.
    pub extra_outputs: Vec<FlowKey>,
    /// Inputs with no flow, now removed.
    pub unused_inputs: Vec<FlowKey>,
}

/// A unit at full throttle and the consumers of its products that are held back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bottleneck {
    pub unit: UnitId,
    pub throttled: Vec<UnitId>,
}

/// A composite with declared outputs, inputs, constraints and priorities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    name: Option<String>,
    inner: Composite,
    decl: Declarations,
}

impl Container {
    /// Resolve and validate `config` against `inner`.
    pub fn new(inner: Composite, config: ContainerConfig, plant: &Plant) -> PlanResult<Self> {
        let decl = Declarations::resolve(config, &inner, plant)?;
        Ok(Self {
            name: None,
            inner,
            decl,
        })
    }

    pub(crate) fn from_declarations(
        inner: Composite,
        decl: Declarations,
        plant: &Plant,
    ) -> PlanResult<Self> {
        decl.validate(&inner.base_flows(plant)?)?;
        Ok(Self {
            name: None,
            inner,
            decl,
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("container")
    }

    pub fn inner(&self) -> &Composite {
        &self.inner
    }

    pub fn declarations(&self) -> &Declarations {
        &self.decl
    }

    /// Solve and write the throttles of every reachable unit.
    pub fn solve(&self, plant: &mut Plant) -> PlanResult<SolveRes> {
        Ok(self.solve_report(plant, &SimplexConfig::default())?.res)
    }

    /// Like [`Container::solve`], returning the full report. Throttles are left
    /// untouched when the problem is infeasible.
    pub fn solve_report(
        &self,
        plant: &mut Plant,
        config: &SimplexConfig,
    ) -> PlanResult<SolveReport> {
        if self.inner.is_empty() {
            return Err(PlanError::EmptyStructure {
                name: self.name().to_string(),
            });
        }

        let model = builder::build(&self.inner, &self.decl, plant)?;
        trace!(container = %self.name(), program = %model.program, "built linear program");

        let solution = fp_solver::solve(&model.program, config)?;
        if solution.res.is_feasible() {
            for (i, value) in solution.values.iter().enumerate() {
                plant.set_throttle(model.index.unit_id(i), value.clone())?;
            }
        }

        for shortfall in &solution.shortfalls {
            warn!(
                container = %self.name(),
                tier = %shortfall.tier,
                term = %shortfall.term,
                achieved = %shortfall.achieved,
                best = %shortfall.best,
                "objective term below its best; different priorities could raise it"
            );
        }
        debug!(
            container = %self.name(),
            res = %solution.res,
            pivots = solution.pivots,
            "solved"
        );

        Ok(SolveReport {
            res: solution.res,
            unbounded: solution
                .zeroed
                .iter()
                .map(|&i| model.index.unit_id(i))
                .collect(),
            shortfalls: solution.shortfalls,
            alternates: solution.alternates,
            pivots: solution.pivots,
        })
    }

    /// Aggregated flows at the current throttles, without the internal keys that
    /// net to zero and were not asked for.
    pub fn flows(&self, plant: &Plant) -> PlanResult<FlowReport> {
        let internal = self.internal_keys(plant)?;
        let mut report = self.inner.flows(plant)?;
        report.retain(|flow| {
            !internal.contains(&flow.key)
                || self.decl.is_declared(&flow.key)
                || !flow.net().is_zero()
        });
        Ok(report)
    }

    /// Flows of the keys that are both produced and consumed inside.
    pub fn internal_flows(&self, plant: &Plant) -> PlanResult<FlowReport> {
        let internal = self.internal_keys(plant)?;
        let mut report = self.inner.flows(plant)?;
        report.retain(|flow| internal.contains(&flow.key));
        Ok(report)
    }

    fn internal_keys(&self, plant: &Plant) -> PlanResult<BTreeSet<FlowKey>> {
        Ok(self
            .inner
            .base_flows(plant)?
            .iter()
            .filter(|flow| !flow.produced.is_zero() && !flow.consumed.is_zero())
            .map(|flow| flow.key.clone())
            .collect())
    }

    /// Turn every unbounded unit's throttle into a whole (or exact) count on its
    /// edges, bound the unit again and re-solve, then drop the ignored outputs and
    /// the inputs that ended up with no flow.
    pub fn finalize(
        &mut self,
        plant: &mut Plant,
        rounding: Rounding,
    ) -> PlanResult<FinalizeReport> {
        let res = self.bound_unbounded(plant, rounding)?;
        let mut report = FinalizeReport {
            res,
            ..FinalizeReport::default()
        };
        if res != Some(SolveRes::Infeasible) {
            self.prune(plant, &mut report)?;
        }
        Ok(report)
    }

    fn bound_unbounded(
        &mut self,
        plant: &mut Plant,
        rounding: Rounding,
    ) -> PlanResult<Option<SolveRes>> {
        let mut throttles: BTreeMap<UnitId, Rational> = BTreeMap::new();
        for id in self.inner.units() {
            let unit = plant.unit(id)?;
            if unit.is_unbounded() {
                throttles.insert(id, unit.throttle().clone());
            }
        }
        if throttles.is_empty() {
            return Ok(None);
        }

        self.inner.rescale_units(|id, multiplier| match throttles.get(&id) {
            None => Some(multiplier.clone()),
            Some(throttle) => {
                let count = multiplier * throttle;
                (!count.is_zero()).then(|| rounding.apply(&count))
            }
        })?;
        for &id in throttles.keys() {
            plant.mark_bounded(id)?;
            plant.reset_throttle(id)?;
        }
        debug!(
            container = %self.name(),
            units = throttles.len(),
            ?rounding,
            "finalized unbounded units"
        );

        self.solve(plant).map(Some)
    }

    /// Pruned keys stay pinned at zero so a later solve keeps the same plan.
    fn prune(&mut self, plant: &Plant, report: &mut FinalizeReport) -> PlanResult<()> {
        let flows = self.inner.flows(plant)?;
        let mut dropped = Vec::new();

        for key in self.decl.outputs.keys() {
            if !self.decl.priority_of(key).is_ignore() {
                continue;
            }
            if flows.net(key).is_zero() {
                dropped.push(key.clone());
            } else {
                report.extra_outputs.push(key.clone());
            }
        }
        for key in self.decl.inputs.keys() {
            if flows.net(key).is_zero() {
                dropped.push(key.clone());
                report.unused_inputs.push(key.clone());
            }
        }

        for key in dropped {
            self.decl.outputs.remove(&key);
            self.decl.inputs.remove(&key);
            self.decl.key_priorities.remove(&key);
            self.decl
                .constraints
                .push(FlowConstraint::exactly(key, Rational::zero()));
        }
        debug!(
            container = %self.name(),
            extra = report.extra_outputs.len(),
            unused = report.unused_inputs.len(),
            "pruned declarations"
        );
        Ok(())
    }

    /// Units running flat out whose products feed units held below full rate.
    pub fn bottlenecks(&self, plant: &Plant) -> PlanResult<Vec<Bottleneck>> {
        let units = self.inner.units();
        let mut found = Vec::new();
        for &id in &units {
            let unit = plant.unit(id)?;
            if !unit.throttle().is_one() {
                continue;
            }
            let mut throttled = Vec::new();
            for (key, rate) in unit.base_rates() {
                if !rate.is_positive() {
                    continue;
                }
                for &other in &units {
                    let consumer = plant.unit(other)?;
                    let consumes = consumer
                        .base_rate(key.as_str())
                        .is_some_and(Rational::is_negative);
                    if consumes && *consumer.throttle() < 1 && !throttled.contains(&other) {
                        throttled.push(other);
                    }
                }
            }
            if !throttled.is_empty() {
                found.push(Bottleneck {
                    unit: id,
                    throttled,
                });
            }
        }
        Ok(found)
    }

    /// Add a unit to `plant` whose base rates are this container's net flows at
    /// the current throttles. The new unit is throttled on its own; re-solving
    /// this container does not change its rates.
    pub fn black_box(&self, plant: &mut Plant) -> PlanResult<UnitId> {
        let flows = self.flows(plant)?;
        let rates: Vec<(FlowKey, Rational)> = flows
            .iter()
            .map(|flow| (flow.key.clone(), flow.net()))
            .filter(|(_, net)| !net.is_zero())
            .collect();
        if rates.is_empty() {
            return Err(config_err(format!(
                "container {:?} has no net flow to box",
                self.name()
            )));
        }
        let id = plant.add_unit(self.name(), rates)?;
        debug!(container = %self.name(), unit = %id, "boxed container");
        Ok(id)
    }

    pub fn reset_throttle(&self, plant: &mut Plant) -> PlanResult<()> {
        self.inner.reset_throttle(plant)?;
        Ok(())
    }
}
