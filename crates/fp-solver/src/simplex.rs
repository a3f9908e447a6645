//! Lexicographic two-phase simplex driver.

use core::fmt;

use fp_core::Rational;
use tracing::{debug, warn};

use crate::error::{SolverError, SolverResult};
use crate::problem::{Constraint, LinearProgram, Relation, Tier};
use crate::tableau::{PivotBudget, Step, Tableau};

/// Simplex configuration.
#[derive(Clone, Debug, Default)]
pub struct SimplexConfig {
    /// Stop with [`SolverError::PivotLimit`] after this many improving pivots.
    /// `None` (the default) never stops; degenerate problems may then cycle.
    pub max_pivots: Option<usize>,
}

/// Classification of a solve, worst first: `Infeasible`, `Unbounded`, `Ok`,
/// `Optimal`, `Unique`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SolveRes {
    /// The optimum is the only solution.
    Unique,
    /// Optimal, but other solutions reach the same objective values.
    Optimal,
    /// Feasible, but some objective term could be raised by a different
    /// choice of priorities.
    Ok,
    /// Some unbounded variables had to be held at zero.
    Unbounded,
    /// No solution satisfies the constraints.
    Infeasible,
}

impl SolveRes {
    pub fn is_feasible(self) -> bool {
        self != SolveRes::Infeasible
    }

    fn severity(self) -> u8 {
        match self {
            SolveRes::Unique => 0,
            SolveRes::Optimal => 1,
            SolveRes::Ok => 2,
            SolveRes::Unbounded => 3,
            SolveRes::Infeasible => 4,
        }
    }

    /// The more severe of two outcomes.
    pub fn worst(self, other: SolveRes) -> SolveRes {
        if other.severity() > self.severity() { other } else { self }
    }
}

impl fmt::Display for SolveRes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolveRes::Unique => "UNIQUE",
            SolveRes::Optimal => "OPTIMAL",
            SolveRes::Ok => "OK",
            SolveRes::Unbounded => "UNBOUNDED",
            SolveRes::Infeasible => "INFEASIBLE",
        })
    }
}

/// An auxiliary term left below the maximum it could reach in its tier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shortfall {
    pub tier: String,
    pub term: String,
    pub achieved: Rational,
    pub best: Rational,
}

/// Result of [`solve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LpSolution {
    pub res: SolveRes,
    /// One value per variable; empty when infeasible.
    pub values: Vec<Rational>,
    /// Optimum of each tier, in tier order.
    pub tier_values: Vec<Rational>,
    pub shortfalls: Vec<Shortfall>,
    /// Labels of non-basic columns that can move without changing the final
    /// objective.
    pub alternates: Vec<String>,
    /// Variables held at zero because they were unbounded.
    pub zeroed: Vec<usize>,
    pub pivots: usize,
}

impl LpSolution {
    fn infeasible(pivots: usize) -> Self {
        Self {
            res: SolveRes::Infeasible,
            values: Vec::new(),
            tier_values: Vec::new(),
            shortfalls: Vec::new(),
            alternates: Vec::new(),
            zeroed: Vec::new(),
            pivots,
        }
    }
}

/// Solve a linear program lexicographically.
///
/// # Algorithm
///
/// 1. Build a tableau from the constraints and upper bounds; phase 1 finds a
///    feasible basis or reports `Infeasible`.
/// 2. For each tier in order, rebuild from scratch with every earlier tier's
///    optimum pinned as an equality, then maximize the tier objective.
///    If it is unbounded, the unbounded variables along the ray are fixed at
///    zero and the tier is retried.
/// 3. For tiers with several auxiliary terms, maximize each term on its own over
///    the same region and record any gap as a [`Shortfall`].
/// 4. In the final tableau, a non-basic column with zero reduced cost that can
///    move a positive distance marks the optimum as non-unique.
pub fn solve(problem: &LinearProgram, config: &SimplexConfig) -> SolverResult<LpSolution> {
    problem.validate()?;

    let n = problem.num_variables();
    let mut budget = PivotBudget::new(config.max_pivots);
    let mut pins: Vec<Constraint> = Vec::new();
    let mut zeroed: Vec<usize> = Vec::new();
    let mut shortfalls = Vec::new();
    let mut tier_values = Vec::new();
    let mut last: Option<(Tableau, Vec<Rational>)> = None;

    for tier in &problem.tiers {
        let label = &tier.objective.label;
        let (start, optimized) = loop {
            let Some(start) = feasible_start(problem, &pins, &mut budget)? else {
                return Ok(LpSolution::infeasible(budget.used()));
            };
            let mut tableau = start.clone();
            let cost = tableau.cost_for(&tier.objective);
            match tableau.optimize(&cost, &mut budget)? {
                Step::Optimal => break (start, tableau),
                Step::Unbounded(col) => {
                    let fresh: Vec<usize> = tableau
                        .ray_variables(col)
                        .into_iter()
                        .filter(|k| problem.variables[*k].upper.is_none() && !zeroed.contains(k))
                        .collect();
                    if fresh.is_empty() {
                        return Err(SolverError::Numeric {
                            what: format!("unbounded ray in tier {label} has no unbounded variable"),
                        });
                    }
                    for k in fresh {
                        let name = &problem.variables[k].name;
                        warn!(tier = %label, variable = %name, "unbounded; holding at zero");
                        pins.push(Constraint::new(
                            format!("{name} zeroed"),
                            vec![(k, Rational::one())],
                            Relation::Eq,
                            Rational::zero(),
                        ));
                        zeroed.push(k);
                    }
                }
            }
        };

        let cost = optimized.cost_for(&tier.objective);
        let value = optimized.objective_value(&cost);
        if tier.aux.len() > 1 {
            shortfalls.extend(check_aux(tier, &start, &optimized, &mut budget)?);
        }
        debug!(tier = %label, value = %value, pivots = budget.used(), "tier optimized");

        pins.push(Constraint::new(
            format!("pin[{label}]"),
            tier.objective.coeffs.clone(),
            Relation::Eq,
            value.clone(),
        ));
        tier_values.push(value);
        last = Some((optimized, cost));
    }

    let (tableau, cost) = match last {
        Some(pair) => pair,
        None => {
            let Some(tableau) = feasible_start(problem, &pins, &mut budget)? else {
                return Ok(LpSolution::infeasible(budget.used()));
            };
            let cost = vec![Rational::zero(); tableau.num_columns()];
            (tableau, cost)
        }
    };

    let alternates: Vec<String> = tableau
        .alternates(&cost)
        .into_iter()
        .map(|col| tableau.label(col).to_string())
        .collect();

    let res = if !zeroed.is_empty() {
        SolveRes::Unbounded
    } else if !shortfalls.is_empty() {
        SolveRes::Ok
    } else if !alternates.is_empty() {
        SolveRes::Optimal
    } else {
        SolveRes::Unique
    };

    Ok(LpSolution {
        res,
        values: tableau.values(n),
        tier_values,
        shortfalls,
        alternates,
        zeroed,
        pivots: budget.used(),
    })
}

fn feasible_start(
    problem: &LinearProgram,
    pins: &[Constraint],
    budget: &mut PivotBudget,
) -> SolverResult<Option<Tableau>> {
    let Some(mut tableau) = Tableau::build(problem, pins) else {
        return Ok(None);
    };
    Ok(tableau.phase_one(budget)?.then_some(tableau))
}

fn check_aux(
    tier: &Tier,
    start: &Tableau,
    optimized: &Tableau,
    budget: &mut PivotBudget,
) -> SolverResult<Vec<Shortfall>> {
    let mut out = Vec::new();
    for aux in &tier.aux {
        let mut trial = start.clone();
        let cost = trial.cost_for(aux);
        if trial.optimize(&cost, budget)? != Step::Optimal {
            continue;
        }
        let best = trial.objective_value(&cost);
        let achieved = optimized.objective_value(&cost);
        if achieved < best {
            out.push(Shortfall {
                tier: tier.objective.label.clone(),
                term: aux.label.clone(),
                achieved,
                best,
            });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Objective;

    fn r(s: &str) -> Rational {
        s.parse().unwrap()
    }

    #[test]
    fn severity_order() {
        assert_eq!(SolveRes::Unique.worst(SolveRes::Optimal), SolveRes::Optimal);
        assert_eq!(SolveRes::Ok.worst(SolveRes::Optimal), SolveRes::Ok);
        assert_eq!(SolveRes::Infeasible.worst(SolveRes::Ok), SolveRes::Infeasible);
        assert!(!SolveRes::Infeasible.is_feasible());
        assert_eq!(SolveRes::Optimal.to_string(), "OPTIMAL");
    }

    #[test]
    fn no_tiers_with_a_single_point_is_unique() {
        // 2a = 9, -6a + 5b = 0, both unbounded above.
        let mut lp = LinearProgram::new();
        let a = lp.add_variable("a", None);
        let b = lp.add_variable("b", None);
        lp.add_constraint(Constraint::new("x", vec![(a, r("2"))], Relation::Eq, r("9")));
        lp.add_constraint(Constraint::new(
            "y",
            vec![(a, r("-6")), (b, r("5"))],
            Relation::Eq,
            r("0"),
        ));

        let sol = solve(&lp, &SimplexConfig::default()).unwrap();
        assert_eq!(sol.res, SolveRes::Unique);
        assert_eq!(sol.values, vec![r("9/2"), r("27/5")]);
    }

    #[test]
    fn no_tiers_with_slack_room_is_optimal() {
        let mut lp = LinearProgram::new();
        lp.add_variable("a", Some(r("1")));
        let sol = solve(&lp, &SimplexConfig::default()).unwrap();
        assert_eq!(sol.res, SolveRes::Optimal);
        assert_eq!(sol.alternates, vec!["a".to_string()]);
    }

    #[test]
    fn unbounded_tier_zeroes_the_variable() {
        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", None);
        let y = lp.add_variable("y", Some(r("1")));
        lp.add_tier(Tier::new(Objective::new(
            "grow",
            vec![(x, r("1")), (y, r("1"))],
        )));

        let sol = solve(&lp, &SimplexConfig::default()).unwrap();
        assert_eq!(sol.res, SolveRes::Unbounded);
        assert_eq!(sol.zeroed, vec![x]);
        assert_eq!(sol.values, vec![r("0"), r("1")]);
    }

    #[test]
    fn pivot_limit_is_an_error() {
        let mut lp = LinearProgram::new();
        let x = lp.add_variable("x", Some(r("1")));
        lp.add_tier(Tier::new(Objective::new("o", vec![(x, r("1"))])));
        let config = SimplexConfig {
            max_pivots: Some(0),
        };
        assert_eq!(
            solve(&lp, &config).unwrap_err(),
            SolverError::PivotLimit { limit: 0 }
        );
    }
}
