//! Integration tests for tiered solving and outcome classification.

use fp_core::Rational;
use fp_solver::{
    Constraint, LinearProgram, Objective, Relation, SimplexConfig, SolveRes, Tier, solve,
};

fn r(s: &str) -> Rational {
    s.parse().unwrap()
}

fn one() -> Rational {
    Rational::one()
}

/// Two throttles sharing a capped input: p1 + p2 <= 1.
fn shared_input() -> (LinearProgram, usize, usize) {
    let mut lp = LinearProgram::new();
    let p1 = lp.add_variable("p1", Some(one()));
    let p2 = lp.add_variable("p2", Some(one()));
    lp.add_constraint(Constraint::new(
        "w",
        vec![(p1, r("-1")), (p2, r("-1"))],
        Relation::Ge,
        r("-1"),
    ));
    (lp, p1, p2)
}

#[test]
fn higher_tier_wins_the_shared_input() {
    let (mut lp, p1, p2) = shared_input();
    lp.add_tier(Tier::new(Objective::new("prio 1", vec![(p1, one())])));
    lp.add_tier(
        Tier::new(Objective::new("prio 0", vec![(p1, one()), (p2, one())]))
            .with_aux(Objective::new("z", vec![(p1, one()), (p2, one())]))
            .with_aux(Objective::new("p2", vec![(p2, one())])),
    );

    let sol = solve(&lp, &SimplexConfig::default()).unwrap();
    assert_eq!(sol.values, vec![r("1"), r("0")]);
    assert_eq!(sol.tier_values, vec![r("1"), r("1")]);
    assert!(sol.shortfalls.is_empty());
    assert_eq!(sol.res, SolveRes::Unique);
}

#[test]
fn competing_terms_in_one_tier_are_ok() {
    let (mut lp, p1, p2) = shared_input();
    lp.add_tier(
        Tier::new(Objective::new("prio 0", vec![(p1, one()), (p2, one())]))
            .with_aux(Objective::new("x", vec![(p1, one())]))
            .with_aux(Objective::new("y", vec![(p2, one())])),
    );

    let sol = solve(&lp, &SimplexConfig::default()).unwrap();
    assert_eq!(sol.res, SolveRes::Ok);
    assert_eq!(sol.shortfalls.len(), 1);
    let shortfall = &sol.shortfalls[0];
    assert_eq!(shortfall.term, "y");
    assert_eq!(shortfall.achieved, r("0"));
    assert_eq!(shortfall.best, r("1"));
}

#[test]
fn perfect_substitutes_are_optimal_not_unique() {
    let (mut lp, p1, p2) = shared_input();
    lp.add_tier(Tier::new(Objective::new(
        "z",
        vec![(p1, one()), (p2, one())],
    )));

    let sol = solve(&lp, &SimplexConfig::default()).unwrap();
    assert_eq!(sol.res, SolveRes::Optimal);
    assert!(!sol.alternates.is_empty());
    assert_eq!(&sol.values[p1] + &sol.values[p2], one());
}

#[test]
fn infeasible_leaves_no_values() {
    let mut lp = LinearProgram::new();
    let x = lp.add_variable("x", Some(one()));
    lp.add_constraint(Constraint::new("x out", vec![(x, r("1"))], Relation::Eq, r("2")));
    lp.add_tier(Tier::new(Objective::new("o", vec![(x, one())])));

    let sol = solve(&lp, &SimplexConfig::default()).unwrap();
    assert_eq!(sol.res, SolveRes::Infeasible);
    assert!(sol.values.is_empty());
}

#[test]
fn minimize_tier_by_negation() {
    // x + y >= 3/2 with both capped at 1; minimize x first, then maximize y.
    let mut lp = LinearProgram::new();
    let x = lp.add_variable("x", Some(one()));
    let y = lp.add_variable("y", Some(one()));
    lp.add_constraint(Constraint::new(
        "need",
        vec![(x, one()), (y, one())],
        Relation::Ge,
        r("3/2"),
    ));
    lp.add_tier(Tier::new(Objective::new("min x", vec![(x, r("-1"))])));

    let sol = solve(&lp, &SimplexConfig::default()).unwrap();
    assert_eq!(sol.values, vec![r("1/2"), r("1")]);
    assert_eq!(sol.tier_values, vec![r("-1/2")]);
    assert_eq!(sol.res, SolveRes::Unique);
}

#[test]
fn repeated_solves_agree() {
    let (mut lp, p1, p2) = shared_input();
    lp.add_tier(Tier::new(Objective::new(
        "z",
        vec![(p1, r("2")), (p2, r("3"))],
    )));

    let first = solve(&lp, &SimplexConfig::default()).unwrap();
    let second = solve(&lp, &SimplexConfig::default()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.values, vec![r("0"), r("1")]);
}
