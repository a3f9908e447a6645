//! Priorities only ever move production toward the favored unit.

use fp_core::Rational;
use fp_flow::{Plant, combine};
use fp_plan::{Container, ContainerConfig, PriorityKey, with_rate};
use proptest::prelude::*;

/// Throttle of `p1` when it competes with `p2` (priority 0) for one unit of
/// shared input, with `p1` at the given priority.
fn favored_throttle(priority: i32) -> Rational {
    let mut plant = Plant::new();
    let one = Rational::one();
    let p1 = plant
        .add_unit("p1", [("z", one.clone()), ("w", -&one)])
        .unwrap();
    let p2 = plant
        .add_unit("p2", [("z", one.clone()), ("w", -&one)])
        .unwrap();
    let config = ContainerConfig::new()
        .with_output(with_rate("z", "p:-99").unwrap())
        .input("w", Some(one))
        .priority(PriorityKey::Unit(p1), priority)
        .priority(PriorityKey::Unit(p2), 0);
    let container = Container::new(combine(p1, p2), config, &plant).unwrap();
    container.solve(&mut plant).unwrap();
    plant.unit(p1).unwrap().throttle().clone()
}

#[test]
fn priority_above_the_rival_wins() {
    assert_eq!(favored_throttle(1), Rational::one());
    assert_eq!(favored_throttle(-1), Rational::zero());
}

proptest! {
    #[test]
    fn raising_priority_never_lowers_production(a in -98i32..=100, b in -98i32..=100) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(favored_throttle(hi) >= favored_throttle(lo));
    }
}

#[test]
fn raising_a_key_priority_raises_its_output() {
    let output_of_y = |priority: i32| {
        let mut plant = Plant::new();
        let one = Rational::one();
        let p1 = plant
            .add_unit("p1", [("x", one.clone()), ("w", -&one)])
            .unwrap();
        let p2 = plant
            .add_unit("p2", [("y", one.clone()), ("w", -&one)])
            .unwrap();
        let config = ContainerConfig::new()
            .output("x")
            .output("y")
            .input("w", Some(one))
            .priority(PriorityKey::Flow("y".into()), priority);
        let container = Container::new(combine(p1, p2), config, &plant).unwrap();
        container.solve(&mut plant).unwrap();
        container.flows(&plant).unwrap().net(&"y".into())
    };

    assert_eq!(output_of_y(0), Rational::zero());
    assert_eq!(output_of_y(1), Rational::one());
}
