//! Integration tests for fp-flow.

use fp_core::Rational;
use fp_flow::{Composite, FlowKey, Plant, UnitIndex, combine, scale};

fn r(s: &str) -> Rational {
    s.parse().unwrap()
}

#[test]
fn scenario_units_aggregate() {
    // A: X +2, Y -6; B: Y +5
    let mut plant = Plant::new();
    let a = plant.add_unit("a", [("x", r("2")), ("y", r("-6"))]).unwrap();
    let b = plant.add_unit("b", [("y", r("5"))]).unwrap();

    let line = combine(a, scale(b, 2).unwrap());
    let flows = line.flows(&plant).unwrap();

    assert_eq!(flows.net(&FlowKey::from("x")), r("2"));
    assert_eq!(flows.net(&FlowKey::from("y")), r("4"));
    assert_eq!(flows.get("y").unwrap().produced, r("10"));
    assert_eq!(flows.get("y").unwrap().consumed, r("6"));
}

#[test]
fn shared_units_see_the_same_throttle() {
    let mut plant = Plant::new();
    let a = plant.add_unit("a", [("x", r("1"))]).unwrap();
    let b = plant.add_unit("b", [("y", r("1"))]).unwrap();

    let first = combine(a, b);
    let second = scale(a, 3).unwrap();

    plant.set_throttle(a, r("1/3")).unwrap();

    assert_eq!(first.flows(&plant).unwrap().net(&"x".into()), r("1/3"));
    assert_eq!(second.flows(&plant).unwrap().net(&"x".into()), r("1"));
}

#[test]
fn unbounded_composite_marks_every_unit() {
    let mut plant = Plant::new();
    let a = plant.add_unit("a", [("x", r("1"))]).unwrap();
    let b = plant.add_unit("b", [("x", r("-1"))]).unwrap();
    let group = Composite::new().with(r("2"), combine(a, b)).unwrap();

    group.mark_unbounded(&mut plant).unwrap();

    assert!(plant.unit(a).unwrap().is_unbounded());
    assert!(plant.unit(b).unwrap().is_unbounded());
    plant.set_throttle(a, r("7/2")).unwrap();

    let index = UnitIndex::from_composite(&group);
    assert_eq!(index.multiplier(index.idx(b).unwrap()), &r("2"));
    assert_eq!(group.flows(&plant).unwrap().net(&"x".into()), r("5"));
}
