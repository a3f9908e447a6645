//! Combined containers and per-container views over shared units.

use fp_core::Rational;
use fp_flow::{FlowKey, Plant, combine};
use fp_plan::{Container, ContainerConfig, OutputTarget, PlanError, SolveRes, union};

fn r(s: &str) -> Rational {
    s.parse().unwrap()
}

#[test]
fn views_share_throttles_with_the_union() {
    // One supply unit feeds both lines.
    let mut plant = Plant::new();
    let supply = plant.add_unit("supply", [("w", r("1"))]).unwrap();
    let p = plant.add_unit("p", [("x", r("1")), ("w", r("-1"))]).unwrap();
    let q = plant.add_unit("q", [("y", r("1")), ("w", r("-1"))]).unwrap();

    let left = Container::new(combine(supply, p), ContainerConfig::new(), &plant)
        .unwrap()
        .named("left");
    let right = Container::new(combine(supply, q), ContainerConfig::new(), &plant)
        .unwrap()
        .named("right");

    let (combined, views) = union(&[&left, &right], &plant).unwrap();
    assert_eq!(combined.inner().units(), vec![supply, p, q]);
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].name(), "left");
    assert_eq!(combined.declarations().outputs.len(), 2);

    assert_eq!(views[0].solve(&mut plant).unwrap(), SolveRes::Unique);
    let flows = combined.flows(&plant).unwrap();
    assert_eq!(flows.net(&FlowKey::from("x")), r("1"));
    assert_eq!(flows.net(&FlowKey::from("y")), r("0"));

    assert_eq!(views[1].solve(&mut plant).unwrap(), SolveRes::Unique);
    let flows = combined.flows(&plant).unwrap();
    assert_eq!(flows.net(&FlowKey::from("x")), r("0"));
    assert_eq!(flows.net(&FlowKey::from("y")), r("1"));

    // Both outputs compete for the one supply.
    assert_eq!(combined.solve(&mut plant).unwrap(), SolveRes::Ok);
}

#[test]
fn widest_multiplier_and_disagreeing_targets() {
    let mut plant = Plant::new();
    let a = plant.add_unit("a", [("x", r("1"))]).unwrap();

    let slow = Container::new(
        fp_flow::scale(a, 2).unwrap(),
        ContainerConfig::new().output_rate("x", r("1")),
        &plant,
    )
    .unwrap();
    let fast = Container::new(
        fp_flow::scale(a, 3).unwrap(),
        ContainerConfig::new().output_rate("x", r("2")),
        &plant,
    )
    .unwrap();

    let (combined, _) = union(&[&slow, &fast], &plant).unwrap();
    assert_eq!(combined.inner().unit_multipliers(), vec![(a, r("3"))]);
    assert_eq!(
        combined.declarations().outputs[&FlowKey::from("x")],
        OutputTarget::Maximize
    );
}

#[test]
fn view_holds_units_of_other_containers_idle() {
    let mut plant = Plant::new();
    let p = plant.add_unit("p", [("x", r("1"))]).unwrap();
    let q = plant.add_unit("q", [("y", r("1"))]).unwrap();
    let left = Container::new(fp_flow::scale(p, 1).unwrap(), ContainerConfig::new(), &plant)
        .unwrap()
        .named("left");
    let right = Container::new(fp_flow::scale(q, 1).unwrap(), ContainerConfig::new(), &plant)
        .unwrap()
        .named("right");
    assert_eq!(left.solve(&mut plant).unwrap(), SolveRes::Unique);

    let (combined, views) = union(&[&left, &right], &plant).unwrap();
    assert_eq!(views[0].declarations().idle.iter().copied().collect::<Vec<_>>(), vec![q]);

    plant.set_throttle(q, r("1/2")).unwrap();
    assert_eq!(views[0].solve(&mut plant).unwrap(), SolveRes::Unique);
    assert_eq!(plant.unit(p).unwrap().throttle(), &r("1"));
    assert_eq!(plant.unit(q).unwrap().throttle(), &r("0"));

    assert_eq!(combined.solve(&mut plant).unwrap(), SolveRes::Unique);
    assert_eq!(plant.unit(q).unwrap().throttle(), &r("1"));
}

#[test]
fn target_declared_by_one_container_is_maximized() {
    let mut plant = Plant::new();
    let p = plant.add_unit("p", [("x", r("1")), ("y", r("1"))]).unwrap();
    let exact = Container::new(
        fp_flow::scale(p, 1).unwrap(),
        ContainerConfig::new().output_rate("x", r("1/2")).output("y"),
        &plant,
    )
    .unwrap();
    let open = Container::new(
        fp_flow::scale(p, 1).unwrap(),
        ContainerConfig::new().output("y"),
        &plant,
    )
    .unwrap();

    let (combined, _) = union(&[&exact, &open], &plant).unwrap();
    let outputs = &combined.declarations().outputs;
    assert_eq!(outputs[&FlowKey::from("x")], OutputTarget::Maximize);
    assert_eq!(outputs[&FlowKey::from("y")], OutputTarget::Maximize);
}

#[test]
fn empty_union_is_rejected() {
    let plant = Plant::new();
    assert!(matches!(
        union(&[], &plant),
        Err(PlanError::Configuration { .. })
    ));
}
