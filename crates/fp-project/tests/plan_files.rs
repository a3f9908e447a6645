use fp_core::Rational;
use fp_flow::FlowKey;
use fp_plan::SolveRes;
use fp_project::{
    BuildConfig, ProjectError, ValidationError, build_plan, from_yaml_str, load_json, load_yaml,
    save_json, save_yaml,
};

const GEARS: &str = r#"
version: 1
name: gears
units:
  - id: smelt
    category: smelting
    time: "16/5"
    inputs: { ore: 1 }
    outputs: { plate: 1 }
  - id: gear
    category: crafting
    time: "1/2"
    inputs: { plate: 2 }
    outputs: { gear: 1 }
locale:
  Iron plate: smelt
  Iron gear wheel: gear
containers:
  - id: line
    children:
      - count: 4
        unit: Iron plate
      - unit: gear
    outputs:
      gear: max
  - id: capped
    children:
      - count: 4
        unit: smelt
      - unit: Iron gear wheel
    outputs:
      gear: max
    constraints:
      - terms: { gear: 1 }
        relation: "<="
        rhs: 1
"#;

fn r(s: &str) -> Rational {
    s.parse().unwrap()
}

fn config() -> BuildConfig {
    BuildConfig::new().with_speed("smelting", r("2"))
}

#[test]
fn yaml_plan_builds_and_solves() {
    let plan = from_yaml_str(GEARS).unwrap();
    assert_eq!(plan.units.len(), 2);

    let mut built = build_plan(&plan, &config()).unwrap();
    assert_eq!(built.plant.len(), 4);
    assert_eq!(built.solve("line").unwrap(), SolveRes::Unique);

    let line = built.container("line").unwrap();
    let units = line.inner().units();
    assert_eq!(built.plant.unit(units[0]).unwrap().throttle(), &r("1"));
    assert_eq!(built.plant.unit(units[1]).unwrap().throttle(), &r("5/8"));

    let flows = line.flows(&built.plant).unwrap();
    assert_eq!(flows.net(&FlowKey::from("gear")), r("5/4"));
    assert_eq!(flows.net(&FlowKey::from("ore")), r("-5/2"));
}

#[test]
fn yaml_constraints_apply() {
    let plan = from_yaml_str(GEARS).unwrap();
    let mut built = build_plan(&plan, &config()).unwrap();

    assert_eq!(built.solve("capped").unwrap(), SolveRes::Unique);
    let capped = built.container("capped").unwrap();
    let units = capped.inner().units();
    assert_eq!(built.plant.unit(units[0]).unwrap().throttle(), &r("4/5"));
    assert_eq!(built.plant.unit(units[1]).unwrap().throttle(), &r("1/2"));
}

#[test]
fn floats_are_rejected() {
    let text = GEARS.replace("time: \"1/2\"", "time: 0.5");
    assert!(matches!(from_yaml_str(&text), Err(ProjectError::Yaml(_))));
}

#[test]
fn validation_catches_bad_plans() {
    let duplicate = GEARS.replace("id: gear\n", "id: smelt\n");
    assert!(matches!(
        from_yaml_str(&duplicate),
        Err(ProjectError::Validation(ValidationError::DuplicateId { .. }))
    ));

    let missing = GEARS.replace("unit: gear\n", "unit: sprocket\n");
    assert!(matches!(
        from_yaml_str(&missing),
        Err(ProjectError::Validation(ValidationError::MissingReference { .. }))
    ));

    let future = GEARS.replace("version: 1", "version: 99");
    assert!(matches!(
        from_yaml_str(&future),
        Err(ProjectError::Validation(ValidationError::UnsupportedVersion { version: 99 }))
    ));

    let zero_time = GEARS.replace("time: \"1/2\"", "time: 0");
    assert!(matches!(
        from_yaml_str(&zero_time),
        Err(ProjectError::Validation(ValidationError::InvalidValue { .. }))
    ));
}

#[test]
fn bad_output_text_fails_at_build() {
    let text = GEARS.replacen("gear: max", "gear: lots", 1);
    let plan = from_yaml_str(&text).unwrap();
    assert!(matches!(
        build_plan(&plan, &config()),
        Err(ProjectError::Plan(_))
    ));
}

#[test]
fn roundtrip_json() {
    let plan = from_yaml_str(GEARS).unwrap();
    let path = std::env::temp_dir().join("fp_project_roundtrip_gears.json");

    save_json(&path, &plan).unwrap();
    let loaded = load_json(&path).unwrap();
    assert_eq!(plan, loaded);
}

#[test]
fn roundtrip_yaml_file() {
    let plan = from_yaml_str(GEARS).unwrap();
    let path = std::env::temp_dir().join("fp_project_roundtrip_gears.yaml");

    save_yaml(&path, &plan).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(plan, loaded);
}
