//! Human-readable dump of a container and its current solution.

use fp_core::Rational;
use fp_flow::{Child, Composite, Plant};

use crate::config::OutputTarget;
use crate::container::Container;
use crate::error::PlanResult;

const DECIMAL_PLACES: u32 = 4;

impl Container {
    /// Children with their throttles and flows, followed by the declarations and
    /// the aggregated flows.
    pub fn summary(&self, plant: &Plant) -> PlanResult<String> {
        let mut out = format!("{}:\n", self.name());
        write_children(&mut out, self.inner(), plant, 1)?;

        let decl = self.declarations();
        let outputs: Vec<String> = decl
            .outputs
            .iter()
            .map(|(key, target)| {
                let what = match target {
                    OutputTarget::Rate(rate) => rate.to_string(),
                    OutputTarget::Maximize => "max".to_string(),
                };
                format!("{key} {what} (p{})", decl.priority_of(key))
            })
            .collect();
        let inputs: Vec<String> = decl
            .inputs
            .iter()
            .map(|(key, max)| match max {
                Some(max) => format!("{key} <= {max}"),
                None => key.to_string(),
            })
            .collect();
        let unconstrained: Vec<String> =
            decl.unconstrained.iter().map(ToString::to_string).collect();
        let constraints: Vec<String> = decl.constraints.iter().map(ToString::to_string).collect();
        let mut priorities: Vec<String> = decl
            .key_priorities
            .iter()
            .map(|(key, p)| format!("{key}: {p}"))
            .collect();
        for (id, p) in &decl.unit_priorities {
            priorities.push(format!("{}: {p}", plant.unit(*id)?.name()));
        }

        let idle = decl
            .idle
            .iter()
            .map(|id| Ok(plant.unit(*id)?.name().to_string()))
            .collect::<PlanResult<Vec<String>>>()?;

        for (label, items) in [
            ("outputs", outputs),
            ("inputs", inputs),
            ("unconstrained", unconstrained),
            ("constraints", constraints),
            ("priorities", priorities),
            ("idle", idle),
        ] {
            if !items.is_empty() {
                out.push_str(&format!("  {label}: {}\n", items.join(", ")));
            }
        }
        out.push_str(&format!("  flows: {}\n", self.flows(plant)?));
        Ok(out)
    }
}

fn approx(value: &Rational) -> String {
    if value.is_integer() {
        value.to_string()
    } else {
        format!("{value} ~{}", value.to_decimal_string(DECIMAL_PLACES))
    }
}

fn write_children(
    out: &mut String,
    composite: &Composite,
    plant: &Plant,
    depth: usize,
) -> PlanResult<()> {
    let indent = "  ".repeat(depth);
    for (multiplier, child) in composite.children() {
        match child {
            Child::Unit(id) => {
                let unit = plant.unit(*id)?;
                out.push_str(&format!(
                    "{indent}{} x {} @ {}: {}\n",
                    approx(multiplier),
                    unit.name(),
                    approx(unit.throttle()),
                    unit.flows().scaled(multiplier)
                ));
            }
            Child::Composite(inner) => {
                out.push_str(&format!(
                    "{indent}{} x group: {}\n",
                    approx(multiplier),
                    inner.flows(plant)?.scaled(multiplier)
                ));
                write_children(out, inner, plant, depth + 1)?;
            }
        }
    }
    Ok(())
}
