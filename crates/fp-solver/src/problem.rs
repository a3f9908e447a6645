//! Linear program definition.
//!
//! All variables are non-negative. Objectives are always maximized; a
//! minimization tier is expressed by negating its coefficients.

use core::fmt;

use fp_core::Rational;

use crate::error::{SolverError, SolverResult};

/// Constraint relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `lhs <= rhs`
    Le,
    /// `lhs >= rhs`
    Ge,
    /// `lhs == rhs`
    Eq,
}

impl Relation {
    pub(crate) fn flipped(self) -> Self {
        match self {
            Relation::Le => Relation::Ge,
            Relation::Ge => Relation::Le,
            Relation::Eq => Relation::Eq,
        }
    }

    pub(crate) fn holds(self, lhs: &Rational, rhs: &Rational) -> bool {
        match self {
            Relation::Le => lhs <= rhs,
            Relation::Ge => lhs >= rhs,
            Relation::Eq => lhs == rhs,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "=",
        })
    }
}

/// A decision variable, bounded below by zero and optionally above.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub upper: Option<Rational>,
}

/// `sum(coeff * x[index]) relation rhs`. Repeated indices are summed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub label: String,
    pub coeffs: Vec<(usize, Rational)>,
    pub relation: Relation,
    pub rhs: Rational,
}

impl Constraint {
    pub fn new(
        label: impl Into<String>,
        coeffs: Vec<(usize, Rational)>,
        relation: Relation,
        rhs: Rational,
    ) -> Self {
        Self {
            label: label.into(),
            coeffs,
            relation,
            rhs,
        }
    }
}

/// A linear function to maximize.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Objective {
    pub label: String,
    pub coeffs: Vec<(usize, Rational)>,
}

impl Objective {
    pub fn new(label: impl Into<String>, coeffs: Vec<(usize, Rational)>) -> Self {
        Self {
            label: label.into(),
            coeffs,
        }
    }

    /// Objective value at `values`.
    pub fn evaluate(&self, values: &[Rational]) -> Rational {
        self.coeffs
            .iter()
            .map(|(index, coeff)| coeff * &values[*index])
            .sum()
    }
}

/// One lexicographic pass.
///
/// `aux` terms are checked after the tier is optimized: each term's own maximum
/// over the tier's feasible region is compared with the value the tier's
/// solution gives it. A gap is reported as a shortfall.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tier {
    pub objective: Objective,
    pub aux: Vec<Objective>,
}

impl Tier {
    pub fn new(objective: Objective) -> Self {
        Self {
            objective,
            aux: Vec::new(),
        }
    }

    pub fn with_aux(mut self, aux: Objective) -> Self {
        self.aux.push(aux);
        self
    }
}

/// Linear program: variables, constraints and tiers in priority order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinearProgram {
    pub variables: Vec<Variable>,
    pub constraints: Vec<Constraint>,
    pub tiers: Vec<Tier>,
}

impl LinearProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable and return its index.
    pub fn add_variable(&mut self, name: impl Into<String>, upper: Option<Rational>) -> usize {
        self.variables.push(Variable {
            name: name.into(),
            upper,
        });
        self.variables.len() - 1
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn add_tier(&mut self, tier: Tier) {
        self.tiers.push(tier);
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Check indices and bounds before building a tableau.
    pub fn validate(&self) -> SolverResult<()> {
        let n = self.variables.len();

        for var in &self.variables {
            if var.upper.as_ref().is_some_and(Rational::is_negative) {
                return Err(SolverError::ProblemSetup {
                    what: format!("variable {} has a negative upper bound", var.name),
                });
            }
        }

        let out_of_range = |coeffs: &[(usize, Rational)]| coeffs.iter().any(|(i, _)| *i >= n);
        for c in &self.constraints {
            if out_of_range(&c.coeffs) {
                return Err(SolverError::ProblemSetup {
                    what: format!("constraint {} references an unknown variable", c.label),
                });
            }
        }
        for tier in &self.tiers {
            for objective in std::iter::once(&tier.objective).chain(&tier.aux) {
                if out_of_range(&objective.coeffs) {
                    return Err(SolverError::ProblemSetup {
                        what: format!("objective {} references an unknown variable", objective.label),
                    });
                }
            }
        }
        Ok(())
    }

    fn write_terms(&self, f: &mut fmt::Formatter<'_>, coeffs: &[(usize, Rational)]) -> fmt::Result {
        if coeffs.is_empty() {
            return f.write_str("0");
        }
        for (k, (index, coeff)) in coeffs.iter().enumerate() {
            let name = &self.variables[*index].name;
            match (k, coeff.is_negative()) {
                (0, false) => write!(f, "{coeff}*{name}")?,
                (0, true) => write!(f, "-{}*{name}", coeff.abs())?,
                (_, false) => write!(f, " + {coeff}*{name}")?,
                (_, true) => write!(f, " - {}*{name}", coeff.abs())?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for LinearProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tier in &self.tiers {
            write!(f, "maximize [{}] ", tier.objective.label)?;
            self.write_terms(f, &tier.objective.coeffs)?;
            writeln!(f)?;
        }
        writeln!(f, "subject to")?;
        for c in &self.constraints {
            write!(f, "  [{}] ", c.label)?;
            self.write_terms(f, &c.coeffs)?;
            writeln!(f, " {} {}", c.relation, c.rhs)?;
        }
        for var in &self.variables {
            match &var.upper {
                Some(upper) => writeln!(f, "  0 <= {} <= {upper}", var.name)?,
                None => writeln!(f, "  0 <= {}", var.name)?,
            }
        }
        Ok(())
    }
}
