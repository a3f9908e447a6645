//! Linear relations over net flows.

use core::fmt;

use fp_core::Rational;
use fp_flow::FlowKey;
use fp_solver::Relation;

/// `sum(coefficient * net(key)) relation rhs`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowConstraint {
    pub terms: Vec<(Rational, FlowKey)>,
    pub relation: Relation,
    pub rhs: Rational,
}

impl FlowConstraint {
    pub fn new(terms: Vec<(Rational, FlowKey)>, relation: Relation, rhs: Rational) -> Self {
        Self {
            terms,
            relation,
            rhs,
        }
    }

    /// `net(key) >= rate`
    pub fn at_least(key: impl Into<FlowKey>, rate: Rational) -> Self {
        Self::new(vec![(Rational::one(), key.into())], Relation::Ge, rate)
    }

    /// `net(key) <= rate`
    pub fn at_most(key: impl Into<FlowKey>, rate: Rational) -> Self {
        Self::new(vec![(Rational::one(), key.into())], Relation::Le, rate)
    }

    /// `net(key) == rate`
    pub fn exactly(key: impl Into<FlowKey>, rate: Rational) -> Self {
        Self::new(vec![(Rational::one(), key.into())], Relation::Eq, rate)
    }

    /// `net(a) == -net(b)`: what is made of `a` equals what is used of `b`.
    pub fn paired(a: impl Into<FlowKey>, b: impl Into<FlowKey>) -> Self {
        Self::new(
            vec![(Rational::one(), a.into()), (Rational::one(), b.into())],
            Relation::Eq,
            Rational::zero(),
        )
    }

    pub fn keys(&self) -> impl Iterator<Item = &FlowKey> {
        self.terms.iter().map(|(_, key)| key)
    }
}

impl fmt::Display for FlowConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (coeff, key)) in self.terms.iter().enumerate() {
            let sign = match (i, coeff.is_negative()) {
                (0, false) => "",
                (0, true) => "-",
                (_, false) => " + ",
                (_, true) => " - ",
            };
            let magnitude = coeff.abs();
            if magnitude.is_one() {
                write!(f, "{sign}{key}")?;
            } else {
                write!(f, "{sign}{magnitude}*{key}")?;
            }
        }
        write!(f, " {} {}", self.relation, self.rhs)
    }
}
