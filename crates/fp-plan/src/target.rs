//! Output targets and objective priorities.

use core::fmt;

use fp_core::Rational;
use fp_flow::FlowKey;

use crate::error::{PlanResult, config_err};

/// Objective weight level in `[-100, 100]`. Higher levels are optimized first;
/// [`Priority::IGNORE`] drops a key from the objectives altogether.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(i8);

impl Priority {
    pub const MIN: i32 = -100;
    pub const MAX: i32 = 100;
    pub const IGNORE: Priority = Priority(-100);

    pub fn new(value: i32) -> PlanResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(config_err(format!(
                "priority {value} is outside [{}, {}]",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(value as i8))
    }

    pub fn get(self) -> i32 {
        i32::from(self.0)
    }

    pub fn is_ignore(self) -> bool {
        self == Self::IGNORE
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a caller asks of one output key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// Net production fixed at exactly this rate.
    Rate(Rational),
    /// Maximize at the default priority.
    Maximize,
    /// Maximize at the given priority.
    Priority(Priority),
}

/// A key paired with its target, as produced by [`with_rate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateSpec {
    pub key: FlowKey,
    pub target: Target,
}

impl RateSpec {
    pub fn maximize(key: impl Into<FlowKey>) -> Self {
        Self {
            key: key.into(),
            target: Target::Maximize,
        }
    }

    pub fn rate(key: impl Into<FlowKey>, rate: Rational) -> Self {
        Self {
            key: key.into(),
            target: Target::Rate(rate),
        }
    }
}

/// Parse a target for `key`: `p:<int>` or `p<int>` is a priority, `max` means
/// maximize, anything else must be an exact rate such as `5/3` or `0.25`.
pub fn with_rate(key: impl Into<FlowKey>, text: &str) -> PlanResult<RateSpec> {
    let key = key.into();
    let trimmed = text.trim();

    let target = if let Some(rest) = trimmed.strip_prefix(['p', 'P']) {
        let digits = rest.strip_prefix(':').unwrap_or(rest).trim();
        let value: i32 = digits
            .parse()
            .map_err(|_| config_err(format!("invalid priority {text:?} for {key}")))?;
        Target::Priority(Priority::new(value)?)
    } else if trimmed.eq_ignore_ascii_case("max") {
        Target::Maximize
    } else {
        Target::Rate(trimmed.parse()?)
    };

    Ok(RateSpec { key, target })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanError;
    use fp_core::FpError;

    #[test]
    fn priority_forms() {
        let spec = with_rate("x", "p:3").unwrap();
        assert_eq!(spec.target, Target::Priority(Priority::new(3).unwrap()));
        assert_eq!(
            with_rate("x", "p-2").unwrap().target,
            Target::Priority(Priority::new(-2).unwrap())
        );
        assert_eq!(with_rate("x", "max").unwrap().target, Target::Maximize);
    }

    #[test]
    fn exact_rates() {
        assert_eq!(
            with_rate("x", "5/3").unwrap().target,
            Target::Rate(Rational::new(5, 3).unwrap())
        );
        assert_eq!(
            with_rate("x", "0.1").unwrap().target,
            Target::Rate(Rational::new(1, 10).unwrap())
        );
    }

    #[test]
    fn malformed_text() {
        assert!(matches!(
            with_rate("x", "abc"),
            Err(PlanError::Core(FpError::Parse { .. }))
        ));
        assert!(matches!(
            with_rate("x", "p:x"),
            Err(PlanError::Configuration { .. })
        ));
        assert!(matches!(
            with_rate("x", "p:101"),
            Err(PlanError::Configuration { .. })
        ));
    }

    #[test]
    fn priority_bounds() {
        assert!(Priority::new(-100).unwrap().is_ignore());
        assert!(Priority::new(100).is_ok());
        assert!(Priority::new(-101).is_err());
        assert_eq!(Priority::default().get(), 0);
    }
}
