//! Exact arbitrary-precision rational numbers.
//!
//! Every rate, throttle and tableau entry in flowplan is a [`Rational`]. Values are
//! kept in lowest terms with a positive denominator, so equality and hashing are
//! structural. There is no conversion from floating point; text input goes through
//! [`Rational::from_str`], which accepts integers, fractions and decimals with an
//! optional exponent.

use core::cmp::Ordering;
use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};
use core::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::error::{FpError, FpResult};

/// Largest decimal exponent accepted by the parser.
const MAX_EXPONENT: u32 = 4096;

/// Exact rational number in lowest terms.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rational(BigRational);

impl Rational {
    /// Build `num / den`, normalized. Fails with [`FpError::DivideByZero`] when `den` is 0.
    pub fn new(num: impl Into<BigInt>, den: impl Into<BigInt>) -> FpResult<Self> {
        let den = den.into();
        if den.is_zero() {
            return Err(FpError::DivideByZero);
        }
        Ok(Self(BigRational::new(num.into(), den)))
    }

    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self(BigRational::from_integer(value.into()))
    }

    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    pub fn one() -> Self {
        Self(BigRational::one())
    }

    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// -1, 0 or 1.
    pub fn signum(&self) -> i32 {
        match self.0.numer().sign() {
            num_bigint::Sign::Minus => -1,
            num_bigint::Sign::NoSign => 0,
            num_bigint::Sign::Plus => 1,
        }
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn recip(&self) -> FpResult<Self> {
        if self.is_zero() {
            return Err(FpError::DivideByZero);
        }
        Ok(Self(self.0.recip()))
    }

    pub fn checked_div(&self, rhs: &Self) -> FpResult<Self> {
        if rhs.is_zero() {
            return Err(FpError::DivideByZero);
        }
        Ok(Self(&self.0 / &rhs.0))
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    /// The integer value, if the denominator is 1.
    pub fn to_integer(&self) -> Option<BigInt> {
        self.is_integer().then(|| self.0.to_integer())
    }

    pub fn floor(&self) -> Self {
        Self(self.0.floor())
    }

    pub fn ceil(&self) -> Self {
        Self(self.0.ceil())
    }

    /// Decimal rendering rounded half away from zero to `places` digits, trailing
    /// zeros trimmed. Computed with integer arithmetic only.
    pub fn to_decimal_string(&self, places: u32) -> String {
        let scale = BigInt::from(10u32).pow(places);
        let scaled = (&self.0 * BigRational::from_integer(scale.clone()))
            .round()
            .to_integer();
        let negative = scaled.is_negative();
        let magnitude = scaled.abs();
        let whole = &magnitude / &scale;
        let frac = &magnitude % &scale;

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&whole.to_string());
        if places > 0 && !frac.is_zero() {
            let digits = format!("{:0>width$}", frac.to_string(), width = places as usize);
            out.push('.');
            out.push_str(digits.trim_end_matches('0'));
        }
        out
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            write!(f, "{}", self.0.numer())
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({self})")
    }
}

impl FromStr for Rational {
    type Err = FpError;

    fn from_str(s: &str) -> FpResult<Self> {
        parse_exact(s)
    }
}

impl From<BigInt> for Rational {
    fn from(value: BigInt) -> Self {
        Self::from_integer(value)
    }
}

macro_rules! from_primitive {
    ($($t:ty),*) => {
        $(impl From<$t> for Rational {
            fn from(value: $t) -> Self {
                Self::from_integer(value)
            }
        })*
    };
}

from_primitive!(i32, i64, u32, u64, usize);

fn parse_exact(input: &str) -> FpResult<Rational> {
    let fail = |reason| FpError::Parse {
        input: input.to_string(),
        reason,
    };

    let text = input.trim();
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        Some(_) => (false, text),
        None => return Err(fail("empty input")),
    };

    let value = match body.split_once('/') {
        Some((num, den)) => {
            let num = parse_digits(num.trim()).ok_or_else(|| fail("invalid numerator"))?;
            let den = parse_digits(den.trim()).ok_or_else(|| fail("invalid denominator"))?;
            Rational::new(num, den)?
        }
        None => parse_decimal(body).map_err(fail)?,
    };

    Ok(if negative { -value } else { value })
}

fn parse_digits(s: &str) -> Option<BigInt> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_decimal(body: &str) -> Result<Rational, &'static str> {
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(at) => (&body[..at], Some(&body[at + 1..])),
        None => (body, None),
    };

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err("expected digits");
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err("not an integer, decimal or fraction");
    }

    let digits = format!("{int_part}{frac_part}");
    let mut num: BigInt = digits.parse().map_err(|_| "expected digits")?;
    let mut den = BigInt::from(10u32).pow(frac_part.len() as u32);

    if let Some(exp) = exponent {
        let (exp_negative, exp_digits) = match exp.as_bytes().first() {
            Some(b'-') => (true, &exp[1..]),
            Some(b'+') => (false, &exp[1..]),
            _ => (false, exp),
        };
        if exp_digits.is_empty() || !all_digits(exp_digits) {
            return Err("invalid exponent");
        }
        let magnitude: u32 = exp_digits.parse().map_err(|_| "exponent out of range")?;
        if magnitude > MAX_EXPONENT {
            return Err("exponent out of range");
        }
        let power = BigInt::from(10u32).pow(magnitude);
        if exp_negative {
            den *= power;
        } else {
            num *= power;
        }
    }

    Ok(Rational(BigRational::new(num, den)))
}

macro_rules! forward_binop {
    ($Trait:ident, $method:ident) => {
        impl $Trait<Rational> for Rational {
            type Output = Rational;
            fn $method(self, rhs: Rational) -> Rational {
                Rational($Trait::$method(self.0, rhs.0))
            }
        }

        impl<'a> $Trait<&'a Rational> for Rational {
            type Output = Rational;
            fn $method(self, rhs: &'a Rational) -> Rational {
                Rational($Trait::$method(self.0, &rhs.0))
            }
        }

        impl<'a> $Trait<Rational> for &'a Rational {
            type Output = Rational;
            fn $method(self, rhs: Rational) -> Rational {
                Rational($Trait::$method(&self.0, rhs.0))
            }
        }

        impl<'a, 'b> $Trait<&'b Rational> for &'a Rational {
            type Output = Rational;
            fn $method(self, rhs: &'b Rational) -> Rational {
                Rational($Trait::$method(&self.0, &rhs.0))
            }
        }
    };
}

forward_binop!(Add, add);
forward_binop!(Sub, sub);
forward_binop!(Mul, mul);
// Panics on a zero divisor, like integer division; use `checked_div` when the
// divisor is not known to be nonzero.
forward_binop!(Div, div);

macro_rules! forward_assign {
    ($Trait:ident, $method:ident) => {
        impl $Trait<Rational> for Rational {
            fn $method(&mut self, rhs: Rational) {
                $Trait::$method(&mut self.0, rhs.0);
            }
        }

        impl<'a> $Trait<&'a Rational> for Rational {
            fn $method(&mut self, rhs: &'a Rational) {
                $Trait::$method(&mut self.0, &rhs.0);
            }
        }
    };
}

forward_assign!(AddAssign, add_assign);
forward_assign!(SubAssign, sub_assign);
forward_assign!(MulAssign, mul_assign);

impl Neg for Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        Rational(-self.0)
    }
}

impl Neg for &Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        Rational(-&self.0)
    }
}

impl Sum for Rational {
    fn sum<I: Iterator<Item = Rational>>(iter: I) -> Self {
        iter.fold(Rational::zero(), |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Rational> for Rational {
    fn sum<I: Iterator<Item = &'a Rational>>(iter: I) -> Self {
        iter.fold(Rational::zero(), |acc, x| acc + x)
    }
}

impl Zero for Rational {
    fn zero() -> Self {
        Rational::zero()
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl One for Rational {
    fn one() -> Self {
        Rational::one()
    }
}

impl PartialEq<i64> for Rational {
    fn eq(&self, other: &i64) -> bool {
        self.0.is_integer() && self.0.numer() == &BigInt::from(*other)
    }
}

impl PartialOrd<i64> for Rational {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        Some(self.0.cmp(&BigRational::from_integer(BigInt::from(*other))))
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Rational;
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Rational {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    struct RationalVisitor;

    impl Visitor<'_> for RationalVisitor {
        type Value = Rational;

        fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str("an integer or exact number text such as \"5/3\" or \"0.25\"")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Rational, E> {
            Ok(Rational::from(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Rational, E> {
            Ok(Rational::from(v))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Rational, E> {
            Err(E::custom(format!(
                "approximate value {v} rejected; quote it to keep it exact"
            )))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Rational, E> {
            v.parse().map_err(E::custom)
        }
    }

    impl<'de> Deserialize<'de> for Rational {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(RationalVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(s: &str) -> Rational {
        s.parse().unwrap()
    }

    #[test]
    fn thirds_sum_to_one() {
        let third = r("1/3");
        assert_eq!(&third + &third + &third, Rational::one());
    }

    #[test]
    fn normalizes_sign_and_terms() {
        let x = Rational::new(6, -4).unwrap();
        assert_eq!(x.numer(), &BigInt::from(-3));
        assert_eq!(x.denom(), &BigInt::from(2));
        assert_eq!(x.to_string(), "-3/2");
    }

    #[test]
    fn zero_denominator_is_rejected() {
        assert_eq!(Rational::new(1, 0), Err(FpError::DivideByZero));
        assert_eq!("3/0".parse::<Rational>(), Err(FpError::DivideByZero));
        assert_eq!(Rational::zero().recip(), Err(FpError::DivideByZero));
        assert_eq!(
            Rational::one().checked_div(&Rational::zero()),
            Err(FpError::DivideByZero)
        );
    }

    #[test]
    fn parses_decimals_exactly() {
        assert_eq!(r("0.1") + r("0.2"), r("3/10"));
        assert_eq!(r(".5"), r("1/2"));
        assert_eq!(r("-2.50"), r("-5/2"));
        assert_eq!(r("1.5e-3"), r("3/2000"));
        assert_eq!(r("2E3"), Rational::from(2000));
        assert_eq!(r("+7"), Rational::from(7));
        assert_eq!(r(" 5 / 3 "), Rational::new(5, 3).unwrap());
    }

    #[test]
    fn rejects_malformed_text() {
        for bad in ["", "-", "abc", "1.2.3", "1e", "inf", "nan", "1/-3", "1/x", "e5", "1e99999"] {
            assert!(
                matches!(bad.parse::<Rational>(), Err(FpError::Parse { .. })),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn rounding_helpers() {
        assert_eq!(r("9/2").ceil(), Rational::from(5));
        assert_eq!(r("9/2").floor(), Rational::from(4));
        assert_eq!(r("-9/2").ceil(), Rational::from(-4));
        assert_eq!(r("27/5").ceil(), Rational::from(6));
        assert_eq!(r("4").to_integer(), Some(BigInt::from(4)));
        assert_eq!(r("4/3").to_integer(), None);
    }

    #[test]
    fn sign_and_ordering() {
        assert_eq!(r("-1/7").signum(), -1);
        assert_eq!(Rational::zero().signum(), 0);
        assert_eq!(r("1/7").signum(), 1);
        assert!(r("1/3") < r("0.34"));
        assert!(r("5/6") < 1_i64);
        assert_eq!(r("-3/4").abs(), r("3/4"));
        assert_eq!(r("2/3").min(r("1/2")), r("1/2"));
    }

    #[test]
    fn decimal_rendering() {
        assert_eq!(r("5/6").to_decimal_string(6), "0.833333");
        assert_eq!(r("2/3").to_decimal_string(3), "0.667");
        assert_eq!(r("-1/8").to_decimal_string(2), "-0.13");
        assert_eq!(r("5/2").to_decimal_string(6), "2.5");
        assert_eq!(r("4").to_decimal_string(6), "4");
    }

    #[test]
    fn assign_ops_and_sum() {
        let mut x = r("1/2");
        x += r("1/3");
        x -= &r("1/6");
        x *= r("3");
        assert_eq!(x, Rational::from(2));

        let total: Rational = [r("1/4"), r("1/4"), r("1/2")].iter().sum();
        assert!(total.is_one());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_accepts_text_and_integers_only() {
        let x: Rational = serde_json::from_str("\"5/3\"").unwrap();
        assert_eq!(x, Rational::new(5, 3).unwrap());
        let y: Rational = serde_json::from_str("12").unwrap();
        assert_eq!(y, Rational::from(12));
        assert!(serde_json::from_str::<Rational>("0.5").is_err());
        assert_eq!(serde_json::to_string(&x).unwrap(), "\"5/3\"");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn parsed_fraction_arithmetic_is_exact(
            a in -1000_i64..1000,
            b in 1_i64..1000,
            c in -1000_i64..1000,
            d in 1_i64..1000,
        ) {
            let x: Rational = format!("{a}/{b}").parse().unwrap();
            let y: Rational = format!("{c}/{d}").parse().unwrap();

            prop_assert_eq!(&x + &y, Rational::new(a * d + c * b, b * d).unwrap());
            prop_assert_eq!(&x * &y, Rational::new(a * c, b * d).unwrap());
            prop_assert_eq!(&(&x - &y) + &y, x.clone());
            if !y.is_zero() {
                prop_assert_eq!(&(&x / &y) * &y, x);
            }
        }

        #[test]
        fn display_parses_back(a in -100_000_i64..100_000, b in 1_i64..5000) {
            let x = Rational::new(a, b).unwrap();
            prop_assert_eq!(x.to_string().parse::<Rational>().unwrap(), x);
        }
    }
}
