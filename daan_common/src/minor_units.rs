use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const CURRENCY_CODE: &str = "INR";
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

//--------------------------------------     MinorUnits      ---------------------------------------------------------
/// An exact amount of money, expressed in the smallest denomination of the currency (paise, cents).
///
/// All arithmetic in the platform happens on this type. Major-unit (rupee, dollar) values only exist at the edges,
/// when parsing client input or rendering amounts for display.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct MinorUnits(i64);

op!(binary MinorUnits, Add, add);
op!(binary MinorUnits, Sub, sub);
op!(inplace MinorUnits, SubAssign, sub_assign);
op!(unary MinorUnits, Neg, neg);

impl Mul<i64> for MinorUnits {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for MinorUnits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid currency amount '{input}': {reason}")]
pub struct AmountParseError {
    pub input: String,
    pub reason: String,
}

impl AmountParseError {
    fn new(input: &str, reason: &str) -> Self {
        Self { input: input.to_string(), reason: reason.to_string() }
    }
}

impl From<i64> for MinorUnits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for MinorUnits {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for MinorUnits {}

impl Display for MinorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {CURRENCY_CODE}", self.to_major_string())
    }
}

impl MinorUnits {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_major(major: i64) -> Self {
        Self(major * MINOR_UNITS_PER_MAJOR)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Parses a decimal string in major units, e.g. "25", "25.5" or "25.00", into minor units.
    ///
    /// Fractions beyond two digits are rounded to the nearest minor unit, with ties rounding away from zero.
    /// No floating point arithmetic is involved.
    pub fn parse_major(input: &str) -> Result<Self, AmountParseError> {
        let s = input.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (digits, None),
        };
        if whole.is_empty() && fraction.map(str::is_empty).unwrap_or(true) {
            return Err(AmountParseError::new(input, "no digits"));
        }
        if fraction == Some("") {
            return Err(AmountParseError::new(input, "missing fraction digits after the decimal point"));
        }
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !fraction.map(all_digits).unwrap_or(true) {
            return Err(AmountParseError::new(input, "only digits and a single decimal point are allowed"));
        }
        let overflow = || AmountParseError::new(input, "amount is too large");
        let whole = if whole.is_empty() { 0 } else { whole.parse::<i64>().map_err(|_| overflow())? };
        let fraction = fraction.unwrap_or("").as_bytes();
        let digit = |i: usize| fraction.get(i).map(|b| i64::from(b - b'0')).unwrap_or(0);
        let cents = digit(0) * 10 + digit(1);
        let round_up = i64::from(digit(2) >= 5);
        let value = whole
            .checked_mul(MINOR_UNITS_PER_MAJOR)
            .and_then(|v| v.checked_add(cents + round_up))
            .ok_or_else(overflow)?;
        Ok(Self(if negative { -value } else { value }))
    }

    /// Renders the amount in major units with exactly two fraction digits, e.g. "500.00".
    pub fn to_major_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_major = MINOR_UNITS_PER_MAJOR.unsigned_abs();
        format!("{sign}{}.{:02}", abs / per_major, abs % per_major)
    }
}
