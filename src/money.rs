use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Decimal places of the smallest currency unit.
pub const CENT_DP: u32 = 2;

/// Rounding mode for divisions that cannot be represented exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Truncate toward zero.
    Down,
    /// Nearest, midpoint away from zero.
    HalfUp,
}

impl Rounding {
    fn strategy(self) -> RoundingStrategy {
        match self {
            Self::Down => RoundingStrategy::ToZero,
            Self::HalfUp => RoundingStrategy::MidpointAwayFromZero,
        }
    }
}

/// An exact decimal currency amount.
///
/// Every monetary sum in the crate goes through this type; binary floats never
/// touch money. The scale is not fixed, so averaged prices keep their full
/// precision until explicitly rounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// `from_cents(1099)` is 10.99.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, CENT_DP))
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Negative values count as zero wherever amounts are aggregated.
    pub fn non_negative(self) -> Self {
        if self.is_negative() {
            Self::ZERO
        } else {
            self
        }
    }

    pub fn round_dp(self, dp: u32, rounding: Rounding) -> Self {
        Self(self.0.round_dp_with_strategy(dp, rounding.strategy()))
    }

    /// Multiply by a plain decimal factor (a quantity, a count, a rate).
    /// Overflow yields zero rather than panicking.
    pub fn times(self, factor: Decimal) -> Self {
        Self(self.0.checked_mul(factor).unwrap_or(Decimal::ZERO))
    }

    /// Exact division. A zero divisor yields zero.
    pub fn div(self, divisor: Decimal) -> Self {
        Self(self.0.checked_div(divisor).unwrap_or(Decimal::ZERO))
    }

    /// Division rounded to `dp` places. A zero divisor yields zero.
    pub fn div_round(self, divisor: Decimal, dp: u32, rounding: Rounding) -> Self {
        self.div(divisor).round_dp(dp, rounding)
    }

    /// Per-installment and final-installment amounts for splitting `self`
    /// into `parts` cent-precision pieces.
    ///
    /// The regular amount is the half-up rounded quotient; the final amount
    /// absorbs the remainder so that `per * (parts - 1) + last == self`.
    /// When rounding up would push the final amount past zero, the regular
    /// amount is truncated instead.
    pub fn installment_parts(self, parts: u32) -> (Money, Money) {
        if parts <= 1 {
            return (self, self);
        }
        let count = Decimal::from(parts);
        let rest = Decimal::from(parts - 1);

        let mut per = self.div_round(count, CENT_DP, Rounding::HalfUp);
        if per.times(rest).abs() > self.abs() {
            per = self.div_round(count, CENT_DP, Rounding::Down);
        }
        let last = self - per.times(rest);
        (per, last)
    }

    /// Split into `parts` amounts that sum exactly to `self`, remainder on the
    /// final element. Zero parts yields an empty vector.
    pub fn split(self, parts: u32) -> Vec<Money> {
        if parts == 0 {
            return Vec::new();
        }
        let (per, last) = self.installment_parts(parts);
        let mut out = vec![per; (parts - 1) as usize];
        out.push(last);
        out
    }

    /// Lenient parse for user and legacy input: strips currency symbols,
    /// grouping separators and accounting parentheses. Anything that is
    /// still not a finite decimal becomes zero.
    ///
    /// When the last separator is a `,` followed by one or two digits
    /// ("89,90", "R$ 1.234,56") the comma is the decimal point and `.`
    /// groups thousands; otherwise `,` groups thousands ("$1,234.56").
    pub fn parse_lenient(s: &str) -> Money {
        let cleaned = s
            .replace("R$", "")
            .replace(['$', ' ', '"', '\u{a0}'], "")
            .replace('(', "-")
            .replace(')', "");

        let decimal_comma = cleaned.rfind([',', '.']).is_some_and(|pos| {
            let tail = &cleaned[pos + 1..];
            cleaned[pos..].starts_with(',')
                && (1..=2).contains(&tail.len())
                && tail.bytes().all(|b| b.is_ascii_digit())
        });
        let normalized = if decimal_comma {
            cleaned.replace('.', "").replace(',', ".")
        } else {
            cleaned.replace(',', "")
        };

        Decimal::from_str(normalized.trim())
            .map(Money)
            .unwrap_or_default()
    }
}

/// `floor(value / divisor)` at `dp` decimal places. A non-positive divisor
/// yields zero.
pub fn div_floor(value: Decimal, divisor: Decimal, dp: u32) -> Decimal {
    if divisor <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    value
        .checked_div(divisor)
        .map(|q| q.round_dp_with_strategy(dp, RoundingStrategy::ToNegativeInfinity))
        .unwrap_or(Decimal::ZERO)
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(CENT_DP, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{rounded:.2}")
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod tests;
