//! Monetary value type used by the calculation pipeline.
//!
//! Every accumulation step in the legacy pricing flow re-rounds to two
//! decimals before continuing, so `Money` exposes rounding-aware arithmetic
//! instead of leaving callers to sprinkle `round_dp` calls around. Midpoints
//! round away from zero to match how the historical totals were produced.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};

const SCALE: u32 = 2;
const STRATEGY: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// A two-decimal currency amount.
///
/// Construction always normalizes to two decimal places; arithmetic that is
/// part of an accumulation chain (`accumulate`, `sum`) re-rounds after every
/// step so that long chains reproduce the stepwise-rounded legacy totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Rounds `value` to two decimals, midpoint away from zero.
    pub fn round2(value: Decimal) -> Self {
        Money(value.round_dp_with_strategy(SCALE, STRATEGY))
    }

    /// Quantity times rate, rounded once at the end.
    pub fn from_qty_rate(quantity: Decimal, rate: Decimal) -> Self {
        Self::round2(quantity * rate)
    }

    /// `percent` percent of this amount.
    pub fn percent(self, percent: Decimal) -> Self {
        Self::round2(self.0 * percent / Decimal::ONE_HUNDRED)
    }

    /// Adds `amount` and re-rounds, matching the per-step rounding the
    /// discount and handling-charge loops require.
    pub fn accumulate(self, amount: Decimal) -> Self {
        Self::round2(self.0 + amount)
    }

    /// Rounds to the nearest whole currency unit.
    pub fn round_whole(self) -> Self {
        Money(self.0.round_dp_with_strategy(0, STRATEGY))
    }

    /// The adjustment that turns this amount into `rounded`.
    pub fn round_off_to(self, rounded: Money) -> Self {
        Self::round2(rounded.0 - self.0)
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self::round2(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::round2(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money::round2(self.0 - rhs.0)
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
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
