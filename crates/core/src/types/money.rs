//! Type-safe currency amounts using decimal arithmetic.
//!
//! All amounts are in the currency's standard unit (dollars, not cents).
//! Binary floating point never touches a `Money` value; serialization goes
//! through decimal strings.

use core::fmt;
use core::ops::{Add, Sub};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A currency amount.
///
/// ## Examples
///
/// ```
/// use plateful_core::Money;
/// use rust_decimal::Decimal;
///
/// let price = Money::from_cents(1299);
/// assert_eq!(price.to_string(), "$12.99");
/// assert_eq!(price.checked_mul(Decimal::from(2)), Some(Money::from_cents(2598)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Number of decimal places in the minor currency unit.
    pub const MINOR_UNIT_DIGITS: u32 = 2;

    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create an amount from a count of minor units (cents).
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, Self::MINOR_UNIT_DIGITS))
    }

    /// Round to the minor currency unit, with midpoints rounded away from zero.
    #[must_use]
    pub fn round_to_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(Self::MINOR_UNIT_DIGITS, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtract, clamping at zero.
    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        if rhs >= self { Self::ZERO } else { self - rhs }
    }

    /// Add, returning `None` if the result cannot be represented.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Multiply by a quantity or rate, returning `None` if the result cannot
    /// be represented.
    #[must_use]
    pub fn checked_mul(self, factor: Decimal) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.round_to_cents().0;
        if rounded.is_sign_negative() && !rounded.is_zero() {
            write!(f, "-${:.2}", rounded.abs())
        } else {
            write!(f, "${:.2}", rounded.abs())
        }
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_round_to_cents_half_up() {
        assert_eq!(Money::new(dec!(1.0392)).round_to_cents(), Money::new(dec!(1.04)));
        assert_eq!(Money::new(dec!(0.125)).round_to_cents(), Money::new(dec!(0.13)));
        assert_eq!(Money::new(dec!(0.124)).round_to_cents(), Money::new(dec!(0.12)));
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Money::new(dec!(3)).to_string(), "$3.00");
        assert_eq!(Money::new(dec!(18.0192)).to_string(), "$18.02");
        assert_eq!(Money::new(dec!(-2.01)).to_string(), "-$2.01");
    }

    #[test]
    fn test_arithmetic() {
        let price = Money::new(dec!(12.99));
        assert_eq!(price.checked_mul(dec!(3)), Some(Money::new(dec!(38.97))));
        assert_eq!(price + Money::new(dec!(0.01)), Money::new(dec!(13.00)));
        assert_eq!(price.checked_mul(dec!(0.08)), Some(Money::new(dec!(1.0392))));
        assert_eq!(
            price.checked_add(Money::new(dec!(0.01))),
            Some(Money::new(dec!(13.00)))
        );
    }

    #[test]
    fn test_checked_arithmetic_overflow() {
        let huge = Money::new(Decimal::MAX);
        assert_eq!(huge.checked_add(Money::new(dec!(1))), None);
        assert_eq!(huge.checked_mul(dec!(2)), None);
    }

    #[test]
    fn test_saturating_sub() {
        let a = Money::new(dec!(15));
        let b = Money::new(dec!(12.99));
        assert_eq!(a.saturating_sub(b), Money::new(dec!(2.01)));
        assert_eq!(b.saturating_sub(a), Money::ZERO);
    }

    #[test]
    fn test_serde_as_string() {
        let price = Money::new(dec!(12.99));
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"12.99\"");

        let parsed: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, price);
    }
}
