//! Totals calculation.
//!
//! A pure function of the cart lines, the bound restaurant and the platform
//! pricing constants. Each output is rounded to cents on its own, and the
//! total is the sum of the rounded parts so a displayed total always adds up.

use serde::{Deserialize, Serialize};

use plateful_core::{Money, Restaurant};

use crate::config::PricingConfig;
use crate::error::{CartError, Result};
use crate::store::CartLine;

/// Monetary totals derived from a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of line prices times quantities.
    pub subtotal: Money,
    /// Delivery fee, floored at the platform base fee.
    pub delivery_fee: Money,
    /// Tax on the subtotal.
    pub tax: Money,
    /// Subtotal plus delivery fee plus tax.
    pub total: Money,
}

impl Totals {
    /// Totals of an empty cart.
    pub const ZERO: Self = Self {
        subtotal: Money::ZERO,
        delivery_fee: Money::ZERO,
        tax: Money::ZERO,
        total: Money::ZERO,
    };

    /// Whether every component is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.subtotal.is_zero()
            && self.delivery_fee.is_zero()
            && self.tax.is_zero()
            && self.total.is_zero()
    }
}

/// Compute the totals for a set of lines.
///
/// The delivery fee is zero when no restaurant is bound; otherwise it is the
/// larger of the platform base fee and the restaurant's declared fee.
///
/// # Errors
///
/// Returns `CartError::AmountOverflow` if any intermediate amount is out of
/// decimal range.
pub fn compute_totals(
    lines: &[CartLine],
    restaurant: Option<&Restaurant>,
    pricing: &PricingConfig,
) -> Result<Totals> {
    let raw_subtotal = lines
        .iter()
        .try_fold(Money::ZERO, |sum, line| sum.checked_add(line.line_total()?))
        .ok_or(CartError::AmountOverflow)?;

    let subtotal = raw_subtotal.round_to_cents();
    let delivery_fee = restaurant
        .map_or(Money::ZERO, |r| r.delivery_fee.max(pricing.base_delivery_fee()))
        .round_to_cents();
    let tax = raw_subtotal
        .checked_mul(pricing.tax_rate())
        .ok_or(CartError::AmountOverflow)?
        .round_to_cents();
    let total = subtotal
        .checked_add(delivery_fee)
        .and_then(|sum| sum.checked_add(tax))
        .ok_or(CartError::AmountOverflow)?;

    Ok(Totals {
        subtotal,
        delivery_fee,
        tax,
        total,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use plateful_core::MenuItem;

    use super::*;

    fn restaurant(fee: Money) -> Restaurant {
        Restaurant::new("r1", "Thai Place", fee, Money::new(dec!(15)))
    }

    fn line(id: &str, price: Money, quantity: u32) -> CartLine {
        CartLine::new(MenuItem::new(id, id, price, "r1"), quantity)
    }

    #[test]
    fn test_single_line() {
        let lines = [line("p1", Money::new(dec!(12.99)), 1)];
        let r = restaurant(Money::new(dec!(3.99)));
        let totals = compute_totals(&lines, Some(&r), &PricingConfig::default()).unwrap();

        assert_eq!(totals.subtotal, Money::new(dec!(12.99)));
        assert_eq!(totals.delivery_fee, Money::new(dec!(3.99)));
        assert_eq!(totals.tax, Money::new(dec!(1.04)));
        assert_eq!(totals.total, Money::new(dec!(18.02)));
    }

    #[test]
    fn test_delivery_fee_floor() {
        let lines = [line("p1", Money::new(dec!(10)), 1)];
        let r = restaurant(Money::new(dec!(0.99)));
        let totals = compute_totals(&lines, Some(&r), &PricingConfig::default()).unwrap();

        assert_eq!(totals.delivery_fee, Money::new(dec!(2.99)));
    }

    #[test]
    fn test_no_restaurant_no_fee() {
        let totals = compute_totals(&[], None, &PricingConfig::default()).unwrap();
        assert_eq!(totals, Totals::ZERO);
        assert!(totals.is_zero());
    }

    #[test]
    fn test_total_is_sum_of_rounded_parts() {
        // 3 x 3.335 = 10.005 -> subtotal 10.01, tax 0.8004 -> 0.80
        let lines = [line("p1", Money::new(dec!(3.335)), 3)];
        let r = restaurant(Money::new(dec!(3.99)));
        let totals = compute_totals(&lines, Some(&r), &PricingConfig::default()).unwrap();

        assert_eq!(totals.subtotal, Money::new(dec!(10.01)));
        assert_eq!(totals.tax, Money::new(dec!(0.80)));
        assert_eq!(
            totals.total,
            totals.subtotal + totals.delivery_fee + totals.tax
        );
    }

    #[test]
    fn test_multiple_lines() {
        let lines = [
            line("p1", Money::new(dec!(12.99)), 2),
            line("p2", Money::new(dec!(4.50)), 3),
        ];
        let r = restaurant(Money::new(dec!(3.99)));
        let totals = compute_totals(&lines, Some(&r), &PricingConfig::default()).unwrap();

        // 25.98 + 13.50 = 39.48; tax 3.1584
        assert_eq!(totals.subtotal, Money::new(dec!(39.48)));
        assert_eq!(totals.tax, Money::new(dec!(3.16)));
        assert_eq!(totals.total, Money::new(dec!(46.63)));
    }

    #[test]
    fn test_unrepresentable_subtotal_is_an_error() {
        let half_max = Money::new(Decimal::MAX / dec!(2));
        let lines = [line("p1", half_max, 3)];
        let r = restaurant(Money::new(dec!(3.99)));

        assert_eq!(
            compute_totals(&lines, Some(&r), &PricingConfig::default()),
            Err(CartError::AmountOverflow)
        );
    }
}
