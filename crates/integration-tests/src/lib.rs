//! Integration tests for Plateful.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p plateful-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - End-to-end cart walkthroughs
//! - `reconciliation` - Error ledger behavior through the session facade
//! - `cart_properties` - Property tests for the cart invariants
//!
//! This library holds the shared fixtures: a two-restaurant catalog with
//! prices chosen so that tax rounding is exercised.

#![cfg_attr(not(test), forbid(unsafe_code))]

use rust_decimal_macros::dec;

use plateful_cart::{CartSession, PricingConfig};
use plateful_core::{MenuItem, Money, Restaurant};

/// Thai restaurant: $3.99 delivery, $15 minimum.
#[must_use]
pub fn thai_place() -> Restaurant {
    Restaurant::new("r1", "Thai Place", Money::new(dec!(3.99)), Money::new(dec!(15)))
}

/// Pizza restaurant: $1.99 delivery (below the platform floor), $10 minimum.
#[must_use]
pub fn pizza_shop() -> Restaurant {
    Restaurant::new("r2", "Pizza Shop", Money::new(dec!(1.99)), Money::new(dec!(10)))
}

/// Pad Thai at $12.99 from [`thai_place`].
#[must_use]
pub fn pad_thai() -> MenuItem {
    MenuItem::new("p1", "Pad Thai", Money::new(dec!(12.99)), "r1")
}

/// Spring rolls at $5.50 from [`thai_place`].
#[must_use]
pub fn spring_rolls() -> MenuItem {
    MenuItem::new("p2", "Spring Rolls", Money::new(dec!(5.50)), "r1")
}

/// Green curry at $14.25 from [`thai_place`].
#[must_use]
pub fn green_curry() -> MenuItem {
    MenuItem::new("p3", "Green Curry", Money::new(dec!(14.25)), "r1")
}

/// Margherita at $11.00 from [`pizza_shop`].
#[must_use]
pub fn margherita() -> MenuItem {
    MenuItem::new("z1", "Margherita", Money::new(dec!(11.00)), "r2")
}

/// Every item sold by [`thai_place`].
#[must_use]
pub fn thai_menu() -> Vec<MenuItem> {
    vec![pad_thai(), spring_rolls(), green_curry()]
}

/// A session with default pricing (8% tax, $2.99 base delivery fee).
#[must_use]
pub fn new_session() -> CartSession {
    CartSession::new(PricingConfig::default())
}
