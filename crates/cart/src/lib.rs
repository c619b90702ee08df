//! Plateful Cart - Single-restaurant cart engine.
//!
//! The engine accumulates line items, keeps every item in a cart bound to a
//! single restaurant, derives monetary totals, and reconciles the cart
//! against fresh catalog truth.
//!
//! # Architecture
//!
//! Components, leaf-first:
//!
//! - [`totals`] - Pure totals calculation (subtotal, delivery fee, tax, total)
//! - [`store`] - Cart lines, bound restaurant and derived totals
//! - [`ledger`] - Reconciliation findings awaiting a user decision
//! - [`session`] - The facade calling code talks to
//!
//! The engine is synchronous and single-writer. A [`CartSession`] is
//! constructed explicitly per ordering session and passed by reference to
//! whatever owns the UI; there is no global state.
//!
//! # Example
//!
//! ```
//! use plateful_cart::{CartSession, PricingConfig};
//! use plateful_core::{MenuItem, Money, Restaurant};
//!
//! let restaurant = Restaurant::new("r1", "Thai Place", Money::from_cents(399), Money::from_cents(1500));
//! let item = MenuItem::new("p1", "Pad Thai", Money::from_cents(1299), "r1");
//!
//! let mut session = CartSession::new(PricingConfig::default());
//! session.add_line(&item, &restaurant, 1)?;
//!
//! assert_eq!(session.totals().total, Money::from_cents(1802));
//! assert_eq!(session.remaining_for_minimum(), Money::from_cents(201));
//! # Ok::<(), plateful_cart::CartError>(())
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod ledger;
pub mod session;
pub mod store;
pub mod totals;

pub use config::{ConfigError, PricingConfig};
pub use error::{CartError, Result};
pub use ledger::{CartFinding, ErrorLedger, FindingKind};
pub use session::{CartSession, CartSnapshot, CheckoutBlocker};
pub use store::{Cart, CartLine, CartListener, CartStore};
pub use totals::{Totals, compute_totals};
