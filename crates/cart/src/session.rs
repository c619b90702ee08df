//! Cart session facade.
//!
//! Composes a [`CartStore`] and an [`ErrorLedger`] into the single object
//! calling code interacts with. Derived values (item count, minimum-order
//! gap, error flag) are computed from current state on every read and never
//! cached.

use serde::Serialize;
use tracing::{debug, info, instrument};

use plateful_core::{MenuItem, MenuItemId, Money, Restaurant};

use crate::config::PricingConfig;
use crate::error::Result;
use crate::ledger::{CartFinding, ErrorLedger, FindingKind};
use crate::store::{Cart, CartLine, CartListener, CartStore};
use crate::totals::Totals;

/// Reason checkout should not proceed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CheckoutBlocker {
    /// The cart has no lines.
    EmptyCart,
    /// The subtotal is below the restaurant's minimum order.
    MinimumOrderNotMet {
        /// Amount still needed to reach the minimum.
        remaining: Money,
    },
    /// Findings are waiting for a user decision.
    UnresolvedFindings {
        /// Number of outstanding findings.
        count: usize,
    },
}

/// Point-in-time view of a session for presentation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub cart: Cart,
    pub findings: Vec<CartFinding>,
    pub item_count: u64,
    pub is_empty: bool,
    pub is_minimum_order_met: bool,
    pub remaining_for_minimum: Money,
    pub has_errors: bool,
    pub checkout_blockers: Vec<CheckoutBlocker>,
}

/// One ordering session: a cart plus its error ledger.
#[derive(Debug)]
pub struct CartSession {
    store: CartStore,
    ledger: ErrorLedger,
}

impl CartSession {
    /// Create a session with an empty cart and ledger.
    #[must_use]
    pub fn new(pricing: PricingConfig) -> Self {
        Self {
            store: CartStore::new(pricing),
            ledger: ErrorLedger::new(),
        }
    }

    /// Register a listener for cart changes.
    pub fn subscribe(&mut self, listener: impl CartListener + 'static) {
        self.store.subscribe(listener);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.store.cart()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.store.lines()
    }

    /// Current totals.
    #[must_use]
    pub const fn totals(&self) -> &Totals {
        self.store.totals()
    }

    /// Restaurant snapshot the cart is bound to.
    #[must_use]
    pub const fn bound_restaurant(&self) -> Option<&Restaurant> {
        self.store.bound_restaurant()
    }

    /// The error ledger.
    #[must_use]
    pub const fn ledger(&self) -> &ErrorLedger {
        &self.ledger
    }

    /// Outstanding findings.
    #[must_use]
    pub fn findings(&self) -> &[CartFinding] {
        self.ledger.findings()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines().iter().map(|l| u64::from(l.quantity())).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// Whether the subtotal reaches the bound restaurant's minimum order.
    ///
    /// The minimum is compared in whole cents, like the subtotal. Always true
    /// for an unbound cart.
    #[must_use]
    pub fn is_minimum_order_met(&self) -> bool {
        self.remaining_for_minimum().is_zero()
    }

    /// Amount still needed to reach the minimum order, or zero.
    #[must_use]
    pub fn remaining_for_minimum(&self) -> Money {
        self.bound_restaurant().map_or(Money::ZERO, |r| {
            r.minimum_order
                .round_to_cents()
                .saturating_sub(self.totals().subtotal)
        })
    }

    /// Whether any findings are outstanding.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.ledger.is_empty()
    }

    /// Whether the item has a line in the cart.
    #[must_use]
    pub fn is_item_in_cart(&self, item_id: &MenuItemId) -> bool {
        self.store.line(item_id).is_some()
    }

    /// Quantity of the item in the cart, or zero.
    #[must_use]
    pub fn get_quantity(&self, item_id: &MenuItemId) -> u32 {
        self.store.line(item_id).map_or(0, CartLine::quantity)
    }

    /// Reasons checkout should not proceed, empty when ready.
    ///
    /// The session never blocks submission itself; callers consult this
    /// before handing the order off.
    #[must_use]
    pub fn checkout_blockers(&self) -> Vec<CheckoutBlocker> {
        let mut blockers = Vec::new();
        if self.is_empty() {
            blockers.push(CheckoutBlocker::EmptyCart);
        }
        if !self.is_minimum_order_met() {
            blockers.push(CheckoutBlocker::MinimumOrderNotMet {
                remaining: self.remaining_for_minimum(),
            });
        }
        if self.has_errors() {
            blockers.push(CheckoutBlocker::UnresolvedFindings {
                count: self.ledger.len(),
            });
        }
        blockers
    }

    /// Whether there are no checkout blockers.
    #[must_use]
    pub fn is_ready_for_checkout(&self) -> bool {
        self.checkout_blockers().is_empty()
    }

    /// Capture the current state and all derived values.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            cart: self.cart().clone(),
            findings: self.findings().to_vec(),
            item_count: self.item_count(),
            is_empty: self.is_empty(),
            is_minimum_order_met: self.is_minimum_order_met(),
            remaining_for_minimum: self.remaining_for_minimum(),
            has_errors: self.has_errors(),
            checkout_blockers: self.checkout_blockers(),
        }
    }

    // =========================================================================
    // Cart mutations
    // =========================================================================

    /// Add `quantity` of a menu item. See [`CartStore::add_line`].
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the item would mix restaurants in the cart or
    /// the new totals are out of range.
    pub fn add_line(
        &mut self,
        menu_item: &MenuItem,
        restaurant: &Restaurant,
        quantity: u32,
    ) -> Result<()> {
        self.store.add_line(menu_item, restaurant, quantity)
    }

    /// Remove the line for an item; no-op if absent.
    pub fn remove_line(&mut self, item_id: &MenuItemId) -> bool {
        self.store.remove_line(item_id)
    }

    /// Set a line's quantity; zero removes it, absent items are ignored.
    pub fn set_quantity(&mut self, item_id: &MenuItemId, quantity: u32) -> bool {
        self.store.set_quantity(item_id, quantity)
    }

    /// Increase a line's quantity by one; no-op if absent.
    pub fn increment_line(&mut self, item_id: &MenuItemId) -> bool {
        match self.store.line(item_id).map(CartLine::quantity) {
            Some(quantity) => self.store.set_quantity(item_id, quantity.saturating_add(1)),
            None => false,
        }
    }

    /// Decrease a line's quantity by one, removing it at zero; no-op if absent.
    pub fn decrement_line(&mut self, item_id: &MenuItemId) -> bool {
        match self.store.line(item_id).map(CartLine::quantity) {
            Some(quantity) if quantity <= 1 => self.store.remove_line(item_id),
            Some(quantity) => self.store.set_quantity(item_id, quantity - 1),
            None => false,
        }
    }

    /// Empty the cart and the error ledger.
    #[instrument(skip_all)]
    pub fn clear(&mut self) {
        self.store.clear();
        self.ledger.clear_errors();
        debug!("Session cleared");
    }

    /// Replace the cart's contents with a single item, possibly from another
    /// restaurant.
    ///
    /// This is the "replace cart?" answer to a cross-restaurant rejection.
    /// The ledger is emptied along with the old lines. A quantity of zero is
    /// a no-op that keeps the existing cart and findings.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if `menu_item` is not sold by `restaurant` or the
    /// new totals are out of range; the existing cart and ledger are then
    /// left untouched.
    #[instrument(skip_all, fields(item = %menu_item.id, restaurant = %restaurant.id))]
    pub fn start_new_cart(
        &mut self,
        menu_item: &MenuItem,
        restaurant: &Restaurant,
        quantity: u32,
    ) -> Result<()> {
        if self.store.replace_with(menu_item, restaurant, quantity)? {
            self.ledger.clear_errors();
            info!("Started new cart");
        }
        Ok(())
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Record findings for unavailable items and a closed restaurant.
    /// See [`ErrorLedger::reconcile`].
    pub fn reconcile(
        &mut self,
        fresh_items: &[MenuItem],
        fresh_restaurant: &Restaurant,
    ) -> &[CartFinding] {
        self.ledger
            .reconcile(self.store.cart(), fresh_items, fresh_restaurant)
    }

    /// Record a live catalog price change. See [`ErrorLedger::report_price_change`].
    pub fn report_price_change(&mut self, item_id: &MenuItemId, new_price: Money) -> bool {
        self.ledger
            .report_price_change(self.store.cart(), item_id, new_price)
    }

    /// Remove the finding at `index`.
    pub fn dismiss(&mut self, index: usize) -> Option<CartFinding> {
        self.ledger.dismiss(index)
    }

    /// Remove every finding without touching cart lines.
    pub fn clear_errors(&mut self) {
        self.ledger.clear_errors();
    }

    /// Accept the new price from an item's `PriceChanged` finding.
    ///
    /// Reprices the line and removes the finding. Returns `false` if there
    /// is no such finding.
    #[instrument(skip_all, fields(item = %item_id))]
    pub fn accept_price_change(&mut self, item_id: &MenuItemId) -> bool {
        let Some(CartFinding::PriceChanged { new_price, .. }) =
            self.ledger.get(FindingKind::PriceChanged, Some(item_id))
        else {
            return false;
        };
        let new_price = *new_price;

        self.store.reprice_line(item_id, new_price);
        self.ledger.resolve(FindingKind::PriceChanged, Some(item_id));
        debug!(price = %new_price, "Accepted price change");
        true
    }

    /// Remove every line flagged as unavailable and dismiss those findings.
    ///
    /// Returns the number of lines removed.
    #[instrument(skip_all)]
    pub fn remove_unavailable_items(&mut self) -> usize {
        let unavailable: Vec<MenuItemId> = self
            .ledger
            .findings()
            .iter()
            .filter(|f| f.kind() == FindingKind::UnavailableItem)
            .filter_map(|f| f.item_id().cloned())
            .collect();

        let mut removed = 0;
        for item_id in &unavailable {
            if self.store.remove_line(item_id) {
                removed += 1;
            }
            self.ledger
                .resolve(FindingKind::UnavailableItem, Some(item_id));
        }

        debug!(removed, "Removed unavailable items");
        removed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::error::CartError;

    use super::*;

    fn thai() -> Restaurant {
        Restaurant::new("r1", "Thai Place", Money::new(dec!(3.99)), Money::new(dec!(15)))
    }

    fn pizza() -> Restaurant {
        Restaurant::new("r2", "Pizza Shop", Money::new(dec!(1.99)), Money::new(dec!(10)))
    }

    fn pad_thai() -> MenuItem {
        MenuItem::new("p1", "Pad Thai", Money::new(dec!(12.99)), "r1")
    }

    fn spring_rolls() -> MenuItem {
        MenuItem::new("p2", "Spring Rolls", Money::new(dec!(5.50)), "r1")
    }

    fn margherita() -> MenuItem {
        MenuItem::new("z1", "Margherita", Money::new(dec!(11)), "r2")
    }

    fn session() -> CartSession {
        CartSession::new(PricingConfig::default())
    }

    #[test]
    fn test_empty_session_derived_values() {
        let session = session();
        assert!(session.is_empty());
        assert_eq!(session.item_count(), 0);
        assert!(session.is_minimum_order_met());
        assert_eq!(session.remaining_for_minimum(), Money::ZERO);
        assert!(!session.has_errors());
        assert_eq!(session.checkout_blockers(), [CheckoutBlocker::EmptyCart]);
    }

    #[test]
    fn test_minimum_order_gap() {
        let mut session = session();
        session.add_line(&pad_thai(), &thai(), 1).unwrap();

        assert!(!session.is_minimum_order_met());
        assert_eq!(session.remaining_for_minimum(), Money::new(dec!(2.01)));

        session.increment_line(&pad_thai().id);
        assert!(session.is_minimum_order_met());
        assert_eq!(session.remaining_for_minimum(), Money::ZERO);
        assert!(session.is_ready_for_checkout());
    }

    #[test]
    fn test_sub_cent_minimum_compared_in_cents() {
        let mut session = session();
        let r = Restaurant::new("r1", "Thai Place", Money::new(dec!(3.99)), Money::new(dec!(15.004)));
        session
            .add_line(&MenuItem::new("p9", "Set Menu", Money::new(dec!(15)), "r1"), &r, 1)
            .unwrap();

        assert!(session.is_minimum_order_met());
        assert_eq!(session.remaining_for_minimum(), Money::ZERO);

        let r = Restaurant::new("r1", "Thai Place", Money::new(dec!(3.99)), Money::new(dec!(15.005)));
        session.clear();
        session
            .add_line(&MenuItem::new("p9", "Set Menu", Money::new(dec!(15)), "r1"), &r, 1)
            .unwrap();

        assert!(!session.is_minimum_order_met());
        assert_eq!(session.remaining_for_minimum(), Money::new(dec!(0.01)));
    }

    #[test]
    fn test_item_count_and_lookups() {
        let mut session = session();
        session.add_line(&pad_thai(), &thai(), 2).unwrap();
        session.add_line(&spring_rolls(), &thai(), 3).unwrap();

        assert_eq!(session.item_count(), 5);
        assert!(session.is_item_in_cart(&pad_thai().id));
        assert_eq!(session.get_quantity(&spring_rolls().id), 3);
        assert_eq!(session.get_quantity(&MenuItemId::new("missing")), 0);
    }

    #[test]
    fn test_decrement_to_zero_removes() {
        let mut session = session();
        session.add_line(&pad_thai(), &thai(), 2).unwrap();

        assert!(session.decrement_line(&pad_thai().id));
        assert_eq!(session.get_quantity(&pad_thai().id), 1);
        assert!(session.decrement_line(&pad_thai().id));
        assert!(session.is_empty());
        assert!(session.bound_restaurant().is_none());
        assert!(!session.decrement_line(&pad_thai().id));
    }

    #[test]
    fn test_increment_absent_is_noop() {
        let mut session = session();
        assert!(!session.increment_line(&pad_thai().id));
        assert!(session.is_empty());
    }

    #[test]
    fn test_clear_empties_ledger() {
        let mut session = session();
        session.add_line(&pad_thai(), &thai(), 1).unwrap();
        session.reconcile(&[pad_thai().with_availability(false)], &thai());
        assert!(session.has_errors());

        session.clear();

        assert!(session.is_empty());
        assert!(!session.has_errors());
        assert!(session.totals().is_zero());
    }

    #[test]
    fn test_start_new_cart_replaces_restaurant() {
        let mut session = session();
        session.add_line(&pad_thai(), &thai(), 1).unwrap();
        session.report_price_change(&pad_thai().id, Money::new(dec!(14)));

        assert!(matches!(
            session.add_line(&margherita(), &pizza(), 1),
            Err(CartError::CrossRestaurant { .. })
        ));
        session.start_new_cart(&margherita(), &pizza(), 1).unwrap();

        assert_eq!(session.lines().len(), 1);
        assert_eq!(session.bound_restaurant().unwrap().id, pizza().id);
        assert!(!session.has_errors());
    }

    #[test]
    fn test_start_new_cart_mismatch_keeps_state() {
        let mut session = session();
        session.add_line(&pad_thai(), &thai(), 1).unwrap();
        let before = session.snapshot();

        let err = session.start_new_cart(&margherita(), &thai(), 1).unwrap_err();

        assert!(matches!(err, CartError::ItemRestaurantMismatch { .. }));
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_start_new_cart_zero_quantity_keeps_state() {
        let mut session = session();
        session.add_line(&pad_thai(), &thai(), 2).unwrap();
        session.report_price_change(&pad_thai().id, Money::new(dec!(14)));
        let before = session.snapshot();

        session.start_new_cart(&margherita(), &pizza(), 0).unwrap();

        assert_eq!(session.snapshot(), before);
        assert_eq!(session.get_quantity(&pad_thai().id), 2);
        assert!(session.has_errors());
    }

    #[test]
    fn test_start_new_cart_is_one_revision() {
        let mut session = session();
        session.add_line(&pad_thai(), &thai(), 1).unwrap();

        session.start_new_cart(&margherita(), &pizza(), 2).unwrap();

        assert_eq!(session.cart().revision(), 2);
        assert_eq!(session.get_quantity(&margherita().id), 2);
    }

    #[test]
    fn test_accept_price_change() {
        let mut session = session();
        session.add_line(&pad_thai(), &thai(), 2).unwrap();
        session.report_price_change(&pad_thai().id, Money::new(dec!(13.49)));

        assert!(session.accept_price_change(&pad_thai().id));

        assert!(!session.has_errors());
        assert_eq!(session.totals().subtotal, Money::new(dec!(26.98)));
        assert!(!session.accept_price_change(&pad_thai().id));
    }

    #[test]
    fn test_remove_unavailable_items() {
        let mut session = session();
        session.add_line(&pad_thai(), &thai(), 1).unwrap();
        session.add_line(&spring_rolls(), &thai(), 1).unwrap();
        session.reconcile(
            &[pad_thai().with_availability(false), spring_rolls()],
            &thai().with_open(false),
        );

        assert_eq!(session.remove_unavailable_items(), 1);

        assert!(!session.is_item_in_cart(&pad_thai().id));
        assert_eq!(session.findings(), [CartFinding::RestaurantClosed]);
    }

    #[test]
    fn test_checkout_blockers_with_findings() {
        let mut session = session();
        session.add_line(&pad_thai(), &thai(), 1).unwrap();
        session.reconcile(&[], &thai().with_open(false));

        assert_eq!(
            session.checkout_blockers(),
            [
                CheckoutBlocker::MinimumOrderNotMet {
                    remaining: Money::new(dec!(2.01))
                },
                CheckoutBlocker::UnresolvedFindings { count: 1 },
            ]
        );
    }

    #[test]
    fn test_snapshot_serializes_derived_values() {
        let mut session = session();
        session.add_line(&pad_thai(), &thai(), 1).unwrap();

        let json = serde_json::to_value(session.snapshot()).unwrap();

        assert_eq!(json["itemCount"], 1);
        assert_eq!(json["remainingForMinimum"], "2.01");
        assert_eq!(json["cart"]["total"], "18.02");
        assert_eq!(json["checkoutBlockers"][0]["reason"], "minimum_order_not_met");
    }
}
