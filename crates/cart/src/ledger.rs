//! Error ledger for stale cart state.
//!
//! Findings are data, not errors: each one records a discrepancy between the
//! cart and fresh catalog truth that awaits a user decision. Findings are
//! keyed by `(kind, item_id)`, so reconciling twice with the same data never
//! duplicates an entry. A finding only goes away through [`ErrorLedger::dismiss`],
//! [`ErrorLedger::resolve`] or [`ErrorLedger::clear_errors`]; it is never
//! withdrawn because a later reconcile no longer observes the condition.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use plateful_core::{MenuItem, MenuItemId, Money, Restaurant};

use crate::store::Cart;

/// Discriminant of a [`CartFinding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// See [`CartFinding::UnavailableItem`].
    UnavailableItem,
    /// See [`CartFinding::PriceChanged`].
    PriceChanged,
    /// See [`CartFinding::RestaurantClosed`].
    RestaurantClosed,
}

/// A detected discrepancy between the cart and fresh catalog truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartFinding {
    /// An item in the cart can no longer be ordered.
    UnavailableItem {
        #[serde(rename = "itemId")]
        item_id: MenuItemId,
    },
    /// An item's catalog price differs from the price in the cart.
    PriceChanged {
        #[serde(rename = "itemId")]
        item_id: MenuItemId,
        #[serde(rename = "originalPrice")]
        original_price: Money,
        #[serde(rename = "newPrice")]
        new_price: Money,
    },
    /// The bound restaurant stopped accepting orders.
    RestaurantClosed,
}

impl CartFinding {
    /// Kind of this finding.
    #[must_use]
    pub const fn kind(&self) -> FindingKind {
        match self {
            Self::UnavailableItem { .. } => FindingKind::UnavailableItem,
            Self::PriceChanged { .. } => FindingKind::PriceChanged,
            Self::RestaurantClosed => FindingKind::RestaurantClosed,
        }
    }

    /// Item this finding refers to, if any.
    #[must_use]
    pub const fn item_id(&self) -> Option<&MenuItemId> {
        match self {
            Self::UnavailableItem { item_id } | Self::PriceChanged { item_id, .. } => Some(item_id),
            Self::RestaurantClosed => None,
        }
    }

    fn has_key(&self, kind: FindingKind, item_id: Option<&MenuItemId>) -> bool {
        self.kind() == kind && self.item_id() == item_id
    }
}

/// Ordered list of outstanding findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorLedger {
    findings: Vec<CartFinding>,
}

impl ErrorLedger {
    /// Create an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            findings: Vec::new(),
        }
    }

    /// Outstanding findings in the order they were first recorded.
    #[must_use]
    pub fn findings(&self) -> &[CartFinding] {
        &self.findings
    }

    /// Findings that refer to the given item.
    #[must_use]
    pub fn findings_for(&self, item_id: &MenuItemId) -> Vec<&CartFinding> {
        self.findings
            .iter()
            .filter(|f| f.item_id() == Some(item_id))
            .collect()
    }

    /// Finding with the given key, if recorded.
    #[must_use]
    pub fn get(&self, kind: FindingKind, item_id: Option<&MenuItemId>) -> Option<&CartFinding> {
        self.findings.iter().find(|f| f.has_key(kind, item_id))
    }

    /// Number of outstanding findings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Whether there are no outstanding findings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Compare the cart against fresh availability and open-status truth.
    ///
    /// Records an `UnavailableItem` finding for each cart line whose fresh
    /// item is unavailable, and a single `RestaurantClosed` finding if the
    /// restaurant is closed. Lines missing from `fresh_items` are skipped.
    /// The restaurant status is ignored unless the cart is bound to that
    /// restaurant.
    #[instrument(skip_all, fields(restaurant = %fresh_restaurant.id, lines = cart.lines().len()))]
    pub fn reconcile(
        &mut self,
        cart: &Cart,
        fresh_items: &[MenuItem],
        fresh_restaurant: &Restaurant,
    ) -> &[CartFinding] {
        let fresh: HashMap<&MenuItemId, &MenuItem> =
            fresh_items.iter().map(|item| (&item.id, item)).collect();

        for line in cart.lines() {
            match fresh.get(line.item_id()) {
                Some(item) if !item.is_available => {
                    self.upsert(CartFinding::UnavailableItem {
                        item_id: line.item_id().clone(),
                    });
                }
                Some(_) => {}
                None => debug!(item = %line.item_id(), "No fresh data for cart line"),
            }
        }

        match cart.bound_restaurant_id() {
            None => debug!("Ignoring restaurant status for an unbound cart"),
            Some(bound) if *bound != fresh_restaurant.id => {
                warn!(bound = %bound, "Ignoring status of restaurant the cart is not bound to");
            }
            Some(_) if !fresh_restaurant.is_open => {
                self.upsert(CartFinding::RestaurantClosed);
            }
            Some(_) => {}
        }

        &self.findings
    }

    /// Record a price change pushed from the live catalog.
    ///
    /// Does nothing if the item is not in the cart or `new_price` equals the
    /// price in the cart. Otherwise inserts, or overwrites, the item's
    /// `PriceChanged` finding. Returns whether the ledger changed.
    #[instrument(skip_all, fields(item = %item_id, price = %new_price))]
    pub fn report_price_change(
        &mut self,
        cart: &Cart,
        item_id: &MenuItemId,
        new_price: Money,
    ) -> bool {
        let Some(line) = cart.line(item_id) else {
            debug!("Price change for item not in cart ignored");
            return false;
        };

        let original_price = line.menu_item().price;
        if new_price == original_price {
            return false;
        }

        self.upsert(CartFinding::PriceChanged {
            item_id: item_id.clone(),
            original_price,
            new_price,
        })
    }

    /// Remove the finding at `index`.
    ///
    /// Returns `None` if the index is out of range.
    pub fn dismiss(&mut self, index: usize) -> Option<CartFinding> {
        if index >= self.findings.len() {
            debug!(index, "Dismiss of out-of-range finding ignored");
            return None;
        }
        Some(self.findings.remove(index))
    }

    /// Remove the finding with the given key.
    pub fn resolve(
        &mut self,
        kind: FindingKind,
        item_id: Option<&MenuItemId>,
    ) -> Option<CartFinding> {
        let index = self.findings.iter().position(|f| f.has_key(kind, item_id))?;
        Some(self.findings.remove(index))
    }

    /// Remove every finding. Cart lines are not touched.
    pub fn clear_errors(&mut self) {
        self.findings.clear();
    }

    /// Insert a finding, or overwrite the one with the same key in place.
    fn upsert(&mut self, finding: CartFinding) -> bool {
        let kind = finding.kind();
        match self
            .findings
            .iter_mut()
            .find(|f| f.has_key(kind, finding.item_id()))
        {
            Some(existing) if *existing == finding => false,
            Some(existing) => {
                info!(?finding, "Updated cart finding");
                *existing = finding;
                true
            }
            None => {
                info!(?finding, "New cart finding");
                self.findings.push(finding);
                true
            }
        }
    }
}
