//! Cart store.
//!
//! Owns the cart lines, the bound restaurant and the derived totals. Every
//! mutation either fully applies (lines updated, totals recomputed,
//! listeners notified) or leaves the cart untouched.
//!
//! # Invariants
//!
//! - All lines belong to the bound restaurant; an empty cart is unbound.
//! - At most one line per menu item id.
//! - Every line has `quantity >= 1`.
//! - Totals always equal [`compute_totals`] of the current lines.

use std::fmt;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use plateful_core::{MenuItem, MenuItemId, Money, Restaurant, RestaurantId};

use crate::config::PricingConfig;
use crate::error::{CartError, Result};
use crate::totals::{Totals, compute_totals};

/// One distinct menu item and its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    menu_item: MenuItem,
    quantity: u32,
}

impl CartLine {
    /// Create a line from an item snapshot.
    #[must_use]
    pub const fn new(menu_item: MenuItem, quantity: u32) -> Self {
        Self {
            menu_item,
            quantity,
        }
    }

    /// Item snapshot taken when the line was created.
    #[must_use]
    pub const fn menu_item(&self) -> &MenuItem {
        &self.menu_item
    }

    /// Item ID.
    #[must_use]
    pub const fn item_id(&self) -> &MenuItemId {
        &self.menu_item.id
    }

    /// Quantity, always at least one inside a cart.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity, unrounded.
    ///
    /// `None` if the product is out of decimal range.
    #[must_use]
    pub fn line_total(&self) -> Option<Money> {
        self.menu_item.price.checked_mul(self.quantity.into())
    }
}

/// The cart aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
    bound_restaurant: Option<Restaurant>,
    #[serde(flatten)]
    totals: Totals,
    revision: u64,
}

impl Cart {
    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Line for the given item, if present.
    #[must_use]
    pub fn line(&self, item_id: &MenuItemId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.item_id() == item_id)
    }

    /// Restaurant snapshot the cart is bound to.
    #[must_use]
    pub const fn bound_restaurant(&self) -> Option<&Restaurant> {
        self.bound_restaurant.as_ref()
    }

    /// ID of the restaurant the cart is bound to.
    #[must_use]
    pub fn bound_restaurant_id(&self) -> Option<&RestaurantId> {
        self.bound_restaurant.as_ref().map(|r| &r.id)
    }

    /// Current totals.
    #[must_use]
    pub const fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Number of accepted mutations since the cart was created.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn position(&self, item_id: &MenuItemId) -> Option<usize> {
        self.lines.iter().position(|l| l.item_id() == item_id)
    }
}

/// Receives the cart after every accepted mutation.
pub trait CartListener {
    /// Called once per accepted mutation with the updated cart.
    fn cart_changed(&mut self, cart: &Cart);
}

impl<F> CartListener for F
where
    F: FnMut(&Cart),
{
    fn cart_changed(&mut self, cart: &Cart) {
        self(cart);
    }
}

/// Owner of a single [`Cart`].
pub struct CartStore {
    cart: Cart,
    pricing: PricingConfig,
    listeners: Vec<Box<dyn CartListener>>,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("pricing", &self.pricing)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl CartStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(pricing: PricingConfig) -> Self {
        Self {
            cart: Cart::default(),
            pricing,
            listeners: Vec::new(),
        }
    }

    /// Register a listener for cart changes.
    pub fn subscribe(&mut self, listener: impl CartListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    /// Line for the given item, if present.
    #[must_use]
    pub fn line(&self, item_id: &MenuItemId) -> Option<&CartLine> {
        self.cart.line(item_id)
    }

    /// Restaurant snapshot the cart is bound to.
    #[must_use]
    pub const fn bound_restaurant(&self) -> Option<&Restaurant> {
        self.cart.bound_restaurant()
    }

    /// Current totals.
    #[must_use]
    pub const fn totals(&self) -> &Totals {
        self.cart.totals()
    }

    /// Add `quantity` of a menu item.
    ///
    /// Merges into the existing line for the item if there is one, otherwise
    /// appends a new line. Binds the cart to `restaurant` if it was empty and
    /// refreshes the bound restaurant snapshot otherwise. A quantity of zero
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// - `CartError::CrossRestaurant` if the cart is bound to another restaurant.
    /// - `CartError::ItemRestaurantMismatch` if `menu_item` is not sold by `restaurant`.
    /// - `CartError::AmountOverflow` if the new totals are out of decimal range.
    #[instrument(skip_all, fields(item = %menu_item.id, restaurant = %restaurant.id, quantity = quantity))]
    pub fn add_line(
        &mut self,
        menu_item: &MenuItem,
        restaurant: &Restaurant,
        quantity: u32,
    ) -> Result<()> {
        Self::check_item_restaurant(menu_item, restaurant)?;

        if let Some(bound) = self.cart.bound_restaurant_id()
            && *bound != restaurant.id
        {
            warn!(bound = %bound, "Rejected cross-restaurant add");
            return Err(CartError::CrossRestaurant {
                bound: bound.clone(),
                attempted: restaurant.id.clone(),
            });
        }

        if quantity == 0 {
            debug!("Ignoring add with zero quantity");
            return Ok(());
        }

        let mut lines = self.cart.lines.clone();
        match lines.iter_mut().find(|l| l.item_id() == &menu_item.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => lines.push(CartLine::new(menu_item.clone(), quantity)),
        }

        self.commit(lines, Some(restaurant.clone()))?;
        debug!("Added line");
        Ok(())
    }

    /// Replace the whole cart with a single line from `restaurant`.
    ///
    /// A quantity of zero is a no-op. Returns whether the cart changed.
    ///
    /// # Errors
    ///
    /// - `CartError::ItemRestaurantMismatch` if `menu_item` is not sold by `restaurant`.
    /// - `CartError::AmountOverflow` if the new totals are out of decimal range.
    #[instrument(skip_all, fields(item = %menu_item.id, restaurant = %restaurant.id, quantity = quantity))]
    pub fn replace_with(
        &mut self,
        menu_item: &MenuItem,
        restaurant: &Restaurant,
        quantity: u32,
    ) -> Result<bool> {
        Self::check_item_restaurant(menu_item, restaurant)?;

        if quantity == 0 {
            debug!("Ignoring replace with zero quantity");
            return Ok(false);
        }

        self.commit(
            vec![CartLine::new(menu_item.clone(), quantity)],
            Some(restaurant.clone()),
        )?;
        debug!("Replaced cart");
        Ok(true)
    }

    /// Reject a menu item that is not sold by the restaurant passed with it.
    fn check_item_restaurant(menu_item: &MenuItem, restaurant: &Restaurant) -> Result<()> {
        if menu_item.restaurant_id == restaurant.id {
            return Ok(());
        }
        warn!(
            item = %menu_item.id,
            item_restaurant = %menu_item.restaurant_id,
            restaurant = %restaurant.id,
            "Rejected item from mismatched restaurant"
        );
        Err(CartError::ItemRestaurantMismatch {
            item: menu_item.id.clone(),
            item_restaurant: menu_item.restaurant_id.clone(),
            restaurant: restaurant.id.clone(),
        })
    }

    /// Remove the line for an item.
    ///
    /// Returns `false` (and does nothing) if the item is not in the cart.
    /// Removing the last line unbinds the restaurant.
    #[instrument(skip_all, fields(item = %item_id))]
    pub fn remove_line(&mut self, item_id: &MenuItemId) -> bool {
        let Some(index) = self.cart.position(item_id) else {
            debug!("Remove of absent item ignored");
            return false;
        };

        let mut lines = self.cart.lines.clone();
        lines.remove(index);
        let bound_restaurant = if lines.is_empty() {
            None
        } else {
            self.cart.bound_restaurant.clone()
        };

        self.try_commit(lines, bound_restaurant, "Removed line")
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero removes the line. Returns `false` if the item is
    /// not in the cart, the quantity is unchanged, or the new totals are out
    /// of decimal range.
    #[instrument(skip_all, fields(item = %item_id, quantity = quantity))]
    pub fn set_quantity(&mut self, item_id: &MenuItemId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove_line(item_id);
        }

        let mut lines = self.cart.lines.clone();
        let Some(line) = lines.iter_mut().find(|l| l.item_id() == item_id) else {
            debug!("Quantity update of absent item ignored");
            return false;
        };
        if line.quantity == quantity {
            return false;
        }
        line.quantity = quantity;

        let bound_restaurant = self.cart.bound_restaurant.clone();
        self.try_commit(lines, bound_restaurant, "Updated quantity")
    }

    /// Replace the unit price in a line's item snapshot.
    ///
    /// Returns `false` if the item is not in the cart, already has that
    /// price, or the new totals are out of decimal range.
    #[instrument(skip_all, fields(item = %item_id, price = %new_price))]
    pub fn reprice_line(&mut self, item_id: &MenuItemId, new_price: Money) -> bool {
        let mut lines = self.cart.lines.clone();
        let Some(line) = lines.iter_mut().find(|l| l.item_id() == item_id) else {
            debug!("Reprice of absent item ignored");
            return false;
        };
        if line.menu_item.price == new_price {
            return false;
        }
        line.menu_item.price = new_price;

        let bound_restaurant = self.cart.bound_restaurant.clone();
        self.try_commit(lines, bound_restaurant, "Repriced line")
    }

    /// Empty the cart and unbind the restaurant.
    ///
    /// Returns `false` if the cart was already empty.
    #[instrument(skip_all)]
    pub fn clear(&mut self) -> bool {
        if self.cart.lines.is_empty() && self.cart.bound_restaurant.is_none() {
            return false;
        }

        self.try_commit(Vec::new(), None, "Cleared cart")
    }

    /// Install new lines and restaurant, recompute totals, bump the revision
    /// and notify listeners.
    ///
    /// Totals are computed before anything is written, so an error leaves
    /// the cart untouched.
    fn commit(&mut self, lines: Vec<CartLine>, bound_restaurant: Option<Restaurant>) -> Result<()> {
        let totals = compute_totals(&lines, bound_restaurant.as_ref(), &self.pricing)
            .inspect_err(|e| warn!(error = %e, "Rejected mutation"))?;

        self.cart.lines = lines;
        self.cart.bound_restaurant = bound_restaurant;
        self.cart.totals = totals;
        self.cart.revision += 1;

        for listener in &mut self.listeners {
            listener.cart_changed(&self.cart);
        }
        Ok(())
    }

    /// [`Self::commit`] for operations that report success as a `bool`.
    fn try_commit(
        &mut self,
        lines: Vec<CartLine>,
        bound_restaurant: Option<Restaurant>,
        outcome: &str,
    ) -> bool {
        let committed = self.commit(lines, bound_restaurant).is_ok();
        if committed {
            debug!("{outcome}");
        }
        committed
    }
}
