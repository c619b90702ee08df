//! Error types for cart mutations.
//!
//! Only invariant violations are errors. Operations on absent items are
//! silent no-ops, and stale catalog data is recorded as findings in the
//! [`ErrorLedger`](crate::ErrorLedger) rather than raised.

use plateful_core::{MenuItemId, RestaurantId};
use thiserror::Error;

/// Errors raised by cart mutations.
///
/// A failed mutation leaves the cart exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The cart already holds items from another restaurant.
    ///
    /// Callers usually present this as a "replace cart?" decision and, if
    /// accepted, call [`CartSession::start_new_cart`](crate::CartSession::start_new_cart).
    #[error("cart is bound to restaurant {bound}, cannot add items from {attempted}")]
    CrossRestaurant {
        /// Restaurant the cart is bound to.
        bound: RestaurantId,
        /// Restaurant of the rejected item.
        attempted: RestaurantId,
    },

    /// The menu item does not belong to the restaurant supplied with it.
    #[error("menu item {item} belongs to restaurant {item_restaurant}, not {restaurant}")]
    ItemRestaurantMismatch {
        /// Item being added.
        item: MenuItemId,
        /// Restaurant named by the item.
        item_restaurant: RestaurantId,
        /// Restaurant snapshot passed alongside the item.
        restaurant: RestaurantId,
    },

    /// A cart total would exceed the range of a decimal amount.
    #[error("cart total is too large to represent")]
    AmountOverflow,
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_restaurant_message() {
        let err = CartError::CrossRestaurant {
            bound: RestaurantId::new("r1"),
            attempted: RestaurantId::new("r2"),
        };
        assert_eq!(
            err.to_string(),
            "cart is bound to restaurant r1, cannot add items from r2"
        );
    }
}
