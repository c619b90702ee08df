//! Catalog snapshots supplied by the external catalog source.
//!
//! The cart engine never fetches or mutates these; it treats every value as
//! a point-in-time snapshot pushed in by calling code.

use serde::{Deserialize, Serialize};

use super::id::{MenuItemId, RestaurantId};
use super::money::Money;

/// A menu item as last seen in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Item ID.
    pub id: MenuItemId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Whether the item can currently be ordered.
    #[serde(default = "default_true")]
    pub is_available: bool,
    /// Restaurant that sells this item.
    pub restaurant_id: RestaurantId,
}

impl MenuItem {
    /// Create an available menu item.
    #[must_use]
    pub fn new(
        id: impl Into<MenuItemId>,
        name: impl Into<String>,
        price: Money,
        restaurant_id: impl Into<RestaurantId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            is_available: true,
            restaurant_id: restaurant_id.into(),
        }
    }

    /// Return a copy with the given availability.
    #[must_use]
    pub fn with_availability(mut self, is_available: bool) -> Self {
        self.is_available = is_available;
        self
    }
}

/// A restaurant as last seen in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Restaurant ID.
    pub id: RestaurantId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Whether the restaurant is accepting orders.
    #[serde(default = "default_true")]
    pub is_open: bool,
    /// Delivery fee the restaurant declares.
    pub delivery_fee: Money,
    /// Smallest subtotal the restaurant will accept.
    #[serde(default)]
    pub minimum_order: Money,
}

impl Restaurant {
    /// Create an open restaurant.
    #[must_use]
    pub fn new(
        id: impl Into<RestaurantId>,
        name: impl Into<String>,
        delivery_fee: Money,
        minimum_order: Money,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_open: true,
            delivery_fee,
            minimum_order,
        }
    }

    /// Return a copy with the given open status.
    #[must_use]
    pub fn with_open(mut self, is_open: bool) -> Self {
        self.is_open = is_open;
        self
    }
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_menu_item_defaults_to_available() {
        let item = MenuItem::new("p1", "Pad Thai", Money::new(dec!(12.99)), "r1");
        assert!(item.is_available);
        assert!(!item.with_availability(false).is_available);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "id": "p1",
            "name": "Pad Thai",
            "price": "12.99",
            "restaurantId": "r1"
        }"#;
        let item: MenuItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id.as_str(), "p1");
        assert_eq!(item.price, Money::new(dec!(12.99)));
        assert!(item.is_available);
    }

    #[test]
    fn test_restaurant_serde() {
        let restaurant = Restaurant::new("r1", "Thai Place", Money::new(dec!(3.99)), Money::new(dec!(15)))
            .with_open(false);
        let json = serde_json::to_value(&restaurant).unwrap();
        assert_eq!(json["isOpen"], false);
        assert_eq!(json["deliveryFee"], "3.99");
        assert_eq!(json["minimumOrder"], "15");
    }
}
