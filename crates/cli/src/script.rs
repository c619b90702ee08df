//! Cart session scripts.
//!
//! A script is a YAML document holding a small catalog (restaurants and menu
//! items) and a list of steps that drive a [`CartSession`] the way a UI
//! would.
//!
//! ```yaml
//! restaurants:
//!   - id: r1
//!     deliveryFee: "3.99"
//!     minimumOrder: "15.00"
//! items:
//!   - id: p1
//!     name: Pad Thai
//!     price: "12.99"
//!     restaurantId: r1
//! steps:
//!   - action: add
//!     item: p1
//!   - action: reconcile
//!     restaurant: r1
//!     unavailable: [p1]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use plateful_cart::{CartError, CartSession};
use plateful_core::{MenuItem, MenuItemId, Money, Restaurant, RestaurantId};

/// Errors that can occur while loading or running a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Reading the script file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The script is not valid YAML for the expected shape.
    #[error("YAML parsing failed: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The script parsed but references are inconsistent.
    #[error("{} validation errors found", .0.len())]
    Invalid(Vec<String>),

    /// A step named an item that is not in the catalog.
    #[error("unknown menu item: {0}")]
    UnknownItem(MenuItemId),

    /// A step named a restaurant that is not in the catalog.
    #[error("unknown restaurant: {0}")]
    UnknownRestaurant(RestaurantId),

    /// The cart rejected a step.
    #[error("cart rejected step: {0}")]
    Cart(#[from] CartError),
}

/// A parsed session script.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionScript {
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
    #[serde(default)]
    pub items: Vec<MenuItem>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One user gesture or catalog push.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Add an item, merging into its existing line.
    Add {
        item: MenuItemId,
        #[serde(default = "default_quantity")]
        quantity: u32,
    },
    /// Remove an item's line.
    Remove {
        item: MenuItemId,
    },
    /// Set a line's quantity; zero removes it.
    SetQuantity {
        item: MenuItemId,
        quantity: u32,
    },
    /// Increase a line's quantity by one.
    Increment {
        item: MenuItemId,
    },
    /// Decrease a line's quantity by one.
    Decrement {
        item: MenuItemId,
    },
    /// Empty the cart and the ledger.
    Clear,
    /// Replace the cart with a single item.
    StartNewCart {
        item: MenuItemId,
        #[serde(default = "default_quantity")]
        quantity: u32,
    },
    /// Push fresh availability and open status for one restaurant.
    Reconcile {
        restaurant: RestaurantId,
        #[serde(default)]
        unavailable: Vec<MenuItemId>,
        #[serde(default)]
        closed: bool,
    },
    /// Push a live price for an item.
    ReportPrice {
        item: MenuItemId,
        price: Money,
    },
    /// Dismiss the finding at a position.
    Dismiss {
        index: usize,
    },
    /// Drop every finding.
    ClearErrors,
    /// Accept a reported price change.
    AcceptPrice {
        item: MenuItemId,
    },
    /// Remove every line flagged as unavailable.
    RemoveUnavailable,
}

const fn default_quantity() -> u32 {
    1
}

impl Step {
    /// Item referenced by this step, if any.
    #[must_use]
    pub const fn item(&self) -> Option<&MenuItemId> {
        match self {
            Self::Add { item, .. }
            | Self::Remove { item }
            | Self::SetQuantity { item, .. }
            | Self::Increment { item }
            | Self::Decrement { item }
            | Self::StartNewCart { item, .. }
            | Self::ReportPrice { item, .. }
            | Self::AcceptPrice { item } => Some(item),
            Self::Clear
            | Self::Reconcile { .. }
            | Self::Dismiss { .. }
            | Self::ClearErrors
            | Self::RemoveUnavailable => None,
        }
    }
}

/// Load and validate a script from a YAML file.
///
/// # Errors
///
/// Returns `ScriptError` if the file cannot be read, does not parse, or fails
/// [`validate_script`].
pub fn load_script(path: &Path) -> Result<SessionScript, ScriptError> {
    let content = std::fs::read_to_string(path)?;
    parse_script(&content)
}

/// Parse and validate a script from YAML text.
///
/// # Errors
///
/// Returns `ScriptError::Parse` or `ScriptError::Invalid`.
pub fn parse_script(content: &str) -> Result<SessionScript, ScriptError> {
    let script: SessionScript = serde_yaml::from_str(content)?;
    debug!(
        restaurants = script.restaurants.len(),
        items = script.items.len(),
        steps = script.steps.len(),
        "Parsed script"
    );

    let errors = validate_script(&script);
    if errors.is_empty() {
        Ok(script)
    } else {
        Err(ScriptError::Invalid(errors))
    }
}

/// Check a script for duplicate IDs and dangling references.
///
/// Returns one message per problem; an empty list means the script is valid.
#[must_use]
pub fn validate_script(script: &SessionScript) -> Vec<String> {
    let mut errors = Vec::new();

    let mut restaurant_ids = HashSet::new();
    for restaurant in &script.restaurants {
        if !restaurant_ids.insert(&restaurant.id) {
            errors.push(format!("duplicate restaurant id: {}", restaurant.id));
        }
    }

    let mut item_ids = HashSet::new();
    for item in &script.items {
        if !item_ids.insert(&item.id) {
            errors.push(format!("duplicate item id: {}", item.id));
        }
        if !restaurant_ids.contains(&item.restaurant_id) {
            errors.push(format!(
                "item {} references unknown restaurant {}",
                item.id, item.restaurant_id
            ));
        }
    }

    for (index, step) in script.steps.iter().enumerate() {
        if let Some(item) = step.item()
            && !item_ids.contains(item)
        {
            errors.push(format!("step {index}: unknown item {item}"));
        }
        if let Step::Reconcile {
            restaurant,
            unavailable,
            ..
        } = step
        {
            if !restaurant_ids.contains(restaurant) {
                errors.push(format!("step {index}: unknown restaurant {restaurant}"));
            }
            for item in unavailable {
                if !item_ids.contains(item) {
                    errors.push(format!("step {index}: unknown item {item}"));
                }
            }
        }
    }

    errors
}

/// Catalog snapshot built from a script.
#[derive(Debug, Clone)]
pub struct Catalog {
    restaurants: HashMap<RestaurantId, Restaurant>,
    items: Vec<MenuItem>,
}

impl Catalog {
    /// Index the script's restaurants and items.
    #[must_use]
    pub fn from_script(script: &SessionScript) -> Self {
        Self {
            restaurants: script
                .restaurants
                .iter()
                .map(|r| (r.id.clone(), r.clone()))
                .collect(),
            items: script.items.clone(),
        }
    }

    fn item(&self, id: &MenuItemId) -> Result<&MenuItem, ScriptError> {
        self.items
            .iter()
            .find(|item| item.id == *id)
            .ok_or_else(|| ScriptError::UnknownItem(id.clone()))
    }

    fn restaurant(&self, id: &RestaurantId) -> Result<&Restaurant, ScriptError> {
        self.restaurants
            .get(id)
            .ok_or_else(|| ScriptError::UnknownRestaurant(id.clone()))
    }

    /// Item together with the restaurant that sells it.
    fn item_with_restaurant(&self, id: &MenuItemId) -> Result<(&MenuItem, &Restaurant), ScriptError> {
        let item = self.item(id)?;
        let restaurant = self.restaurant(&item.restaurant_id)?;
        Ok((item, restaurant))
    }

    /// Fresh truth for one restaurant with the given overrides applied.
    fn fresh(
        &self,
        restaurant: &RestaurantId,
        unavailable: &[MenuItemId],
        closed: bool,
    ) -> Result<(Vec<MenuItem>, Restaurant), ScriptError> {
        let restaurant = self.restaurant(restaurant)?.clone().with_open(!closed);
        let items = self
            .items
            .iter()
            .filter(|item| item.restaurant_id == restaurant.id)
            .map(|item| {
                let available = item.is_available && !unavailable.contains(&item.id);
                item.clone().with_availability(available)
            })
            .collect();
        Ok((items, restaurant))
    }
}

/// Apply one step to a session.
///
/// # Errors
///
/// Returns `ScriptError::Cart` if the cart rejects the step, or an unknown-ID
/// error if the step references something missing from the catalog.
pub fn apply_step(
    session: &mut CartSession,
    catalog: &Catalog,
    step: &Step,
) -> Result<(), ScriptError> {
    match step {
        Step::Add { item, quantity } => {
            let (item, restaurant) = catalog.item_with_restaurant(item)?;
            session.add_line(item, restaurant, *quantity)?;
        }
        Step::Remove { item } => {
            session.remove_line(item);
        }
        Step::SetQuantity { item, quantity } => {
            session.set_quantity(item, *quantity);
        }
        Step::Increment { item } => {
            session.increment_line(item);
        }
        Step::Decrement { item } => {
            session.decrement_line(item);
        }
        Step::Clear => session.clear(),
        Step::StartNewCart { item, quantity } => {
            let (item, restaurant) = catalog.item_with_restaurant(item)?;
            session.start_new_cart(item, restaurant, *quantity)?;
        }
        Step::Reconcile {
            restaurant,
            unavailable,
            closed,
        } => {
            let (items, restaurant) = catalog.fresh(restaurant, unavailable, *closed)?;
            let findings = session.reconcile(&items, &restaurant).len();
            info!(findings, "Reconciled cart");
        }
        Step::ReportPrice { item, price } => {
            session.report_price_change(item, *price);
        }
        Step::Dismiss { index } => {
            session.dismiss(*index);
        }
        Step::ClearErrors => session.clear_errors(),
        Step::AcceptPrice { item } => {
            session.accept_price_change(item);
        }
        Step::RemoveUnavailable => {
            session.remove_unavailable_items();
        }
    }
    Ok(())
}
