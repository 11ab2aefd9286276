//! # Cart Types
//!
//! The mutable, pre-checkout side of the workflow. A cart is created by the
//! storefront's add-to-cart path (out of scope here), read and validated by
//! the [`CartAccessor`], and consumed exactly once when an order is
//! materialized from it.

use crate::error::{CheckoutError, CheckoutResult};
use crate::money::Money;
use crate::store::CartStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// A line item in a cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Product ID
    pub product_id: String,

    /// Product name (denormalized; snapshotted onto the order at materialization)
    pub name: String,

    /// Quantity (must be positive to price)
    pub quantity: u32,

    /// Unit price snapshot taken when the line was added
    pub unit_price: Money,

    /// Optional discounted price; used only when non-negative and lower
    /// than the unit price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<Money>,
}

impl CartLine {
    /// Create a line with no discount
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            quantity,
            unit_price,
            discounted_price: None,
        }
    }

    /// Builder: set a discounted price
    pub fn with_discount(mut self, discounted_price: Money) -> Self {
        self.discounted_price = Some(discounted_price);
        self
    }

    /// The unit price this line actually charges: the discounted price when
    /// present, non-negative, and lower than the unit price; otherwise the
    /// unit price. Negative discounts are treated as absent.
    pub fn effective_unit_price(&self) -> Money {
        match &self.discounted_price {
            Some(d) if d.amount >= 0 && d.amount < self.unit_price.amount => d.clone(),
            _ => self.unit_price.clone(),
        }
    }
}

/// A customer's in-progress selection of products
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    /// Opaque cart token
    pub id: String,

    /// Line items, in insertion order
    pub lines: Vec<CartLine>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Create an empty cart with the given token
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Builder: append a line
    pub fn with_line(mut self, line: CartLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Check if the cart has no line items
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total unit count across all lines
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// Read-only access to carts with validation at the checkout boundary.
///
/// Guards the rest of the workflow: downstream components only ever see
/// carts that exist and have at least one line item.
pub struct CartAccessor {
    store: Arc<dyn CartStore>,
}

impl CartAccessor {
    /// Create an accessor over the given cart store
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        Self { store }
    }

    /// Load a cart, failing with `CartNotFound` when absent (or already
    /// consumed by a previous order) and `EmptyCart` when it has no lines.
    /// Does not mutate the cart.
    #[instrument(skip(self))]
    pub async fn load_validated(&self, cart_id: &str) -> CheckoutResult<Cart> {
        let cart = self
            .store
            .fetch_cart(cart_id)
            .await?
            .ok_or_else(|| CheckoutError::CartNotFound {
                cart_id: cart_id.to_string(),
            })?;

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart {
                cart_id: cart_id.to_string(),
            });
        }

        Ok(cart)
    }
}
