//! # Order Types
//!
//! The immutable, post-checkout side of the workflow. An order is created
//! exactly once from a cart by the materializer; after that only its status
//! moves, and only along `created -> paid | payment_failed`.

use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order lifecycle status.
///
/// Transitions are monotonic: `Created` may become `Paid` or
/// `PaymentFailed`; nothing leaves `Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Materialized, awaiting settlement
    Created,
    /// Charge captured
    Paid,
    /// Gateway gave a definitive decline
    PaymentFailed,
}

impl OrderStatus {
    /// Stable status string for responses and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Paid => "paid",
            OrderStatus::PaymentFailed => "payment_failed",
        }
    }

    /// Terminal statuses accept no further settlement attempts
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Created)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable order record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID (generated)
    pub id: String,

    /// Customer reference
    pub customer_id: String,

    /// Shipping option selected at checkout
    pub shipping_id: String,

    /// Tax option selected at checkout
    pub tax_id: String,

    /// Authoritative total, computed once at materialization and never
    /// recomputed from live prices
    pub total: Money,

    /// Lifecycle status
    pub status: OrderStatus,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order in `Created` status with a generated ID
    pub fn new(
        customer_id: impl Into<String>,
        shipping_id: impl Into<String>,
        tax_id: impl Into<String>,
        total: Money,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.into(),
            shipping_id: shipping_id.into(),
            tax_id: tax_id.into(),
            total,
            status: OrderStatus::Created,
            created_at: Utc::now(),
        }
    }
}

/// Snapshot of a cart line at order-creation time.
///
/// Decoupled from the live catalog so later price or name changes never
/// affect historical orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    /// Product ID
    pub product_id: String,

    /// Product name at order time
    pub product_name: String,

    /// Quantity
    pub quantity: u32,

    /// Unit cost actually charged (discount already applied)
    pub unit_cost: Money,

    /// quantity x unit_cost
    pub subtotal: Money,
}

/// A captured gateway charge, correlated to one order.
/// Append-only: charges are never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    /// Gateway transaction identifier
    pub id: String,

    /// Order this charge settles
    pub order_id: String,

    /// Captured amount (minor units)
    pub amount: Money,

    /// Capture timestamp
    pub created_at: DateTime<Utc>,
}
