//! # Shipping and Tax Rates
//!
//! Shipping options and tax options are small reference tables resolved by
//! identifier at materialization time. They are loaded from
//! `config/rates.toml`, with an embedded default so the service runs
//! without a config file.

use crate::error::{CheckoutError, CheckoutResult};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// A shipping option with a flat cost
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingOption {
    /// Unique identifier (e.g. "ground")
    pub id: String,

    /// Display label
    pub label: String,

    /// Flat cost in minor units
    pub cost_minor: i64,
}

impl ShippingOption {
    /// Shipping cost as money in the given currency
    pub fn cost(&self, currency: Currency) -> Money {
        Money::from_minor(self.cost_minor, currency)
    }
}

/// How a tax option computes its amount.
///
/// Tax applies to the item-subtotal sum only, never to shipping. That is a
/// fixed product decision, not configurable per option.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum TaxPolicy {
    /// Percentage of the item-subtotal sum, rounded to the nearest minor unit
    Rate { percent: f64 },
    /// Fixed amount in minor units
    Flat { amount_minor: i64 },
}

/// A tax option resolved by identifier at checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxOption {
    /// Unique identifier (e.g. "standard")
    pub id: String,

    /// Display label
    pub label: String,

    /// Amount policy
    pub policy: TaxPolicy,
}

impl TaxOption {
    /// Tax amount over the item-subtotal sum (shipping excluded)
    pub fn amount_on(&self, items_subtotal: &Money) -> Money {
        let amount = match &self.policy {
            TaxPolicy::Rate { percent } => {
                ((items_subtotal.amount as f64) * percent / 100.0).round() as i64
            }
            TaxPolicy::Flat { amount_minor } => *amount_minor,
        };
        Money::from_minor(amount, items_subtotal.currency)
    }
}

/// The full set of shipping and tax options known to the service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateBook {
    #[serde(default)]
    pub shipping: Vec<ShippingOption>,

    #[serde(default)]
    pub taxes: Vec<TaxOption>,
}

impl RateBook {
    /// Create an empty rate book
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a rate book from TOML
    pub fn from_toml(toml_str: &str) -> CheckoutResult<Self> {
        toml::from_str(toml_str)
            .map_err(|e| CheckoutError::Configuration(format!("invalid rates config: {e}")))
    }

    /// Find a shipping option by ID
    pub fn shipping(&self, id: &str) -> Option<&ShippingOption> {
        self.shipping.iter().find(|s| s.id == id)
    }

    /// Find a tax option by ID
    pub fn tax(&self, id: &str) -> Option<&TaxOption> {
        self.taxes.iter().find(|t| t.id == id)
    }
}
