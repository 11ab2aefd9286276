//! # Payment Gateway Seam
//!
//! The external gateway is a black box with a single contract: charge an
//! amount against a payment token and return a transaction identifier.
//! Provider crates implement [`PaymentGateway`]; the settlement coordinator
//! only ever sees this trait.

use crate::error::CheckoutResult;
use crate::money::Money;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A single charge attempt against the gateway
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    /// Amount to capture, already in the gateway's smallest currency unit
    pub amount: Money,

    /// Gateway-specific payment token (never raw card material)
    pub token: String,

    /// Statement description referencing the order identifier
    pub description: String,

    /// Fresh key per attempt; a caller retrying after a transient failure
    /// supplies a new attempt and therefore a new key
    pub idempotency_key: String,
}

/// The gateway's record of a captured charge
#[derive(Debug, Clone)]
pub struct GatewayCharge {
    /// Gateway transaction identifier
    pub charge_id: String,

    /// Captured amount as reported by the gateway
    pub amount: Money,

    /// Capture timestamp
    pub created_at: DateTime<Utc>,
}

/// Contract every payment provider implements.
///
/// Outcomes are classified by the implementation:
/// - definitive decline (bad card, expired or invalid token) fails with
///   `PaymentDeclined` carrying the gateway's reason;
/// - no definitive response (network error, timeout, provider 5xx) fails
///   with `PaymentGatewayUnreachable`.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Capture a charge. Success returns the gateway's transaction record.
    async fn charge(&self, request: &ChargeRequest) -> CheckoutResult<GatewayCharge>;

    /// Provider name (for logging)
    fn gateway_name(&self) -> &'static str;
}

/// Type alias for an injected gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;
