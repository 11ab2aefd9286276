//! # Payment Settlement Coordinator
//!
//! Drives the order status state machine:
//!
//! ```text
//! created --(charge succeeds)--> paid
//! created --(definitive decline)--> payment_failed
//! ```
//!
//! The gateway call runs under a caller-supplied timeout and no store lock
//! is held across it; mutual exclusion between concurrent attempts on the
//! same order is a compare-and-set claim in the store. The local status is
//! written only after a definitive gateway response: on a decline the order
//! moves to `payment_failed`, while a timeout or unreachable gateway
//! releases the claim and leaves the order `created` so the caller may
//! retry (with a fresh idempotency key). The coordinator itself never
//! retries.

use crate::error::{CheckoutError, CheckoutResult};
use crate::gateway::{BoxedPaymentGateway, ChargeRequest};
use crate::order::{Charge, OrderStatus};
use crate::store::BoxedOrderStore;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Settles orders against the payment gateway
pub struct SettlementCoordinator {
    orders: BoxedOrderStore,
    gateway: BoxedPaymentGateway,
    gateway_timeout: Duration,
}

impl SettlementCoordinator {
    /// Create a coordinator over the given store and gateway
    pub fn new(
        orders: BoxedOrderStore,
        gateway: BoxedPaymentGateway,
        gateway_timeout: Duration,
    ) -> Self {
        Self {
            orders,
            gateway,
            gateway_timeout,
        }
    }

    /// Charge the gateway for an order's total and reconcile the outcome.
    ///
    /// Fails with `OrderNotFound` when the order is absent and
    /// `OrderAlreadySettled` when it is not in `created` status or another
    /// attempt is in flight. A successful charge transitions the order to
    /// `paid` and returns the recorded [`Charge`].
    #[instrument(skip(self, payment_token), fields(order_id))]
    pub async fn settle(&self, order_id: &str, payment_token: &str) -> CheckoutResult<Charge> {
        let order = self
            .orders
            .fetch_order(order_id)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound {
                order_id: order_id.to_string(),
            })?;

        if order.status.is_terminal() {
            return Err(CheckoutError::OrderAlreadySettled {
                order_id: order_id.to_string(),
            });
        }

        // Idempotency guard: only one attempt may pass this point per order
        // until the claim is resolved or released.
        self.orders.claim_settlement(order_id).await?;

        let request = ChargeRequest {
            amount: order.total.clone(),
            token: payment_token.to_string(),
            description: format!("Order {}", order.id),
            idempotency_key: Uuid::new_v4().to_string(),
        };

        let result = match tokio::time::timeout(
            self.gateway_timeout,
            self.gateway.charge(&request),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(CheckoutError::PaymentGatewayUnreachable(format!(
                "{} charge timed out after {:?}",
                self.gateway.gateway_name(),
                self.gateway_timeout
            ))),
        };

        match result {
            Ok(gateway_charge) => {
                let charge = Charge {
                    id: gateway_charge.charge_id,
                    order_id: order.id.clone(),
                    amount: gateway_charge.amount,
                    created_at: gateway_charge.created_at,
                };
                self.orders
                    .settle_order(order_id, OrderStatus::Paid, Some(&charge))
                    .await?;
                info!(
                    "Order {} paid: charge {} for {}",
                    order.id,
                    charge.id,
                    charge.amount.display()
                );
                Ok(charge)
            }
            Err(declined @ CheckoutError::PaymentDeclined { .. }) => {
                // Definitive gateway answer: terminal failure state.
                self.orders
                    .settle_order(order_id, OrderStatus::PaymentFailed, None)
                    .await?;
                warn!("Order {} payment declined: {}", order.id, declined);
                Err(declined)
            }
            Err(transient) => {
                // No definitive answer: stay `created`, free the claim for a
                // caller-driven retry.
                self.orders.release_settlement(order_id).await?;
                warn!(
                    "Order {} settlement inconclusive, claim released: {}",
                    order.id, transient
                );
                Err(transient)
            }
        }
    }
}
