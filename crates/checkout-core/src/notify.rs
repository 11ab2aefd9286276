//! # Confirmation Notification
//!
//! Best-effort confirmation dispatch after settlement. A failed or timed-out
//! send is logged and reported as a warning; it never rolls back the order
//! or the charge, and the checkout as a whole still succeeds.

use crate::error::CheckoutResult;
use crate::money::Money;
use crate::order::{Charge, Order};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// The confirmation message handed to the transport
#[derive(Debug, Clone)]
pub struct Confirmation {
    /// Recipient address
    pub recipient: String,

    /// Order being confirmed
    pub order_id: String,

    /// Gateway charge identifier
    pub charge_id: String,

    /// Order total
    pub total: Money,
}

/// Outbound transport for confirmation messages.
/// Fire-and-forget from the workflow's perspective.
#[async_trait]
pub trait ConfirmationSender: Send + Sync {
    /// Deliver one confirmation
    async fn send(&self, confirmation: &Confirmation) -> CheckoutResult<()>;

    /// Transport name (for logging)
    fn transport_name(&self) -> &'static str;
}

/// Type alias for an injected sender
pub type BoxedConfirmationSender = Arc<dyn ConfirmationSender>;

/// No-op sender that only logs; useful for local runs without a relay
pub struct LoggingConfirmationSender;

#[async_trait]
impl ConfirmationSender for LoggingConfirmationSender {
    async fn send(&self, confirmation: &Confirmation) -> CheckoutResult<()> {
        info!(
            "Confirmation for order {} to {} ({})",
            confirmation.order_id,
            confirmation.recipient,
            confirmation.total.display()
        );
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "logging"
    }
}

/// Outcome of a dispatch attempt. Failures carry the warning message shown
/// to the caller; they are never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Message handed to the transport successfully
    Delivered,
    /// Send failed or timed out; order and charge are unaffected
    Failed(String),
}

impl NotificationOutcome {
    /// True when the confirmation was delivered
    pub fn is_delivered(&self) -> bool {
        matches!(self, NotificationOutcome::Delivered)
    }

    /// The warning message, when delivery failed
    pub fn warning(&self) -> Option<&str> {
        match self {
            NotificationOutcome::Delivered => None,
            NotificationOutcome::Failed(msg) => Some(msg),
        }
    }
}

/// Sends the post-settlement confirmation under a timeout
pub struct NotificationDispatcher {
    sender: BoxedConfirmationSender,
    timeout: Duration,
}

impl NotificationDispatcher {
    /// Create a dispatcher over the given transport
    pub fn new(sender: BoxedConfirmationSender, timeout: Duration) -> Self {
        Self { sender, timeout }
    }

    /// Send the confirmation for a settled order. Any failure becomes a
    /// logged `NotificationOutcome::Failed`, never an error.
    #[instrument(skip(self, order, charge), fields(order_id = %order.id))]
    pub async fn dispatch(
        &self,
        order: &Order,
        charge: &Charge,
        recipient: &str,
    ) -> NotificationOutcome {
        let confirmation = Confirmation {
            recipient: recipient.to_string(),
            order_id: order.id.clone(),
            charge_id: charge.id.clone(),
            total: order.total.clone(),
        };

        match tokio::time::timeout(self.timeout, self.sender.send(&confirmation)).await {
            Ok(Ok(())) => {
                debug!(
                    "Confirmation sent via {} for order {}",
                    self.sender.transport_name(),
                    order.id
                );
                NotificationOutcome::Delivered
            }
            Ok(Err(e)) => {
                warn!("Confirmation send failed for order {}: {}", order.id, e);
                NotificationOutcome::Failed(e.to_string())
            }
            Err(_) => {
                let msg = format!(
                    "confirmation send timed out after {:?} via {}",
                    self.timeout,
                    self.sender.transport_name()
                );
                warn!("{} (order {})", msg, order.id);
                NotificationOutcome::Failed(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckoutError;
    use crate::money::Currency;
    use chrono::Utc;

    struct FailingSender;

    #[async_trait]
    impl ConfirmationSender for FailingSender {
        async fn send(&self, _confirmation: &Confirmation) -> CheckoutResult<()> {
            Err(CheckoutError::NotificationFailed("relay refused".into()))
        }

        fn transport_name(&self) -> &'static str {
            "failing"
        }
    }

    struct HangingSender;

    #[async_trait]
    impl ConfirmationSender for HangingSender {
        async fn send(&self, _confirmation: &Confirmation) -> CheckoutResult<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }

        fn transport_name(&self) -> &'static str {
            "hanging"
        }
    }

    fn sample_order_and_charge() -> (Order, Charge) {
        let order = Order::new("cust-1", "ground", "standard", Money::new(29.0, Currency::USD));
        let charge = Charge {
            id: "ch_test".into(),
            order_id: order.id.clone(),
            amount: order.total.clone(),
            created_at: Utc::now(),
        };
        (order, charge)
    }

    #[tokio::test]
    async fn test_logging_sender_delivers() {
        let dispatcher = NotificationDispatcher::new(
            Arc::new(LoggingConfirmationSender),
            Duration::from_secs(1),
        );
        let (order, charge) = sample_order_and_charge();

        let outcome = dispatcher.dispatch(&order, &charge, "a@b.test").await;
        assert!(outcome.is_delivered());
        assert!(outcome.warning().is_none());
    }

    #[tokio::test]
    async fn test_send_failure_becomes_warning() {
        let dispatcher =
            NotificationDispatcher::new(Arc::new(FailingSender), Duration::from_secs(1));
        let (order, charge) = sample_order_and_charge();

        let outcome = dispatcher.dispatch(&order, &charge, "a@b.test").await;
        assert!(!outcome.is_delivered());
        assert!(outcome.warning().unwrap().contains("relay refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_warning() {
        let dispatcher =
            NotificationDispatcher::new(Arc::new(HangingSender), Duration::from_millis(100));
        let (order, charge) = sample_order_and_charge();

        let outcome = dispatcher.dispatch(&order, &charge, "a@b.test").await;
        assert!(!outcome.is_delivered());
        assert!(outcome.warning().unwrap().contains("timed out"));
    }
}
