//! # checkout-notify
//!
//! HTTP implementation of the checkout engine's confirmation transport.
//! Confirmations are POSTed as `{ to, template, context }` to a mail-relay
//! endpoint that owns rendering and actual delivery. The transport is
//! fire-and-forget from the workflow's perspective: any failure here is a
//! warning upstream, never an error.

use async_trait::async_trait;
use checkout_core::{CheckoutError, CheckoutResult, Confirmation, ConfirmationSender};
use reqwest::Client;
use serde::Serialize;
use std::env;
use tracing::{debug, instrument, warn};

/// Template identifier the relay renders for order confirmations
const ORDER_CONFIRMATION_TEMPLATE: &str = "order_confirmation";

/// Mail relay configuration
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Relay endpoint URL
    pub relay_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl NotifyConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `NOTIFY_RELAY_URL`
    ///
    /// Optional:
    /// - `NOTIFY_TIMEOUT_SECS` (default 10)
    pub fn from_env() -> Result<Self, CheckoutError> {
        dotenvy::dotenv().ok();

        let relay_url = env::var("NOTIFY_RELAY_URL")
            .map_err(|_| CheckoutError::Configuration("NOTIFY_RELAY_URL not set".to_string()))?;

        let timeout_secs = env::var("NOTIFY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Ok(Self {
            relay_url,
            timeout_secs,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(relay_url: impl Into<String>) -> Self {
        Self {
            relay_url: relay_url.into(),
            timeout_secs: 10,
        }
    }
}

/// The relay's wire format
#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    to: &'a str,
    template: &'a str,
    context: RelayContext<'a>,
}

#[derive(Debug, Serialize)]
struct RelayContext<'a> {
    order_id: &'a str,
    charge_id: &'a str,
    total: String,
    total_minor: i64,
    currency: &'a str,
}

/// Confirmation sender backed by an HTTP mail relay
pub struct HttpConfirmationSender {
    config: NotifyConfig,
    client: Client,
}

impl HttpConfirmationSender {
    /// Create a sender with the given configuration
    pub fn new(config: NotifyConfig) -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                CheckoutError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> CheckoutResult<Self> {
        Self::new(NotifyConfig::from_env()?)
    }
}

#[async_trait]
impl ConfirmationSender for HttpConfirmationSender {
    #[instrument(skip(self, confirmation), fields(order_id = %confirmation.order_id))]
    async fn send(&self, confirmation: &Confirmation) -> CheckoutResult<()> {
        let message = RelayMessage {
            to: &confirmation.recipient,
            template: ORDER_CONFIRMATION_TEMPLATE,
            context: RelayContext {
                order_id: &confirmation.order_id,
                charge_id: &confirmation.charge_id,
                total: confirmation.total.display(),
                total_minor: confirmation.total.amount,
                currency: confirmation.total.currency.as_str(),
            },
        };

        let response = self
            .client
            .post(&self.config.relay_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| CheckoutError::NotificationFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Mail relay rejected confirmation: HTTP {}", status);
            return Err(CheckoutError::NotificationFailed(format!(
                "relay returned HTTP {status}"
            )));
        }

        debug!(
            "Confirmation accepted by relay for order {}",
            confirmation.order_id
        );
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "http-relay"
    }
}
