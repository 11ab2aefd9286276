//! # Stripe Charges
//!
//! Implementation of [`PaymentGateway`] over the Stripe Charges API.
//! One HTTP call per settlement attempt; the caller supplies a fresh
//! idempotency key per attempt so gateway-side retries are safe.
//!
//! Outcome classification:
//! - 2xx with a captured charge: success
//! - 4xx (card errors, invalid or expired tokens): `PaymentDeclined`
//!   carrying Stripe's message
//! - 5xx and transport failures: `PaymentGatewayUnreachable`

use crate::config::StripeConfig;
use async_trait::async_trait;
use checkout_core::{
    ChargeRequest, CheckoutError, CheckoutResult, Currency, GatewayCharge, Money, PaymentGateway,
};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

/// Stripe charge gateway
pub struct StripeChargeGateway {
    config: StripeConfig,
    client: Client,
}

impl StripeChargeGateway {
    /// Create a gateway with the given configuration
    pub fn new(config: StripeConfig) -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                CheckoutError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> CheckoutResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    fn parse_currency(code: &str) -> Currency {
        match code.to_lowercase().as_str() {
            "usd" => Currency::USD,
            "eur" => Currency::EUR,
            "gbp" => Currency::GBP,
            "jpy" => Currency::JPY,
            "cad" => Currency::CAD,
            "aud" => Currency::AUD,
            _ => Currency::default(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeChargeGateway {
    #[instrument(skip(self, request), fields(description = %request.description))]
    async fn charge(&self, request: &ChargeRequest) -> CheckoutResult<GatewayCharge> {
        let form_params: Vec<(&str, String)> = vec![
            ("amount", request.amount.amount.to_string()),
            ("currency", request.amount.currency.as_str().to_string()),
            ("source", request.token.clone()),
            ("description", request.description.clone()),
        ];

        debug!(
            "Charging Stripe: {} ({})",
            request.amount.display(),
            request.description
        );

        let url = format!("{}/v1/charges", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &request.idempotency_key)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| CheckoutError::PaymentGatewayUnreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::PaymentGatewayUnreachable(e.to_string()))?;

        if status.is_server_error() {
            error!("Stripe server error: status={}, body={}", status, body);
            return Err(CheckoutError::PaymentGatewayUnreachable(format!(
                "stripe returned HTTP {status}"
            )));
        }

        if !status.is_success() {
            // Definitive client-side rejection: bad card, expired or invalid
            // token, bad request
            let reason = serde_json::from_str::<StripeErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            info!("Stripe declined charge: {}", reason);
            return Err(CheckoutError::PaymentDeclined { reason });
        }

        let charge: StripeChargeResponse = serde_json::from_str(&body).map_err(|e| {
            CheckoutError::PaymentGatewayUnreachable(format!(
                "failed to parse Stripe response: {e}"
            ))
        })?;

        if charge.status != "succeeded" {
            // Stripe can report a created-but-failed charge with HTTP 200
            let reason = charge
                .failure_message
                .unwrap_or_else(|| format!("charge status {}", charge.status));
            info!("Stripe charge not captured: {}", reason);
            return Err(CheckoutError::PaymentDeclined { reason });
        }

        info!(
            "Stripe charge captured: id={}, amount={}",
            charge.id, charge.amount
        );

        let created_at = charge
            .created
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now);

        Ok(GatewayCharge {
            charge_id: charge.id,
            amount: Money::from_minor(charge.amount, Self::parse_currency(&charge.currency)),
            created_at,
        })
    }

    fn gateway_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeChargeResponse {
    id: String,
    amount: i64,
    currency: String,
    status: String,
    #[serde(default)]
    failure_message: Option<String>,
    #[serde(default)]
    created: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
