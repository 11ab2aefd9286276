//! # Request Handlers
//!
//! Axum request handlers for the checkout API: one endpoint to materialize
//! an order from a cart, one to settle payment for it. Errors carry the
//! stable machine-readable codes from `CheckoutError::code()`.

use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use checkout_core::{CheckoutError, OrderStore};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Materialize an order from a cart
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Authenticated customer reference (session issuance is out of scope;
    /// the upstream gateway injects this)
    pub customer_id: String,
    /// Selected shipping option
    pub shipping_id: String,
    /// Selected tax option
    pub tax_id: String,
}

/// Created order summary
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Order ID to settle against
    pub order_id: String,
    /// Order status (always "created" here)
    pub status: String,
    /// Authoritative total in minor units
    pub total_minor: i64,
    /// Display total (e.g. "$29.00")
    pub total: String,
    /// ISO currency code
    pub currency: String,
}

/// Settle payment for an order
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    /// Gateway payment token (never raw card material)
    pub payment_token: String,
    /// Optional confirmation recipient override; no confirmation is sent
    /// when absent
    #[serde(default)]
    pub email: Option<String>,
}

/// Settled payment summary. Exposes only the gateway charge reference and
/// amounts; card material is never stored or echoed.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Gateway charge identifier
    pub charge_id: String,
    /// Order that was settled
    pub order_id: String,
    /// Order status after settlement (always "paid" here)
    pub status: String,
    /// Captured amount in minor units
    pub amount_minor: i64,
    /// Display amount
    pub amount: String,
    /// ISO currency code
    pub currency: String,
    /// Present when the confirmation could not be delivered; the payment
    /// itself still succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_warning: Option<String>,
}

/// Structured error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Stable machine-readable code (e.g. "empty_cart")
    pub code: &'static str,
    /// HTTP status, duplicated in the body for log correlation
    pub status: u16,
}

fn error_to_response(err: CheckoutError) -> (StatusCode, Json<ErrorResponse>) {
    let status = err.status_code();
    let response = ErrorResponse {
        error: err.to_string(),
        code: err.code(),
        status,
    };
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

fn require_field(value: &str, name: &str) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    if value.trim().is_empty() {
        return Err(error_to_response(CheckoutError::InvalidRequest(format!(
            "{name} must not be empty"
        ))));
    }
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "storefront-checkout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Materialize an order from a cart.
///
/// `POST /api/v1/carts/{cart_id}/checkout`
#[instrument(skip(state, request), fields(cart_id = %cart_id))]
pub async fn checkout_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), (StatusCode, Json<ErrorResponse>)> {
    require_field(&request.customer_id, "customer_id")?;
    require_field(&request.shipping_id, "shipping_id")?;
    require_field(&request.tax_id, "tax_id")?;

    let materialized = state
        .materializer
        .materialize(
            &cart_id,
            &request.customer_id,
            &request.shipping_id,
            &request.tax_id,
        )
        .await
        .map_err(error_to_response)?;

    let order = materialized.order;
    info!("Checkout created order {} from cart {}", order.id, cart_id);

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order_id: order.id,
            status: order.status.as_str().to_string(),
            total_minor: order.total.amount,
            total: order.total.display(),
            currency: order.total.currency.to_string(),
        }),
    ))
}

/// Settle payment for a materialized order.
///
/// `POST /api/v1/orders/{order_id}/payment`
///
/// A settled charge with a failed confirmation is still a success; the
/// response carries `notification_warning` instead of an error.
#[instrument(skip(state, request), fields(order_id = %order_id))]
pub async fn settle_payment(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<PaymentResponse>, (StatusCode, Json<ErrorResponse>)> {
    require_field(&request.payment_token, "payment_token")?;

    let charge = state
        .coordinator
        .settle(&order_id, &request.payment_token)
        .await
        .map_err(error_to_response)?;

    let notification_warning = match &request.email {
        Some(email) => {
            // The order is terminal at this point; refetch for the dispatcher
            let order = state
                .store
                .fetch_order(&order_id)
                .await
                .map_err(error_to_response)?
                .ok_or_else(|| {
                    error_to_response(CheckoutError::OrderNotFound {
                        order_id: order_id.clone(),
                    })
                })?;
            state
                .dispatcher
                .dispatch(&order, &charge, email)
                .await
                .warning()
                .map(str::to_string)
        }
        None => None,
    };

    Ok(Json(PaymentResponse {
        charge_id: charge.id,
        order_id: charge.order_id,
        status: "paid".to_string(),
        amount_minor: charge.amount.amount,
        amount: charge.amount.display(),
        currency: charge.amount.currency.to_string(),
        notification_warning,
    }))
}
