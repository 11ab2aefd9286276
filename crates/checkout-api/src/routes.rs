//! # Routes
//!
//! Axum router configuration for the checkout API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /health - Health check
/// - POST /api/v1/carts/{cart_id}/checkout - Materialize an order from a cart
/// - POST /api/v1/orders/{order_id}/payment - Settle payment for an order
pub fn create_router(state: AppState) -> Router {
    // Allow all origins: the storefront frontends are served from
    // per-brand domains that are not known at build time
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/carts/{cart_id}/checkout", post(handlers::checkout_cart))
        .route("/orders/{order_id}/payment", post(handlers::settle_payment));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use async_trait::async_trait;
    use axum_test::TestServer;
    use checkout_core::{
        Cart, CartLine, ChargeRequest, CheckoutError, CheckoutResult, Confirmation,
        ConfirmationSender, Currency, GatewayCharge, LoggingConfirmationSender, MemoryStore,
        Money, OrderStore, PaymentGateway, RateBook,
    };
    use serde_json::json;
    use std::sync::Arc;

    const RATES: &str = r#"
[[shipping]]
id = "ground"
label = "Ground"
cost_minor = 300

[[taxes]]
id = "flat-two"
label = "Flat two dollars"
policy = { type = "flat", amount_minor = 200 }
"#;

    struct ApprovingGateway;

    #[async_trait]
    impl PaymentGateway for ApprovingGateway {
        async fn charge(&self, request: &ChargeRequest) -> CheckoutResult<GatewayCharge> {
            Ok(GatewayCharge {
                charge_id: "ch_test_1".to_string(),
                amount: request.amount.clone(),
                created_at: chrono::Utc::now(),
            })
        }

        fn gateway_name(&self) -> &'static str {
            "approving-stub"
        }
    }

    struct DecliningGateway;

    #[async_trait]
    impl PaymentGateway for DecliningGateway {
        async fn charge(&self, _request: &ChargeRequest) -> CheckoutResult<GatewayCharge> {
            Err(CheckoutError::PaymentDeclined {
                reason: "card_declined".to_string(),
            })
        }

        fn gateway_name(&self) -> &'static str {
            "declining-stub"
        }
    }

    struct RefusingSender;

    #[async_trait]
    impl ConfirmationSender for RefusingSender {
        async fn send(&self, _confirmation: &Confirmation) -> CheckoutResult<()> {
            Err(CheckoutError::NotificationFailed("relay down".to_string()))
        }

        fn transport_name(&self) -> &'static str {
            "refusing-stub"
        }
    }

    fn test_config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            gateway_timeout_secs: 5,
            notify_timeout_secs: 5,
        }
    }

    async fn server_with(
        gateway: Arc<dyn PaymentGateway>,
        sender: Arc<dyn ConfirmationSender>,
    ) -> (TestServer, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let cart = Cart::new("cart-1")
            .with_line(CartLine::new(
                "prod-1",
                "Widget",
                2,
                Money::new(10.0, Currency::USD),
            ))
            .with_line(
                CartLine::new("prod-2", "Gadget", 1, Money::new(5.0, Currency::USD))
                    .with_discount(Money::new(4.0, Currency::USD)),
            );
        store.put_cart(cart).await;

        let state = AppState::with_collaborators(
            store.clone(),
            RateBook::from_toml(RATES).unwrap(),
            gateway,
            sender,
            test_config(),
        );
        let server = TestServer::new(create_router(state)).unwrap();
        (server, store)
    }

    async fn checkout_order_id(server: &TestServer) -> String {
        let response = server
            .post("/api/v1/carts/cart-1/checkout")
            .json(&json!({
                "customer_id": "cust-1",
                "shipping_id": "ground",
                "tax_id": "flat-two"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<serde_json::Value>()["order_id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (server, _) =
            server_with(Arc::new(ApprovingGateway), Arc::new(LoggingConfirmationSender)).await;

        let response = server.get("/health").await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<serde_json::Value>()["status"],
            json!("healthy")
        );
    }

    #[tokio::test]
    async fn test_checkout_returns_priced_order() {
        let (server, _) =
            server_with(Arc::new(ApprovingGateway), Arc::new(LoggingConfirmationSender)).await;

        let response = server
            .post("/api/v1/carts/cart-1/checkout")
            .json(&json!({
                "customer_id": "cust-1",
                "shipping_id": "ground",
                "tax_id": "flat-two"
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let body = response.json::<serde_json::Value>();
        // 2 x $10 + $4 (discounted from $5) + $3 shipping + $2 flat tax
        assert_eq!(body["total_minor"], json!(2900));
        assert_eq!(body["total"], json!("$29.00"));
        assert_eq!(body["status"], json!("created"));
    }

    #[tokio::test]
    async fn test_checkout_unknown_cart_is_404() {
        let (server, _) =
            server_with(Arc::new(ApprovingGateway), Arc::new(LoggingConfirmationSender)).await;

        let response = server
            .post("/api/v1/carts/missing/checkout")
            .json(&json!({
                "customer_id": "cust-1",
                "shipping_id": "ground",
                "tax_id": "flat-two"
            }))
            .await;

        response.assert_status(axum::http::StatusCode::NOT_FOUND);
        assert_eq!(
            response.json::<serde_json::Value>()["code"],
            json!("cart_not_found")
        );
    }

    #[tokio::test]
    async fn test_checkout_consumes_cart() {
        let (server, store) =
            server_with(Arc::new(ApprovingGateway), Arc::new(LoggingConfirmationSender)).await;

        checkout_order_id(&server).await;
        assert!(!store.cart_exists("cart-1").await);

        // Second attempt against the same cart must fail
        let response = server
            .post("/api/v1/carts/cart-1/checkout")
            .json(&json!({
                "customer_id": "cust-1",
                "shipping_id": "ground",
                "tax_id": "flat-two"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_payment_settles_order() {
        let (server, store) =
            server_with(Arc::new(ApprovingGateway), Arc::new(LoggingConfirmationSender)).await;

        let order_id = checkout_order_id(&server).await;
        let response = server
            .post(&format!("/api/v1/orders/{order_id}/payment"))
            .json(&json!({ "payment_token": "tok_visa" }))
            .await;

        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["charge_id"], json!("ch_test_1"));
        assert_eq!(body["status"], json!("paid"));
        assert_eq!(body["amount_minor"], json!(2900));
        assert!(body.get("notification_warning").is_none());

        let order = store.fetch_order(&order_id).await.unwrap().unwrap();
        assert!(order.status.is_terminal());
    }

    #[tokio::test]
    async fn test_declined_payment_is_402() {
        let (server, store) =
            server_with(Arc::new(DecliningGateway), Arc::new(LoggingConfirmationSender)).await;

        let order_id = checkout_order_id(&server).await;
        let response = server
            .post(&format!("/api/v1/orders/{order_id}/payment"))
            .json(&json!({ "payment_token": "tok_chargeDeclined" }))
            .await;

        response.assert_status(axum::http::StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            response.json::<serde_json::Value>()["code"],
            json!("payment_declined")
        );
        assert_eq!(store.charges_for_order(&order_id).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_second_settlement_is_conflict() {
        let (server, _) =
            server_with(Arc::new(ApprovingGateway), Arc::new(LoggingConfirmationSender)).await;

        let order_id = checkout_order_id(&server).await;
        server
            .post(&format!("/api/v1/orders/{order_id}/payment"))
            .json(&json!({ "payment_token": "tok_visa" }))
            .await
            .assert_status_ok();

        let response = server
            .post(&format!("/api/v1/orders/{order_id}/payment"))
            .json(&json!({ "payment_token": "tok_visa" }))
            .await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_failed_notification_is_warning_not_error() {
        let (server, store) =
            server_with(Arc::new(ApprovingGateway), Arc::new(RefusingSender)).await;

        let order_id = checkout_order_id(&server).await;
        let response = server
            .post(&format!("/api/v1/orders/{order_id}/payment"))
            .json(&json!({
                "payment_token": "tok_visa",
                "email": "customer@example.test"
            }))
            .await;

        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert!(body["notification_warning"]
            .as_str()
            .unwrap()
            .contains("relay down"));

        // Payment stands regardless of the relay
        let order = store.fetch_order(&order_id).await.unwrap().unwrap();
        assert_eq!(order.status.as_str(), "paid");
        assert_eq!(store.charges_for_order(&order_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_payment_token_is_400() {
        let (server, _) =
            server_with(Arc::new(ApprovingGateway), Arc::new(LoggingConfirmationSender)).await;

        let order_id = checkout_order_id(&server).await;
        let response = server
            .post(&format!("/api/v1/orders/{order_id}/payment"))
            .json(&json!({ "payment_token": " " }))
            .await;

        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }
}
