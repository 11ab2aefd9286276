//! # Application State
//!
//! Composition root for the checkout service. Collaborators (store, rate
//! book, payment gateway, confirmation transport) are constructed once
//! here and injected into the workflow components; nothing in the workflow
//! owns a global client.

use checkout_core::{
    BoxedConfirmationSender, BoxedPaymentGateway, LoggingConfirmationSender, MemoryStore,
    NotificationDispatcher, OrderMaterializer, RateBook, SettlementCoordinator,
};
use checkout_notify::HttpConfirmationSender;
use checkout_stripe::StripeChargeGateway;
use std::sync::Arc;
use std::time::Duration;

/// Rate tables used when no config/rates.toml is found
const DEFAULT_RATES: &str = r#"
[[shipping]]
id = "ground"
label = "Ground (5-7 days)"
cost_minor = 300

[[shipping]]
id = "express"
label = "Express (2 days)"
cost_minor = 1200

[[taxes]]
id = "standard"
label = "Standard sales tax"
policy = { type = "rate", percent = 8.5 }

[[taxes]]
id = "exempt"
label = "Tax exempt"
policy = { type = "flat", amount_minor = 0 }
"#;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Upper bound on one gateway charge call
    pub gateway_timeout_secs: u64,
    /// Upper bound on one confirmation send
    pub notify_timeout_secs: u64,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            gateway_timeout_secs: std::env::var("GATEWAY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            notify_timeout_secs: std::env::var("NOTIFY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Cart and order store
    pub store: Arc<MemoryStore>,
    /// Shipping and tax tables
    pub rates: RateBook,
    /// Cart-to-order conversion
    pub materializer: Arc<OrderMaterializer>,
    /// Order settlement against the gateway
    pub coordinator: Arc<SettlementCoordinator>,
    /// Post-settlement confirmation dispatch
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create production state: Stripe gateway from env, HTTP confirmation
    /// relay when `NOTIFY_RELAY_URL` is set (log-only transport otherwise).
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let rates = load_rate_book()?;

        let gateway: BoxedPaymentGateway = Arc::new(
            StripeChargeGateway::from_env()
                .map_err(|e| anyhow::anyhow!("failed to initialize Stripe: {e}"))?,
        );

        let sender: BoxedConfirmationSender = match HttpConfirmationSender::from_env() {
            Ok(sender) => Arc::new(sender),
            Err(_) => {
                tracing::warn!("NOTIFY_RELAY_URL not set, confirmations will only be logged");
                Arc::new(LoggingConfirmationSender)
            }
        };

        Ok(Self::with_collaborators(
            Arc::new(MemoryStore::new()),
            rates,
            gateway,
            sender,
            config,
        ))
    }

    /// Wire the workflow over explicit collaborators (tests inject stubs here)
    pub fn with_collaborators(
        store: Arc<MemoryStore>,
        rates: RateBook,
        gateway: BoxedPaymentGateway,
        sender: BoxedConfirmationSender,
        config: AppConfig,
    ) -> Self {
        let materializer = Arc::new(OrderMaterializer::new(
            store.clone(),
            store.clone(),
            rates.clone(),
        ));
        let coordinator = Arc::new(SettlementCoordinator::new(
            store.clone(),
            gateway,
            Duration::from_secs(config.gateway_timeout_secs),
        ));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            sender,
            Duration::from_secs(config.notify_timeout_secs),
        ));

        Self {
            store,
            rates,
            materializer,
            coordinator,
            dispatcher,
            config,
        }
    }
}

/// Load rate tables from config/rates.toml, falling back to the embedded default
fn load_rate_book() -> anyhow::Result<RateBook> {
    let config_paths = [
        "config/rates.toml",
        "../config/rates.toml",
        "../../config/rates.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let book = RateBook::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("failed to parse {path}: {e}"))?;
            tracing::info!(
                "Loaded {} shipping and {} tax options from {}",
                book.shipping.len(),
                book.taxes.len(),
                path
            );
            return Ok(book);
        }
    }

    tracing::warn!("No rates config found, using embedded defaults");
    Ok(RateBook::from_toml(DEFAULT_RATES)
        .map_err(|e| anyhow::anyhow!("embedded rates are invalid: {e}"))?)
}
