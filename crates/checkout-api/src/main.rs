//! # Storefront Checkout
//!
//! Cart-to-order checkout service.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export NOTIFY_RELAY_URL=https://relay.internal/send   # optional
//!
//! # Run the server
//! storefront-checkout
//! ```

use checkout_api::{routes, state::AppState};
use checkout_core::{Cart, CartLine, Currency, Money};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!(
        "Rates loaded: {} shipping options, {} tax options",
        state.rates.shipping.len(),
        state.rates.taxes.len()
    );

    if !is_prod {
        seed_demo_cart(&state).await;
    }

    let app = routes::create_router(state);

    info!("Storefront checkout starting on http://{}", addr);

    if !is_prod {
        info!("Health:   GET  http://{}/health", addr);
        info!(
            "Checkout: POST http://{}/api/v1/carts/{{cart_id}}/checkout",
            addr
        );
        info!(
            "Payment:  POST http://{}/api/v1/orders/{{order_id}}/payment",
            addr
        );
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Seed a known cart so the checkout endpoint is exercisable out of the box
/// (add-to-cart lives upstream; the in-memory store starts empty otherwise).
async fn seed_demo_cart(state: &AppState) {
    let cart = Cart::new("demo-cart")
        .with_line(CartLine::new(
            "prod-widget",
            "Widget",
            2,
            Money::new(10.0, Currency::USD),
        ))
        .with_line(
            CartLine::new("prod-gadget", "Gadget", 1, Money::new(5.0, Currency::USD))
                .with_discount(Money::new(4.0, Currency::USD)),
        );
    state.store.put_cart(cart).await;
    info!("Seeded demo cart 'demo-cart' (2x Widget, 1x Gadget)");
}
