//! # checkout-core
//!
//! Core types and workflow for the storefront checkout engine.
//!
//! This crate provides:
//! - `Money` and `Currency` for minor-unit amounts
//! - `Cart`/`CartLine` and the `CartAccessor` validation boundary
//! - `Order`, `OrderLine`, `Charge`, and the monotonic `OrderStatus` machine
//! - a pure pricing engine (`pricing::quote`)
//! - `OrderMaterializer` for the atomic cart-to-order conversion
//! - `SettlementCoordinator` for charging the payment gateway
//! - `NotificationDispatcher` for best-effort confirmations
//! - store/gateway/sender traits plus an in-memory store
//! - `CheckoutError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{MemoryStore, OrderMaterializer, RateBook, SettlementCoordinator};
//!
//! let store = Arc::new(MemoryStore::new());
//! let materializer = OrderMaterializer::new(store.clone(), store.clone(), rates);
//!
//! // Cart -> Order (atomic; consumes the cart)
//! let materialized = materializer
//!     .materialize("cart-1", "cust-1", "ground", "standard")
//!     .await?;
//!
//! // Order -> Charge (idempotent; at most one successful charge)
//! let coordinator = SettlementCoordinator::new(store, gateway, timeout);
//! let charge = coordinator.settle(&materialized.order.id, "tok_...").await?;
//! ```

pub mod cart;
pub mod error;
pub mod gateway;
pub mod materialize;
pub mod memory;
pub mod money;
pub mod notify;
pub mod order;
pub mod pricing;
pub mod rates;
pub mod settle;
pub mod store;

// Re-exports for convenience
pub use cart::{Cart, CartAccessor, CartLine};
pub use error::{CheckoutError, CheckoutResult, ErrorKind};
pub use gateway::{BoxedPaymentGateway, ChargeRequest, GatewayCharge, PaymentGateway};
pub use materialize::{MaterializedOrder, OrderMaterializer};
pub use memory::{FaultPoint, MemoryStore};
pub use money::{Currency, Money};
pub use notify::{
    BoxedConfirmationSender, Confirmation, ConfirmationSender, LoggingConfirmationSender,
    NotificationDispatcher, NotificationOutcome,
};
pub use order::{Charge, Order, OrderLine, OrderStatus};
pub use pricing::Quote;
pub use rates::{RateBook, ShippingOption, TaxOption, TaxPolicy};
pub use settle::SettlementCoordinator;
pub use store::{BoxedCartStore, BoxedOrderStore, CartStore, OrderStore};
