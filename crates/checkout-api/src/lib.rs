//! # checkout-api
//!
//! HTTP layer for the storefront checkout engine: an axum service exposing
//! the cart-to-order and order-to-payment endpoints over the workflow
//! components in `checkout-core`.

pub mod handlers;
pub mod routes;
pub mod state;
