//! # checkout-stripe
//!
//! Stripe implementation of the checkout engine's payment gateway seam.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_stripe::StripeChargeGateway;
//! use checkout_core::PaymentGateway;
//!
//! // Create gateway from environment (STRIPE_SECRET_KEY)
//! let gateway = StripeChargeGateway::from_env()?;
//!
//! // One charge per settlement attempt
//! let charge = gateway.charge(&request).await?;
//! ```

pub mod charge;
pub mod config;

// Re-exports
pub use charge::StripeChargeGateway;
pub use config::StripeConfig;
