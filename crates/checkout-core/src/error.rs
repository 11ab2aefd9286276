//! # Checkout Error Types
//!
//! Typed error handling for the checkout workflow.
//! All checkout operations return `Result<T, CheckoutError>`.
//!
//! Every variant carries a stable machine-readable code (see [`CheckoutError::code`])
//! and maps into one of five classes (see [`ErrorKind`]): validation, not-found,
//! conflict, transient, and permanent. Callers use the class to decide whether a
//! retry makes sense; the payment settlement coordinator never retries on its own.

use thiserror::Error;

/// Broad classification of a checkout failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input shape (missing field, zero quantity, empty cart)
    Validation,
    /// Referenced cart/order/shipping/tax option is absent
    NotFound,
    /// The operation conflicts with current state (already-settled order)
    Conflict,
    /// Temporary failure; the caller may retry
    Transient,
    /// Definitive failure; retrying with the same inputs will not help
    Permanent,
}

/// Core error type for all checkout operations
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Configuration errors (missing env vars, bad rate tables)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data at the API boundary
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cart contents violate pricing preconditions (e.g. zero quantity)
    #[error("Invalid cart state: {message}")]
    InvalidCartState { message: String },

    /// Cart absent (never created, or already consumed by an order)
    #[error("Cart not found: {cart_id}")]
    CartNotFound { cart_id: String },

    /// Cart exists but holds no line items
    #[error("Cart is empty: {cart_id}")]
    EmptyCart { cart_id: String },

    /// Referenced shipping option does not exist
    #[error("Shipping option not found: {shipping_id}")]
    ShippingNotFound { shipping_id: String },

    /// Referenced tax option does not exist
    #[error("Tax option not found: {tax_id}")]
    TaxNotFound { tax_id: String },

    /// Order absent
    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: String },

    /// Order is no longer in `created` status, or a settlement attempt
    /// is already in flight for it
    #[error("Order already settled: {order_id}")]
    OrderAlreadySettled { order_id: String },

    /// Storage-layer failure during order materialization; the store has
    /// rolled back, no partial rows remain
    #[error("Order persistence failed: {0}")]
    OrderPersistenceFailed(String),

    /// Storage temporarily unreachable (timeout, connection loss)
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Gateway gave a definitive decline (bad card, expired token)
    #[error("Payment declined: {reason}")]
    PaymentDeclined { reason: String },

    /// No definitive gateway response (network error, timeout, 5xx);
    /// the order stays `created` and the caller may retry
    #[error("Payment gateway unreachable: {0}")]
    PaymentGatewayUnreachable(String),

    /// Confirmation send failed; never escalated past a warning
    #[error("Notification failed: {0}")]
    NotificationFailed(String),
}

impl CheckoutError {
    /// Classify this error: validation / not-found / conflict /
    /// transient / permanent.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::Configuration(_) => ErrorKind::Permanent,
            CheckoutError::InvalidRequest(_) => ErrorKind::Validation,
            CheckoutError::InvalidCartState { .. } => ErrorKind::Validation,
            CheckoutError::EmptyCart { .. } => ErrorKind::Validation,
            CheckoutError::CartNotFound { .. } => ErrorKind::NotFound,
            CheckoutError::ShippingNotFound { .. } => ErrorKind::NotFound,
            CheckoutError::TaxNotFound { .. } => ErrorKind::NotFound,
            CheckoutError::OrderNotFound { .. } => ErrorKind::NotFound,
            CheckoutError::OrderAlreadySettled { .. } => ErrorKind::Conflict,
            CheckoutError::OrderPersistenceFailed(_) => ErrorKind::Permanent,
            CheckoutError::StoreUnavailable(_) => ErrorKind::Transient,
            CheckoutError::PaymentDeclined { .. } => ErrorKind::Permanent,
            CheckoutError::PaymentGatewayUnreachable(_) => ErrorKind::Transient,
            CheckoutError::NotificationFailed(_) => ErrorKind::Transient,
        }
    }

    /// Stable machine-readable code for structured error responses
    pub fn code(&self) -> &'static str {
        match self {
            CheckoutError::Configuration(_) => "configuration_error",
            CheckoutError::InvalidRequest(_) => "invalid_request",
            CheckoutError::InvalidCartState { .. } => "invalid_cart_state",
            CheckoutError::CartNotFound { .. } => "cart_not_found",
            CheckoutError::EmptyCart { .. } => "empty_cart",
            CheckoutError::ShippingNotFound { .. } => "shipping_not_found",
            CheckoutError::TaxNotFound { .. } => "tax_not_found",
            CheckoutError::OrderNotFound { .. } => "order_not_found",
            CheckoutError::OrderAlreadySettled { .. } => "order_already_settled",
            CheckoutError::OrderPersistenceFailed(_) => "order_persistence_failed",
            CheckoutError::StoreUnavailable(_) => "store_unavailable",
            CheckoutError::PaymentDeclined { .. } => "payment_declined",
            CheckoutError::PaymentGatewayUnreachable(_) => "payment_gateway_unreachable",
            CheckoutError::NotificationFailed(_) => "notification_failed",
        }
    }

    /// Returns true if the caller may retry the same operation
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transient)
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CheckoutError::Configuration(_) => 500,
            CheckoutError::InvalidRequest(_) => 400,
            CheckoutError::InvalidCartState { .. } => 422,
            CheckoutError::CartNotFound { .. } => 404,
            CheckoutError::EmptyCart { .. } => 422,
            CheckoutError::ShippingNotFound { .. } => 404,
            CheckoutError::TaxNotFound { .. } => 404,
            CheckoutError::OrderNotFound { .. } => 404,
            CheckoutError::OrderAlreadySettled { .. } => 409,
            CheckoutError::OrderPersistenceFailed(_) => 500,
            CheckoutError::StoreUnavailable(_) => 503,
            CheckoutError::PaymentDeclined { .. } => 402,
            CheckoutError::PaymentGatewayUnreachable(_) => 503,
            CheckoutError::NotificationFailed(_) => 502,
        }
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(CheckoutError::PaymentGatewayUnreachable("timeout".into()).is_retryable());
        assert!(CheckoutError::StoreUnavailable("pool exhausted".into()).is_retryable());
        assert!(!CheckoutError::PaymentDeclined {
            reason: "expired card".into()
        }
        .is_retryable());
        assert!(!CheckoutError::EmptyCart {
            cart_id: "c1".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            CheckoutError::OrderAlreadySettled {
                order_id: "o1".into()
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            CheckoutError::ShippingNotFound {
                shipping_id: "s1".into()
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CheckoutError::OrderPersistenceFailed("constraint".into()).kind(),
            ErrorKind::Permanent
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CheckoutError::CartNotFound {
                cart_id: "c1".into()
            }
            .status_code(),
            404
        );
        assert_eq!(
            CheckoutError::PaymentDeclined {
                reason: "x".into()
            }
            .status_code(),
            402
        );
        assert_eq!(
            CheckoutError::OrderAlreadySettled {
                order_id: "o1".into()
            }
            .status_code(),
            409
        );
    }

    #[test]
    fn test_stable_codes() {
        assert_eq!(
            CheckoutError::EmptyCart {
                cart_id: "c1".into()
            }
            .code(),
            "empty_cart"
        );
        assert_eq!(
            CheckoutError::PaymentGatewayUnreachable("down".into()).code(),
            "payment_gateway_unreachable"
        );
    }
}
