//! # Store Traits
//!
//! Persistence seams for the checkout workflow. The workflow components
//! depend on these traits only; the concrete store is injected by the
//! composition root. [`crate::memory::MemoryStore`] implements both.

use crate::cart::Cart;
use crate::error::CheckoutResult;
use crate::order::{Charge, Order, OrderLine, OrderStatus};
use async_trait::async_trait;
use std::sync::Arc;

/// Row-level read access to carts
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Fetch a cart with its line items. `None` when the cart does not
    /// exist or has already been consumed by an order.
    async fn fetch_cart(&self, cart_id: &str) -> CheckoutResult<Option<Cart>>;
}

/// Transactional order persistence.
///
/// `materialize_order` is the one indivisible unit of work in the system:
/// order row, line snapshots, and cart consumption commit together or not
/// at all. Settlement claims give per-order mutual exclusion without
/// holding any lock across the external gateway call.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Atomically insert the order and its line snapshots and consume the
    /// source cart. On failure no partial rows remain visible.
    ///
    /// Consume-once: fails with `CartNotFound` when the cart was already
    /// consumed by a concurrent materialization.
    async fn materialize_order(
        &self,
        order: &Order,
        lines: &[OrderLine],
        cart_id: &str,
    ) -> CheckoutResult<()>;

    /// Fetch an order by ID
    async fn fetch_order(&self, order_id: &str) -> CheckoutResult<Option<Order>>;

    /// Claim the exclusive right to settle this order (compare-and-set).
    ///
    /// Succeeds only when the order is in `Created` status and no other
    /// settlement attempt is in flight; otherwise fails with
    /// `OrderAlreadySettled`. This is the idempotency guard that makes
    /// double-charging impossible under concurrency.
    async fn claim_settlement(&self, order_id: &str) -> CheckoutResult<()>;

    /// Release a settlement claim after a non-definitive gateway outcome.
    /// The order stays `Created` and a later attempt may claim it again.
    async fn release_settlement(&self, order_id: &str) -> CheckoutResult<()>;

    /// Apply the terminal settlement outcome. `Paid` must carry the
    /// captured charge; `PaymentFailed` carries none. Enforces at most one
    /// successful charge per order and releases the claim.
    async fn settle_order(
        &self,
        order_id: &str,
        status: OrderStatus,
        charge: Option<&Charge>,
    ) -> CheckoutResult<()>;

    /// All charges recorded for an order (at most one under the current
    /// invariants; a `Vec` so reconciliation tooling can observe drift)
    async fn charges_for_order(&self, order_id: &str) -> CheckoutResult<Vec<Charge>>;
}

/// Type alias for an injected cart store
pub type BoxedCartStore = Arc<dyn CartStore>;

/// Type alias for an injected order store
pub type BoxedOrderStore = Arc<dyn OrderStore>;
