//! # Order Materializer
//!
//! The linchpin operation of checkout: convert a validated cart into a
//! persisted order with line snapshots, consuming the cart in the same
//! unit of work. Pricing happens exactly once here; the stored total is
//! authoritative from then on.

use crate::cart::CartAccessor;
use crate::error::{CheckoutError, CheckoutResult};
use crate::order::Order;
use crate::pricing::{self, Quote};
use crate::rates::RateBook;
use crate::store::{BoxedCartStore, BoxedOrderStore};
use tracing::{info, instrument};

/// The result of a successful materialization: the persisted order (status
/// `created`) and the priced breakdown it was built from.
#[derive(Debug, Clone)]
pub struct MaterializedOrder {
    /// The persisted order
    pub order: Order,

    /// The quote the order total was computed from; `quote.lines` are the
    /// persisted line snapshots
    pub quote: Quote,
}

/// Converts carts into orders
pub struct OrderMaterializer {
    carts: CartAccessor,
    orders: BoxedOrderStore,
    rates: RateBook,
}

impl OrderMaterializer {
    /// Create a materializer over the given stores and rate tables
    pub fn new(carts: BoxedCartStore, orders: BoxedOrderStore, rates: RateBook) -> Self {
        Self {
            carts: CartAccessor::new(carts),
            orders,
            rates,
        }
    }

    /// Materialize an order from a cart.
    ///
    /// Resolves the shipping and tax selections, prices the cart, and
    /// performs the atomic order+lines+cart-consumption write. Fails with
    /// `CartNotFound` / `EmptyCart` / `ShippingNotFound` / `TaxNotFound`
    /// on bad references and `OrderPersistenceFailed` when the store could
    /// not commit (in which case no partial rows remain).
    #[instrument(skip(self), fields(cart_id, customer_id))]
    pub async fn materialize(
        &self,
        cart_id: &str,
        customer_id: &str,
        shipping_id: &str,
        tax_id: &str,
    ) -> CheckoutResult<MaterializedOrder> {
        let cart = self.carts.load_validated(cart_id).await?;

        let shipping =
            self.rates
                .shipping(shipping_id)
                .ok_or_else(|| CheckoutError::ShippingNotFound {
                    shipping_id: shipping_id.to_string(),
                })?;
        let tax = self
            .rates
            .tax(tax_id)
            .ok_or_else(|| CheckoutError::TaxNotFound {
                tax_id: tax_id.to_string(),
            })?;

        let quote = pricing::quote(&cart, shipping, tax)?;
        let order = Order::new(customer_id, shipping_id, tax_id, quote.total.clone());

        self.orders
            .materialize_order(&order, &quote.lines, cart_id)
            .await?;

        info!(
            "Materialized order {} from cart {}: {} items, total {}",
            order.id,
            cart_id,
            cart.item_count(),
            order.total.display()
        );

        Ok(MaterializedOrder { order, quote })
    }
}
