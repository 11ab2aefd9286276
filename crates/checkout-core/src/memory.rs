//! # In-Memory Store
//!
//! Reference implementation of [`CartStore`] and [`OrderStore`] over a
//! single `RwLock`. Used by the composition root and by every workflow
//! test.
//!
//! `materialize_order` is written as staged inserts with compensating
//! deletes rather than relying on the lock alone, so the all-or-nothing
//! contract is exercised the same way a store without multi-row commit
//! would have to implement it. Fault injection makes each stage failable
//! in tests.

use crate::cart::Cart;
use crate::error::{CheckoutError, CheckoutResult};
use crate::order::{Charge, Order, OrderLine, OrderStatus};
use crate::store::{CartStore, OrderStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Stage of the materialization unit of work at which an injected fault fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    /// Before the order row insert
    OrderInsert,
    /// After the order row insert, before the line snapshots
    LineInsert,
    /// After the line snapshots, before the cart is consumed
    CartConsume,
}

#[derive(Default)]
struct Inner {
    carts: HashMap<String, Cart>,
    orders: HashMap<String, OrderRow>,
    order_lines: HashMap<String, Vec<OrderLine>>,
    charges: HashMap<String, Vec<Charge>>,
    fault: Option<FaultPoint>,
}

struct OrderRow {
    order: Order,
    settlement_claimed: bool,
}

/// In-memory cart and order store
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a cart (seeding hook for the composition root and tests)
    pub async fn put_cart(&self, cart: Cart) {
        let mut inner = self.inner.write().await;
        inner.carts.insert(cart.id.clone(), cart);
    }

    /// Make the next `materialize_order` fail at the given stage (test support)
    pub async fn inject_fault(&self, point: FaultPoint) {
        let mut inner = self.inner.write().await;
        inner.fault = Some(point);
    }

    /// Whether a cart is still present (i.e. not yet consumed)
    pub async fn cart_exists(&self, cart_id: &str) -> bool {
        self.inner.read().await.carts.contains_key(cart_id)
    }

    /// Line snapshots persisted for an order (empty when the order has none
    /// or was rolled back)
    pub async fn order_lines(&self, order_id: &str) -> Vec<OrderLine> {
        self.inner
            .read()
            .await
            .order_lines
            .get(order_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of persisted order rows
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    fn fault_fires(inner: &mut Inner, point: FaultPoint) -> bool {
        if inner.fault == Some(point) {
            inner.fault = None;
            return true;
        }
        false
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn fetch_cart(&self, cart_id: &str) -> CheckoutResult<Option<Cart>> {
        Ok(self.inner.read().await.carts.get(cart_id).cloned())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn materialize_order(
        &self,
        order: &Order,
        lines: &[OrderLine],
        cart_id: &str,
    ) -> CheckoutResult<()> {
        let mut inner = self.inner.write().await;

        // Consume-once: a concurrent materialization that won the race has
        // already removed the cart.
        if !inner.carts.contains_key(cart_id) {
            return Err(CheckoutError::CartNotFound {
                cart_id: cart_id.to_string(),
            });
        }

        if inner.orders.contains_key(&order.id) {
            return Err(CheckoutError::OrderPersistenceFailed(format!(
                "duplicate order id {}",
                order.id
            )));
        }

        // Stage 1: order row
        if Self::fault_fires(&mut inner, FaultPoint::OrderInsert) {
            return Err(CheckoutError::OrderPersistenceFailed(
                "order insert failed".to_string(),
            ));
        }
        inner.orders.insert(
            order.id.clone(),
            OrderRow {
                order: order.clone(),
                settlement_claimed: false,
            },
        );

        // Stage 2: line snapshots; compensate the order row on failure
        if Self::fault_fires(&mut inner, FaultPoint::LineInsert) {
            inner.orders.remove(&order.id);
            return Err(CheckoutError::OrderPersistenceFailed(
                "line item insert failed".to_string(),
            ));
        }
        inner.order_lines.insert(order.id.clone(), lines.to_vec());

        // Stage 3: consume the cart; compensate both prior stages on failure
        if Self::fault_fires(&mut inner, FaultPoint::CartConsume) {
            inner.order_lines.remove(&order.id);
            inner.orders.remove(&order.id);
            return Err(CheckoutError::OrderPersistenceFailed(
                "cart consumption failed".to_string(),
            ));
        }
        inner.carts.remove(cart_id);

        Ok(())
    }

    async fn fetch_order(&self, order_id: &str) -> CheckoutResult<Option<Order>> {
        Ok(self
            .inner
            .read()
            .await
            .orders
            .get(order_id)
            .map(|row| row.order.clone()))
    }

    async fn claim_settlement(&self, order_id: &str) -> CheckoutResult<()> {
        let mut inner = self.inner.write().await;
        let row = inner
            .orders
            .get_mut(order_id)
            .ok_or_else(|| CheckoutError::OrderNotFound {
                order_id: order_id.to_string(),
            })?;

        if row.order.status != OrderStatus::Created || row.settlement_claimed {
            return Err(CheckoutError::OrderAlreadySettled {
                order_id: order_id.to_string(),
            });
        }

        row.settlement_claimed = true;
        Ok(())
    }

    async fn release_settlement(&self, order_id: &str) -> CheckoutResult<()> {
        let mut inner = self.inner.write().await;
        let row = inner
            .orders
            .get_mut(order_id)
            .ok_or_else(|| CheckoutError::OrderNotFound {
                order_id: order_id.to_string(),
            })?;

        row.settlement_claimed = false;
        Ok(())
    }

    async fn settle_order(
        &self,
        order_id: &str,
        status: OrderStatus,
        charge: Option<&Charge>,
    ) -> CheckoutResult<()> {
        let mut inner = self.inner.write().await;

        let current = inner
            .orders
            .get(order_id)
            .map(|row| row.order.status)
            .ok_or_else(|| CheckoutError::OrderNotFound {
                order_id: order_id.to_string(),
            })?;

        // Monotonic transitions only: nothing leaves a terminal status.
        if current != OrderStatus::Created {
            return Err(CheckoutError::OrderAlreadySettled {
                order_id: order_id.to_string(),
            });
        }

        match status {
            OrderStatus::Paid => {
                let charge = charge.ok_or_else(|| {
                    CheckoutError::OrderPersistenceFailed(
                        "paid transition requires a charge".to_string(),
                    )
                })?;
                let existing = inner.charges.entry(order_id.to_string()).or_default();
                if !existing.is_empty() {
                    return Err(CheckoutError::OrderAlreadySettled {
                        order_id: order_id.to_string(),
                    });
                }
                existing.push(charge.clone());
            }
            OrderStatus::PaymentFailed => {}
            OrderStatus::Created => {
                return Err(CheckoutError::OrderPersistenceFailed(
                    "created is not a settlement outcome".to_string(),
                ));
            }
        }

        if let Some(row) = inner.orders.get_mut(order_id) {
            row.order.status = status;
            row.settlement_claimed = false;
        }

        Ok(())
    }

    async fn charges_for_order(&self, order_id: &str) -> CheckoutResult<Vec<Charge>> {
        Ok(self
            .inner
            .read()
            .await
            .charges
            .get(order_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLine;
    use crate::money::{Currency, Money};
    use chrono::Utc;

    fn sample_cart(id: &str) -> Cart {
        Cart::new(id).with_line(CartLine::new(
            "p1",
            "Widget",
            2,
            Money::new(10.0, Currency::USD),
        ))
    }

    fn sample_order(total_minor: i64) -> (Order, Vec<OrderLine>) {
        let order = Order::new(
            "cust-1",
            "ground",
            "standard",
            Money::from_minor(total_minor, Currency::USD),
        );
        let lines = vec![OrderLine {
            product_id: "p1".into(),
            product_name: "Widget".into(),
            quantity: 2,
            unit_cost: Money::new(10.0, Currency::USD),
            subtotal: Money::new(20.0, Currency::USD),
        }];
        (order, lines)
    }

    fn sample_charge(order_id: &str) -> Charge {
        Charge {
            id: "ch_test_1".into(),
            order_id: order_id.into(),
            amount: Money::from_minor(2900, Currency::USD),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_materialize_consumes_cart() {
        let store = MemoryStore::new();
        store.put_cart(sample_cart("c1")).await;
        let (order, lines) = sample_order(2900);

        store.materialize_order(&order, &lines, "c1").await.unwrap();

        assert!(!store.cart_exists("c1").await);
        assert_eq!(store.order_lines(&order.id).await.len(), 1);
        assert_eq!(
            store.fetch_order(&order.id).await.unwrap().unwrap().status,
            OrderStatus::Created
        );
    }

    #[tokio::test]
    async fn test_materialize_twice_from_same_cart_fails() {
        let store = MemoryStore::new();
        store.put_cart(sample_cart("c1")).await;

        let (first, lines) = sample_order(2900);
        store.materialize_order(&first, &lines, "c1").await.unwrap();

        let (second, lines) = sample_order(2900);
        let err = store
            .materialize_order(&second, &lines, "c1")
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::CartNotFound { .. }));
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn test_line_insert_fault_compensates_order_row() {
        let store = MemoryStore::new();
        store.put_cart(sample_cart("c1")).await;
        store.inject_fault(FaultPoint::LineInsert).await;

        let (order, lines) = sample_order(2900);
        let err = store
            .materialize_order(&order, &lines, "c1")
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::OrderPersistenceFailed(_)));
        // All-or-nothing: no partial rows, cart untouched
        assert_eq!(store.order_count().await, 0);
        assert!(store.order_lines(&order.id).await.is_empty());
        assert!(store.cart_exists("c1").await);
    }

    #[tokio::test]
    async fn test_cart_consume_fault_compensates_everything() {
        let store = MemoryStore::new();
        store.put_cart(sample_cart("c1")).await;
        store.inject_fault(FaultPoint::CartConsume).await;

        let (order, lines) = sample_order(2900);
        assert!(store.materialize_order(&order, &lines, "c1").await.is_err());

        assert_eq!(store.order_count().await, 0);
        assert!(store.order_lines(&order.id).await.is_empty());
        assert!(store.cart_exists("c1").await);

        // The fault is one-shot; the retry succeeds.
        let (order, lines) = sample_order(2900);
        store.materialize_order(&order, &lines, "c1").await.unwrap();
        assert!(!store.cart_exists("c1").await);
    }

    #[tokio::test]
    async fn test_claim_is_exclusive() {
        let store = MemoryStore::new();
        store.put_cart(sample_cart("c1")).await;
        let (order, lines) = sample_order(2900);
        store.materialize_order(&order, &lines, "c1").await.unwrap();

        store.claim_settlement(&order.id).await.unwrap();
        let err = store.claim_settlement(&order.id).await.unwrap_err();
        assert!(matches!(err, CheckoutError::OrderAlreadySettled { .. }));

        // Released claims can be re-acquired (transient gateway outcome path)
        store.release_settlement(&order.id).await.unwrap();
        store.claim_settlement(&order.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_settle_enforces_single_charge_and_monotonic_status() {
        let store = MemoryStore::new();
        store.put_cart(sample_cart("c1")).await;
        let (order, lines) = sample_order(2900);
        store.materialize_order(&order, &lines, "c1").await.unwrap();

        store.claim_settlement(&order.id).await.unwrap();
        store
            .settle_order(&order.id, OrderStatus::Paid, Some(&sample_charge(&order.id)))
            .await
            .unwrap();

        assert_eq!(
            store.fetch_order(&order.id).await.unwrap().unwrap().status,
            OrderStatus::Paid
        );
        assert_eq!(store.charges_for_order(&order.id).await.unwrap().len(), 1);

        // No transition out of Paid, no second charge
        let err = store
            .settle_order(&order.id, OrderStatus::PaymentFailed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::OrderAlreadySettled { .. }));
        assert_eq!(store.charges_for_order(&order.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_paid_requires_a_charge() {
        let store = MemoryStore::new();
        store.put_cart(sample_cart("c1")).await;
        let (order, lines) = sample_order(2900);
        store.materialize_order(&order, &lines, "c1").await.unwrap();

        let err = store
            .settle_order(&order.id, OrderStatus::Paid, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::OrderPersistenceFailed(_)));
    }
}
