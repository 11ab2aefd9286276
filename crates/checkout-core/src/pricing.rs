//! # Pricing Engine
//!
//! Pure computation of line subtotals and the order total from a cart, a
//! shipping option, and a tax option. No side effects, no clock, no store:
//! the same inputs always produce the same quote, which is what makes the
//! materializer deterministic to test.
//!
//! Rules:
//! - per-line subtotal = quantity x effective unit price, where the
//!   discounted price is used only when present, non-negative, and lower
//!   than the unit price;
//! - tax applies to the item-subtotal sum, never to shipping;
//! - total = item subtotals + shipping cost + tax amount.

use crate::cart::Cart;
use crate::error::{CheckoutError, CheckoutResult};
use crate::money::Money;
use crate::order::OrderLine;
use crate::rates::{ShippingOption, TaxOption};

/// A fully priced cart: the per-line snapshots plus the order-level sums.
/// The `lines` here become the order's line items verbatim.
#[derive(Debug, Clone)]
pub struct Quote {
    /// Per-line snapshots (name, quantity, effective unit cost, subtotal)
    pub lines: Vec<OrderLine>,

    /// Sum of line subtotals, before shipping and tax
    pub items_subtotal: Money,

    /// Flat shipping cost
    pub shipping_cost: Money,

    /// Tax on the item-subtotal sum
    pub tax_amount: Money,

    /// items_subtotal + shipping_cost + tax_amount
    pub total: Money,
}

/// Price a cart against the selected shipping and tax options.
///
/// Fails with `InvalidCartState` when any line has zero quantity.
pub fn quote(cart: &Cart, shipping: &ShippingOption, tax: &TaxOption) -> CheckoutResult<Quote> {
    let currency = cart
        .lines
        .first()
        .map(|l| l.unit_price.currency)
        .unwrap_or_default();

    let mut lines = Vec::with_capacity(cart.lines.len());
    let mut items_subtotal = Money::zero(currency);

    for line in &cart.lines {
        if line.quantity == 0 {
            return Err(CheckoutError::InvalidCartState {
                message: format!("line {} has zero quantity", line.product_id),
            });
        }

        let unit_cost = line.effective_unit_price();
        let subtotal = unit_cost.times(line.quantity);
        items_subtotal = items_subtotal.plus(&subtotal);

        lines.push(OrderLine {
            product_id: line.product_id.clone(),
            product_name: line.name.clone(),
            quantity: line.quantity,
            unit_cost,
            subtotal,
        });
    }

    let shipping_cost = shipping.cost(currency);
    let tax_amount = tax.amount_on(&items_subtotal);
    let total = items_subtotal.plus(&shipping_cost).plus(&tax_amount);

    Ok(Quote {
        lines,
        items_subtotal,
        shipping_cost,
        tax_amount,
        total,
    })
}
