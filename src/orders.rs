//! Orders
//!
//! The order-creation payload handed to the order placement service.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Serialize;

use crate::{cart::Cart, ids::ProductId};

/// One product and its quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    /// Product id
    pub product_id: ProductId,

    /// Units ordered
    pub quantity: u32,
}

/// Order creation payload.
///
/// Add-on selections are not part of the payload; lines that differ only by
/// add-ons are sent as separate items for the same product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Lines in cart order
    pub items: Vec<OrderItem>,

    /// Discounted, rounded cart total with the currency's decimal places
    pub total_amount: String,
}

impl OrderRequest {
    /// Build the payload from a cart and its priced total.
    #[must_use]
    pub fn new(cart: &Cart<'_>, total: Money<'_, Currency>) -> Self {
        let items = cart
            .iter()
            .map(|line| OrderItem {
                product_id: line.product(),
                quantity: line.quantity(),
            })
            .collect();

        Self {
            items,
            total_amount: Decimal::new(total.to_minor_units(), total.currency().exponent)
                .to_string(),
        }
    }
}
