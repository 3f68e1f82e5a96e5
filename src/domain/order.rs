use super::cart::{Cart, format_amount};
use super::line_item::LineItem;
use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;

/// Snapshot of a cart taken when the customer checks out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    /// `ORD-` followed by six digits.
    pub order_number: String,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub total: String,
    pub item_count: u64,
}

impl OrderSummary {
    pub fn from_cart(order_number: String, cart: &Cart) -> Self {
        let subtotal = cart.subtotal();
        Self {
            order_number,
            items: cart.items().to_vec(),
            subtotal,
            total: format_amount(subtotal),
            item_count: cart.item_count(),
        }
    }
}

pub fn generate_order_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("ORD-{}", rng.gen_range(100_000..=999_999))
}
