use super::line_item::{LineItem, ProductId, ProductInput, Quantity};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An ordered collection of line items, at most one per product id.
///
/// Serializes as a plain JSON array of line items, which is the format kept in
/// the durable store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    fn get_mut(&mut self, product_id: &ProductId) -> Option<&mut LineItem> {
        self.items
            .iter_mut()
            .find(|item| &item.product_id == product_id)
    }

    /// Adds `quantity` units of `product`.
    ///
    /// An existing line keeps the price and metadata it was first added with;
    /// only its quantity grows.
    pub fn add(&mut self, product: ProductInput, quantity: Quantity) {
        match self.get_mut(&product.product_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
            None => self.items.push(LineItem::from_product(product, quantity)),
        }
    }

    /// Sets the quantity of a line, removing it when `quantity <= 0`.
    ///
    /// Returns `false` when no line has that id.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(product_id);
        }
        let Some(item) = self.get_mut(product_id) else {
            return false;
        };
        match Quantity::new(u32::try_from(quantity).unwrap_or(u32::MAX)) {
            Ok(quantity) => {
                item.quantity = quantity;
                true
            }
            Err(_) => false,
        }
    }

    /// Removes the line for `product_id`. Returns `false` when it was absent.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product_id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Folds `other` into this cart: overlapping ids sum their quantities,
    /// the rest are appended in `other`'s order.
    pub fn merge(&mut self, other: Cart) {
        for incoming in other.items {
            match self.get_mut(&incoming.product_id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(incoming.quantity)
                }
                None => self.items.push(incoming),
            }
        }
    }

    /// Exact sum of `price * quantity` over every line, saturating at
    /// `Decimal::MAX`.
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(LineItem::line_total)
            .try_fold(Decimal::ZERO, |total, line| total.checked_add(line))
            .unwrap_or(Decimal::MAX)
    }

    /// The subtotal as a fixed-point string with exactly two decimals.
    pub fn total_price(&self) -> String {
        format_amount(self.subtotal())
    }

    /// Number of units in the cart, not the number of distinct lines.
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }
}

impl From<Vec<LineItem>> for Cart {
    fn from(items: Vec<LineItem>) -> Self {
        // Persisted data may repeat an id; collapse it to keep one line per product.
        let mut cart = Cart::new();
        cart.merge(Cart { items });
        cart
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

/// Formats a currency amount with two decimals, rounding half away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(id: &str, price: Decimal) -> ProductInput {
        ProductInput::new(id, format!("Item {}", id), price).unwrap()
    }

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    #[test]
    fn test_add_keeps_first_snapshot() {
        let mut cart = Cart::new();
        cart.add(product("burger1", dec!(10.00)), qty(2));
        cart.add(product("burger1", dec!(15.00)), qty(1));

        assert_eq!(cart.items().len(), 1);
        let line = &cart.items()[0];
        assert_eq!(line.price.value(), dec!(10.00));
        assert_eq!(line.quantity.get(), 3);
        assert_eq!(cart.total_price(), "30.00");
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = Cart::new();
        assert_eq!(cart.total_price(), "0.00");
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let mut cart = Cart::new();
        cart.add(product("a", dec!(1.00)), qty(3));
        cart.add(product("b", dec!(2.00)), qty(3));
        assert_eq!(cart.item_count(), 6);
        assert_eq!(cart.total_price(), "9.00");
    }

    #[test]
    fn test_set_quantity_zero_equals_remove() {
        let mut a = Cart::new();
        a.add(product("a", dec!(1.00)), qty(1));
        a.add(product("b", dec!(2.00)), qty(2));
        let mut b = a.clone();

        assert!(a.set_quantity(&ProductId::from("a"), 0));
        assert!(b.remove(&ProductId::from("a")));
        assert_eq!(a, b);
    }

    #[test]
    fn test_set_quantity_negative_removes() {
        let mut cart = Cart::new();
        cart.add(product("a", dec!(1.00)), qty(4));
        assert!(cart.set_quantity(&ProductId::from("a"), -3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add(product("a", dec!(1.00)), qty(1));
        let before = cart.clone();

        assert!(!cart.set_quantity(&ProductId::from("zzz"), 5));
        assert!(!cart.remove(&ProductId::from("zzz")));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_merge_sums_overlaps() {
        let mut user = Cart::new();
        user.add(product("A", dec!(1.00)), qty(2));
        user.add(product("B", dec!(1.00)), qty(1));

        let mut anonymous = Cart::new();
        anonymous.add(product("A", dec!(9.99)), qty(1));
        anonymous.add(product("C", dec!(1.00)), qty(2));

        user.merge(anonymous);

        let quantities: Vec<(String, u32)> = user
            .items()
            .iter()
            .map(|i| (i.product_id.to_string(), i.quantity.get()))
            .collect();
        assert_eq!(
            quantities,
            vec![
                ("A".to_string(), 3),
                ("B".to_string(), 1),
                ("C".to_string(), 2)
            ]
        );
        // The user's own snapshot of A wins.
        assert_eq!(user.get(&ProductId::from("A")).unwrap().price.value(), dec!(1.00));
    }

    #[test]
    fn test_total_price_rounding() {
        let mut cart = Cart::new();
        cart.add(product("a", dec!(0.125)), qty(1));
        assert_eq!(cart.total_price(), "0.13");

        cart.add(product("b", dec!(0.1)), qty(3));
        assert_eq!(cart.total_price(), "0.43");
    }

    #[test]
    fn test_cart_json_is_plain_array() {
        let mut cart = Cart::new();
        cart.add(product("a", dec!(1.50)), qty(2));

        let json = serde_json::to_string(&cart).unwrap();
        assert!(json.starts_with('['));

        let back: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_from_vec_collapses_duplicates() {
        let line = LineItem::from_product(product("a", dec!(1.00)), qty(1));
        let cart = Cart::from(vec![line.clone(), line]);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 2);
    }
}
