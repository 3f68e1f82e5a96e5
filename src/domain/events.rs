use super::identity::PartitionKey;
use super::line_item::ProductId;

/// Notifications published by the cart engine after each state change.
#[derive(Debug, Clone, PartialEq)]
pub enum CartEvent {
    Loaded { key: PartitionKey, items: usize },
    ItemAdded { product_id: ProductId, quantity: u32 },
    QuantityUpdated { product_id: ProductId, quantity: u32 },
    ItemRemoved { product_id: ProductId },
    Cleared { key: PartitionKey },
    Merged { key: PartitionKey, merged_items: usize },
    CheckedOut { order_number: String },
    /// The cart display should be shown (`true`) or hidden.
    VisibilityChanged(bool),
}
