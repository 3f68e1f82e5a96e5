use super::line_item::{ProductId, ProductInput, Quantity};

/// A user action against the cart, as issued by the storefront UI.
#[derive(Debug, Clone, PartialEq)]
pub enum CartCommand {
    Add {
        product: ProductInput,
        quantity: Option<Quantity>,
    },
    Update {
        product_id: ProductId,
        quantity: i64,
    },
    Remove {
        product_id: ProductId,
    },
    Clear,
    Open,
    Close,
    Login {
        user_id: String,
    },
    Logout,
    Checkout,
}
