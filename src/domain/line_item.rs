use crate::error::CartError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque catalog identifier of a product.
///
/// The catalog hands out either numeric or textual ids; both are kept as-is so
/// that a persisted cart round-trips with the same identity the catalog uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Int(id) => write!(f, "{}", id),
            ProductId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        ProductId::Int(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId::Text(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        ProductId::Text(id)
    }
}

impl ProductId {
    /// Parses a raw identifier, preferring the numeric form when it fits.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        raw.parse::<i64>()
            .map(ProductId::Int)
            .unwrap_or_else(|_| ProductId::Text(raw.to_string()))
    }
}

/// Unit price of a product, captured when it is first added to a cart.
///
/// Wraps `rust_decimal::Decimal` so that prices never go through binary
/// floating point and can never be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Upper bound on a unit price. Keeps `price * u32::MAX` far inside the
    /// `Decimal` range.
    pub const MAX: Self = Self(Decimal::from_parts(3_567_587_328, 232, 0, false, 0));

    pub fn new(value: Decimal) -> Result<Self, CartError> {
        if value.is_sign_negative() && !value.is_zero() {
            Err(CartError::ValidationError(
                "Price must not be negative".to_string(),
            ))
        } else if value > Self::MAX.0 {
            Err(CartError::ValidationError(format!(
                "Price {} exceeds the maximum of {}",
                value,
                Self::MAX.0
            )))
        } else {
            Ok(Self(value))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = CartError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

/// A strictly positive number of units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Self = Self(1);

    pub fn new(value: u32) -> Result<Self, CartError> {
        if value >= 1 {
            Ok(Self(value))
        } else {
            Err(CartError::InvalidQuantity(
                "Quantity must be at least 1".to_string(),
            ))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Adds two quantities, saturating at `u32::MAX`.
    pub fn saturating_add(self, other: Quantity) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl TryFrom<u32> for Quantity {
    type Error = CartError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = CartError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let value = u32::try_from(value)
            .map_err(|_| CartError::InvalidQuantity(format!("{} is out of range", value)))?;
        Self::new(value)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

/// The validated shape a caller hands to the cart when adding a product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    /// Display data (image reference, description, ...) carried through untouched.
    pub metadata: Map<String, Value>,
}

impl ProductInput {
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Decimal,
    ) -> Result<Self, CartError> {
        let product_id = product_id.into();
        if let ProductId::Text(id) = &product_id
            && id.trim().is_empty()
        {
            return Err(CartError::ValidationError(
                "Product id must not be empty".to_string(),
            ));
        }

        let name = name.into();
        if name.trim().is_empty() {
            return Err(CartError::ValidationError(format!(
                "Product {} has no name",
                product_id
            )));
        }

        Ok(Self {
            product_id,
            name,
            price: Price::new(price)?,
            metadata: Map::new(),
        })
    }

    /// Attaches a display attribute. Keys naming a line item field (`id`,
    /// `productId`, `name`, `price`, `quantity`) are ignored.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if !is_reserved_key(&key) {
            self.metadata.insert(key, value.into());
        }
        self
    }
}

const RESERVED_KEYS: [&str; 5] = ["id", "productId", "name", "price", "quantity"];

/// Flattened metadata must not shadow the line's own fields, or the stored JSON
/// would carry duplicate keys and fail to load.
fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// One product entry in a cart together with the quantity held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "id", alias = "productId")]
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: Quantity,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl LineItem {
    /// Snapshots `product` into a new line item.
    pub fn from_product(product: ProductInput, quantity: Quantity) -> Self {
        let mut metadata = product.metadata;
        metadata.retain(|key, _| !is_reserved_key(key));
        Self {
            product_id: product.product_id,
            name: product.name,
            price: product.price,
            quantity,
            metadata,
        }
    }

    /// `price * quantity` for this line, saturating at `Decimal::MAX`.
    pub fn line_total(&self) -> Decimal {
        self.price
            .value()
            .checked_mul(Decimal::from(self.quantity.get()))
            .unwrap_or(Decimal::MAX)
    }
}
