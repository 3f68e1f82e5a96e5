use crate::domain::cart::format_amount;
use crate::domain::line_item::LineItem;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct CartRow {
    product: String,
    name: String,
    price: String,
    quantity: u32,
    subtotal: String,
}

impl From<&LineItem> for CartRow {
    fn from(item: &LineItem) -> Self {
        Self {
            product: item.product_id.to_string(),
            name: item.name.clone(),
            price: format_amount(item.price.value()),
            quantity: item.quantity.get(),
            subtotal: format_amount(item.line_total()),
        }
    }
}

/// Writes cart lines as CSV: `product,name,price,quantity,subtotal`.
pub struct CartWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CartWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes the header followed by one row per line item.
    pub fn write_items(&mut self, items: &[LineItem]) -> Result<()> {
        if items.is_empty() {
            self.writer
                .write_record(["product", "name", "price", "quantity", "subtotal"])?;
        }
        for item in items {
            self.writer.serialize(CartRow::from(item))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
