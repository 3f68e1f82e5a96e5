use crate::domain::command::CartCommand;
use crate::domain::line_item::{ProductId, ProductInput, Quantity};
use crate::error::{CartError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum CommandKind {
    Add,
    Update,
    Remove,
    Clear,
    Open,
    Close,
    Login,
    Logout,
    Checkout,
}

/// One raw CSV row: `command,product,name,price,quantity,user[,image]`.
#[derive(Debug, Deserialize)]
struct CommandRecord {
    command: CommandKind,
    #[serde(default)]
    product: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    quantity: Option<i64>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

fn required<T>(value: Option<T>, command: CommandKind, field: &str) -> Result<T> {
    value.ok_or_else(|| {
        CartError::ValidationError(format!(
            "{:?} command requires a {} column",
            command, field
        ))
    })
}

impl CommandRecord {
    fn into_command(self) -> Result<CartCommand> {
        let kind = self.command;
        let product_id = self.product.as_deref().map(ProductId::parse);

        let command = match kind {
            CommandKind::Add => {
                let product_id = required(product_id, kind, "product")?;
                let name = required(self.name, kind, "name")?;
                let price = required(self.price, kind, "price")?;
                let quantity = self.quantity.map(Quantity::try_from).transpose()?;

                let mut product = ProductInput::new(product_id, name, price)?;
                if let Some(image) = self.image {
                    product = product.with_metadata("image", image);
                }
                CartCommand::Add { product, quantity }
            }
            CommandKind::Update => CartCommand::Update {
                product_id: required(product_id, kind, "product")?,
                quantity: required(self.quantity, kind, "quantity")?,
            },
            CommandKind::Remove => CartCommand::Remove {
                product_id: required(product_id, kind, "product")?,
            },
            CommandKind::Clear => CartCommand::Clear,
            CommandKind::Open => CartCommand::Open,
            CommandKind::Close => CartCommand::Close,
            CommandKind::Login => CartCommand::Login {
                user_id: required(self.user, kind, "user")?,
            },
            CommandKind::Logout => CartCommand::Logout,
            CommandKind::Checkout => CartCommand::Checkout,
        };
        Ok(command)
    }
}

/// Reads cart commands from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<CartCommand>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and validates commands.
    ///
    /// A bad row yields an `Err` for that row only; reading continues.
    pub fn commands(self) -> impl Iterator<Item = Result<CartCommand>> {
        self.reader
            .into_deserialize::<CommandRecord>()
            .map(|result| result.map_err(CartError::from).and_then(CommandRecord::into_command))
    }
}
