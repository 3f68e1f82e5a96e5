use cart_engine::application::session::ShopSession;
use cart_engine::config::Settings;
use cart_engine::interfaces::csv::cart_writer::CartWriter;
use cart_engine::interfaces::csv::command_reader::CommandReader;
use cart_engine::logging;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input cart commands CSV file
    input: PathBuf,

    #[command(flatten)]
    settings: Settings,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(&cli.settings.log_level, cli.settings.log_json);

    let store = cli.settings.open_store().into_diagnostic()?;
    let mut session = ShopSession::new(store);
    session.start().await;

    // Replay commands
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for command in reader.commands() {
        match command {
            Ok(command) => {
                if let Some(order) = session.apply(command).await {
                    info!(
                        order_number = %order.order_number,
                        total = %order.total,
                        items = order.item_count,
                        "Order placed"
                    );
                }
            }
            Err(e) => {
                error!("Error reading command: {}", e);
            }
        }
    }

    let engine = session.engine();
    info!(
        total = %engine.total_price(),
        items = engine.item_count(),
        "Final cart"
    );

    // Output final cart
    let stdout = io::stdout();
    let mut writer = CartWriter::new(stdout.lock());
    writer.write_items(engine.items()).into_diagnostic()?;

    Ok(())
}
