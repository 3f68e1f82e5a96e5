use std::io::IsTerminal;
use std::str::FromStr;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global tracing subscriber. Logs always go to stderr so stdout
/// stays clean CSV.
///
/// `log_level` is either a bare level (`debug`) or a full directive string
/// (`info,cart_engine::application=trace`).
pub fn setup_logging(log_level: &str, json_format: bool) {
    let filter_spec = filter_spec(log_level);
    let filter = EnvFilter::from_str(&filter_spec).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    // A second init (tests, embedding) keeps the first subscriber.
    let installed = if json_format {
        let json_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_current_span(false);
        subscriber.with(json_layer).try_init()
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(true)
            .compact();
        subscriber.with(fmt_layer).try_init()
    };

    if installed.is_ok() {
        let format = if json_format { "json" } else { "compact" };
        tracing::debug!(filter = %filter_spec, format, "Logging initialized");
    }
}

fn filter_spec(log_level: &str) -> String {
    let normalized = log_level.trim();
    if normalized.is_empty() {
        "info".to_string()
    } else {
        normalized.to_string()
    }
}
