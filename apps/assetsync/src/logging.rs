//! Logging setup using tracing.
//!
//! Text output for interactive use, flattened JSON for log aggregation.
//! `RUST_LOG` takes precedence over the configured level.

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::{fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'text' or 'json', got '{other}'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Build the level filter: `RUST_LOG` first, then `filter`, then `info`.
fn build_filter(filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|e| {
            eprintln!("Invalid log filter '{filter}': {e}, falling back to info");
            EnvFilter::new("info")
        })
}

/// Initialize the global tracing subscriber.
///
/// # Panics
///
/// Panics if the subscriber has already been initialized.
pub fn init_logging(filter: &str, format: LogFormat) {
    let filter_layer = build_filter(filter);

    match format {
        LogFormat::Json => {
            let fmt_layer = tracing_fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .flatten_event(true);
            tracing_subscriber::registry()
                .with(fmt_layer)
                .with(filter_layer)
                .init();
        }
        LogFormat::Text => {
            let fmt_layer = tracing_fmt::layer().with_target(false);
            tracing_subscriber::registry()
                .with(fmt_layer)
                .with(filter_layer)
                .init();
        }
    }

    tracing::info!(filter = %filter, format = %format, "Logging initialized");
}

/// Initialize logging for tests (with simpler output).
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}
