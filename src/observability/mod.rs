//! Logging and tracing setup.
//!
//! Structured logging via `tracing`, with the format chosen per surface: the
//! CLI uses a human-oriented pretty format, the server defaults to JSON for
//! log aggregation. `RUST_LOG` always wins over the built-in directives.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;

/// Initialize the global tracing subscriber.
///
/// `default_directives` applies when `RUST_LOG` is unset. Calling this twice
/// panics, so each binary surface calls it exactly once at startup.
pub fn init_tracing(format: LogFormat, default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}
