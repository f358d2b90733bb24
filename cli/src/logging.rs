//! Tracing / logging initialisation.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log settings taken from the command line.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default level or full filter directive, e.g. "info" or "chainload_core=debug"
    pub level: String,
    /// Emit JSON structured logs instead of human-readable text
    pub json: bool,
}

/// Initialise tracing once at startup. `RUST_LOG` overrides `level` when set.
pub fn init_tracing(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}
