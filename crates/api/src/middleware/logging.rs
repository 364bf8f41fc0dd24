//! Logging initialization.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Filter applied when `RUST_LOG` is unset: the configured level for the
/// helpdesk crates, quieter levels for the chatty dependencies underneath.
pub fn default_directives(level: &str) -> String {
    format!("{level},sqlx=warn,hyper=warn,tower_http=info,h2=warn")
}

/// Installs the global subscriber. `json` is the production format; any
/// other value falls back to human-readable output for local runs.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));

    let registry = tracing_subscriber::registry().with(filter);

    match config.format.as_str() {
        "json" => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_current_span(true),
            )
            .init(),
        "compact" => registry
            .with(fmt::layer().compact().with_target(false))
            .init(),
        _ => registry
            .with(fmt::layer().pretty().with_span_events(FmtSpan::CLOSE))
            .init(),
    }
}
