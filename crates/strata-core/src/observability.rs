//! Observability infrastructure for Strata.
//!
//! Structured logging with consistent spans for sink components.

use std::fmt;
use std::str::FromStr;
use std::sync::Once;

use tracing::Span;
use tracing_subscriber::{
    EnvFilter, fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::error::Error;

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logs (for production).
    Json,
    /// Pretty-printed logs (for development).
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(Error::invalid_input(format!(
                "log format must be one of json, pretty (got {other})"
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Pretty => f.write_str("pretty"),
        }
    }
}

/// Initializes the logging subsystem.
///
/// Call once at application startup. Safe to call multiple times;
/// subsequent calls are no-ops.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log levels (e.g., `info`, `strata_iceberg=debug`)
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        // try_init: a host process may already own the global subscriber.
        let result = match format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_fmt::layer().json())
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_fmt::layer().pretty())
                .try_init(),
        };
        if result.is_err() {
            tracing::debug!("global subscriber already installed");
        }
    });
}

/// Creates a span for sink operations on one table.
///
/// # Example
///
/// ```rust
/// use strata_core::observability::sink_span;
///
/// let span = sink_span("plan_distribution", "db.events");
/// let _guard = span.enter();
/// ```
#[must_use]
pub fn sink_span(operation: &str, table: &str) -> Span {
    tracing::info_span!("sink", op = operation, table = table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_succeeds() {
        // Should not panic (uses Once internally)
        init_logging(LogFormat::Pretty);
        init_logging(LogFormat::Json); // Second call should be no-op
    }

    #[test]
    fn test_sink_span_creates_span() {
        let span = sink_span("route", "db.events");
        let _guard = span.enter();
        tracing::info!("test message in span");
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().ok(), Some(LogFormat::Json));
        assert_eq!(" Pretty ".parse::<LogFormat>().ok(), Some(LogFormat::Pretty));

        let err = "xml".parse::<LogFormat>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid input: log format must be one of json, pretty (got xml)"
        );
    }
}
