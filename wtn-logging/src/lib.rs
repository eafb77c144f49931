//! Logging setup for WTN publishing clients

use std::str::FromStr;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines (development)
    #[default]
    Console,
    /// One JSON object per event (production)
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" | "pretty" | "text" => Ok(LogFormat::Console),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Build the filter from `RUST_LOG`, falling back to `default_level`
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the subscriber for `format`
///
/// JSON events carry target, file and line; span context is omitted to keep
/// signaling logs one line per request.
fn install(default_level: &str, format: LogFormat) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(default_level));
    match format {
        LogFormat::Console => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .try_init(),
    }
}

/// Initialize logging in the requested format
///
/// A subscriber installed earlier is kept and a warning goes to it.
pub fn init(service_name: &str, default_level: &str, format: LogFormat) {
    match install(default_level, format) {
        Ok(()) => tracing::info!(
            service = service_name,
            format = ?format,
            "Logging initialized"
        ),
        Err(e) => tracing::warn!(
            service = service_name,
            error = %e,
            "Logging already initialized"
        ),
    }
}

/// Install a subscriber unless one is already present
///
/// Returns `false` when another subscriber was installed first.
pub fn try_init(default_level: &str, format: LogFormat) -> bool {
    install(default_level, format).is_ok()
}

/// Initialize structured JSON logging
pub fn init_logging(service_name: &str, default_level: &str) {
    init(service_name, default_level, LogFormat::Json);
}

/// Initialize human-readable console logging
pub fn init_console_logging(service_name: &str, default_level: &str) {
    init(service_name, default_level, LogFormat::Console);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Console".parse::<LogFormat>().unwrap(), LogFormat::Console);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Console);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_init_after_install_keeps_first() {
        let _ = try_init("debug", LogFormat::Console);
        // Must not panic when a subscriber is already present
        init_logging("wtn-test", "info");
        init_console_logging("wtn-test", "info");
        assert!(!try_init("info", LogFormat::Json));
    }

    #[test]
    fn test_try_init_only_once() {
        // Whichever test installs first wins; the second attempt must not panic
        let _ = try_init("debug", LogFormat::Console);
        assert!(!try_init("debug", LogFormat::Json));
    }
}
