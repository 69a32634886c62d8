pub mod token_counter;

use crate::config::{LogFormat, LoggingConfig};
use crate::protocol::canonical::CanonicalUsage;
use tracing_subscriber::EnvFilter;

/// Map a configured level name to an `EnvFilter` directive.
///
/// - "DISABLED" -> `None`, no subscriber installed
/// - "WARNING" -> WARN
/// - "CRITICAL" -> ERROR
/// - Others map directly (TRACE, DEBUG, INFO, ERROR)
#[must_use]
pub fn level_directive(log_level: &str) -> Option<String> {
    let level = log_level.to_uppercase();
    match level.as_str() {
        "DISABLED" => None,
        "WARNING" => Some("WARN".to_string()),
        "CRITICAL" => Some("ERROR".to_string()),
        _ => Some(level),
    }
}

/// Initialize the tracing subscriber from the logging section.
///
/// Returns `false` when logging is disabled or a global subscriber was
/// already installed.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let Some(directive) = level_directive(&config.level) else {
        return false;
    };
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("INFO"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match config.format {
        LogFormat::Text => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}

/// Log the completion record for a normalized stream.
pub fn log_stream_complete(
    vendor: &str,
    model: &str,
    usage: &CanonicalUsage,
    elapsed: std::time::Duration,
) {
    token_counter::log_stream_usage(vendor, model, usage, elapsed);
}
