use super::{ConfigError, GatewayConfig};

/// Validate the full config, returning an error if any rule is violated.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] when any configuration invariant is violated.
pub fn validate_config(config: &GatewayConfig) -> Result<(), ConfigError> {
    validate_log_level(config)?;
    validate_stream_config(config)?;
    validate_poller_config(config)?;
    Ok(())
}

fn validation_err(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

const VALID_LOG_LEVELS: &[&str] = &[
    "TRACE", "DEBUG", "INFO", "WARNING", "WARN", "ERROR", "CRITICAL", "DISABLED",
];

fn validate_log_level(config: &GatewayConfig) -> Result<(), ConfigError> {
    if !VALID_LOG_LEVELS.contains(&config.logging.level.to_uppercase().as_str()) {
        return Err(validation_err(format!(
            "logging.level must be one of {VALID_LOG_LEVELS:?}"
        )));
    }
    Ok(())
}

/// Smallest line limit that still fits a realistic single frame.
const MIN_LINE_BYTES: usize = 1024;

fn validate_stream_config(config: &GatewayConfig) -> Result<(), ConfigError> {
    if config.stream.max_line_bytes < MIN_LINE_BYTES {
        return Err(validation_err(format!(
            "stream.max_line_bytes must be at least {MIN_LINE_BYTES}"
        )));
    }
    Ok(())
}

fn validate_poller_config(config: &GatewayConfig) -> Result<(), ConfigError> {
    let poller = &config.poller;
    if poller.interval_ms == 0 {
        return Err(validation_err("poller.interval_ms must be greater than 0"));
    }
    if poller.timeout_secs == 0 {
        return Err(validation_err("poller.timeout_secs must be greater than 0"));
    }
    if poller.interval_ms > poller.timeout_secs.saturating_mul(1_000) {
        return Err(validation_err(
            "poller.interval_ms must not exceed poller.timeout_secs",
        ));
    }
    if let Some(max_attempts) = poller.max_attempts {
        if max_attempts == 0 {
            return Err(validation_err(
                "poller.max_attempts must be greater than 0 when set",
            ));
        }
    }
    Ok(())
}
