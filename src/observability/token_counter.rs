use crate::protocol::canonical::CanonicalUsage;
use std::time::Duration;
use tracing::info;

/// Build usage from one vendor usage report.
///
/// A missing or zero total is computed as prompt + completion; vendors that
/// report a larger total (thinking tokens billed separately) keep theirs.
#[must_use]
pub fn resolve_usage(
    prompt: u64,
    completion: u64,
    total: Option<u64>,
    cached_input: Option<u64>,
) -> CanonicalUsage {
    let total_tokens = match total {
        Some(v) if v > 0 => v,
        _ => prompt.saturating_add(completion),
    };
    CanonicalUsage {
        input_tokens: prompt,
        output_tokens: completion,
        total_tokens,
        cached_input_tokens: cached_input,
    }
}

/// Log token usage for a completed stream at INFO level.
pub fn log_stream_usage(vendor: &str, model: &str, usage: &CanonicalUsage, duration: Duration) {
    info!(
        vendor = vendor,
        model = model,
        input_tokens = usage.input_tokens,
        output_tokens = usage.output_tokens,
        total_tokens = usage.total_tokens,
        cached_input_tokens = usage.cached_input_tokens.unwrap_or(0),
        duration_seconds = duration.as_secs_f64(),
        "stream completed"
    );
}
