use std::time::Duration;

/// Crate-wide error type for stream reading, frame decoding and fetches.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Malformed frame from {vendor}: {message}")]
    MalformedFrame {
        vendor: &'static str,
        message: String,
    },
    #[error("Upstream error: status={status}, message={message}")]
    Upstream { status: u16, message: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Broad error category, used to decide whether a failure ends a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Recoverable per frame: the frame is skipped and the session continues.
    Frame,
    /// Ends the stream or the poll.
    Fatal,
}

impl GatewayError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            GatewayError::MalformedFrame { .. } => ErrorCategory::Frame,
            GatewayError::Config(_)
            | GatewayError::Transport(_)
            | GatewayError::Upstream { .. }
            | GatewayError::Internal(_) => ErrorCategory::Fatal,
        }
    }

    pub(crate) fn malformed(vendor: &'static str, err: impl std::fmt::Display) -> Self {
        GatewayError::MalformedFrame {
            vendor,
            message: err.to_string(),
        }
    }
}

/// Failure modes of [`crate::poll::poll_until_terminal`].
///
/// A job that reached a terminal *failed* state is not an error here; the
/// caller inspects the returned payload.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Polling timed out after {elapsed:?} ({attempts} attempts)")]
    Timeout { elapsed: Duration, attempts: u32 },
    #[error("Polling gave up after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },
    #[error("Polling cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
    #[error("Status fetch failed on attempt {attempt}: {source}")]
    Fetch {
        attempt: u32,
        #[source]
        source: GatewayError,
    },
}

impl PollError {
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            PollError::Timeout { attempts, .. }
            | PollError::AttemptsExhausted { attempts }
            | PollError::Cancelled { attempts } => *attempts,
            PollError::Fetch { attempt, .. } => *attempt,
        }
    }
}
