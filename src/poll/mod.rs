use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{GatewayError, PollError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Duration,
    /// `None` bounds the loop by `timeout` only.
    pub max_attempts: Option<u32>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(600),
            max_attempts: None,
        }
    }
}

/// Per-job loop state; dropped when the poll returns.
#[derive(Debug)]
pub struct PollState<T> {
    pub attempt: u32,
    pub started_at: Instant,
    pub last_result: Option<T>,
}

impl<T> PollState<T> {
    fn new() -> Self {
        Self {
            attempt: 0,
            started_at: Instant::now(),
            last_result: None,
        }
    }
}

/// Poll `fetch` until `is_terminal` accepts its result.
///
/// Each iteration checks cancellation, then the wall-clock timeout, then the
/// attempt cap, then sleeps `interval` and fetches. The sleep precedes every
/// fetch, including the first. A fetch error ends the loop without retry.
///
/// # Errors
///
/// [`PollError::Cancelled`], [`PollError::Timeout`],
/// [`PollError::AttemptsExhausted`] or [`PollError::Fetch`].
pub async fn poll_until_terminal<T, F, Fut, P>(
    mut fetch: F,
    is_terminal: P,
    options: &PollOptions,
    cancel: &CancellationToken,
) -> Result<T, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GatewayError>>,
    P: Fn(&T) -> bool,
{
    let mut state: PollState<T> = PollState::new();

    loop {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled {
                attempts: state.attempt,
            });
        }
        let elapsed = state.started_at.elapsed();
        if elapsed > options.timeout {
            debug!(attempts = state.attempt, ?elapsed, "poll timed out");
            return Err(PollError::Timeout {
                elapsed,
                attempts: state.attempt,
            });
        }
        if let Some(max_attempts) = options.max_attempts {
            if state.attempt >= max_attempts {
                return Err(PollError::AttemptsExhausted {
                    attempts: state.attempt,
                });
            }
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(PollError::Cancelled { attempts: state.attempt });
            }
            () = tokio::time::sleep(options.interval) => {}
        }

        state.attempt += 1;
        let attempt = state.attempt;
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(PollError::Cancelled { attempts: attempt });
            }
            result = fetch() => result,
        };
        let value = result.map_err(|source| PollError::Fetch { attempt, source })?;

        if is_terminal(&value) {
            debug!(attempt, elapsed = ?state.started_at.elapsed(), "poll reached terminal state");
            return Ok(value);
        }
        debug!(attempt, "poll result not terminal");
        state.last_result = Some(value);
    }
}

/// Coarse lifecycle phase of an asynchronous job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobPhase {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    /// A status string this classifier does not know; treated as non-terminal.
    Unknown,
}

impl JobPhase {
    /// Classify a vendor status string (case-insensitive, `-`/space as `_`).
    #[must_use]
    pub fn classify(status: &str) -> Self {
        let normalized: String = status
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        match normalized.as_str() {
            "queued" | "pending" | "starting" | "submitted" | "created" => JobPhase::Queued,
            "processing" | "in_progress" | "running" | "generating" => JobPhase::Running,
            "succeeded" | "completed" | "complete" | "success" | "done" => JobPhase::Succeeded,
            "failed" | "failure" | "error" | "errored" => JobPhase::Failed,
            "canceled" | "cancelled" | "expired" => JobPhase::Cancelled,
            _ => JobPhase::Unknown,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobPhase::Succeeded | JobPhase::Failed | JobPhase::Cancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_common_statuses() {
        assert_eq!(JobPhase::classify("IN_PROGRESS"), JobPhase::Running);
        assert_eq!(JobPhase::classify("in-progress"), JobPhase::Running);
        assert_eq!(JobPhase::classify("starting"), JobPhase::Queued);
        assert_eq!(JobPhase::classify("Succeeded"), JobPhase::Succeeded);
        assert_eq!(JobPhase::classify("completed"), JobPhase::Succeeded);
        assert_eq!(JobPhase::classify("failed"), JobPhase::Failed);
        assert_eq!(JobPhase::classify("canceled"), JobPhase::Cancelled);
        assert_eq!(JobPhase::classify("warming up"), JobPhase::Unknown);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(JobPhase::Succeeded.is_terminal());
        assert!(JobPhase::Failed.is_terminal());
        assert!(JobPhase::Cancelled.is_terminal());
        assert!(!JobPhase::Running.is_terminal());
        assert!(!JobPhase::Unknown.is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_precedes_first_fetch() {
        let started = Instant::now();
        let options = PollOptions {
            interval: Duration::from_secs(3),
            ..PollOptions::default()
        };
        let result = poll_until_terminal(
            || async { Ok::<_, GatewayError>(Instant::now()) },
            |_| true,
            &options,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(result - started, Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_is_not_retried() {
        let mut calls = 0u32;
        let err = poll_until_terminal(
            || {
                calls += 1;
                async {
                    Err::<(), _>(GatewayError::Upstream {
                        status: 500,
                        message: "boom".to_string(),
                    })
                }
            },
            |_| true,
            &PollOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PollError::Fetch { attempt: 1, .. }));
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_never_fetches() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut calls = 0u32;
        let err = poll_until_terminal(
            || {
                calls += 1;
                async { Ok::<_, GatewayError>(()) }
            },
            |_| true,
            &PollOptions::default(),
            &cancel,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PollError::Cancelled { attempts: 0 }));
        assert_eq!(calls, 0);
    }
}
