pub mod session;
pub mod sse;
pub mod tool_calls;

pub use session::{SessionOptions, StreamSession};
pub use sse::{data_frame_stream, DataLineParser, LineFraming, ReaderOptions};
pub use tool_calls::{ToolCallAccumulator, ToolCallEntry};

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Instant;

use futures_util::Stream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{ErrorCategory, GatewayError};
use crate::observability::log_stream_complete;
use crate::protocol::canonical::CanonicalEvent;
use crate::protocol::mapping::VendorProfile;

/// Vendor-neutral intermediate form produced by a [`StreamAdapter`] for each
/// decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamDelta {
    TextToken {
        text: String,
    },
    ReasoningToken {
        text: String,
        signature: Option<String>,
    },
    ToolUseStart {
        id: Option<String>,
        index: Option<u32>,
        name: Option<String>,
        provider_executed: bool,
    },
    ToolArgFragment {
        id: Option<String>,
        index: Option<u32>,
        fragment: String,
    },
    ToolResultAvailable {
        id: String,
        output: serde_json::Value,
    },
    /// Cumulative counters; each update replaces the previous one.
    UsageUpdate {
        prompt: u64,
        completion: u64,
        total: Option<u64>,
        cached_input: Option<u64>,
    },
    StopSignal {
        reason: String,
    },
    SourceCitation {
        url: String,
        title: Option<String>,
    },
    ModelObserved {
        model: String,
    },
    /// An error reported in-band by the vendor.
    UpstreamError {
        message: String,
    },
}

/// Decodes one vendor's frame payloads into [`UpstreamDelta`] values.
pub trait StreamAdapter: Send {
    fn profile(&self) -> &'static VendorProfile;

    /// Decode one frame payload.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MalformedFrame`] when the payload cannot be
    /// decoded; the caller discards anything appended to `out` for it.
    fn decode_frame(
        &mut self,
        payload: &str,
        out: &mut Vec<UpstreamDelta>,
    ) -> Result<(), GatewayError>;

    /// Release deltas the adapter deferred; called once after the last frame.
    fn flush(&mut self, _out: &mut Vec<UpstreamDelta>) {}
}

impl<A: StreamAdapter + ?Sized> StreamAdapter for Box<A> {
    fn profile(&self) -> &'static VendorProfile {
        (**self).profile()
    }

    fn decode_frame(
        &mut self,
        payload: &str,
        out: &mut Vec<UpstreamDelta>,
    ) -> Result<(), GatewayError> {
        (**self).decode_frame(payload, out)
    }

    fn flush(&mut self, out: &mut Vec<UpstreamDelta>) {
        (**self).flush(out);
    }
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    pub session: SessionOptions,
    pub reader: ReaderOptions,
}

// ---------------------------------------------------------------------------
// FrameNormalizer: synchronous adapter + session pairing
// ---------------------------------------------------------------------------

/// Feeds frame payloads through an adapter into a [`StreamSession`].
pub struct FrameNormalizer<A> {
    adapter: A,
    session: StreamSession,
    scratch: Vec<UpstreamDelta>,
    frames: u64,
    skipped: u64,
}

impl<A: StreamAdapter> FrameNormalizer<A> {
    pub fn new(adapter: A, options: SessionOptions) -> Self {
        let session = StreamSession::new(adapter.profile(), options);
        Self {
            adapter,
            session,
            scratch: Vec::with_capacity(4),
            frames: 0,
            skipped: 0,
        }
    }

    pub fn on_frame(&mut self, payload: &str, out: &mut Vec<CanonicalEvent>) {
        if self.session.is_finished() {
            return;
        }
        self.frames += 1;
        let vendor = self.session.profile().name;
        match self.adapter.decode_frame(payload, &mut self.scratch) {
            Ok(()) => {
                debug!(vendor, frame = self.frames, deltas = self.scratch.len(), "decoded upstream frame");
                self.apply_scratch(out);
            }
            Err(err) if err.category() == ErrorCategory::Frame => {
                self.scratch.clear();
                self.skipped += 1;
                warn!(vendor, frame = self.frames, error = %err, "skipping malformed upstream frame");
            }
            Err(err) => {
                self.scratch.clear();
                self.session.fail(err.to_string(), out);
            }
        }
    }

    pub fn on_transport_error(&mut self, err: &GatewayError, out: &mut Vec<CanonicalEvent>) {
        warn!(vendor = self.session.profile().name, error = %err, "upstream transport failed");
        self.session.fail(err.to_string(), out);
    }

    /// End of frames: flush adapter-deferred deltas, then finish the session.
    pub fn on_end(&mut self, out: &mut Vec<CanonicalEvent>) {
        if self.session.is_finished() {
            return;
        }
        self.adapter.flush(&mut self.scratch);
        self.apply_scratch(out);
        self.session.finish(out);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    #[must_use]
    pub fn session(&self) -> &StreamSession {
        &self.session
    }

    #[must_use]
    pub fn skipped_frames(&self) -> u64 {
        self.skipped
    }

    fn apply_scratch(&mut self, out: &mut Vec<CanonicalEvent>) {
        for delta in self.scratch.drain(..) {
            self.session.apply(delta, out);
        }
    }
}

// ---------------------------------------------------------------------------
// normalize_stream: pull-based driver
// ---------------------------------------------------------------------------

struct DriverState<F, A> {
    frames: Pin<Box<F>>,
    normalizer: FrameNormalizer<A>,
    pending: VecDeque<CanonicalEvent>,
    scratch: Vec<CanonicalEvent>,
    cancel: CancellationToken,
    started: Instant,
    done: bool,
}

/// Normalize an upstream byte stream into canonical events.
///
/// Events are produced only as the consumer polls. Cancelling `cancel` ends
/// the stream at the next suspension point without a terminal event.
pub fn normalize_stream<S, E, A>(
    byte_stream: S,
    adapter: A,
    options: NormalizeOptions,
    cancel: CancellationToken,
) -> impl Stream<Item = CanonicalEvent> + Send
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
    A: StreamAdapter + 'static,
{
    use futures_util::StreamExt;

    let state = DriverState {
        frames: Box::pin(data_frame_stream(byte_stream, options.reader)),
        normalizer: FrameNormalizer::new(adapter, options.session),
        pending: VecDeque::with_capacity(8),
        scratch: Vec::with_capacity(8),
        cancel,
        started: Instant::now(),
        done: false,
    };

    futures_util::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                return Some((event, state));
            }
            if state.done {
                return None;
            }
            if state.cancel.is_cancelled() {
                debug!("normalized stream cancelled by consumer");
                return None;
            }

            let next = tokio::select! {
                biased;
                () = state.cancel.cancelled() => {
                    debug!("normalized stream cancelled by consumer");
                    return None;
                }
                item = state.frames.next() => item,
            };

            match next {
                Some(Ok(payload)) => state.normalizer.on_frame(&payload, &mut state.scratch),
                Some(Err(err)) => state.normalizer.on_transport_error(&err, &mut state.scratch),
                None => state.normalizer.on_end(&mut state.scratch),
            }
            state.pending.extend(state.scratch.drain(..));

            if state.normalizer.is_finished() {
                state.done = true;
                let session = state.normalizer.session();
                log_stream_complete(
                    session.profile().name,
                    session.model(),
                    &session.usage(),
                    state.started.elapsed(),
                );
            }
        }
    })
}
