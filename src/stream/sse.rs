use std::collections::VecDeque;

use futures_util::Stream;
use memchr::{memchr, memchr_iter};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GatewayError;

pub const DEFAULT_MAX_LINE_BYTES: usize = 16 * 1024 * 1024;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// How payload lines are recognised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineFraming {
    /// Server-sent events: only `data:` lines carry payloads.
    #[default]
    Sse,
    /// One bare JSON object per line; a `data:` prefix is still honoured.
    NdJson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    pub framing: LineFraming,
    pub max_line_bytes: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            framing: LineFraming::Sse,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

// ---------------------------------------------------------------------------
// DataLineParser: incremental line parser
// ---------------------------------------------------------------------------

/// Incremental payload-line parser.
///
/// Feed it text chunks split at arbitrary boundaries; it yields the trimmed
/// payload of every complete data line until the `[DONE]` sentinel.
pub struct DataLineParser {
    framing: LineFraming,
    max_line_bytes: usize,
    buffer: String,
    read_offset: usize,
    skipping_oversized: bool,
    done: bool,
}

impl DataLineParser {
    #[must_use]
    pub fn new(options: ReaderOptions) -> Self {
        Self {
            framing: options.framing,
            max_line_bytes: options.max_line_bytes,
            buffer: String::new(),
            read_offset: 0,
            skipping_oversized: false,
            done: false,
        }
    }

    /// Whether the `[DONE]` sentinel has been seen.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.feed_into(chunk, &mut out);
        out
    }

    /// Feed raw text and append complete payloads into a caller-provided buffer.
    pub fn feed_into(&mut self, chunk: &str, out: &mut Vec<String>) {
        if self.done {
            return;
        }

        let mut chunk = chunk;
        if self.skipping_oversized {
            match memchr(b'\n', chunk.as_bytes()) {
                Some(pos) => {
                    self.skipping_oversized = false;
                    chunk = &chunk[pos + 1..];
                }
                None => return,
            }
        }

        self.buffer.push_str(chunk);
        let mut processed_up_to = self.read_offset;
        let bytes = self.buffer.as_bytes();
        let scan_start = processed_up_to;
        for rel_pos in memchr_iter(b'\n', &bytes[scan_start..]) {
            let line_end = scan_start + rel_pos;
            Self::process_line(
                &self.buffer[processed_up_to..line_end],
                self.framing,
                self.max_line_bytes,
                &mut self.done,
                out,
            );
            processed_up_to = line_end + 1;
            if self.done {
                break;
            }
        }

        if self.done {
            self.buffer.clear();
            self.read_offset = 0;
            return;
        }

        self.read_offset = processed_up_to;
        if self.read_offset == self.buffer.len() {
            self.buffer.clear();
            self.read_offset = 0;
            return;
        }
        let should_compact = self.read_offset > 0
            && (self.read_offset >= self.buffer.len() / 2 || self.read_offset >= 8 * 1024);
        if should_compact {
            self.buffer.drain(..self.read_offset);
            self.read_offset = 0;
        }

        if self.buffer.len() - self.read_offset > self.max_line_bytes {
            warn!(
                max_line_bytes = self.max_line_bytes,
                "discarding oversized upstream line"
            );
            self.buffer.clear();
            self.read_offset = 0;
            self.skipping_oversized = true;
        }
    }

    /// Process a trailing line that arrived without a newline before close.
    pub fn finish_into(&mut self, out: &mut Vec<String>) {
        if !self.done && !self.skipping_oversized && self.read_offset < self.buffer.len() {
            Self::process_line(
                &self.buffer[self.read_offset..],
                self.framing,
                self.max_line_bytes,
                &mut self.done,
                out,
            );
        }
        self.buffer.clear();
        self.read_offset = 0;
        self.skipping_oversized = false;
    }

    fn process_line(
        line: &str,
        framing: LineFraming,
        max_line_bytes: usize,
        done: &mut bool,
        out: &mut Vec<String>,
    ) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.len() > max_line_bytes {
            warn!(
                line_bytes = line.len(),
                max_line_bytes, "discarding oversized upstream line"
            );
            return;
        }

        // Comment line
        if line.starts_with(':') {
            return;
        }

        let payload = match line.strip_prefix(DATA_PREFIX) {
            Some(value) => value,
            None if framing == LineFraming::NdJson => line,
            None => return,
        };
        let payload = payload.trim();
        if payload.is_empty() {
            return;
        }
        if payload.eq_ignore_ascii_case(DONE_SENTINEL) {
            *done = true;
            return;
        }
        out.push(payload.to_owned());
    }
}

impl Default for DataLineParser {
    fn default() -> Self {
        Self::new(ReaderOptions::default())
    }
}

/// Decode `bytes` as UTF-8 into the parser, carrying an incomplete trailing
/// code point in `remainder`. Invalid sequences become U+FFFD.
fn feed_bytes(
    parser: &mut DataLineParser,
    remainder: &mut Vec<u8>,
    bytes: &[u8],
    out: &mut Vec<String>,
) {
    if remainder.is_empty() {
        if let Ok(text) = std::str::from_utf8(bytes) {
            parser.feed_into(text, out);
            return;
        }
    }

    remainder.extend_from_slice(bytes);
    let mut consumed = 0usize;
    loop {
        match std::str::from_utf8(&remainder[consumed..]) {
            Ok(text) => {
                parser.feed_into(text, out);
                consumed = remainder.len();
                break;
            }
            Err(err) => {
                let valid_up_to = consumed + err.valid_up_to();
                if let Ok(text) = std::str::from_utf8(&remainder[consumed..valid_up_to]) {
                    parser.feed_into(text, out);
                }
                match err.error_len() {
                    Some(invalid_len) => {
                        parser.feed_into("\u{FFFD}", out);
                        consumed = valid_up_to + invalid_len;
                    }
                    None => {
                        consumed = valid_up_to;
                        break;
                    }
                }
            }
        }
    }
    remainder.drain(..consumed);
}

// ---------------------------------------------------------------------------
// Stream utility
// ---------------------------------------------------------------------------

struct ReaderState<S> {
    stream: std::pin::Pin<Box<S>>,
    parser: DataLineParser,
    remainder: Vec<u8>,
    parsed: Vec<String>,
    pending: VecDeque<String>,
    closed: bool,
}

/// Split a byte stream into data-line payloads using [`DataLineParser`].
///
/// The sequence ends at `[DONE]` (nothing after it is read), at transport
/// close, or after yielding one `Err(GatewayError::Transport)`.
pub fn data_frame_stream<S, E>(
    byte_stream: S,
    options: ReaderOptions,
) -> impl Stream<Item = Result<String, GatewayError>> + Send
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    use futures_util::StreamExt;

    let state = ReaderState {
        stream: Box::pin(byte_stream),
        parser: DataLineParser::new(options),
        remainder: Vec::new(),
        parsed: Vec::with_capacity(8),
        pending: VecDeque::with_capacity(8),
        closed: false,
    };

    futures_util::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(payload) = state.pending.pop_front() {
                return Some((Ok(payload), state));
            }
            if state.closed || state.parser.is_done() {
                return None;
            }

            match state.stream.as_mut().next().await {
                Some(Ok(bytes)) => {
                    feed_bytes(
                        &mut state.parser,
                        &mut state.remainder,
                        &bytes,
                        &mut state.parsed,
                    );
                }
                Some(Err(err)) => {
                    state.closed = true;
                    return Some((Err(GatewayError::Transport(err.to_string())), state));
                }
                None => {
                    state.closed = true;
                    if !state.remainder.is_empty() {
                        debug!(
                            bytes = state.remainder.len(),
                            "stream closed inside a UTF-8 sequence"
                        );
                        let tail = String::from_utf8_lossy(&state.remainder).into_owned();
                        state.remainder.clear();
                        state.parser.feed_into(&tail, &mut state.parsed);
                    }
                    state.parser.finish_into(&mut state.parsed);
                }
            }
            state.pending.extend(state.parsed.drain(..));
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
