use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use super::tool_calls::{Registration, ToolCallAccumulator, ToolCallEntry};
use super::UpstreamDelta;
use crate::observability::token_counter::resolve_usage;
use crate::protocol::canonical::{CanonicalEvent, CanonicalUsage, FinishReason};
use crate::protocol::mapping::VendorProfile;
use crate::util::{next_approval_id, next_source_id, next_stream_id};

/// Request-level values echoed on the terminal `Finish` event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionOptions {
    pub model: String,
    pub temperature: Option<f64>,
}

impl SessionOptions {
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// The semantic block currently open. Text and reasoning are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OpenBlock {
    None,
    Text {
        stream_id: String,
    },
    Reasoning {
        stream_id: String,
        signature: Option<String>,
    },
}

/// Per-request state machine folding [`UpstreamDelta`] values into the
/// canonical event sequence.
pub struct StreamSession {
    profile: &'static VendorProfile,
    options: SessionOptions,
    block: OpenBlock,
    tool_calls: ToolCallAccumulator,
    usage: CanonicalUsage,
    observed_model: Option<String>,
    seen_sources: FxHashSet<String>,
    last_stop_was_tool_round: bool,
    finished: bool,
}

impl StreamSession {
    #[must_use]
    pub fn new(profile: &'static VendorProfile, options: SessionOptions) -> Self {
        Self {
            profile,
            options,
            block: OpenBlock::None,
            tool_calls: ToolCallAccumulator::new(),
            usage: CanonicalUsage::default(),
            observed_model: None,
            seen_sources: FxHashSet::default(),
            last_stop_was_tool_round: false,
            finished: false,
        }
    }

    /// Apply one intermediate delta, appending the resulting events to `out`.
    pub fn apply(&mut self, delta: UpstreamDelta, out: &mut Vec<CanonicalEvent>) {
        if self.finished {
            debug!(vendor = self.profile.name, ?delta, "delta after terminal event ignored");
            return;
        }

        match delta {
            UpstreamDelta::TextToken { text } => {
                if text.is_empty() {
                    return;
                }
                let stream_id = self.ensure_text_block(out);
                out.push(CanonicalEvent::TextDelta { stream_id, text });
            }
            UpstreamDelta::ReasoningToken { text, signature } => {
                if text.is_empty() && signature.is_none() {
                    return;
                }
                let stream_id = self.ensure_reasoning_block(out);
                if let OpenBlock::Reasoning {
                    signature: pending, ..
                } = &mut self.block
                {
                    if signature.is_some() {
                        *pending = signature;
                    }
                }
                if !text.is_empty() {
                    out.push(CanonicalEvent::ReasoningDelta { stream_id, text });
                }
            }
            UpstreamDelta::ToolUseStart {
                id,
                index,
                name,
                provider_executed,
            } => {
                self.close_block(out);
                // A start without a position takes the next one in the round so
                // later index-only fragments resolve to it.
                let index = match (index, id.as_deref()) {
                    (None, Some(id)) if !id.is_empty() && self.tool_calls.get(id).is_none() => {
                        Some(self.tool_calls.next_position())
                    }
                    _ => index,
                };
                let key = self.tool_calls.resolve_key(id.as_deref(), index);
                let provider_executed = provider_executed || self.profile.is_provider_executed(&key);
                self.start_tool_call(&key, name, provider_executed, out);
            }
            UpstreamDelta::ToolArgFragment {
                id,
                index,
                fragment,
            } => {
                if fragment.is_empty() {
                    return;
                }
                let key = self.tool_calls.resolve_key(id.as_deref(), index);
                if self.tool_calls.get(&key).is_none() {
                    self.close_block(out);
                    let provider_executed = self.profile.is_provider_executed(&key);
                    self.start_tool_call(&key, None, provider_executed, out);
                }
                self.tool_calls.append(&key, &fragment);
                out.push(CanonicalEvent::ToolCallDelta {
                    call_id: key,
                    argument_fragment: fragment,
                });
            }
            UpstreamDelta::ToolResultAvailable { id, output } => {
                // Only hosted calls complete early; client calls wait for the drain.
                let buffered = self.tool_calls.get(&id).map(|entry| entry.provider_executed);
                let provider_executed = match buffered {
                    Some(true) => {
                        if let Some(entry) = self.tool_calls.remove(&id) {
                            self.emit_ready(entry, out);
                        }
                        true
                    }
                    Some(false) => false,
                    None => self.profile.is_provider_executed(&id),
                };
                out.push(CanonicalEvent::ToolOutputAvailable {
                    call_id: id,
                    output,
                    provider_executed,
                });
            }
            UpstreamDelta::UsageUpdate {
                prompt,
                completion,
                total,
                cached_input,
            } => {
                self.usage = resolve_usage(prompt, completion, total, cached_input);
            }
            UpstreamDelta::StopSignal { reason } => self.stop(&reason, out),
            UpstreamDelta::SourceCitation { url, title } => {
                if url.is_empty() || !self.seen_sources.insert(url.clone()) {
                    return;
                }
                out.push(CanonicalEvent::Source {
                    url,
                    source_id: next_source_id(),
                    title,
                });
            }
            UpstreamDelta::ModelObserved { model } => {
                if !model.is_empty() {
                    self.observed_model = Some(model);
                }
            }
            UpstreamDelta::UpstreamError { message } => self.fail(message, out),
        }
    }

    /// End of the upstream stream. Emits `Finish` unless a terminal event was
    /// already produced; never leaves a block open.
    pub fn finish(&mut self, out: &mut Vec<CanonicalEvent>) {
        if self.finished {
            return;
        }
        self.close_block(out);
        if !self.tool_calls.is_empty() {
            debug!(
                vendor = self.profile.name,
                pending = self.tool_calls.len(),
                "stream ended with buffered tool calls"
            );
            self.drain_tool_calls(out);
        }
        let reason = if self.last_stop_was_tool_round {
            FinishReason::ToolCall
        } else {
            FinishReason::Stop
        };
        self.emit_finish(reason, out);
    }

    /// Terminate the sequence with an `Error` event after closing any open block.
    pub fn fail(&mut self, message: String, out: &mut Vec<CanonicalEvent>) {
        if self.finished {
            return;
        }
        self.close_block(out);
        self.finished = true;
        out.push(CanonicalEvent::Error { message });
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn text_open(&self) -> bool {
        matches!(self.block, OpenBlock::Text { .. })
    }

    #[must_use]
    pub fn reasoning_open(&self) -> bool {
        matches!(self.block, OpenBlock::Reasoning { .. })
    }

    #[must_use]
    pub fn current_stream_id(&self) -> Option<&str> {
        match &self.block {
            OpenBlock::None => None,
            OpenBlock::Text { stream_id } | OpenBlock::Reasoning { stream_id, .. } => {
                Some(stream_id)
            }
        }
    }

    #[must_use]
    pub fn usage(&self) -> CanonicalUsage {
        self.usage
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.observed_model
            .as_deref()
            .unwrap_or(self.options.model.as_str())
    }

    #[must_use]
    pub fn profile(&self) -> &'static VendorProfile {
        self.profile
    }

    #[must_use]
    pub fn tool_calls(&self) -> &ToolCallAccumulator {
        &self.tool_calls
    }

    fn ensure_text_block(&mut self, out: &mut Vec<CanonicalEvent>) -> String {
        if let OpenBlock::Text { stream_id } = &self.block {
            return stream_id.clone();
        }
        self.close_block(out);
        let stream_id = next_stream_id();
        out.push(CanonicalEvent::TextStart {
            stream_id: stream_id.clone(),
        });
        self.block = OpenBlock::Text {
            stream_id: stream_id.clone(),
        };
        stream_id
    }

    fn ensure_reasoning_block(&mut self, out: &mut Vec<CanonicalEvent>) -> String {
        if let OpenBlock::Reasoning { stream_id, .. } = &self.block {
            return stream_id.clone();
        }
        self.close_block(out);
        let stream_id = next_stream_id();
        out.push(CanonicalEvent::ReasoningStart {
            stream_id: stream_id.clone(),
        });
        self.block = OpenBlock::Reasoning {
            stream_id: stream_id.clone(),
            signature: None,
        };
        stream_id
    }

    fn close_block(&mut self, out: &mut Vec<CanonicalEvent>) {
        match std::mem::replace(&mut self.block, OpenBlock::None) {
            OpenBlock::None => {}
            OpenBlock::Text { stream_id } => out.push(CanonicalEvent::TextEnd { stream_id }),
            OpenBlock::Reasoning {
                stream_id,
                signature,
            } => out.push(CanonicalEvent::ReasoningEnd {
                stream_id,
                metadata: signature.map(|signature| serde_json::json!({ "signature": signature })),
            }),
        }
    }

    fn start_tool_call(
        &mut self,
        key: &str,
        name: Option<String>,
        provider_executed: bool,
        out: &mut Vec<CanonicalEvent>,
    ) {
        let tool_name = name.clone().unwrap_or_default();
        if self.tool_calls.register(key, name, provider_executed) == Registration::New {
            out.push(CanonicalEvent::ToolCallStart {
                call_id: key.to_string(),
                tool_name,
                provider_executed,
            });
        }
    }

    fn stop(&mut self, reason: &str, out: &mut Vec<CanonicalEvent>) {
        self.close_block(out);
        if self.profile.is_tool_round(reason) {
            self.drain_tool_calls(out);
            self.last_stop_was_tool_round = true;
            return;
        }

        // Calls still buffered under a non-tool stop are surfaced, not dropped.
        if !self.tool_calls.is_empty() {
            self.drain_tool_calls(out);
        }
        self.last_stop_was_tool_round = false;
        let finish_reason = self.profile.finish_reason(reason);
        self.emit_finish(finish_reason, out);
    }

    fn drain_tool_calls(&mut self, out: &mut Vec<CanonicalEvent>) {
        for entry in self.tool_calls.drain() {
            self.emit_ready(entry, out);
        }
    }

    fn emit_ready(&self, entry: ToolCallEntry, out: &mut Vec<CanonicalEvent>) {
        let input = match entry.parse_input() {
            Ok(input) => input,
            Err(err) => {
                warn!(
                    vendor = self.profile.name,
                    call_id = %entry.key,
                    error = %err,
                    "dropping tool call with unparseable arguments"
                );
                return;
            }
        };
        let call_id = entry.key;
        out.push(CanonicalEvent::ToolCallReady {
            call_id: call_id.clone(),
            tool_name: entry.name.unwrap_or_default(),
            input,
            provider_executed: entry.provider_executed,
        });
        if !entry.provider_executed {
            out.push(CanonicalEvent::ToolApprovalRequest {
                call_id,
                approval_id: next_approval_id(),
            });
        }
    }

    fn emit_finish(&mut self, finish_reason: FinishReason, out: &mut Vec<CanonicalEvent>) {
        self.finished = true;
        out.push(CanonicalEvent::Finish {
            finish_reason,
            model: self.model().to_string(),
            input_tokens: self.usage.input_tokens,
            output_tokens: self.usage.output_tokens,
            total_tokens: self.usage.total_tokens,
            cached_input_tokens: self.usage.cached_input_tokens,
            temperature: self.options.temperature,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::mapping::{ANTHROPIC, OPENAI};
    use serde_json::json;

    fn session() -> StreamSession {
        StreamSession::new(&OPENAI, SessionOptions::new("gpt-test"))
    }

    fn run(session: &mut StreamSession, deltas: Vec<UpstreamDelta>) -> Vec<CanonicalEvent> {
        let mut out = Vec::new();
        for delta in deltas {
            session.apply(delta, &mut out);
        }
        out
    }

    fn text(s: &str) -> UpstreamDelta {
        UpstreamDelta::TextToken {
            text: s.to_string(),
        }
    }

    fn reasoning(s: &str) -> UpstreamDelta {
        UpstreamDelta::ReasoningToken {
            text: s.to_string(),
            signature: None,
        }
    }

    #[test]
    fn test_text_opens_block_once() {
        let mut s = session();
        let events = run(&mut s, vec![text("a"), text("b")]);
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], CanonicalEvent::TextStart { .. }));
        assert!(s.text_open());
        assert!(!s.reasoning_open());
        let id = s.current_stream_id().unwrap().to_string();
        assert_eq!(
            events[2],
            CanonicalEvent::TextDelta {
                stream_id: id,
                text: "b".to_string()
            }
        );
    }

    #[test]
    fn test_switching_block_types_closes_previous() {
        let mut s = session();
        let events = run(&mut s, vec![reasoning("think"), text("answer")]);
        let kinds: Vec<&str> = events.iter().map(kind).collect();
        assert_eq!(
            kinds,
            vec![
                "reasoning-start",
                "reasoning-delta",
                "reasoning-end",
                "text-start",
                "text-delta"
            ]
        );
    }

    #[test]
    fn test_reasoning_signature_lands_on_end_metadata() {
        let mut s = StreamSession::new(&ANTHROPIC, SessionOptions::new("claude"));
        let mut events = run(
            &mut s,
            vec![
                reasoning("hmm"),
                UpstreamDelta::ReasoningToken {
                    text: String::new(),
                    signature: Some("sig-1".to_string()),
                },
            ],
        );
        s.finish(&mut events);
        let end = events
            .iter()
            .find(|e| matches!(e, CanonicalEvent::ReasoningEnd { .. }))
            .unwrap();
        match end {
            CanonicalEvent::ReasoningEnd { metadata, .. } => {
                assert_eq!(metadata.as_ref().unwrap(), &json!({"signature": "sig-1"}));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_usage_is_last_write_wins() {
        let mut s = session();
        run(
            &mut s,
            vec![
                UpstreamDelta::UsageUpdate {
                    prompt: 10,
                    completion: 5,
                    total: None,
                    cached_input: None,
                },
                UpstreamDelta::UsageUpdate {
                    prompt: 12,
                    completion: 7,
                    total: Some(20),
                    cached_input: Some(4),
                },
            ],
        );
        let usage = s.usage();
        assert_eq!(usage.input_tokens, 12);
        assert_eq!(usage.output_tokens, 7);
        assert_eq!(usage.total_tokens, 20);
        assert_eq!(usage.cached_input_tokens, Some(4));
    }

    #[test]
    fn test_non_tool_stop_maps_reason_and_uses_usage() {
        let mut s = StreamSession::new(
            &OPENAI,
            SessionOptions::new("gpt-test").with_temperature(0.3),
        );
        let events = run(
            &mut s,
            vec![
                text("hi"),
                UpstreamDelta::UsageUpdate {
                    prompt: 3,
                    completion: 1,
                    total: None,
                    cached_input: None,
                },
                UpstreamDelta::ModelObserved {
                    model: "gpt-test-0613".to_string(),
                },
                UpstreamDelta::StopSignal {
                    reason: "length".to_string(),
                },
            ],
        );
        assert!(matches!(events[2], CanonicalEvent::TextEnd { .. }));
        assert_eq!(
            events[3],
            CanonicalEvent::Finish {
                finish_reason: FinishReason::Length,
                model: "gpt-test-0613".to_string(),
                input_tokens: 3,
                output_tokens: 1,
                total_tokens: 4,
                cached_input_tokens: None,
                temperature: Some(0.3),
            }
        );
        assert!(s.is_finished());

        let mut more = Vec::new();
        s.apply(text("late"), &mut more);
        s.finish(&mut more);
        assert!(more.is_empty());
    }

    #[test]
    fn test_tool_result_does_not_close_text_block() {
        let mut s = session();
        let events = run(
            &mut s,
            vec![
                text("a"),
                UpstreamDelta::ToolResultAvailable {
                    id: "ws_1".to_string(),
                    output: json!({"hits": 3}),
                },
                text("b"),
            ],
        );
        let kinds: Vec<&str> = events.iter().map(kind).collect();
        assert_eq!(
            kinds,
            vec!["text-start", "text-delta", "tool-output-available", "text-delta"]
        );
        assert!(matches!(
            events[2],
            CanonicalEvent::ToolOutputAvailable {
                provider_executed: true,
                ..
            }
        ));
    }

    #[test]
    fn test_hosted_call_is_completed_before_its_result() {
        let mut s = StreamSession::new(&ANTHROPIC, SessionOptions::new("claude"));
        let events = run(
            &mut s,
            vec![
                UpstreamDelta::ToolUseStart {
                    id: Some("srvtoolu_1".to_string()),
                    index: Some(0),
                    name: Some("web_search".to_string()),
                    provider_executed: false,
                },
                UpstreamDelta::ToolArgFragment {
                    id: None,
                    index: Some(0),
                    fragment: "{\"query\":\"rust\"}".to_string(),
                },
                UpstreamDelta::ToolResultAvailable {
                    id: "srvtoolu_1".to_string(),
                    output: json!([{"url": "https://www.rust-lang.org"}]),
                },
            ],
        );
        let kinds: Vec<&str> = events.iter().map(kind).collect();
        assert_eq!(
            kinds,
            vec![
                "tool-call-start",
                "tool-call-delta",
                "tool-call-ready",
                "tool-output-available"
            ]
        );
        assert!(s.tool_calls().is_empty());
    }

    #[test]
    fn test_fragment_for_unknown_call_starts_it_first() {
        let mut s = session();
        let events = run(
            &mut s,
            vec![UpstreamDelta::ToolArgFragment {
                id: None,
                index: Some(4),
                fragment: "{}".to_string(),
            }],
        );
        assert_eq!(
            events[0],
            CanonicalEvent::ToolCallStart {
                call_id: "idx:4".to_string(),
                tool_name: String::new(),
                provider_executed: false,
            }
        );
        assert!(matches!(events[1], CanonicalEvent::ToolCallDelta { .. }));
    }

    #[test]
    fn test_duplicate_tool_start_is_not_reemitted() {
        let mut s = session();
        let start = UpstreamDelta::ToolUseStart {
            id: Some("c1".to_string()),
            index: Some(0),
            name: Some("f".to_string()),
            provider_executed: false,
        };
        let events = run(&mut s, vec![start.clone(), start]);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_unparseable_call_is_dropped_on_drain() {
        let mut s = session();
        let events = run(
            &mut s,
            vec![
                UpstreamDelta::ToolUseStart {
                    id: Some("bad".to_string()),
                    index: Some(0),
                    name: Some("f".to_string()),
                    provider_executed: false,
                },
                UpstreamDelta::ToolArgFragment {
                    id: None,
                    index: Some(0),
                    fragment: "{\"a\":".to_string(),
                },
                UpstreamDelta::StopSignal {
                    reason: "tool_calls".to_string(),
                },
            ],
        );
        assert!(!events
            .iter()
            .any(|e| matches!(e, CanonicalEvent::ToolCallReady { .. })));
        assert!(s.tool_calls().is_empty());
    }

    #[test]
    fn test_sources_deduplicated_by_url() {
        let mut s = session();
        let cite = |url: &str| UpstreamDelta::SourceCitation {
            url: url.to_string(),
            title: None,
        };
        let events = run(
            &mut s,
            vec![cite("https://a"), cite("https://b"), cite("https://a")],
        );
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[1], CanonicalEvent::Source { url, .. } if url == "https://b"));
    }

    #[test]
    fn test_upstream_error_closes_block_and_terminates() {
        let mut s = session();
        let mut events = run(
            &mut s,
            vec![
                text("partial"),
                UpstreamDelta::UpstreamError {
                    message: "overloaded".to_string(),
                },
            ],
        );
        s.finish(&mut events);
        let kinds: Vec<&str> = events.iter().map(kind).collect();
        assert_eq!(kinds, vec!["text-start", "text-delta", "text-end", "error"]);
    }

    #[test]
    fn test_index_only_fragments_follow_unpositioned_start() {
        let mut s = session();
        let events = run(
            &mut s,
            vec![
                UpstreamDelta::ToolUseStart {
                    id: Some("t1".to_string()),
                    index: None,
                    name: Some("search".to_string()),
                    provider_executed: false,
                },
                UpstreamDelta::ToolArgFragment {
                    id: None,
                    index: Some(0),
                    fragment: "{\"q\":".to_string(),
                },
                UpstreamDelta::ToolArgFragment {
                    id: None,
                    index: Some(0),
                    fragment: "\"x\"}".to_string(),
                },
                UpstreamDelta::StopSignal {
                    reason: "tool_calls".to_string(),
                },
            ],
        );
        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|e| e.call_id() == Some("t1")));
        assert_eq!(
            events[3],
            CanonicalEvent::ToolCallReady {
                call_id: "t1".to_string(),
                tool_name: "search".to_string(),
                input: json!({"q": "x"}),
                provider_executed: false,
            }
        );
        assert!(s.tool_calls().is_empty());
        assert_eq!(s.tool_calls().alias_count(), 0);
    }

    #[test]
    fn test_finish_after_tool_round_reports_tool_call() {
        let mut s = session();
        let mut events = run(
            &mut s,
            vec![
                UpstreamDelta::ToolUseStart {
                    id: Some("c".to_string()),
                    index: Some(0),
                    name: Some("f".to_string()),
                    provider_executed: false,
                },
                UpstreamDelta::StopSignal {
                    reason: "tool_calls".to_string(),
                },
            ],
        );
        assert!(!s.is_finished());
        s.finish(&mut events);
        assert!(matches!(
            events.last(),
            Some(CanonicalEvent::Finish {
                finish_reason: FinishReason::ToolCall,
                ..
            })
        ));
    }

    #[test]
    fn test_stream_end_with_buffered_calls_reports_stop() {
        let mut s = session();
        let mut events = run(
            &mut s,
            vec![
                UpstreamDelta::ToolUseStart {
                    id: Some("c1".to_string()),
                    index: Some(0),
                    name: Some("f".to_string()),
                    provider_executed: false,
                },
                UpstreamDelta::ToolArgFragment {
                    id: None,
                    index: Some(0),
                    fragment: "{}".to_string(),
                },
            ],
        );
        s.finish(&mut events);
        let kinds: Vec<&str> = events.iter().map(kind).collect();
        assert_eq!(
            kinds,
            vec![
                "tool-call-start",
                "tool-call-delta",
                "tool-call-ready",
                "tool-approval-request",
                "finish"
            ]
        );
        assert!(matches!(
            events.last(),
            Some(CanonicalEvent::Finish {
                finish_reason: FinishReason::Stop,
                ..
            })
        ));
    }

    #[test]
    fn test_client_call_result_leaves_entry_for_drain() {
        let mut s = StreamSession::new(&ANTHROPIC, SessionOptions::new("claude"));
        let events = run(
            &mut s,
            vec![
                UpstreamDelta::ToolUseStart {
                    id: Some("toolu_1".to_string()),
                    index: Some(0),
                    name: Some("get_weather".to_string()),
                    provider_executed: false,
                },
                UpstreamDelta::ToolResultAvailable {
                    id: "toolu_1".to_string(),
                    output: json!({"temp": 21}),
                },
            ],
        );
        let kinds: Vec<&str> = events.iter().map(kind).collect();
        assert_eq!(kinds, vec!["tool-call-start", "tool-output-available"]);
        assert!(matches!(
            events[1],
            CanonicalEvent::ToolOutputAvailable {
                provider_executed: false,
                ..
            }
        ));
        assert_eq!(s.tool_calls().len(), 1);

        let events = run(
            &mut s,
            vec![UpstreamDelta::StopSignal {
                reason: "tool_use".to_string(),
            }],
        );
        let kinds: Vec<&str> = events.iter().map(kind).collect();
        assert_eq!(kinds, vec!["tool-call-ready", "tool-approval-request"]);
        assert!(s.tool_calls().is_empty());
    }

    fn kind(event: &CanonicalEvent) -> &'static str {
        match event {
            CanonicalEvent::TextStart { .. } => "text-start",
            CanonicalEvent::TextDelta { .. } => "text-delta",
            CanonicalEvent::TextEnd { .. } => "text-end",
            CanonicalEvent::ReasoningStart { .. } => "reasoning-start",
            CanonicalEvent::ReasoningDelta { .. } => "reasoning-delta",
            CanonicalEvent::ReasoningEnd { .. } => "reasoning-end",
            CanonicalEvent::ToolCallStart { .. } => "tool-call-start",
            CanonicalEvent::ToolCallDelta { .. } => "tool-call-delta",
            CanonicalEvent::ToolCallReady { .. } => "tool-call-ready",
            CanonicalEvent::ToolApprovalRequest { .. } => "tool-approval-request",
            CanonicalEvent::ToolOutputAvailable { .. } => "tool-output-available",
            CanonicalEvent::Source { .. } => "source",
            CanonicalEvent::Finish { .. } => "finish",
            CanonicalEvent::Error { .. } => "error",
        }
    }
}
