use crate::error::GatewayError;
use crate::protocol::mapping::{VendorProfile, OPENAI};
use crate::stream::{StreamAdapter, UpstreamDelta};

use super::{OpenAiStreamChunk, OpenAiUsage};

/// Adapter for OpenAI Chat Completions and compatible streaming endpoints.
///
/// With `stream_options.include_usage` the usage arrives on a chunk after the
/// one carrying `finish_reason`, so the stop is held back until usage is seen
/// or the stream ends.
#[derive(Debug)]
pub struct OpenAiChatAdapter {
    profile: &'static VendorProfile,
    pending_stop: Option<String>,
    model_seen: bool,
}

impl OpenAiChatAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_profile(&OPENAI)
    }

    /// Adapter for an OpenAI-compatible vendor with its own profile.
    #[must_use]
    pub fn with_profile(profile: &'static VendorProfile) -> Self {
        Self {
            profile,
            pending_stop: None,
            model_seen: false,
        }
    }
}

impl Default for OpenAiChatAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamAdapter for OpenAiChatAdapter {
    fn profile(&self) -> &'static VendorProfile {
        self.profile
    }

    fn decode_frame(
        &mut self,
        payload: &str,
        out: &mut Vec<UpstreamDelta>,
    ) -> Result<(), GatewayError> {
        let chunk: OpenAiStreamChunk = serde_json::from_str(payload)
            .map_err(|e| GatewayError::malformed(self.profile.name, e))?;
        self.decode_chunk_into(chunk, out);
        Ok(())
    }

    fn flush(&mut self, out: &mut Vec<UpstreamDelta>) {
        if let Some(reason) = self.pending_stop.take() {
            out.push(UpstreamDelta::StopSignal { reason });
        }
    }
}

impl OpenAiChatAdapter {
    /// Decode an already-parsed chunk into a caller-provided delta buffer.
    pub fn decode_chunk_into(&mut self, chunk: OpenAiStreamChunk, out: &mut Vec<UpstreamDelta>) {
        if let Some(error) = chunk.error {
            out.push(UpstreamDelta::UpstreamError {
                message: error.message,
            });
            return;
        }

        if !self.model_seen && !chunk.model.is_empty() {
            self.model_seen = true;
            out.push(UpstreamDelta::ModelObserved { model: chunk.model });
        }

        for url in chunk.citations {
            out.push(UpstreamDelta::SourceCitation { url, title: None });
        }

        // Only the first choice is normalized; n > 1 is not streamed through.
        for choice in chunk.choices.into_iter().filter(|choice| choice.index == 0) {
            let delta = choice.delta;
            if let Some(text) = delta.reasoning_content.or(delta.reasoning) {
                out.push(UpstreamDelta::ReasoningToken {
                    text,
                    signature: None,
                });
            }
            if let Some(text) = delta.content {
                out.push(UpstreamDelta::TextToken { text });
            }
            if let Some(text) = delta.refusal {
                out.push(UpstreamDelta::TextToken { text });
            }

            for tc in delta.tool_calls.unwrap_or_default() {
                let function = tc.function.unwrap_or_default();
                if tc.id.is_some() || function.name.is_some() {
                    out.push(UpstreamDelta::ToolUseStart {
                        id: tc.id.clone(),
                        index: tc.index,
                        name: function.name,
                        provider_executed: false,
                    });
                }
                if let Some(fragment) = function.arguments.filter(|args| !args.is_empty()) {
                    out.push(UpstreamDelta::ToolArgFragment {
                        id: tc.id,
                        index: tc.index,
                        fragment,
                    });
                }
            }

            if let Some(reason) = choice.finish_reason {
                self.pending_stop = Some(reason);
            }
        }

        if let Some(usage) = chunk.usage {
            out.push(usage_delta(&usage));
            if let Some(reason) = self.pending_stop.take() {
                out.push(UpstreamDelta::StopSignal { reason });
            }
        }
    }
}

fn usage_delta(usage: &OpenAiUsage) -> UpstreamDelta {
    UpstreamDelta::UsageUpdate {
        prompt: usage.prompt_tokens,
        completion: usage.completion_tokens,
        total: usage.total_tokens,
        cached_input: usage
            .prompt_tokens_details
            .as_ref()
            .and_then(|details| details.cached_tokens),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::mapping::GROQ;

    fn decode(adapter: &mut OpenAiChatAdapter, payload: &str) -> Vec<UpstreamDelta> {
        let mut out = Vec::new();
        adapter.decode_frame(payload, &mut out).unwrap();
        out
    }

    #[test]
    fn test_text_and_model() {
        let mut adapter = OpenAiChatAdapter::new();
        let deltas = decode(
            &mut adapter,
            r#"{"id":"c1","model":"gpt-4o","choices":[{"index":0,"delta":{"role":"assistant","content":"Hi"}}]}"#,
        );
        assert_eq!(
            deltas,
            vec![
                UpstreamDelta::ModelObserved {
                    model: "gpt-4o".to_string()
                },
                UpstreamDelta::TextToken {
                    text: "Hi".to_string()
                },
            ]
        );
        let again = decode(
            &mut adapter,
            r#"{"model":"gpt-4o","choices":[{"index":0,"delta":{"content":"!"}}]}"#,
        );
        assert_eq!(again.len(), 1);
    }

    #[test]
    fn test_tool_call_start_and_fragments() {
        let mut adapter = OpenAiChatAdapter::new();
        let deltas = decode(
            &mut adapter,
            r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"id":"call_1","type":"function","function":{"name":"search","arguments":""}}]}}]}"#,
        );
        assert_eq!(
            deltas,
            vec![UpstreamDelta::ToolUseStart {
                id: Some("call_1".to_string()),
                index: Some(0),
                name: Some("search".to_string()),
                provider_executed: false,
            }]
        );
        let deltas = decode(
            &mut adapter,
            r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{\"q\":1}"}}]}}]}"#,
        );
        assert_eq!(
            deltas,
            vec![UpstreamDelta::ToolArgFragment {
                id: None,
                index: Some(0),
                fragment: "{\"q\":1}".to_string(),
            }]
        );
    }

    #[test]
    fn test_stop_waits_for_usage_chunk() {
        let mut adapter = OpenAiChatAdapter::new();
        let deltas = decode(
            &mut adapter,
            r#"{"choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}"#,
        );
        assert!(deltas.is_empty());
        let deltas = decode(
            &mut adapter,
            r#"{"choices":[],"usage":{"prompt_tokens":9,"completion_tokens":3,"total_tokens":12,"prompt_tokens_details":{"cached_tokens":4}}}"#,
        );
        assert_eq!(
            deltas,
            vec![
                UpstreamDelta::UsageUpdate {
                    prompt: 9,
                    completion: 3,
                    total: Some(12),
                    cached_input: Some(4),
                },
                UpstreamDelta::StopSignal {
                    reason: "stop".to_string()
                },
            ]
        );
        let mut tail = Vec::new();
        adapter.flush(&mut tail);
        assert!(tail.is_empty());
    }

    #[test]
    fn test_flush_releases_stop_without_usage() {
        let mut adapter = OpenAiChatAdapter::with_profile(&GROQ);
        decode(
            &mut adapter,
            r#"{"choices":[{"index":0,"delta":{},"finish_reason":"length"}]}"#,
        );
        let mut tail = Vec::new();
        adapter.flush(&mut tail);
        assert_eq!(
            tail,
            vec![UpstreamDelta::StopSignal {
                reason: "length".to_string()
            }]
        );
        assert_eq!(adapter.profile().name, "groq");
    }

    #[test]
    fn test_reasoning_citations_and_error() {
        let mut adapter = OpenAiChatAdapter::new();
        let deltas = decode(
            &mut adapter,
            r#"{"citations":["https://a.example"],"choices":[{"index":0,"delta":{"reasoning_content":"hmm"}}]}"#,
        );
        assert_eq!(
            deltas,
            vec![
                UpstreamDelta::SourceCitation {
                    url: "https://a.example".to_string(),
                    title: None
                },
                UpstreamDelta::ReasoningToken {
                    text: "hmm".to_string(),
                    signature: None
                },
            ]
        );
        let deltas = decode(
            &mut adapter,
            r#"{"error":{"message":"rate limited","type":"rate_limit"}}"#,
        );
        assert_eq!(
            deltas,
            vec![UpstreamDelta::UpstreamError {
                message: "rate limited".to_string()
            }]
        );
    }

    #[test]
    fn test_malformed_json_is_frame_error() {
        let mut adapter = OpenAiChatAdapter::new();
        let mut out = Vec::new();
        let err = adapter.decode_frame("{not json", &mut out).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::MalformedFrame {
                vendor: "openai",
                ..
            }
        ));
    }
}
