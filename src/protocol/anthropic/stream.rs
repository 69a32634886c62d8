use crate::error::GatewayError;
use crate::protocol::mapping::{VendorProfile, ANTHROPIC};
use crate::stream::{StreamAdapter, UpstreamDelta};

use super::{AnthropicContentBlock, AnthropicDelta, AnthropicStreamEvent, AnthropicUsage};

/// Adapter for the Anthropic Messages streaming API.
///
/// Input tokens arrive on `message_start` and output tokens on
/// `message_delta`; the adapter merges them so every usage update it emits is
/// the full running picture.
#[derive(Debug, Default)]
pub struct AnthropicAdapter {
    input_tokens: u64,
    output_tokens: u64,
    cache_read_tokens: Option<u64>,
    cache_creation_tokens: u64,
}

impl AnthropicAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn merge_usage(&mut self, usage: &AnthropicUsage) -> UpstreamDelta {
        if let Some(input) = usage.input_tokens {
            self.input_tokens = input;
        }
        if let Some(output) = usage.output_tokens {
            self.output_tokens = output;
        }
        if usage.cache_read_input_tokens.is_some() {
            self.cache_read_tokens = usage.cache_read_input_tokens;
        }
        if let Some(created) = usage.cache_creation_input_tokens {
            self.cache_creation_tokens = created;
        }
        let prompt = self.input_tokens
            + self.cache_read_tokens.unwrap_or(0)
            + self.cache_creation_tokens;
        UpstreamDelta::UsageUpdate {
            prompt,
            completion: self.output_tokens,
            total: None,
            cached_input: self.cache_read_tokens,
        }
    }

    /// Decode an already-parsed event into a caller-provided delta buffer.
    pub fn decode_event_into(&mut self, event: AnthropicStreamEvent, out: &mut Vec<UpstreamDelta>) {
        match event {
            AnthropicStreamEvent::MessageStart { message } => {
                if !message.model.is_empty() {
                    out.push(UpstreamDelta::ModelObserved {
                        model: message.model,
                    });
                }
                out.push(self.merge_usage(&message.usage));
            }
            AnthropicStreamEvent::ContentBlockStart {
                index,
                content_block,
            } => decode_block_start(index, content_block, out),
            AnthropicStreamEvent::ContentBlockDelta { index, delta } => match delta {
                AnthropicDelta::TextDelta { text } => out.push(UpstreamDelta::TextToken { text }),
                AnthropicDelta::ThinkingDelta { thinking } => {
                    out.push(UpstreamDelta::ReasoningToken {
                        text: thinking,
                        signature: None,
                    });
                }
                AnthropicDelta::SignatureDelta { signature } => {
                    out.push(UpstreamDelta::ReasoningToken {
                        text: String::new(),
                        signature: Some(signature),
                    });
                }
                AnthropicDelta::InputJsonDelta { partial_json } => {
                    out.push(UpstreamDelta::ToolArgFragment {
                        id: None,
                        index: Some(index),
                        fragment: partial_json,
                    });
                }
                AnthropicDelta::CitationsDelta { citation } => {
                    if let Some(url) = citation.url {
                        out.push(UpstreamDelta::SourceCitation {
                            url,
                            title: citation.title,
                        });
                    }
                }
                AnthropicDelta::Unknown => {}
            },
            AnthropicStreamEvent::MessageDelta { delta, usage } => {
                out.push(self.merge_usage(&usage));
                if let Some(reason) = delta.stop_reason {
                    out.push(UpstreamDelta::StopSignal { reason });
                }
            }
            AnthropicStreamEvent::Error { error } => {
                let message = if error.type_.is_empty() {
                    error.message
                } else {
                    format!("{}: {}", error.type_, error.message)
                };
                out.push(UpstreamDelta::UpstreamError { message });
            }
            AnthropicStreamEvent::ContentBlockStop { .. }
            | AnthropicStreamEvent::MessageStop {}
            | AnthropicStreamEvent::Ping {} => {}
        }
    }
}

fn decode_block_start(index: u32, block: AnthropicContentBlock, out: &mut Vec<UpstreamDelta>) {
    match block {
        AnthropicContentBlock::Text { text } => out.push(UpstreamDelta::TextToken { text }),
        AnthropicContentBlock::Thinking {
            thinking,
            signature,
        } => out.push(UpstreamDelta::ReasoningToken {
            text: thinking,
            signature,
        }),
        AnthropicContentBlock::ToolUse { id, name } => out.push(UpstreamDelta::ToolUseStart {
            id: Some(id),
            index: Some(index),
            name: Some(name),
            provider_executed: false,
        }),
        AnthropicContentBlock::ServerToolUse { id, name } => {
            out.push(UpstreamDelta::ToolUseStart {
                id: Some(id),
                index: Some(index),
                name: Some(name),
                provider_executed: true,
            });
        }
        AnthropicContentBlock::WebSearchToolResult {
            tool_use_id,
            content,
        } => {
            if let Some(results) = content.as_array() {
                for result in results {
                    if let Some(url) = result.get("url").and_then(serde_json::Value::as_str) {
                        out.push(UpstreamDelta::SourceCitation {
                            url: url.to_string(),
                            title: result
                                .get("title")
                                .and_then(serde_json::Value::as_str)
                                .map(str::to_string),
                        });
                    }
                }
            }
            out.push(UpstreamDelta::ToolResultAvailable {
                id: tool_use_id,
                output: content,
            });
        }
        AnthropicContentBlock::RedactedThinking { .. } | AnthropicContentBlock::Unknown => {}
    }
}

impl StreamAdapter for AnthropicAdapter {
    fn profile(&self) -> &'static VendorProfile {
        &ANTHROPIC
    }

    fn decode_frame(
        &mut self,
        payload: &str,
        out: &mut Vec<UpstreamDelta>,
    ) -> Result<(), GatewayError> {
        let event: AnthropicStreamEvent = serde_json::from_str(payload)
            .map_err(|e| GatewayError::malformed(ANTHROPIC.name, e))?;
        self.decode_event_into(event, out);
        Ok(())
    }
}
