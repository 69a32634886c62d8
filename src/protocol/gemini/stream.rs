use crate::error::GatewayError;
use crate::protocol::mapping::{VendorProfile, GEMINI, GEMINI_FUNCTION_CALL_REASON};
use crate::stream::{StreamAdapter, UpstreamDelta};
use crate::util::next_call_id;

use super::{GeminiCandidate, GeminiResponse, GeminiUsageMetadata};

const GEMINI_NORMAL_STOP: &str = "STOP";

/// Adapter for Gemini `streamGenerateContent`.
///
/// Function calls arrive whole in a single part and Gemini reports `STOP`
/// even when the turn ended on calls; the adapter rewrites that stop to the
/// function-call reason so the session runs a tool round.
#[derive(Debug, Default)]
pub struct GeminiAdapter {
    saw_function_call: bool,
    model_seen: bool,
}

impl GeminiAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an already-parsed chunk into a caller-provided delta buffer.
    pub fn decode_response_into(&mut self, response: GeminiResponse, out: &mut Vec<UpstreamDelta>) {
        if let Some(error) = response.error {
            let message = match error.status {
                Some(status) => format!("{status} ({}): {}", error.code, error.message),
                None => error.message,
            };
            out.push(UpstreamDelta::UpstreamError { message });
            return;
        }

        if !self.model_seen {
            if let Some(model) = response.model_version.filter(|m| !m.is_empty()) {
                self.model_seen = true;
                out.push(UpstreamDelta::ModelObserved { model });
            }
        }

        let candidate = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .find(|candidate| candidate.index.unwrap_or(0) == 0);
        let finish_reason = candidate
            .as_ref()
            .and_then(|candidate| candidate.finish_reason.clone());
        if let Some(candidate) = candidate {
            self.decode_candidate(candidate, out);
        }

        if let Some(usage) = response.usage_metadata {
            out.push(usage_delta(&usage));
        }

        if let Some(reason) = finish_reason {
            let reason = if self.saw_function_call && reason == GEMINI_NORMAL_STOP {
                GEMINI_FUNCTION_CALL_REASON.to_string()
            } else {
                reason
            };
            self.saw_function_call = false;
            out.push(UpstreamDelta::StopSignal { reason });
        }
    }

    fn decode_candidate(&mut self, candidate: GeminiCandidate, out: &mut Vec<UpstreamDelta>) {
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(call) = part.function_call {
                let id = call.id.filter(|id| !id.is_empty()).unwrap_or_else(next_call_id);
                self.saw_function_call = true;
                out.push(UpstreamDelta::ToolUseStart {
                    id: Some(id.clone()),
                    index: None,
                    name: Some(call.name),
                    provider_executed: false,
                });
                if !call.args.is_null() {
                    out.push(UpstreamDelta::ToolArgFragment {
                        id: Some(id),
                        index: None,
                        fragment: call.args.to_string(),
                    });
                }
                continue;
            }

            let Some(text) = part.text else {
                continue;
            };
            if part.thought.unwrap_or(false) {
                out.push(UpstreamDelta::ReasoningToken {
                    text,
                    signature: part.thought_signature,
                });
            } else {
                out.push(UpstreamDelta::TextToken { text });
            }
        }

        let chunks = candidate
            .grounding_metadata
            .map(|meta| meta.grounding_chunks)
            .unwrap_or_default();
        for web in chunks.into_iter().filter_map(|chunk| chunk.web) {
            out.push(UpstreamDelta::SourceCitation {
                url: web.uri,
                title: web.title,
            });
        }
    }
}

fn usage_delta(usage: &GeminiUsageMetadata) -> UpstreamDelta {
    UpstreamDelta::UsageUpdate {
        prompt: usage.prompt_token_count.unwrap_or(0),
        completion: usage.candidates_token_count.unwrap_or(0)
            + usage.thoughts_token_count.unwrap_or(0),
        total: usage.total_token_count,
        cached_input: usage.cached_content_token_count,
    }
}

impl StreamAdapter for GeminiAdapter {
    fn profile(&self) -> &'static VendorProfile {
        &GEMINI
    }

    fn decode_frame(
        &mut self,
        payload: &str,
        out: &mut Vec<UpstreamDelta>,
    ) -> Result<(), GatewayError> {
        let response: GeminiResponse =
            serde_json::from_str(payload).map_err(|e| GatewayError::malformed(GEMINI.name, e))?;
        self.decode_response_into(response, out);
        Ok(())
    }
}
