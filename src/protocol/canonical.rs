use serde::{Deserialize, Serialize};

/// The kind of provider an upstream stream comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
}

/// Canonical reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCall,
    ContentFilter,
    Error,
}

impl FinishReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FinishReason::Stop => "stop",
            FinishReason::Length => "length",
            FinishReason::ToolCall => "tool-call",
            FinishReason::ContentFilter => "content-filter",
            FinishReason::Error => "error",
        }
    }
}

/// Token usage as last reported by the upstream.
///
/// Counters are replaced wholesale by each usage-bearing frame; vendors that
/// report cumulative totals rely on this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanonicalUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub cached_input_tokens: Option<u64>,
}

/// A single event in the normalized output sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum CanonicalEvent {
    TextStart {
        stream_id: String,
    },
    TextDelta {
        stream_id: String,
        text: String,
    },
    TextEnd {
        stream_id: String,
    },
    ReasoningStart {
        stream_id: String,
    },
    ReasoningDelta {
        stream_id: String,
        text: String,
    },
    ReasoningEnd {
        stream_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },
    ToolCallStart {
        call_id: String,
        tool_name: String,
        provider_executed: bool,
    },
    ToolCallDelta {
        call_id: String,
        argument_fragment: String,
    },
    ToolCallReady {
        call_id: String,
        tool_name: String,
        input: serde_json::Value,
        provider_executed: bool,
    },
    ToolApprovalRequest {
        call_id: String,
        approval_id: String,
    },
    ToolOutputAvailable {
        call_id: String,
        output: serde_json::Value,
        provider_executed: bool,
    },
    Source {
        url: String,
        source_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Finish {
        finish_reason: FinishReason,
        model: String,
        input_tokens: u64,
        output_tokens: u64,
        total_tokens: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cached_input_tokens: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temperature: Option<f64>,
    },
    Error {
        message: String,
    },
}

impl CanonicalEvent {
    /// Whether this event ends the canonical sequence.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CanonicalEvent::Finish { .. } | CanonicalEvent::Error { .. }
        )
    }

    /// The call id carried by tool lifecycle events.
    #[must_use]
    pub fn call_id(&self) -> Option<&str> {
        match self {
            CanonicalEvent::ToolCallStart { call_id, .. }
            | CanonicalEvent::ToolCallDelta { call_id, .. }
            | CanonicalEvent::ToolCallReady { call_id, .. }
            | CanonicalEvent::ToolApprovalRequest { call_id, .. }
            | CanonicalEvent::ToolOutputAvailable { call_id, .. } => Some(call_id),
            _ => None,
        }
    }
}
