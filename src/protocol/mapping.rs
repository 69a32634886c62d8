use super::canonical::{FinishReason, ProviderKind};

/// Per-vendor conventions the shared session consults at stop and tool-start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorProfile {
    pub name: &'static str,
    pub stop_reasons: &'static [(&'static str, FinishReason)],
    /// Stop reasons that mean "the model wants the caller to run tools".
    pub tool_round_reasons: &'static [&'static str],
    /// Call id prefixes the vendor uses for tools it executes itself.
    pub hosted_call_prefixes: &'static [&'static str],
}

impl VendorProfile {
    /// Map a native stop reason to the canonical one; unknown values are `Stop`.
    #[must_use]
    pub fn finish_reason(&self, raw: &str) -> FinishReason {
        self.stop_reasons
            .iter()
            .find(|(native, _)| *native == raw)
            .map_or(FinishReason::Stop, |(_, reason)| *reason)
    }

    #[must_use]
    pub fn is_tool_round(&self, raw: &str) -> bool {
        self.tool_round_reasons.contains(&raw)
    }

    #[must_use]
    pub fn is_provider_executed(&self, call_id: &str) -> bool {
        self.hosted_call_prefixes
            .iter()
            .any(|prefix| call_id.starts_with(prefix))
    }
}

// ---------------------------------------------------------------------------
// Stop reason tables
// ---------------------------------------------------------------------------

const OPENAI_STOP_REASONS: &[(&str, FinishReason)] = &[
    ("stop", FinishReason::Stop),
    ("length", FinishReason::Length),
    ("tool_calls", FinishReason::ToolCall),
    ("function_call", FinishReason::ToolCall),
    ("content_filter", FinishReason::ContentFilter),
    ("error", FinishReason::Error),
];

const ANTHROPIC_STOP_REASONS: &[(&str, FinishReason)] = &[
    ("end_turn", FinishReason::Stop),
    ("stop_sequence", FinishReason::Stop),
    ("pause_turn", FinishReason::Stop),
    ("max_tokens", FinishReason::Length),
    ("model_context_window_exceeded", FinishReason::Length),
    ("tool_use", FinishReason::ToolCall),
    ("refusal", FinishReason::ContentFilter),
];

const GEMINI_STOP_REASONS: &[(&str, FinishReason)] = &[
    ("STOP", FinishReason::Stop),
    ("MAX_TOKENS", FinishReason::Length),
    ("SAFETY", FinishReason::ContentFilter),
    ("RECITATION", FinishReason::ContentFilter),
    ("BLOCKLIST", FinishReason::ContentFilter),
    ("PROHIBITED_CONTENT", FinishReason::ContentFilter),
    ("SPII", FinishReason::ContentFilter),
    ("IMAGE_SAFETY", FinishReason::ContentFilter),
    ("MALFORMED_FUNCTION_CALL", FinishReason::Error),
    ("OTHER", FinishReason::Error),
];

const OPENAI_TOOL_ROUND_REASONS: &[&str] = &["tool_calls", "function_call"];

/// Synthetic reason the Gemini adapter reports when a candidate carried function calls.
pub const GEMINI_FUNCTION_CALL_REASON: &str = "FUNCTION_CALL";

pub static OPENAI: VendorProfile = VendorProfile {
    name: "openai",
    stop_reasons: OPENAI_STOP_REASONS,
    tool_round_reasons: OPENAI_TOOL_ROUND_REASONS,
    hosted_call_prefixes: &["ws_", "fs_", "ci_"],
};

pub static ANTHROPIC: VendorProfile = VendorProfile {
    name: "anthropic",
    stop_reasons: ANTHROPIC_STOP_REASONS,
    tool_round_reasons: &["tool_use"],
    hosted_call_prefixes: &["srvtoolu_"],
};

pub static GEMINI: VendorProfile = VendorProfile {
    name: "gemini",
    stop_reasons: GEMINI_STOP_REASONS,
    tool_round_reasons: &[GEMINI_FUNCTION_CALL_REASON],
    hosted_call_prefixes: &[],
};

/// OpenAI-compatible chat vendors share the OpenAI stop table; only the name differs.
const fn openai_compatible(name: &'static str) -> VendorProfile {
    VendorProfile {
        name,
        stop_reasons: OPENAI_STOP_REASONS,
        tool_round_reasons: OPENAI_TOOL_ROUND_REASONS,
        hosted_call_prefixes: &[],
    }
}

pub static GROQ: VendorProfile = openai_compatible("groq");
pub static MISTRAL: VendorProfile = openai_compatible("mistral");
pub static XAI: VendorProfile = openai_compatible("xai");
pub static DEEPSEEK: VendorProfile = openai_compatible("deepseek");
pub static PERPLEXITY: VendorProfile = openai_compatible("perplexity");
pub static OPENROUTER: VendorProfile = openai_compatible("openrouter");
pub static TOGETHER: VendorProfile = openai_compatible("together");
pub static FIREWORKS: VendorProfile = openai_compatible("fireworks");

static ALL_PROFILES: &[&VendorProfile] = &[
    &OPENAI,
    &ANTHROPIC,
    &GEMINI,
    &GROQ,
    &MISTRAL,
    &XAI,
    &DEEPSEEK,
    &PERPLEXITY,
    &OPENROUTER,
    &TOGETHER,
    &FIREWORKS,
];

/// Look up a vendor profile by its configured name.
#[must_use]
pub fn profile_by_name(name: &str) -> Option<&'static VendorProfile> {
    ALL_PROFILES
        .iter()
        .copied()
        .find(|profile| profile.name.eq_ignore_ascii_case(name))
}

/// Default profile for a wire protocol family.
#[must_use]
pub fn default_profile(kind: ProviderKind) -> &'static VendorProfile {
    match kind {
        ProviderKind::OpenAi => &OPENAI,
        ProviderKind::Anthropic => &ANTHROPIC,
        ProviderKind::Gemini => &GEMINI,
    }
}
