pub mod anthropic;
pub mod canonical;
pub mod gemini;
pub mod mapping;
pub mod openai_chat;

pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use openai_chat::OpenAiChatAdapter;

use crate::stream::StreamAdapter;
use canonical::ProviderKind;
use mapping::VendorProfile;

/// Build the stream adapter for a wire protocol family, optionally with an
/// OpenAI-compatible vendor profile.
#[must_use]
pub fn adapter_for(
    kind: ProviderKind,
    profile: Option<&'static VendorProfile>,
) -> Box<dyn StreamAdapter> {
    match kind {
        ProviderKind::OpenAi => Box::new(OpenAiChatAdapter::with_profile(
            profile.unwrap_or(&mapping::OPENAI),
        )),
        ProviderKind::Anthropic => Box::new(AnthropicAdapter::new()),
        ProviderKind::Gemini => Box::new(GeminiAdapter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_for_uses_profile() {
        let adapter = adapter_for(ProviderKind::OpenAi, mapping::profile_by_name("deepseek"));
        assert_eq!(adapter.profile().name, "deepseek");
        let adapter = adapter_for(ProviderKind::Anthropic, None);
        assert_eq!(adapter.profile().name, "anthropic");
    }
}
