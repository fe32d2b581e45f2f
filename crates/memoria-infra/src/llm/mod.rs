//! LLM provider implementations.
//!
//! Concrete implementations of the [`LlmProvider`](memoria_core::llm::provider::LlmProvider)
//! trait, plus [`create_provider`] which builds the configured provider as a
//! [`BoxLlmProvider`].

pub mod openai_compat;

use memoria_core::llm::box_provider::BoxLlmProvider;
use memoria_types::config::LlmConfig;
use memoria_types::llm::LlmError;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::OpenAiCompatConfig;

/// Build the chat-completion provider described by `config`.
///
/// The API key is read from the environment variable named in
/// `config.api_key_env`; a missing key is `AuthenticationFailed`.
pub fn create_provider(config: &LlmConfig) -> Result<BoxLlmProvider, LlmError> {
    let oai_config = OpenAiCompatConfig::from_env(config)?;
    tracing::debug!(
        provider = %oai_config.provider_name,
        base_url = %oai_config.base_url,
        "Creating OpenAI-compatible provider"
    );
    Ok(BoxLlmProvider::new(OpenAiCompatibleProvider::new(oai_config)))
}
