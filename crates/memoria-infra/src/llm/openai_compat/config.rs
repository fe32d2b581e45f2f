//! Connection settings for OpenAI-compatible endpoints.

use secrecy::SecretString;

use memoria_types::config::LlmConfig;
use memoria_types::llm::LlmError;

/// Connection settings for an [`super::OpenAiCompatibleProvider`].
///
/// Holds the API key as a [`SecretString`] so it never shows up in `Debug`
/// output or logs.
#[derive(Debug)]
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai", "ollama").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    pub api_key: SecretString,
}

impl OpenAiCompatConfig {
    /// Combine the file-level settings with an already resolved key.
    pub fn from_parts(llm: &LlmConfig, api_key: SecretString) -> Self {
        Self {
            provider_name: llm.provider_name.clone(),
            base_url: llm.base_url.clone(),
            api_key,
        }
    }

    /// Resolve the API key from the environment variable named in `llm.api_key_env`.
    pub fn from_env(llm: &LlmConfig) -> Result<Self, LlmError> {
        let key = std::env::var(&llm.api_key_env).map_err(|_| {
            tracing::warn!(env = %llm.api_key_env, "API key environment variable not set");
            LlmError::AuthenticationFailed
        })?;
        Ok(Self::from_parts(llm, SecretString::from(key)))
    }
}

/// OpenAI defaults: `https://api.openai.com/v1`.
pub fn openai_defaults(api_key: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: "https://api.openai.com/v1".into(),
        api_key: SecretString::from(api_key.to_string()),
    }
}
