//! Global configuration types for Memoria.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! memory subsystem's tuning knobs and the chat-completion endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration for Memoria.
///
/// Loaded from `~/.memoria/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

/// Tuning knobs for extraction, deduplication, caching, and context building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Hard ceiling, in characters, on the compiled context body.
    #[serde(default = "default_context_budget_chars")]
    pub context_budget_chars: usize,

    /// Lifetime of a cached compiled context.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// How many of a conversation's most recent messages feed extraction.
    #[serde(default = "default_recent_message_window")]
    pub recent_message_window: usize,

    /// Below this many messages, extraction is a no-op.
    #[serde(default = "default_min_messages")]
    pub min_messages_for_extraction: usize,

    /// How many existing memories each extracted fact is compared against.
    #[serde(default = "default_dedup_sample_size")]
    pub dedup_sample_size: usize,

    /// How many relevant memories are considered for a context build.
    #[serde(default = "default_context_memory_limit")]
    pub context_memory_limit: usize,

    #[serde(default = "default_extraction_temperature")]
    pub extraction_temperature: f32,

    #[serde(default = "default_extraction_max_tokens")]
    pub extraction_max_tokens: u32,

    #[serde(default = "default_cleanup_max_age_days")]
    pub cleanup_max_age_days: u32,

    #[serde(default = "default_cleanup_max_importance")]
    pub cleanup_max_importance: u8,

    /// Model identifier preferred for extraction.
    #[serde(default)]
    pub default_model: Option<String>,

    /// Fail instead of falling back to the first active model when
    /// `default_model` is not among the active models.
    #[serde(default)]
    pub strict_model_selection: bool,

    /// Deadline for a whole extraction run. `None` means no deadline.
    #[serde(default)]
    pub extraction_timeout_secs: Option<u64>,
}

fn default_context_budget_chars() -> usize {
    1200
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_recent_message_window() -> usize {
    10
}

fn default_min_messages() -> usize {
    2
}

fn default_dedup_sample_size() -> usize {
    100
}

fn default_context_memory_limit() -> usize {
    20
}

fn default_extraction_temperature() -> f32 {
    0.3
}

fn default_extraction_max_tokens() -> u32 {
    400
}

fn default_cleanup_max_age_days() -> u32 {
    30
}

fn default_cleanup_max_importance() -> u8 {
    3
}

impl MemoryConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn extraction_timeout(&self) -> Option<Duration> {
        self.extraction_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            context_budget_chars: default_context_budget_chars(),
            cache_ttl_secs: default_cache_ttl_secs(),
            recent_message_window: default_recent_message_window(),
            min_messages_for_extraction: default_min_messages(),
            dedup_sample_size: default_dedup_sample_size(),
            context_memory_limit: default_context_memory_limit(),
            extraction_temperature: default_extraction_temperature(),
            extraction_max_tokens: default_extraction_max_tokens(),
            cleanup_max_age_days: default_cleanup_max_age_days(),
            cleanup_max_importance: default_cleanup_max_importance(),
            default_model: None,
            strict_model_selection: false,
            extraction_timeout_secs: None,
        }
    }
}

/// Connection settings for the OpenAI-compatible chat-completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Human-readable provider name used in logs.
    #[serde(default = "default_provider_name")]
    pub provider_name: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_provider_name() -> String {
    "openai".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider_name: default_provider_name(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_config_default_values() {
        let config = MemoryConfig::default();
        assert_eq!(config.context_budget_chars, 1200);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.recent_message_window, 10);
        assert_eq!(config.min_messages_for_extraction, 2);
        assert_eq!(config.dedup_sample_size, 100);
        assert_eq!(config.context_memory_limit, 20);
        assert_eq!(config.extraction_max_tokens, 400);
        assert_eq!(config.cleanup_max_age_days, 30);
        assert_eq!(config.cleanup_max_importance, 3);
        assert!(config.default_model.is_none());
        assert!(!config.strict_model_selection);
        assert!(config.extraction_timeout().is_none());
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.memory.context_budget_chars, 1200);
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
[memory]
context_budget_chars = 800
cache_ttl_secs = 60
default_model = "gpt-4o-mini"
strict_model_selection = true
extraction_timeout_secs = 20

[llm]
provider_name = "mistral"
base_url = "https://api.mistral.ai/v1"
api_key_env = "MISTRAL_API_KEY"
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.memory.context_budget_chars, 800);
        assert_eq!(config.memory.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.memory.default_model.as_deref(), Some("gpt-4o-mini"));
        assert!(config.memory.strict_model_selection);
        assert_eq!(
            config.memory.extraction_timeout(),
            Some(Duration::from_secs(20))
        );
        // Unspecified fields keep their defaults
        assert_eq!(config.memory.dedup_sample_size, 100);
        assert_eq!(config.llm.provider_name, "mistral");
        assert_eq!(config.llm.api_key_env, "MISTRAL_API_KEY");
    }
}
