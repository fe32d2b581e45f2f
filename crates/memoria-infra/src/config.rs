//! Global configuration loader for Memoria.
//!
//! Reads `config.toml` from the data directory (`~/.memoria/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when the
//! file is missing or malformed, so a broken config never blocks startup.

use std::path::Path;

use memoria_types::config::GlobalConfig;

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - Otherwise returns the parsed config; omitted fields take their defaults.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.memory.context_budget_chars, 1200);
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[memory]
context_budget_chars = 800
default_model = "gpt-4o-mini"
extraction_timeout_secs = 20

[llm]
provider_name = "local"
base_url = "http://localhost:11434/v1"
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.memory.context_budget_chars, 800);
        assert_eq!(config.memory.default_model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.memory.extraction_timeout_secs, Some(20));
        // Unset fields keep their defaults
        assert_eq!(config.memory.recent_message_window, 10);
        assert_eq!(config.llm.provider_name, "local");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.memory.context_budget_chars, 1200);
    }
}
