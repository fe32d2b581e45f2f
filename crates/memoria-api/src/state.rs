//! Application state wiring the memory subsystem to its concrete adapters.
//!
//! `MemoryManager` is generic over its ports; AppState pins it to the SQLite
//! repositories and the OpenAI-compatible provider.

use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;

use memoria_core::llm::box_provider::BoxLlmProvider;
use memoria_core::memory::manager::MemoryManager;
use memoria_infra::config::load_global_config;
use memoria_infra::llm::create_provider;
use memoria_infra::llm::openai_compat::OpenAiCompatibleProvider;
use memoria_infra::llm::openai_compat::config::OpenAiCompatConfig;
use memoria_infra::paths::{database_url, resolve_data_dir};
use memoria_infra::sqlite::chat::SqliteConversationRepository;
use memoria_infra::sqlite::memory::SqliteMemoryRepository;
use memoria_infra::sqlite::model::SqliteModelRegistry;
use memoria_infra::sqlite::pool::DatabasePool;
use memoria_types::config::{GlobalConfig, LlmConfig};

/// Memory manager pinned to the infra implementations.
pub type ConcreteMemoryManager =
    MemoryManager<SqliteMemoryRepository, SqliteConversationRepository, SqliteModelRegistry>;

/// Shared state for CLI command handlers.
#[derive(Clone)]
pub struct AppState {
    pub memory: Arc<ConcreteMemoryManager>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Load config, open the database, and wire the memory manager.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;
        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;

        let memory = MemoryManager::new(
            SqliteMemoryRepository::new(db_pool.clone()),
            SqliteConversationRepository::new(db_pool.clone()),
            SqliteModelRegistry::new(db_pool.clone()),
            build_provider(&config.llm),
            config.memory.clone(),
        );

        tracing::debug!(data_dir = %data_dir.display(), "Application state initialized");

        Ok(Self {
            memory: Arc::new(memory),
            config: Arc::new(config),
            data_dir,
            db_pool,
        })
    }
}

/// Build the configured provider. Without an API key, commands that never
/// call the model still work; extraction surfaces the upstream auth error.
fn build_provider(llm: &LlmConfig) -> BoxLlmProvider {
    match create_provider(llm) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::debug!(error = %e, env = %llm.api_key_env, "No API key; extraction will fail until one is set");
            let config = OpenAiCompatConfig::from_parts(llm, SecretString::from(String::new()));
            BoxLlmProvider::new(OpenAiCompatibleProvider::new(config))
        }
    }
}
