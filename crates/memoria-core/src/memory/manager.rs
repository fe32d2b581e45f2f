//! MemoryManager -- the public facade over the memory subsystem.
//!
//! Every mutation of a user's facts goes through here so the per-user
//! context cache can be invalidated in one place. The manager holds no lock
//! of its own; all shared state lives in the internally synchronized cache.

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use memoria_types::config::MemoryConfig;
use memoria_types::error::MemoryError;
use memoria_types::memory::{
    ExtractionReport, Memory, MemoryCategory, MemoryUpdate, is_valid_importance,
};

use crate::chat::repository::ConversationRepository;
use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::registry::ModelRegistry;

use super::budget::build_budgeted_context;
use super::cache::{ContextCache, TtlContextCache};
use super::extractor::ExtractionPipeline;
use super::store::MemoryRepository;

/// First line of a non-empty compiled context.
pub const MEMORY_CONTEXT_HEADER: &str = "Known facts about the user from previous conversations:\n";

/// Facade coordinating extraction, storage, caching, and context compilation.
pub struct MemoryManager<M, C, R, K = TtlContextCache> {
    memories: M,
    conversations: C,
    models: R,
    provider: BoxLlmProvider,
    cache: K,
    config: MemoryConfig,
}

impl<M, C, R> MemoryManager<M, C, R, TtlContextCache>
where
    M: MemoryRepository,
    C: ConversationRepository,
    R: ModelRegistry,
{
    /// Build a manager with a fresh in-process TTL cache.
    pub fn new(
        memories: M,
        conversations: C,
        models: R,
        provider: BoxLlmProvider,
        config: MemoryConfig,
    ) -> Self {
        Self::with_cache(
            memories,
            conversations,
            models,
            provider,
            TtlContextCache::new(),
            config,
        )
    }
}

impl<M, C, R, K> MemoryManager<M, C, R, K>
where
    M: MemoryRepository,
    C: ConversationRepository,
    R: ModelRegistry,
    K: ContextCache,
{
    pub fn with_cache(
        memories: M,
        conversations: C,
        models: R,
        provider: BoxLlmProvider,
        cache: K,
        config: MemoryConfig,
    ) -> Self {
        Self {
            memories,
            conversations,
            models,
            provider,
            cache,
            config,
        }
    }

    pub fn memories(&self) -> &M {
        &self.memories
    }

    pub fn conversations(&self) -> &C {
        &self.conversations
    }

    pub fn models(&self) -> &R {
        &self.models
    }

    pub fn cache(&self) -> &K {
        &self.cache
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Page through a user's memories. Bypasses the cache.
    pub async fn get_user_memories(
        &self,
        user_id: &Uuid,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Memory>, MemoryError> {
        Ok(self.memories.list_by_user(user_id, limit, offset).await?)
    }

    /// Ranked memories for a user. Bumps each returned memory's usage
    /// counter; counter failures are logged and ignored.
    pub async fn get_relevant_memories(
        &self,
        user_id: &Uuid,
        limit: usize,
    ) -> Result<Vec<Memory>, MemoryError> {
        let memories = self.memories.get_relevant_memories(user_id, limit).await?;

        for memory in &memories {
            if let Err(e) = self.memories.increment_usage(&memory.id).await {
                tracing::debug!(memory_id = %memory.id, error = %e, "Failed to increment memory usage");
            }
        }

        Ok(memories)
    }

    /// Store a user-asserted memory. No dedup pass is run.
    pub async fn create_memory(
        &self,
        user_id: Uuid,
        content: &str,
        category: MemoryCategory,
        importance: u8,
    ) -> Result<Memory, MemoryError> {
        let content = validate_content(content)?;
        validate_importance(importance)?;

        let memory = Memory::new(user_id, content, category, importance, None);
        self.memories.create(&memory).await?;
        self.cache.invalidate(&user_id);

        tracing::info!(user_id = %user_id, memory_id = %memory.id, "Memory created");
        Ok(memory)
    }

    /// Apply a partial update to a memory owned by `user_id`.
    pub async fn update_memory(
        &self,
        user_id: &Uuid,
        memory_id: &Uuid,
        update: MemoryUpdate,
    ) -> Result<Memory, MemoryError> {
        let update = MemoryUpdate {
            content: update
                .content
                .as_deref()
                .map(validate_content)
                .transpose()?,
            ..update
        };
        if let Some(importance) = update.importance {
            validate_importance(importance)?;
        }

        let mut memory = self.owned_memory(user_id, memory_id).await?;
        if update.is_empty() {
            return Ok(memory);
        }

        update.apply_to(&mut memory);
        self.memories.update(&memory).await?;
        self.cache.invalidate(user_id);

        tracing::info!(user_id = %user_id, memory_id = %memory_id, "Memory updated");
        Ok(memory)
    }

    /// Delete a memory owned by `user_id`.
    pub async fn delete_memory(&self, user_id: &Uuid, memory_id: &Uuid) -> Result<(), MemoryError> {
        self.owned_memory(user_id, memory_id).await?;
        self.memories.delete(memory_id).await?;
        self.cache.invalidate(user_id);

        tracing::info!(user_id = %user_id, memory_id = %memory_id, "Memory deleted");
        Ok(())
    }

    /// Delete the user's old, unimportant, unused memories. Returns the count.
    pub async fn cleanup_old_memories(&self, user_id: &Uuid) -> Result<u64, MemoryError> {
        let deleted = self
            .memories
            .delete_low_importance(
                user_id,
                self.config.cleanup_max_age_days,
                self.config.cleanup_max_importance,
            )
            .await?;

        if deleted > 0 {
            self.cache.invalidate(user_id);
        }

        tracing::info!(user_id = %user_id, deleted, "Old memories cleaned up");
        Ok(deleted)
    }

    /// Compiled, budget-bounded context for prompt injection.
    ///
    /// Returns an empty string when there is nothing to inject.
    #[tracing::instrument(skip_all, fields(user_id = %user_id, cache_hit = tracing::field::Empty))]
    pub async fn build_memory_context(&self, user_id: &Uuid) -> Result<String, MemoryError> {
        if let Some(cached) = self.cache.get(user_id) {
            tracing::Span::current().record("cache_hit", true);
            return Ok(cached);
        }
        tracing::Span::current().record("cache_hit", false);

        let memories = self
            .get_relevant_memories(user_id, self.config.context_memory_limit)
            .await?;
        let body = build_budgeted_context(&memories, self.config.context_budget_chars);

        let context = if body.is_empty() {
            String::new()
        } else {
            format!("{MEMORY_CONTEXT_HEADER}{body}")
        };

        self.cache
            .put(*user_id, context.clone(), self.config.cache_ttl());
        Ok(context)
    }

    /// Extract new facts from a conversation, bounded by the configured timeout.
    pub async fn extract_memories(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<ExtractionReport, MemoryError> {
        let outcome = self.run_extraction(user_id, conversation_id).await;
        self.cache.invalidate(&user_id);
        outcome
    }

    /// Like [`extract_memories`](Self::extract_memories), but stops early
    /// with `Cancelled` once `cancel` fires. Facts already stored are kept.
    pub async fn extract_memories_with_cancel(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<ExtractionReport, MemoryError> {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(user_id = %user_id, conversation_id = %conversation_id, "Memory extraction cancelled");
                Err(MemoryError::Cancelled)
            }
            result = self.run_extraction(user_id, conversation_id) => result,
        };
        self.cache.invalidate(&user_id);
        outcome
    }

    async fn run_extraction(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<ExtractionReport, MemoryError> {
        let pipeline = ExtractionPipeline {
            memories: &self.memories,
            conversations: &self.conversations,
            models: &self.models,
            provider: &self.provider,
            config: &self.config,
        };

        match self.config.extraction_timeout() {
            Some(limit) => tokio::time::timeout(limit, pipeline.run(user_id, conversation_id))
                .await
                .map_err(|_| {
                    tracing::warn!(
                        user_id = %user_id,
                        conversation_id = %conversation_id,
                        timeout_secs = limit.as_secs(),
                        "Memory extraction timed out"
                    );
                    MemoryError::Timeout
                })?,
            None => pipeline.run(user_id, conversation_id).await,
        }
    }

    /// Load a memory and check that `user_id` owns it.
    async fn owned_memory(&self, user_id: &Uuid, memory_id: &Uuid) -> Result<Memory, MemoryError> {
        let memory = self
            .memories
            .get_by_id(memory_id)
            .await?
            .ok_or(MemoryError::NotFound)?;

        if &memory.user_id != user_id {
            tracing::warn!(user_id = %user_id, memory_id = %memory_id, "Rejected access to another user's memory");
            return Err(MemoryError::Unauthorized);
        }

        Ok(memory)
    }
}

fn validate_content(content: &str) -> Result<String, MemoryError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(MemoryError::InvalidInput(
            "memory content must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_importance(importance: u8) -> Result<(), MemoryError> {
    if !is_valid_importance(importance) {
        return Err(MemoryError::InvalidInput(format!(
            "importance must be between 1 and 10, got {importance}"
        )));
    }
    Ok(())
}
