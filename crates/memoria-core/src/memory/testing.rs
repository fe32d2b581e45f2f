//! In-memory test doubles for the memory subsystem's ports.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use memoria_types::chat::ConversationMessage;
use memoria_types::error::RepositoryError;
use memoria_types::llm::{
    AiModel, ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, LlmError,
    MessageRole, Usage,
};
use memoria_types::memory::Memory;

use crate::chat::repository::ConversationRepository;
use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::provider::LlmProvider;
use crate::llm::registry::ModelRegistry;

use super::store::MemoryRepository;

/// Cleanup treats a memory as unused below this many context selections.
const UNUSED_THRESHOLD: u32 = 3;

#[derive(Default)]
struct MemoriesInner {
    rows: Mutex<Vec<Memory>>,
    fail_create_containing: Mutex<Option<String>>,
    fail_relevant: AtomicBool,
    fail_increment: AtomicBool,
    relevant_calls: AtomicUsize,
}

/// Vec-backed `MemoryRepository`. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryMemories {
    inner: Arc<MemoriesInner>,
}

impl InMemoryMemories {
    pub fn insert(&self, memory: Memory) {
        self.inner.rows.lock().unwrap().push(memory);
    }

    pub fn all(&self) -> Vec<Memory> {
        self.inner.rows.lock().unwrap().clone()
    }

    pub fn find(&self, id: &Uuid) -> Option<Memory> {
        self.all().into_iter().find(|m| &m.id == id)
    }

    pub fn count_for(&self, user_id: &Uuid) -> usize {
        self.all().iter().filter(|m| &m.user_id == user_id).count()
    }

    /// Make `create` fail for any memory whose content contains `needle`.
    pub fn fail_creates_containing(&self, needle: &str) {
        *self.inner.fail_create_containing.lock().unwrap() = Some(needle.to_string());
    }

    pub fn fail_relevant_lookups(&self) {
        self.inner.fail_relevant.store(true, Ordering::SeqCst);
    }

    pub fn fail_usage_increments(&self) {
        self.inner.fail_increment.store(true, Ordering::SeqCst);
    }

    /// Number of `get_relevant_memories` calls observed.
    pub fn relevant_calls(&self) -> usize {
        self.inner.relevant_calls.load(Ordering::SeqCst)
    }
}

impl MemoryRepository for InMemoryMemories {
    async fn create(&self, memory: &Memory) -> Result<(), RepositoryError> {
        if let Some(needle) = self.inner.fail_create_containing.lock().unwrap().as_deref() {
            if memory.content.contains(needle) {
                return Err(RepositoryError::Query("injected create failure".to_string()));
            }
        }
        self.insert(memory.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Memory>, RepositoryError> {
        Ok(self.find(id))
    }

    async fn update(&self, memory: &Memory) -> Result<(), RepositoryError> {
        let mut rows = self.inner.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|m| m.id == memory.id)
            .ok_or(RepositoryError::NotFound)?;
        row.content = memory.content.clone();
        row.category = memory.category;
        row.importance = memory.importance;
        row.updated_at = memory.updated_at;
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let mut rows = self.inner.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|m| &m.id != id);
        if rows.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_by_user(
        &self,
        user_id: &Uuid,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Memory>, RepositoryError> {
        let mut owned: Vec<Memory> = self
            .all()
            .into_iter()
            .filter(|m| &m.user_id == user_id)
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned.into_iter().skip(offset).take(limit).collect())
    }

    async fn get_relevant_memories(
        &self,
        user_id: &Uuid,
        limit: usize,
    ) -> Result<Vec<Memory>, RepositoryError> {
        self.inner.relevant_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_relevant.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        let mut owned: Vec<Memory> = self
            .all()
            .into_iter()
            .filter(|m| &m.user_id == user_id)
            .collect();
        owned.sort_by(|a, b| {
            b.importance
                .cmp(&a.importance)
                .then(b.updated_at.cmp(&a.updated_at))
        });
        owned.truncate(limit);
        Ok(owned)
    }

    async fn increment_usage(&self, id: &Uuid) -> Result<(), RepositoryError> {
        if self.inner.fail_increment.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        let mut rows = self.inner.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or(RepositoryError::NotFound)?;
        row.usage_count += 1;
        Ok(())
    }

    async fn delete_low_importance(
        &self,
        user_id: &Uuid,
        max_age_days: u32,
        max_importance: u8,
    ) -> Result<u64, RepositoryError> {
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(max_age_days));
        let mut rows = self.inner.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|m| {
            !(&m.user_id == user_id
                && m.created_at < cutoff
                && m.importance <= max_importance
                && m.usage_count < UNUSED_THRESHOLD)
        });
        Ok((before - rows.len()) as u64)
    }
}

/// Vec-backed `ConversationRepository`. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryConversations {
    messages: Arc<Mutex<Vec<ConversationMessage>>>,
}

impl InMemoryConversations {
    pub fn with_messages(messages: Vec<ConversationMessage>) -> Self {
        Self {
            messages: Arc::new(Mutex::new(messages)),
        }
    }
}

impl ConversationRepository for InMemoryConversations {
    async fn save_message(&self, message: &ConversationMessage) -> Result<(), RepositoryError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn get_recent_messages(
        &self,
        conversation_id: &Uuid,
        limit: usize,
    ) -> Result<Vec<ConversationMessage>, RepositoryError> {
        let in_conversation: Vec<ConversationMessage> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| &m.conversation_id == conversation_id)
            .cloned()
            .collect();
        let skip = in_conversation.len().saturating_sub(limit);
        Ok(in_conversation.into_iter().skip(skip).collect())
    }
}

/// Fixed model catalog.
pub struct StaticModels {
    models: Vec<AiModel>,
}

impl StaticModels {
    pub fn new(models: Vec<AiModel>) -> Self {
        Self { models }
    }
}

impl ModelRegistry for StaticModels {
    async fn list(&self, active_only: bool) -> Result<Vec<AiModel>, RepositoryError> {
        Ok(self
            .models
            .iter()
            .filter(|m| !active_only || m.is_active)
            .cloned()
            .collect())
    }
}

pub fn active_model(identifier: &str) -> AiModel {
    AiModel {
        id: Uuid::now_v7(),
        name: identifier.to_string(),
        model_identifier: identifier.to_string(),
        is_active: true,
    }
}

pub type RequestLog = Arc<Mutex<Vec<ChatCompletionRequest>>>;

/// Provider that records each request and answers with a canned reply.
pub struct ScriptedProvider {
    reply: Option<String>,
    delay: Option<Duration>,
    requests: RequestLog,
}

impl ScriptedProvider {
    /// Provider returning `content` as the first choice, plus its request log.
    pub fn replying(content: &str) -> (BoxLlmProvider, RequestLog) {
        let requests = RequestLog::default();
        let provider = Self {
            reply: Some(content.to_string()),
            delay: None,
            requests: requests.clone(),
        };
        (BoxLlmProvider::new(provider), requests)
    }

    /// Provider that sleeps for `delay` before replying.
    pub fn delayed(content: &str, delay: Duration) -> BoxLlmProvider {
        BoxLlmProvider::new(Self {
            reply: Some(content.to_string()),
            delay: Some(delay),
            requests: RequestLog::default(),
        })
    }

    /// Provider whose every call fails upstream.
    pub fn failing() -> BoxLlmProvider {
        BoxLlmProvider::new(Self {
            reply: None,
            delay: None,
            requests: RequestLog::default(),
        })
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let Some(content) = self.reply.clone() else {
            return Err(LlmError::Provider {
                message: "scripted failure".to_string(),
            });
        };

        Ok(ChatCompletionResponse {
            id: "scripted-1".to_string(),
            model: request.model.clone(),
            choices: vec![ChatChoice {
                index: 0,
                message: ChatMessage {
                    role: MessageRole::Assistant,
                    content,
                },
            }],
            usage: Usage {
                input_tokens: 100,
                output_tokens: 20,
            },
        })
    }
}
