//! Memory extraction from conversations via an auxiliary LLM call.
//!
//! `ExtractionPipeline` runs one extraction for one conversation:
//!
//! 1. Load the most recent messages (no-op below the minimum count)
//! 2. Render them as a `role: content` transcript
//! 3. Resolve the extraction model from the registry
//! 4. Ask the model for a JSON array of `{content, category, importance}`
//! 5. Strip an optional code fence and strictly validate the JSON
//! 6. Skip facts similar to an existing memory, persist the rest
//!
//! Steps 1-5 fail the whole run. In step 6 a failing fact is logged and
//! skipped so one bad insert never aborts the batch. Cache invalidation is
//! the caller's job (see `MemoryManager::extract_memories`).

use serde::Deserialize;
use uuid::Uuid;

use memoria_types::chat::ConversationMessage;
use memoria_types::config::MemoryConfig;
use memoria_types::error::MemoryError;
use memoria_types::llm::{ChatCompletionRequest, ChatMessage};
use memoria_types::memory::{ExtractionReport, Memory, MemoryCategory, is_valid_importance};

use crate::chat::repository::ConversationRepository;
use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::registry::{ModelRegistry, choose_model};

use super::similarity::is_similar_to_any;
use super::store::MemoryRepository;

/// System instruction for the extraction call.
///
/// Restricts the model to facts the user stated outright.
pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are a memory extraction assistant. \
Extract only facts about the user that the user explicitly stated in the conversation. \
Do NOT infer, guess, generalize, or invent anything. \
Ignore statements made only by the assistant unless the user confirmed them. \
Respond with JSON only.";

/// Build the user-turn prompt carrying the transcript and the output contract.
pub fn build_extraction_prompt(transcript: &str) -> String {
    format!(
        r#"Extract long-term facts about the user from the conversation below.

Conversation:
{transcript}

Return a JSON array. Each element must have exactly these fields:
- "content": string (the fact, at most 40 characters)
- "category": string (one of: "preference", "fact", "context")
- "importance": integer (1-10, where 10 = critical to remember)

If the user stated nothing worth remembering, return an empty array: []
Output only the JSON array, without any explanation."#
    )
}

/// Render messages as one `role: content` line each, preserving order.
pub fn render_transcript(messages: &[ConversationMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove an optional Markdown code fence (```` ```json ```` or bare ```` ``` ````)
/// wrapped around a model response. Unfenced text is returned trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Skip the optional language tag, which may run straight into the body
    let body = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    match body.trim_end().strip_suffix("```") {
        Some(inner) => inner.trim(),
        None => trimmed,
    }
}

/// One fact as returned by the model. Unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractedFact {
    pub content: String,
    pub category: MemoryCategory,
    pub importance: u8,
}

/// Parse and validate the model's response text.
///
/// Any deviation from the contract (not JSON, unknown field, category outside
/// the enum, importance outside 1..=10, blank content) rejects the whole
/// response. No partial salvage is attempted.
pub fn parse_extracted_facts(raw: &str) -> Result<Vec<ExtractedFact>, MemoryError> {
    let json = strip_code_fence(raw);

    let facts: Vec<ExtractedFact> = serde_json::from_str(json).map_err(|e| {
        tracing::warn!(
            error = %e,
            content_preview = %json.chars().take(200).collect::<String>(),
            "Failed to parse memory extraction JSON"
        );
        MemoryError::MalformedOutput(e.to_string())
    })?;

    facts
        .into_iter()
        .map(|mut fact| {
            fact.content = fact.content.trim().to_string();
            if fact.content.is_empty() {
                return Err(MemoryError::MalformedOutput(
                    "extracted fact has empty content".to_string(),
                ));
            }
            if !is_valid_importance(fact.importance) {
                return Err(MemoryError::MalformedOutput(format!(
                    "importance {} outside 1..=10",
                    fact.importance
                )));
            }
            Ok(fact)
        })
        .collect()
}

/// Borrowed collaborators for one extraction run.
pub struct ExtractionPipeline<'a, M, C, R> {
    pub memories: &'a M,
    pub conversations: &'a C,
    pub models: &'a R,
    pub provider: &'a BoxLlmProvider,
    pub config: &'a MemoryConfig,
}

impl<M, C, R> ExtractionPipeline<'_, M, C, R>
where
    M: MemoryRepository,
    C: ConversationRepository,
    R: ModelRegistry,
{
    /// Extract facts from `conversation_id` and persist the new ones for `user_id`.
    #[tracing::instrument(
        name = "extract_memories",
        skip_all,
        fields(
            user_id = %user_id,
            conversation_id = %conversation_id,
            gen_ai.request.model = tracing::field::Empty,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
        )
    )]
    pub async fn run(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<ExtractionReport, MemoryError> {
        let messages = self
            .conversations
            .get_recent_messages(&conversation_id, self.config.recent_message_window)
            .await?;

        let mut report = ExtractionReport {
            messages_considered: messages.len(),
            ..Default::default()
        };

        if messages.len() < self.config.min_messages_for_extraction {
            tracing::debug!(
                message_count = messages.len(),
                "Not enough messages for extraction; skipping"
            );
            return Ok(report);
        }

        let transcript = render_transcript(&messages);
        let facts = self.request_facts(&transcript).await?;
        report.extracted = facts.len();

        for fact in facts {
            self.persist_fact(user_id, conversation_id, fact, &mut report)
                .await;
        }

        tracing::info!(
            extracted = report.extracted,
            inserted = report.inserted,
            skipped_duplicates = report.skipped_duplicates,
            failed = report.failed,
            "Memory extraction finished"
        );

        Ok(report)
    }

    /// Resolve the model, call it, and parse its answer.
    async fn request_facts(&self, transcript: &str) -> Result<Vec<ExtractedFact>, MemoryError> {
        let models = self.models.list(true).await?;
        let model = choose_model(
            models,
            self.config.default_model.as_deref(),
            self.config.strict_model_selection,
        )?;

        let span = tracing::Span::current();
        span.record("gen_ai.request.model", model.model_identifier.as_str());

        let request = ChatCompletionRequest {
            model: model.model_identifier.clone(),
            messages: vec![
                ChatMessage::system(EXTRACTION_SYSTEM_PROMPT),
                ChatMessage::user(build_extraction_prompt(transcript)),
            ],
            temperature: Some(self.config.extraction_temperature),
            max_tokens: self.config.extraction_max_tokens,
        };

        let response = self.provider.complete(&request).await?;
        span.record("gen_ai.usage.input_tokens", response.usage.input_tokens);
        span.record("gen_ai.usage.output_tokens", response.usage.output_tokens);

        let content = response.first_content().ok_or_else(|| {
            MemoryError::MalformedOutput("completion returned no choices".to_string())
        })?;

        parse_extracted_facts(content)
    }

    /// Dedup one fact against the user's existing memories and insert it if new.
    async fn persist_fact(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        fact: ExtractedFact,
        report: &mut ExtractionReport,
    ) {
        let existing = match self
            .memories
            .get_relevant_memories(&user_id, self.config.dedup_sample_size)
            .await
        {
            Ok(existing) => existing,
            Err(e) => {
                tracing::warn!(error = %e, content = %fact.content, "Dedup lookup failed; skipping fact");
                report.failed += 1;
                return;
            }
        };

        if is_similar_to_any(&fact.content, existing.iter().map(|m| m.content.as_str())) {
            tracing::debug!(content = %fact.content, "Similar memory exists; skipping");
            report.skipped_duplicates += 1;
            return;
        }

        let memory = Memory::new(
            user_id,
            fact.content,
            fact.category,
            fact.importance,
            Some(conversation_id),
        );

        match self.memories.create(&memory).await {
            Ok(()) => report.inserted += 1,
            Err(e) => {
                tracing::warn!(error = %e, content = %memory.content, "Failed to save extracted memory");
                report.failed += 1;
            }
        }
    }
}
