//! Memory types for Memoria.
//!
//! These types model a user's long-term memory: short, durable facts and
//! preferences that persist across conversations and are injected into
//! future prompts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Lowest allowed importance score.
pub const MIN_IMPORTANCE: u8 = 1;

/// Highest allowed importance score.
pub const MAX_IMPORTANCE: u8 = 10;

/// Category of a memory entry.
///
/// Closed set: unknown values are rejected at the boundary rather than
/// silently mapped to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryCategory {
    Preference,
    Fact,
    Context,
}

impl fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryCategory::Preference => write!(f, "preference"),
            MemoryCategory::Fact => write!(f, "fact"),
            MemoryCategory::Context => write!(f, "context"),
        }
    }
}

impl FromStr for MemoryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "preference" => Ok(MemoryCategory::Preference),
            "fact" => Ok(MemoryCategory::Fact),
            "context" => Ok(MemoryCategory::Context),
            other => Err(format!("invalid memory category: '{other}'")),
        }
    }
}

/// Whether `importance` lies in the allowed `1..=10` range.
pub fn is_valid_importance(importance: u8) -> bool {
    (MIN_IMPORTANCE..=MAX_IMPORTANCE).contains(&importance)
}

/// A single durable fact about a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: Uuid,
    /// Owner. Every mutation must be performed by this user.
    pub user_id: Uuid,
    pub content: String,
    pub category: MemoryCategory,
    /// Importance score from 1 (trivial) to 10 (critical).
    pub importance: u8,
    /// Conversation the memory was extracted from (None for manual memories).
    ///
    /// Provenance only: deleting the conversation never deletes the memory.
    pub source_conversation_id: Option<Uuid>,
    /// Number of times this memory was selected for a context build.
    pub usage_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Memory {
    /// Build a fresh memory with a new UUIDv7 and zeroed usage.
    pub fn new(
        user_id: Uuid,
        content: impl Into<String>,
        category: MemoryCategory,
        importance: u8,
        source_conversation_id: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            content: content.into(),
            category,
            importance,
            source_conversation_id,
            usage_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this memory was created by the user rather than extracted.
    pub fn is_manual(&self) -> bool {
        self.source_conversation_id.is_none()
    }
}

/// Partial update for an existing memory. Only `Some` fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryUpdate {
    pub content: Option<String>,
    pub category: Option<MemoryCategory>,
    pub importance: Option<u8>,
}

impl MemoryUpdate {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.category.is_none() && self.importance.is_none()
    }

    /// Apply the supplied fields onto `memory`, bumping `updated_at`.
    pub fn apply_to(&self, memory: &mut Memory) {
        if let Some(content) = &self.content {
            memory.content = content.clone();
        }
        if let Some(category) = self.category {
            memory.category = category;
        }
        if let Some(importance) = self.importance {
            memory.importance = importance;
        }
        memory.updated_at = Utc::now();
    }
}

/// Outcome of a single extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Messages rendered into the transcript.
    pub messages_considered: usize,
    /// Facts returned by the model.
    pub extracted: usize,
    /// Facts persisted as new memories.
    pub inserted: usize,
    /// Facts dropped because a similar memory already existed.
    pub skipped_duplicates: usize,
    /// Facts whose dedup lookup or insert failed.
    pub failed: usize,
}
