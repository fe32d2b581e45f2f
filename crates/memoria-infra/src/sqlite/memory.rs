//! SQLite memory repository implementation.
//!
//! Implements `MemoryRepository` from `memoria-core` using sqlx with split
//! read/write pools: raw queries, a private Row struct, writes on the
//! single-connection writer.

use chrono::Utc;
use memoria_core::memory::store::MemoryRepository;
use memoria_types::error::RepositoryError;
use memoria_types::memory::{Memory, MemoryCategory};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_uuid};

/// Memories selected fewer times than this count as unused for cleanup.
pub const DEFAULT_UNUSED_THRESHOLD: u32 = 3;

/// SQLite-backed implementation of `MemoryRepository`.
pub struct SqliteMemoryRepository {
    pool: DatabasePool,
    unused_threshold: u32,
}

impl SqliteMemoryRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            pool,
            unused_threshold: DEFAULT_UNUSED_THRESHOLD,
        }
    }

    /// Override the usage count below which a memory is eligible for cleanup.
    pub fn with_unused_threshold(mut self, threshold: u32) -> Self {
        self.unused_threshold = threshold;
        self
    }
}

/// Internal row type for mapping SQLite rows to the domain `Memory`.
struct MemoryRow {
    id: String,
    user_id: String,
    content: String,
    category: String,
    importance: i64,
    source_conversation_id: Option<String>,
    usage_count: i64,
    created_at: String,
    updated_at: String,
}

impl MemoryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            content: row.try_get("content")?,
            category: row.try_get("category")?,
            importance: row.try_get("importance")?,
            source_conversation_id: row.try_get("source_conversation_id")?,
            usage_count: row.try_get("usage_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_memory(self) -> Result<Memory, RepositoryError> {
        let category: MemoryCategory = self
            .category
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let importance = u8::try_from(self.importance)
            .map_err(|e| RepositoryError::Query(format!("invalid importance: {e}")))?;
        let usage_count = u32::try_from(self.usage_count)
            .map_err(|e| RepositoryError::Query(format!("invalid usage_count: {e}")))?;
        let source_conversation_id = self
            .source_conversation_id
            .as_deref()
            .map(|s| parse_uuid(s, "source_conversation_id"))
            .transpose()?;

        Ok(Memory {
            id: parse_uuid(&self.id, "memory id")?,
            user_id: parse_uuid(&self.user_id, "user_id")?,
            content: self.content,
            category,
            importance,
            source_conversation_id,
            usage_count,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn rows_to_memories(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Memory>, RepositoryError> {
    let mut memories = Vec::with_capacity(rows.len());
    for row in rows {
        let memory_row =
            MemoryRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        memories.push(memory_row.into_memory()?);
    }
    Ok(memories)
}

fn to_sql_limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl MemoryRepository for SqliteMemoryRepository {
    async fn create(&self, memory: &Memory) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO memories (id, user_id, content, category, importance, source_conversation_id, usage_count, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(memory.id.to_string())
        .bind(memory.user_id.to_string())
        .bind(&memory.content)
        .bind(memory.category.to_string())
        .bind(i64::from(memory.importance))
        .bind(memory.source_conversation_id.map(|id| id.to_string()))
        .bind(i64::from(memory.usage_count))
        .bind(format_datetime(&memory.created_at))
        .bind(format_datetime(&memory.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Memory>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM memories WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let memory_row =
                    MemoryRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(memory_row.into_memory()?))
            }
            None => Ok(None),
        }
    }

    async fn update(&self, memory: &Memory) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE memories SET content = ?, category = ?, importance = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&memory.content)
        .bind(memory.category.to_string())
        .bind(i64::from(memory.importance))
        .bind(format_datetime(&memory.updated_at))
        .bind(memory.id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM memories WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
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
        let rows = sqlx::query(
            "SELECT * FROM memories WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id.to_string())
        .bind(to_sql_limit(limit))
        .bind(to_sql_limit(offset))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_to_memories(&rows)
    }

    async fn get_relevant_memories(
        &self,
        user_id: &Uuid,
        limit: usize,
    ) -> Result<Vec<Memory>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM memories WHERE user_id = ? ORDER BY importance DESC, updated_at DESC LIMIT ?",
        )
        .bind(user_id.to_string())
        .bind(to_sql_limit(limit))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_to_memories(&rows)
    }

    async fn increment_usage(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE memories SET usage_count = usage_count + 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_low_importance(
        &self,
        user_id: &Uuid,
        max_age_days: u32,
        max_importance: u8,
    ) -> Result<u64, RepositoryError> {
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(max_age_days));

        let result = sqlx::query(
            r#"DELETE FROM memories
               WHERE user_id = ? AND created_at < ? AND importance <= ? AND usage_count < ?"#,
        )
        .bind(user_id.to_string())
        .bind(format_datetime(&cutoff))
        .bind(i64::from(max_importance))
        .bind(i64::from(self.unused_threshold))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
