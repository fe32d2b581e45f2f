//! SQLite conversation message repository.

use memoria_core::chat::repository::ConversationRepository;
use memoria_types::chat::ConversationMessage;
use memoria_types::error::RepositoryError;
use memoria_types::llm::MessageRole;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_uuid};

/// SQLite-backed implementation of `ConversationRepository`.
pub struct SqliteConversationRepository {
    pool: DatabasePool,
}

impl SqliteConversationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct MessageRow {
    id: String,
    conversation_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ConversationMessage, RepositoryError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(ConversationMessage {
            id: parse_uuid(&self.id, "message id")?,
            conversation_id: parse_uuid(&self.conversation_id, "conversation_id")?,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl ConversationRepository for SqliteConversationRepository {
    async fn save_message(&self, message: &ConversationMessage) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO conversation_messages (id, conversation_id, role, content, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.conversation_id.to_string())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_recent_messages(
        &self,
        conversation_id: &Uuid,
        limit: usize,
    ) -> Result<Vec<ConversationMessage>, RepositoryError> {
        // Newest `limit` first, then flipped back to chronological order
        let rows = sqlx::query(
            "SELECT * FROM conversation_messages WHERE conversation_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(conversation_id.to_string())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in rows.iter().rev() {
            let message_row =
                MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(message_row.into_message()?);
        }

        Ok(messages)
    }
}
