//! ConversationRepository trait definition.
//!
//! Follows the same RPITIT pattern as `MemoryRepository`.

use memoria_types::chat::ConversationMessage;
use memoria_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for conversation message persistence.
///
/// Implementations live in memoria-infra (e.g., `SqliteConversationRepository`).
pub trait ConversationRepository: Send + Sync {
    /// Save a new message within a conversation.
    fn save_message(
        &self,
        message: &ConversationMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get the newest `limit` messages of a conversation, returned oldest-first.
    fn get_recent_messages(
        &self,
        conversation_id: &Uuid,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ConversationMessage>, RepositoryError>> + Send;
}
