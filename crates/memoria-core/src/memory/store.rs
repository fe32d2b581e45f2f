//! MemoryRepository trait definition.
//!
//! Provides CRUD and ranked retrieval for user memories. Follows the RPITIT
//! pattern used by every repository port in memoria-core.
//!
//! Every query is scoped by user except `get_by_id`, `update`, and `delete`;
//! callers of those must verify ownership themselves.

use memoria_types::error::RepositoryError;
use memoria_types::memory::Memory;
use uuid::Uuid;

/// Repository trait for long-term memory persistence.
///
/// Implementations live in memoria-infra (e.g., `SqliteMemoryRepository`).
pub trait MemoryRepository: Send + Sync {
    /// Save a new memory.
    fn create(
        &self,
        memory: &Memory,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a memory by ID regardless of owner.
    fn get_by_id(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Memory>, RepositoryError>> + Send;

    /// Overwrite content, category, importance, and `updated_at` of a memory.
    fn update(
        &self,
        memory: &Memory,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a memory by ID. Returns `NotFound` if nothing was deleted.
    fn delete(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Page through a user's memories, newest first.
    fn list_by_user(
        &self,
        user_id: &Uuid,
        limit: usize,
        offset: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Memory>, RepositoryError>> + Send;

    /// Get a user's memories ranked by importance DESC, then recency DESC.
    fn get_relevant_memories(
        &self,
        user_id: &Uuid,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Memory>, RepositoryError>> + Send;

    /// Increment a memory's usage counter by one.
    fn increment_usage(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a user's memories that are older than `max_age_days`, have
    /// `importance <= max_importance`, and are unused by the store's
    /// definition. All conditions must hold. Returns the deleted count.
    fn delete_low_importance(
        &self,
        user_id: &Uuid,
        max_age_days: u32,
        max_importance: u8,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
