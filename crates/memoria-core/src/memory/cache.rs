//! Per-user cache of compiled memory context.
//!
//! `TtlContextCache` is backed by `DashMap`, so concurrent readers and
//! writers for different users never contend on a single lock. Expiry is
//! lazy: an expired entry is evicted by the `get` that observes it, there is
//! no background sweep. Values are cloned out immediately so no `DashMap`
//! guard is ever held across an `.await`.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use uuid::Uuid;

/// Default lifetime of a cached context.
pub const DEFAULT_CONTEXT_TTL: Duration = Duration::from_secs(5 * 60);

/// Read-through cache of compiled context strings keyed by user.
///
/// Implementations must be internally synchronized; callers never wrap
/// them in an outer lock.
pub trait ContextCache: Send + Sync {
    /// The cached context for `user_id`, if present and not expired.
    fn get(&self, user_id: &Uuid) -> Option<String>;

    /// Store `value` for `user_id`, replacing any existing entry.
    fn put(&self, user_id: Uuid, value: String, ttl: Duration);

    /// Drop the entry for `user_id`. No-op when absent.
    fn invalidate(&self, user_id: &Uuid);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    compiled_context: String,
    expires_at: Instant,
}

/// `DashMap`-backed [`ContextCache`] with lazy TTL expiry.
///
/// Cloning produces a shared view of the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct TtlContextCache {
    entries: Arc<DashMap<Uuid, CacheEntry>>,
}

impl TtlContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, including not-yet-evicted expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContextCache for TtlContextCache {
    fn get(&self, user_id: &Uuid) -> Option<String> {
        let now = Instant::now();

        // Shared read lock on the hit path; the guard drops before eviction.
        let entry = self.entries.get(user_id)?;
        if now < entry.expires_at {
            return Some(entry.compiled_context.clone());
        }
        drop(entry);

        // A concurrent put may have refreshed the entry in between.
        self.entries
            .remove_if(user_id, |_, entry| now >= entry.expires_at);
        None
    }

    fn put(&self, user_id: Uuid, value: String, ttl: Duration) {
        self.entries.insert(
            user_id,
            CacheEntry {
                compiled_context: value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn invalidate(&self, user_id: &Uuid) {
        self.entries.remove(user_id);
    }
}
