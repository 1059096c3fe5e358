//! Query cache keyed by logical resource names.
//!
//! The cache is a derived view over server state, never the source of truth.
//! Each entry carries a staleness flag; invalidation marks an entry stale and
//! wakes subscribers so the next read refetches instead of returning the
//! stored snapshot. Invalidating an entry that is already stale (or absent)
//! is a no-op: no event is published and no extra fetch is triggered before
//! the next read.

use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::http::ClientError;
use crate::lock::{rw_read, rw_write};

const SOURCE: &str = "perch_client::cache";
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Stable logical key for a cached server resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The logged-in user, fetched once per app load from `/api/auth/me`.
    AuthUser,
    /// The profile page user.
    UserProfile,
    /// The current feed.
    Posts,
    /// The notification list.
    Notifications,
}

impl QueryKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AuthUser => "authUser",
            Self::UserProfile => "userProfile",
            Self::Posts => "posts",
            Self::Notifications => "notifications",
        }
    }
}

#[derive(Default)]
struct Entry {
    value: Option<serde_json::Value>,
    stale: bool,
}

impl Entry {
    fn is_fresh(&self) -> bool {
        self.value.is_some() && !self.stale
    }
}

/// Key-value store with per-key staleness flags and a subscription channel.
///
/// Individual key invalidations commute; the only writer per key is the
/// staleness marking, so concurrent invalidations of different keys need no
/// coordination beyond the map lock.
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, Entry>>,
    events: broadcast::Sender<QueryKey>,
}

impl QueryCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            entries: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Subscribe to invalidation events. Each received key means the entry
    /// went from fresh to stale and a refetch will happen on the next read.
    pub fn subscribe(&self) -> broadcast::Receiver<QueryKey> {
        self.events.subscribe()
    }

    /// Mark an entry stale so the next read refetches it.
    ///
    /// No-op with respect to observable state when the entry is already
    /// stale or was never populated.
    pub async fn invalidate(&self, key: QueryKey) {
        let transitioned = {
            let mut entries = rw_write(&self.entries, SOURCE, "invalidate");
            match entries.get_mut(&key) {
                Some(entry) if entry.is_fresh() => {
                    entry.stale = true;
                    true
                }
                _ => false,
            }
        };

        if transitioned {
            debug!(key = key.as_str(), "cache entry invalidated");
            // No receivers is fine; the entry is stale either way.
            let _ = self.events.send(key);
        }
    }

    /// Return the cached value if present and fresh.
    pub fn peek<T: DeserializeOwned>(&self, key: QueryKey) -> Option<T> {
        let entries = rw_read(&self.entries, SOURCE, "peek");
        let entry = entries.get(&key)?;
        if !entry.is_fresh() {
            return None;
        }
        entry
            .value
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn is_stale(&self, key: QueryKey) -> bool {
        rw_read(&self.entries, SOURCE, "is_stale")
            .get(&key)
            .is_none_or(|entry| !entry.is_fresh())
    }

    /// Read path for all server fetches: return the fresh cached value or
    /// run `fetch`, store the result, and clear the staleness flag.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        if let Some(value) = self.peek(key) {
            return Ok(value);
        }

        let fetched = fetch().await?;
        self.store(key, &fetched);
        Ok(fetched)
    }

    /// Store a freshly fetched value without going through `get_or_fetch`.
    pub fn store<T: Serialize>(&self, key: QueryKey, value: &T) {
        match serde_json::to_value(value) {
            Ok(json) => {
                let mut entries = rw_write(&self.entries, SOURCE, "store");
                let entry = entries.entry(key).or_default();
                entry.value = Some(json);
                entry.stale = false;
            }
            Err(err) => {
                // Leave the entry as-is; the caller still has the value.
                warn!(key = key.as_str(), error = %err, "failed to cache value");
            }
        }
    }

    /// Drop all entries, e.g. on logout.
    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn fresh_entry_skips_fetch() {
        let cache = QueryCache::new();
        cache.store(QueryKey::AuthUser, &"wren".to_string());

        let calls = AtomicUsize::new(0);
        let value: String = cache
            .get_or_fetch(QueryKey::AuthUser, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("refetched".to_string())
            })
            .await
            .unwrap();

        assert_eq!(value, "wren");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalidation_forces_refetch_on_next_read() {
        let cache = QueryCache::new();
        cache.store(QueryKey::UserProfile, &1u32);
        cache.invalidate(QueryKey::UserProfile).await;

        let value: u32 = cache
            .get_or_fetch(QueryKey::UserProfile, || async { Ok(2u32) })
            .await
            .unwrap();
        assert_eq!(value, 2);
        assert!(!cache.is_stale(QueryKey::UserProfile));
    }

    #[tokio::test]
    async fn invalidating_stale_entry_is_a_no_op() {
        let cache = QueryCache::new();
        let mut events = cache.subscribe();

        cache.store(QueryKey::AuthUser, &1u32);
        cache.invalidate(QueryKey::AuthUser).await;
        cache.invalidate(QueryKey::AuthUser).await;
        // Never populated, so no event either.
        cache.invalidate(QueryKey::Posts).await;

        assert_eq!(events.try_recv().unwrap(), QueryKey::AuthUser);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn invalidations_of_distinct_keys_commute() {
        let cache = QueryCache::new();
        cache.store(QueryKey::AuthUser, &1u32);
        cache.store(QueryKey::UserProfile, &2u32);

        tokio::join!(
            cache.invalidate(QueryKey::AuthUser),
            cache.invalidate(QueryKey::UserProfile),
        );

        assert!(cache.is_stale(QueryKey::AuthUser));
        assert!(cache.is_stale(QueryKey::UserProfile));
    }

    #[tokio::test]
    async fn clear_drops_all_entries() {
        let cache = QueryCache::new();
        cache.store(QueryKey::Notifications, &vec![1u32, 2]);
        cache.clear();
        assert!(cache.peek::<Vec<u32>>(QueryKey::Notifications).is_none());
    }
}
