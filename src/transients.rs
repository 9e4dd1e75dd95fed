//! Named values with an expiry.
//!
//! Callers get and set through [`TransientStore`] so the backing store can be
//! swapped: [`MemoryTransients`] for a single process, or the SQLite
//! [`Database`](crate::storage::Database) when values must outlive it.
//! Entries are only ever invalidated by expiry.

use anyhow::Result;
use lru::LruCache;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Get/set-with-TTL capability used by cached lookups.
pub trait TransientStore: Sync {
    /// Value stored under `name`, or `None` if absent or expired.
    fn get_transient(&self, name: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Store `value` under `name` for `ttl`, replacing any previous value.
    fn set_transient(
        &self,
        name: &str,
        value: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Default number of entries kept by [`MemoryTransients`].
const DEFAULT_CAPACITY: usize = 256;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process transient store.
///
/// Bounded: once full, the least recently used entry is dropped even if it
/// has not expired yet.
pub struct MemoryTransients {
    entries: Mutex<LruCache<String, Entry>>,
}

impl MemoryTransients {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of stored entries, expired ones included until they are read.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, name: &str) -> Result<Option<String>> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("transient store lock poisoned"))?;

        let expired = match entries.get(name) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(name);
            tracing::trace!(name = %name, "Transient expired");
        }
        Ok(None)
    }

    fn store(&self, name: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("transient store lock poisoned"))?;

        entries.put(
            name.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}

impl Default for MemoryTransients {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

impl TransientStore for MemoryTransients {
    async fn get_transient(&self, name: &str) -> Result<Option<String>> {
        self.lookup(name)
    }

    async fn set_transient(&self, name: &str, value: &str, ttl: Duration) -> Result<()> {
        self.store(name, value, ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing() {
        let store = MemoryTransients::default();
        assert!(store.get_transient("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryTransients::default();
        store
            .set_transient("k", "v", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get_transient("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_set_replaces_value() {
        let store = MemoryTransients::default();
        store
            .set_transient("k", "old", Duration::from_secs(60))
            .await
            .unwrap();
        store
            .set_transient("k", "new", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            store.get_transient("k").await.unwrap().as_deref(),
            Some("new")
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let store = MemoryTransients::default();
        store
            .set_transient("k", "v", Duration::from_secs(3600))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(3599)).await;
        assert!(store.get_transient("k").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(store.get_transient("k").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recent() {
        let store = MemoryTransients::new(NonZeroUsize::new(2).unwrap());
        let ttl = Duration::from_secs(60);
        store.set_transient("a", "1", ttl).await.unwrap();
        store.set_transient("b", "2", ttl).await.unwrap();
        store.set_transient("c", "3", ttl).await.unwrap();

        assert!(store.get_transient("a").await.unwrap().is_none());
        assert!(store.get_transient("c").await.unwrap().is_some());
    }
}
