use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Ephemeral key/value store with per-key TTL. Namespaces keep QR codes and
/// SMS challenge codes from colliding on the same key space.
#[allow(async_fn_in_trait)]
pub trait CodeCache {
    async fn put(&self, namespace: &str, key: &str, value: &str, ttl: Duration);

    /// Returns the live value, or `None` if the key was never written or has
    /// expired. Absence is definitive, not transient; callers do not retry.
    async fn get(&self, namespace: &str, key: &str) -> Option<String>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Process-local cache backed by a concurrent map. Expired entries are
/// dropped lazily on read; a fresh put for the same key overwrites the old
/// entry (last write wins).
#[derive(Debug, Default)]
pub struct InMemoryCodeCache {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryCodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}:{}", namespace, key)
    }
}

impl CodeCache for InMemoryCodeCache {
    async fn put(&self, namespace: &str, key: &str, value: &str, ttl: Duration) {
        self.entries.insert(
            Self::composite_key(namespace, key),
            CacheEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn get(&self, namespace: &str, key: &str) -> Option<String> {
        let composite = Self::composite_key(namespace, key);
        if let Some(entry) = self.entries.get(&composite) {
            if entry.expires_at > Instant::now() {
                return Some(entry.value.clone());
            }
        }
        // Evict only if the entry is still stale at removal time; a put for
        // the same key may have landed since the read above, and last write
        // wins.
        self.entries
            .remove_if(&composite, |_, entry| entry.expires_at <= Instant::now());
        None
    }
}
