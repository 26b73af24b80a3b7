use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::time::{Duration, Instant};

/// Maximum number of cache entries before eviction kicks in
const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Short-lived cache for aggregation responses, owned by the app state.
///
/// The aggregation queries scan every chat row, so identical reads within
/// the TTL are served from memory instead of hitting PostgreSQL again.
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
}

#[derive(Clone)]
struct CacheEntry {
    data: String,
    expires_at: Instant,
    last_accessed: Instant,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cached data if it exists and hasn't expired
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if let Some(mut entry) = self.entries.get_mut(key) {
            let now = Instant::now();
            if now < entry.expires_at {
                entry.last_accessed = now;
                if let Ok(data) = serde_json::from_str(&entry.data) {
                    return Some(data);
                }
            } else {
                drop(entry);
                self.entries.remove(key);
            }
        }

        None
    }

    pub fn set<T: Serialize>(&self, key: &str, data: &T) -> Result<(), serde_json::Error> {
        if self.ttl.is_zero() {
            return Ok(());
        }

        if self.entries.len() >= self.max_entries {
            self.evict_lru_entries();
        }

        let json_data = serde_json::to_string(data)?;
        let now = Instant::now();

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                data: json_data,
                expires_at: now + self.ttl,
                last_accessed: now,
            },
        );
        Ok(())
    }

    /// Removes 20% of entries, oldest access first.
    fn evict_lru_entries(&self) {
        let current_size = self.entries.len();
        let target_remove = (current_size / 5).max(1);

        let mut entries: Vec<(String, Instant)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().last_accessed))
            .collect();

        entries.sort_by_key(|(_, last_accessed)| *last_accessed);

        for (key, _) in entries.iter().take(target_remove) {
            self.entries.remove(key);
        }

        tracing::info!(
            "🗑️  Cache eviction: removed {} LRU entries (cache size: {} -> {})",
            target_remove,
            current_size,
            self.entries.len()
        );
    }

    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        let before_count = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        let removed = before_count.saturating_sub(self.entries.len());

        if removed > 0 {
            tracing::info!("🧹 Cleaned up {} expired cache entries", removed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_returns_values() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.set("overview", &vec![1i64, 2, 3]).unwrap();
        assert_eq!(cache.get::<Vec<i64>>("overview"), Some(vec![1, 2, 3]));
        assert_eq!(cache.get::<Vec<i64>>("missing"), None);
    }

    #[test]
    fn expired_entries_are_dropped_on_read() {
        let cache = ResponseCache::new(Duration::from_millis(1));
        cache.set("overview", &1i64).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get::<i64>("overview"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_ttl_disables_caching() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.set("overview", &1i64).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn cleanup_drops_only_expired_entries() {
        let cache = ResponseCache::new(Duration::from_millis(200));
        cache.set("old", &1i64).unwrap();
        std::thread::sleep(Duration::from_millis(300));
        cache.set("fresh", &2i64).unwrap();

        cache.cleanup_expired();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get::<i64>("fresh"), Some(2));

        // Nothing left to drop; must not underflow the removed count.
        cache.cleanup_expired();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evicts_least_recently_used_when_full() {
        let cache = ResponseCache::with_capacity(Duration::from_secs(60), 5);
        for i in 0..5 {
            cache.set(&format!("k{i}"), &i).unwrap();
            std::thread::sleep(Duration::from_millis(2));
        }
        // Touch k0 so k1 becomes the oldest.
        assert_eq!(cache.get::<i32>("k0"), Some(0));
        cache.set("k5", &5).unwrap();

        assert_eq!(cache.len(), 5);
        assert_eq!(cache.get::<i32>("k1"), None);
        assert_eq!(cache.get::<i32>("k0"), Some(0));
        assert_eq!(cache.get::<i32>("k5"), Some(5));
    }
}
