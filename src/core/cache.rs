use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CacheValue<V> {
    value: V,
    expires_at: Option<Instant>,
}

/// In-memory cache with optional per-entry expiry.
#[derive(Clone)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, CacheValue<V>>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Send + Sync + Debug,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock().await;
        let expired = match cache.get(key) {
            Some(entry) => entry.expires_at.is_some_and(|at| at <= Instant::now()),
            None => {
                debug!("Cache MISS for key: {:?}", key);
                return None;
            }
        };

        if expired {
            debug!("Cache entry expired for key: {:?}", key);
            cache.remove(key);
            return None;
        }

        debug!("Cache HIT for key: {:?}", key);
        cache.get(key).map(|entry| entry.value.clone())
    }

    /// Stores `value` and drops every entry that has already expired.
    pub async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        let now = Instant::now();
        let expires_at = ttl.map(|duration| now + duration);
        let mut cache = self.inner.lock().await;
        cache.retain(|_, entry| entry.expires_at.is_none_or(|at| at > now));
        debug!("Cache PUT for key: {:?}", key);
        cache.insert(key, CacheValue { value, expires_at });
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Send + Sync + Debug,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = Cache::<String, i32>::new();

        assert!(cache.get(&"key1".to_string()).await.is_none());

        cache.put("key1".to_string(), 123, None).await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));

        assert!(cache.get(&"key2".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_entry_expires() {
        let cache = Cache::<String, i32>::new();
        cache
            .put("short".to_string(), 1, Some(Duration::from_millis(20)))
            .await;
        cache
            .put("long".to_string(), 2, Some(Duration::from_secs(60)))
            .await;

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(cache.get(&"short".to_string()).await.is_none());
        assert_eq!(cache.get(&"long".to_string()).await, Some(2));
    }

    #[tokio::test]
    async fn test_put_sweeps_expired_entries() {
        let cache = Cache::<String, i32>::new();
        cache
            .put("EUR".to_string(), 1, Some(Duration::from_millis(10)))
            .await;
        cache.put("GBP".to_string(), 2, None).await;
        assert_eq!(cache.len().await, 2);

        tokio::time::sleep(Duration::from_millis(30)).await;
        cache
            .put("JPY".to_string(), 3, Some(Duration::from_secs(60)))
            .await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get(&"GBP".to_string()).await, Some(2));
        assert_eq!(cache.get(&"JPY".to_string()).await, Some(3));
    }
}
