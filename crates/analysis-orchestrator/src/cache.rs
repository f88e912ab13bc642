use analysis_core::{FundamentalsCache, FundamentalsSnapshot};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_CACHE_TTL_SECS: i64 = 300;
/// One year.
pub const MAX_CACHE_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Process-local snapshot cache with a fixed time-to-live.
pub struct InMemoryFundamentalsCache {
    entries: DashMap<String, CacheEntry<Arc<FundamentalsSnapshot>>>,
    ttl: Duration,
}

impl InMemoryFundamentalsCache {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::seconds(ttl_secs.clamp(0, MAX_CACHE_TTL_SECS)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InMemoryFundamentalsCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL_SECS)
    }
}

#[async_trait]
impl FundamentalsCache for InMemoryFundamentalsCache {
    async fn get(&self, symbol: &str) -> Option<Arc<FundamentalsSnapshot>> {
        let key = symbol.to_uppercase();
        let hit = self.entries.get(&key).and_then(|entry| {
            let age = Utc::now() - entry.cached_at;
            (age < self.ttl).then(|| Arc::clone(&entry.data))
        });
        match hit {
            Some(snapshot) => {
                debug!(symbol = %key, "Fundamentals cache hit");
                Some(snapshot)
            }
            None => {
                // evict on miss
                self.entries.remove_if(&key, |_, entry| Utc::now() - entry.cached_at >= self.ttl);
                None
            }
        }
    }

    async fn put(&self, symbol: &str, snapshot: Arc<FundamentalsSnapshot>) {
        self.entries.insert(
            symbol.to_uppercase(),
            CacheEntry {
                data: snapshot,
                cached_at: Utc::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get_case_insensitive() {
        let cache = InMemoryFundamentalsCache::default();
        cache.put("aapl", Arc::new(FundamentalsSnapshot::new("AAPL"))).await;
        let hit = cache.get("AAPL").await.unwrap();
        assert_eq!(hit.symbol, "AAPL");
        assert!(cache.get("MSFT").await.is_none());
    }

    #[tokio::test]
    async fn test_oversized_ttl_is_capped() {
        let cache = InMemoryFundamentalsCache::new(i64::MAX);
        assert_eq!(cache.ttl, Duration::seconds(MAX_CACHE_TTL_SECS));
        cache.put("AAPL", Arc::new(FundamentalsSnapshot::new("AAPL"))).await;
        assert!(cache.get("AAPL").await.is_some());
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let cache = InMemoryFundamentalsCache::new(0);
        cache.put("AAPL", Arc::new(FundamentalsSnapshot::new("AAPL"))).await;
        assert!(cache.get("AAPL").await.is_none());
        assert!(cache.is_empty());
    }
}
