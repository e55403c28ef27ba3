//! Bounded in-process cache for fetched ticker records.
//!
//! Keyed by the uppercase symbol only; least-recently-used eviction at
//! a fixed capacity; no TTL. A record stays until evicted or the
//! process restarts.

use std::sync::Arc;

use cached::{Cached, SizedCache};
use tokio::sync::RwLock;

use crate::error::MarketResult;
use crate::provider::TickerRecord;

pub const DEFAULT_CACHE_CAPACITY: usize = 128;

pub struct RecordCache {
    inner: Arc<RwLock<SizedCache<String, Arc<TickerRecord>>>>,
}

impl RecordCache {
    /// # Panics
    /// Panics if `capacity` is zero; config validation rejects that
    /// before construction.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SizedCache::with_size(capacity))),
        }
    }

    /// Normalizes a raw ticker argument into the cache key form.
    #[must_use]
    pub fn normalize(symbol: &str) -> String {
        symbol.trim().to_uppercase()
    }

    pub async fn get(&self, symbol: &str) -> Option<Arc<TickerRecord>> {
        let key = Self::normalize(symbol);
        // cache_get refreshes recency, so reads take the write lock.
        let mut cache = self.inner.write().await;
        cache.cache_get(&key).cloned()
    }

    pub async fn insert(&self, symbol: &str, record: Arc<TickerRecord>) {
        let key = Self::normalize(symbol);
        let mut cache = self.inner.write().await;
        let _ = cache.cache_set(key, record);
    }

    /// Returns the cached record for `symbol`, or runs `fetcher` and
    /// caches its result. A hit performs no provider call.
    ///
    /// # Errors
    /// Propagates the fetcher's error; nothing is cached on failure.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        symbol: &str,
        fetcher: F,
    ) -> MarketResult<Arc<TickerRecord>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = MarketResult<TickerRecord>>,
    {
        if let Some(record) = self.get(symbol).await {
            tracing::debug!(symbol, "record cache hit");
            return Ok(record);
        }

        tracing::debug!(symbol, "record cache miss");
        let record = Arc::new(fetcher().await?);
        self.insert(symbol, record.clone()).await;
        Ok(record)
    }

    pub async fn len(&self) -> usize {
        let cache = self.inner.read().await;
        cache.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for RecordCache {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarketError;
    use crate::provider::{CompanyProfile, TickerRecord};

    fn record(symbol: &str) -> TickerRecord {
        TickerRecord {
            symbol: symbol.to_string(),
            closes: Vec::new(),
            profile: CompanyProfile::default(),
            income_statement: Vec::new(),
        }
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let cache = RecordCache::new(8);
        cache.insert("nvda", Arc::new(record("NVDA"))).await;
        let hit = cache.get("NvDa").await.unwrap();
        assert_eq!(hit.symbol, "NVDA");
    }

    #[tokio::test]
    async fn second_fetch_skips_the_fetcher() {
        let cache = RecordCache::new(8);
        let mut calls = 0;

        let first = cache
            .get_or_fetch("AAPL", || {
                calls += 1;
                async { Ok(record("AAPL")) }
            })
            .await
            .unwrap();
        assert_eq!(first.symbol, "AAPL");
        assert_eq!(calls, 1);

        let second = cache
            .get_or_fetch("aapl", || {
                calls += 1;
                async { Ok(record("AAPL")) }
            })
            .await
            .unwrap();
        assert_eq!(second.symbol, "AAPL");
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn failed_fetch_caches_nothing() {
        let cache = RecordCache::new(8);
        let result = cache
            .get_or_fetch("MSFT", || async {
                Err(MarketError::Provider("boom".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn eviction_drops_the_least_recently_used_entry() {
        let cache = RecordCache::new(3);
        cache.insert("A", Arc::new(record("A"))).await;
        cache.insert("B", Arc::new(record("B"))).await;
        cache.insert("C", Arc::new(record("C"))).await;

        // Touch A so B becomes least recently used.
        assert!(cache.get("A").await.is_some());
        cache.insert("D", Arc::new(record("D"))).await;

        assert_eq!(cache.len().await, 3);
        assert!(cache.get("B").await.is_none());
        assert!(cache.get("A").await.is_some());
        assert!(cache.get("D").await.is_some());
    }

    #[tokio::test]
    async fn holds_full_capacity_before_evicting() {
        let cache = RecordCache::new(DEFAULT_CACHE_CAPACITY);
        for i in 0..DEFAULT_CACHE_CAPACITY {
            let symbol = format!("SYM{i}");
            cache.insert(&symbol, Arc::new(record(&symbol))).await;
        }
        assert_eq!(cache.len().await, DEFAULT_CACHE_CAPACITY);

        cache.insert("EXTRA", Arc::new(record("EXTRA"))).await;
        assert_eq!(cache.len().await, DEFAULT_CACHE_CAPACITY);
        assert!(cache.get("SYM0").await.is_none());
        assert!(cache.get("EXTRA").await.is_some());
    }
}
