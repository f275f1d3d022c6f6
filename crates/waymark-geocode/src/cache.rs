//! Caching geocoding lookup.
//!
//! Wraps any [`GeocodingLookup`] with a bounded in-memory LRU. Entries are
//! keyed by a SHA-256 digest of the normalized query: free text is trimmed
//! and lowercased, structured filters are serialized with sorted keys.
//! Both matches and misses are cached; errors are not.
//!
//! The cache lock is never held across the inner lookup, so concurrent
//! misses for the same key may each reach the provider once.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use lru::LruCache;
use serde_json::{Map, Value as JsonValue};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, trace};
use waymark_core::{defaults, GeocodeQuery, GeocodedAddress, GeocodingLookup, Result};

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
}

/// LRU-caching decorator around a geocoding lookup.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: Arc<Mutex<LruCache<String, Option<GeocodedAddress>>>>,
    counters: Counters,
    prefix: String,
}

impl<G: GeocodingLookup> CachedGeocoder<G> {
    /// Wrap `inner` with the default capacity.
    pub fn new(inner: G) -> Self {
        Self::with_capacity(inner, defaults::GEOCODE_CACHE_CAPACITY)
    }

    /// Wrap `inner` with room for `capacity` entries (at least one).
    pub fn with_capacity(inner: G, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
            counters: Counters::default(),
            prefix: defaults::GEOCODE_CACHE_PREFIX.to_string(),
        }
    }

    /// The wrapped lookup.
    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Generate the cache key for a query.
    pub fn cache_key(&self, query: &GeocodeQuery) -> String {
        let mut hasher = Sha256::new();
        match query {
            GeocodeQuery::Text(text) => {
                hasher.update(b"text:");
                hasher.update(text.trim().to_lowercase().as_bytes());
            }
            GeocodeQuery::Structured(map) => {
                hasher.update(b"structured:");
                hasher.update(canonical_json(&JsonValue::Object(map.clone())).as_bytes());
            }
        }
        let hash = hex::encode(hasher.finalize());
        format!("{}{}", self.prefix, &hash[..16])
    }

    /// Current hit/miss counts.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
        }
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.lock().await.is_empty()
    }

    /// Drop every cached entry.
    pub async fn clear(&self) {
        self.cache.lock().await.clear();
    }
}

#[async_trait]
impl<G: GeocodingLookup> GeocodingLookup for CachedGeocoder<G> {
    async fn lookup(&self, query: &GeocodeQuery) -> Result<Option<GeocodedAddress>> {
        let key = self.cache_key(query);

        {
            let mut cache = self.cache.lock().await;
            if let Some(cached) = cache.get(&key) {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                trace!(
                    subsystem = "geocode",
                    component = "geocode_cache",
                    op = "lookup",
                    cache_key = %key,
                    cache_hit = true,
                    "Cache HIT"
                );
                return Ok(cached.clone());
            }
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        let result = self.inner.lookup(query).await?;

        debug!(
            subsystem = "geocode",
            component = "geocode_cache",
            op = "lookup",
            cache_key = %key,
            cache_hit = false,
            matched = result.is_some(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Cache MISS, stored provider result"
        );

        self.cache.lock().await.put(key, result.clone());
        Ok(result)
    }
}

/// Serialize a JSON value with object keys sorted at every depth.
fn canonical_json(value: &JsonValue) -> String {
    fn sort(value: &JsonValue) -> JsonValue {
        match value {
            JsonValue::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                let mut sorted = Map::new();
                for key in keys {
                    sorted.insert(key.clone(), sort(&map[key]));
                }
                JsonValue::Object(sorted)
            }
            JsonValue::Array(items) => JsonValue::Array(items.iter().map(sort).collect()),
            other => other.clone(),
        }
    }
    sort(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGeocoder;
    use serde_json::json;

    fn mock() -> MockGeocoder {
        MockGeocoder::new().with_result(
            "Chicago",
            json!({
                "types": ["locality", "political"],
                "geometry": {"location": {"lat": 41.8781, "lng": -87.6298}}
            }),
        )
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let cached = CachedGeocoder::new(mock());
        let query = GeocodeQuery::Text("Chicago".into());

        let first = cached.lookup(&query).await.unwrap();
        let second = cached.lookup(&query).await.unwrap();

        assert_eq!(first, second);
        assert!(first.is_some());
        assert_eq!(cached.inner().call_count(), 1);
        assert_eq!(cached.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[tokio::test]
    async fn test_text_keys_are_normalized() {
        let cached = CachedGeocoder::new(mock());
        cached
            .lookup(&GeocodeQuery::Text("Chicago".into()))
            .await
            .unwrap();
        cached
            .lookup(&GeocodeQuery::Text("  chicago ".into()))
            .await
            .unwrap();
        assert_eq!(cached.inner().call_count(), 1);
    }

    #[tokio::test]
    async fn test_misses_are_cached() {
        let cached = CachedGeocoder::new(mock());
        let query = GeocodeQuery::Text("Atlantis".into());
        assert!(cached.lookup(&query).await.unwrap().is_none());
        assert!(cached.lookup(&query).await.unwrap().is_none());
        assert_eq!(cached.inner().call_count(), 1);
        assert_eq!(cached.len().await, 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cached = CachedGeocoder::new(MockGeocoder::new().with_failure("quota exceeded"));
        let query = GeocodeQuery::Text("Chicago".into());
        assert!(cached.lookup(&query).await.is_err());
        assert!(cached.lookup(&query).await.is_err());
        assert_eq!(cached.inner().call_count(), 2);
        assert!(cached.is_empty().await);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recent() {
        let cached = CachedGeocoder::with_capacity(mock(), 1);
        let chicago = GeocodeQuery::Text("Chicago".into());
        let other = GeocodeQuery::Text("Evanston".into());

        cached.lookup(&chicago).await.unwrap();
        cached.lookup(&other).await.unwrap();
        cached.lookup(&chicago).await.unwrap();
        assert_eq!(cached.inner().call_count(), 3);

        cached.clear().await;
        assert!(cached.is_empty().await);
    }

    #[test]
    fn test_structured_keys_ignore_key_order() {
        let cached = CachedGeocoder::new(mock());
        let a = json!({"address": "Springfield", "state": "IL"});
        let b = json!({"state": "IL", "address": "Springfield"});
        let key_a = cached.cache_key(&GeocodeQuery::Structured(a.as_object().unwrap().clone()));
        let key_b = cached.cache_key(&GeocodeQuery::Structured(b.as_object().unwrap().clone()));
        assert_eq!(key_a, key_b);
        assert!(key_a.starts_with("wm:geocode:"));
        assert_eq!(key_a.len(), "wm:geocode:".len() + 16);
    }

    #[test]
    fn test_text_and_structured_keys_differ() {
        let cached = CachedGeocoder::new(mock());
        let text = cached.cache_key(&GeocodeQuery::Text("springfield".into()));
        let map = json!({"address": "springfield"});
        let structured = cached.cache_key(&GeocodeQuery::Structured(map.as_object().unwrap().clone()));
        assert_ne!(text, structured);
    }
}
