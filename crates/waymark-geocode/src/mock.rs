//! Mock geocoder for deterministic testing.
//!
//! Results are registered per query text and parsed exactly like provider
//! responses. Every lookup is recorded so tests can assert on call counts.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use serde_json::json;
//! use waymark_core::{GeocodeQuery, GeocodingLookup};
//! use waymark_geocode::MockGeocoder;
//!
//! let geocoder = MockGeocoder::new().with_result(
//!     "Chicago",
//!     json!({"types": ["locality"], "geometry": {"location": {"lat": 41.88, "lng": -87.63}}}),
//! );
//!
//! let found = geocoder.lookup(&GeocodeQuery::Text("chicago".into())).await?;
//! assert!(found.is_some());
//! assert_eq!(geocoder.call_count(), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use waymark_core::{Error, GeocodeQuery, GeocodedAddress, GeocodingLookup, Result};

use crate::result::parse_result;

/// Mock geocoding lookup.
#[derive(Clone, Default)]
pub struct MockGeocoder {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<GeocodeQuery>>>,
}

#[derive(Debug, Clone, Default)]
struct MockConfig {
    results: HashMap<String, JsonValue>,
    failure: Option<String>,
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

impl MockGeocoder {
    /// Create a mock that matches nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `raw` (a single provider result) for lookups of `text`.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Structured queries match on their `address` entry.
    pub fn with_result(mut self, text: impl AsRef<str>, raw: JsonValue) -> Self {
        Arc::make_mut(&mut self.config)
            .results
            .insert(normalize(text.as_ref()), raw);
        self
    }

    /// Fail every lookup with a geocoding error.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(message.into());
        self
    }

    /// All queries received, in order.
    pub fn calls(&self) -> Vec<GeocodeQuery> {
        self.call_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn clear_calls(&self) {
        self.call_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[async_trait]
impl GeocodingLookup for MockGeocoder {
    async fn lookup(&self, query: &GeocodeQuery) -> Result<Option<GeocodedAddress>> {
        self.call_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());

        if let Some(message) = &self.config.failure {
            return Err(Error::Geocoding(message.clone()));
        }

        match self.config.results.get(&normalize(query.text())) {
            Some(raw) => parse_result(raw.clone()).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_registered_result_is_returned() {
        let geocoder = MockGeocoder::new().with_result(
            "Cook County",
            json!({
                "types": ["administrative_area_level_2", "political"],
                "geometry": {"location": {"lat": 41.7377, "lng": -87.6976}}
            }),
        );

        let found = geocoder
            .lookup(&GeocodeQuery::Text(" cook county".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.primary_type(), Some("administrative_area_level_2"));
    }

    #[tokio::test]
    async fn test_structured_query_matches_address_entry() {
        let geocoder = MockGeocoder::new().with_result("Springfield", json!({"types": ["locality"]}));
        let map = json!({"address": "Springfield", "state": "IL"});
        let found = geocoder
            .lookup(&GeocodeQuery::Structured(map.as_object().unwrap().clone()))
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_unknown_query_is_no_match() {
        let geocoder = MockGeocoder::new();
        let found = geocoder
            .lookup(&GeocodeQuery::Text("Nowhere".into()))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_failure_and_call_log() {
        let geocoder = MockGeocoder::new().with_failure("quota exceeded");
        let query = GeocodeQuery::Text("Chicago".into());
        let err = geocoder.lookup(&query).await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(geocoder.calls(), vec![query]);

        geocoder.clear_calls();
        assert_eq!(geocoder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_call_log() {
        let geocoder = MockGeocoder::new();
        let clone = geocoder.clone();
        clone
            .lookup(&GeocodeQuery::Text("x".into()))
            .await
            .unwrap();
        assert_eq!(geocoder.call_count(), 1);
    }
}
