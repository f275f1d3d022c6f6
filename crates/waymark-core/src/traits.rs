//! Core traits for waymark collaborators.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable geocoding providers and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{GeocodeQuery, GeocodedAddress};

/// Resolves an address query to its best match.
///
/// Implementations perform at most one provider call per lookup (or serve it
/// from cache) and own their own timeout, retry, and backoff policy.
#[async_trait]
pub trait GeocodingLookup: Send + Sync {
    /// Return the best match for `query`, or `None` when nothing matched.
    async fn lookup(&self, query: &GeocodeQuery) -> Result<Option<GeocodedAddress>>;
}
