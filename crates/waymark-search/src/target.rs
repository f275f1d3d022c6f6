//! Target resolution.
//!
//! Turns a [`Target`] into search-origin coordinates. Literal coordinates
//! pass through; free text and structured filters go to the geocoding
//! lookup. Lookup failures never fail a search: they are logged and
//! treated as no match, and the compiler then searches from the default
//! location.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};
use waymark_core::{Coordinates, GeocodeQuery, GeocodedAddress, GeocodingLookup, Target};

/// Outcome of resolving a target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Origin, when one could be determined.
    pub coords: Option<Coordinates>,
    /// Geocoder match, when a lookup was made and matched.
    pub address: Option<GeocodedAddress>,
}

impl Resolution {
    pub fn unresolved() -> Self {
        Self::default()
    }
}

/// Resolves targets through a geocoding lookup.
#[derive(Clone)]
pub struct TargetResolver {
    geocoder: Arc<dyn GeocodingLookup>,
}

impl TargetResolver {
    pub fn new(geocoder: Arc<dyn GeocodingLookup>) -> Self {
        Self { geocoder }
    }

    /// Resolve `target`. Performs at most one lookup.
    pub async fn resolve(&self, target: &Target) -> Resolution {
        let query = match target {
            Target::Literal(coords) => {
                return Resolution {
                    coords: Some(*coords),
                    address: None,
                }
            }
            Target::Text(text) if text.trim().is_empty() => return Resolution::unresolved(),
            Target::Unsupported(value) => {
                debug!(
                    subsystem = "search",
                    component = "target_resolver",
                    value = %value,
                    "Target is neither text nor a filter, not geocoding"
                );
                return Resolution::unresolved();
            }
            Target::Text(text) => GeocodeQuery::Text(text.clone()),
            Target::StructuredFilter(map) => GeocodeQuery::Structured(map.clone()),
        };

        let start = Instant::now();
        match self.geocoder.lookup(&query).await {
            Ok(Some(address)) => {
                debug!(
                    subsystem = "search",
                    component = "target_resolver",
                    op = "resolve",
                    target_kind = target.kind(),
                    geocode_type = address.primary_type().unwrap_or("unknown"),
                    has_coords = address.coords.is_some(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Target geocoded"
                );
                Resolution {
                    coords: address.coords,
                    address: Some(address),
                }
            }
            Ok(None) => {
                debug!(
                    subsystem = "search",
                    component = "target_resolver",
                    op = "resolve",
                    target_kind = target.kind(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Target not found"
                );
                Resolution::unresolved()
            }
            Err(e) => {
                warn!(
                    subsystem = "search",
                    component = "target_resolver",
                    op = "resolve",
                    target_kind = target.kind(),
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Geocoding lookup failed, treating target as unresolved"
                );
                Resolution::unresolved()
            }
        }
    }
}
