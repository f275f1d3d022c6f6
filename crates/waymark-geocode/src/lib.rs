//! # waymark-geocode
//!
//! Geocoding support for waymark proximity search.
//!
//! This crate provides:
//! - Parsing of provider results into [`GeocodedAddress`](waymark_core::GeocodedAddress)
//! - Address component restructuring
//! - An LRU caching decorator for any [`GeocodingLookup`](waymark_core::GeocodingLookup)
//! - A deterministic mock geocoder for tests
//!
//! The HTTP transport to a geocoding provider is left to the host; wrap it
//! in [`CachedGeocoder`] and hand it to the search compiler.

pub mod cache;
pub mod components;
pub mod mock;
pub mod result;

pub use cache::{CacheStats, CachedGeocoder};
pub use components::{components, restructure_components, AddressComponent};
pub use mock::MockGeocoder;
pub use result::{parse_response, parse_result};
