//! Centralized default constants for waymark.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// PROXIMITY SEARCH
// =============================================================================

/// Range used when the caller omits one or supplies a non-positive value.
pub const RANGE: f64 = 500.0;

/// Units used when the caller omits them or supplies an unknown value.
pub const UNITS: &str = "mi";

/// Earth radius in miles, as used by the haversine formula.
pub const EARTH_RADIUS_MILES: i64 = 3959;

/// Earth radius in kilometers, as used by the haversine formula.
pub const EARTH_RADIUS_KM: i64 = 6371;

/// Marker value of the `subfields` option requesting automatic narrowing.
pub const SUBFIELDS_FALLBACK: &str = "fallback";

// =============================================================================
// DEFAULT LOCATION
// =============================================================================

/// Latitude searched from when a target cannot be resolved.
pub const LATITUDE: f64 = 38.8977;

/// Longitude searched from when a target cannot be resolved.
pub const LONGITUDE: f64 = -77.0365;

/// Map zoom level paired with the default location.
pub const ZOOM: u8 = 11;

// =============================================================================
// ADDRESS TABLE
// =============================================================================

/// Table holding one geocoded address per element/site/field.
pub const ADDRESS_TABLE: &str = "googlemaps_addresses";

/// Alias the address table is joined under.
pub const ADDRESS_ALIAS: &str = "gm_addresses";

/// Alias of the computed distance column.
pub const DISTANCE_ALIAS: &str = "distance";

/// Alias of the per-row reverse radius column.
pub const REVERSE_RADIUS_ALIAS: &str = "gm_reverseRadius";

// =============================================================================
// HOST QUERY
// =============================================================================

/// Base element table of the host query.
pub const ELEMENTS_TABLE: &str = "elements";

/// Per-site element table carrying the JSON `content` column.
pub const ELEMENTS_SITES_TABLE: &str = "elements_sites";

/// JSON column holding custom field values keyed by field layout UID.
pub const CONTENT_COLUMN: &str = "content";

// =============================================================================
// GEOCODING
// =============================================================================

/// Maximum number of geocode responses kept by the lookup cache.
pub const GEOCODE_CACHE_CAPACITY: usize = 1024;

/// Prefix applied to geocode cache keys.
pub const GEOCODE_CACHE_PREFIX: &str = "wm:geocode:";
