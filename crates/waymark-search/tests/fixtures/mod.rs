//! Shared fixtures for proximity search integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value as JsonValue};
use waymark_core::{AddressField, FieldKind, StaticFieldLayout};
use waymark_geocode::MockGeocoder;

/// Install a test-friendly tracing subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn component(long: &str, short: &str, types: &[&str]) -> JsonValue {
    json!({"long_name": long, "short_name": short, "types": types})
}

/// Geocoder result for "Chicago" (a locality).
pub fn chicago() -> JsonValue {
    json!({
        "formatted_address": "Chicago, IL, USA",
        "place_id": "ChIJ7cv00DwsDogRAMDACa2m4K8",
        "types": ["locality", "political"],
        "geometry": {"location": {"lat": 41.8781136, "lng": -87.6297982}},
        "address_components": [
            component("Chicago", "Chicago", &["locality", "political"]),
            component("Cook County", "Cook County", &["administrative_area_level_2", "political"]),
            component("Illinois", "IL", &["administrative_area_level_1", "political"]),
            component("United States", "US", &["country", "political"]),
        ]
    })
}

/// Geocoder result for "Cook County" (a second-level administrative area).
pub fn cook_county() -> JsonValue {
    json!({
        "formatted_address": "Cook County, IL, USA",
        "types": ["administrative_area_level_2", "political"],
        "geometry": {"location": {"lat": 41.7376587, "lng": -87.697554}},
        "address_components": [
            component("Cook County", "Cook County", &["administrative_area_level_2", "political"]),
            component("Illinois", "IL", &["administrative_area_level_1", "political"]),
            component("United States", "US", &["country", "political"]),
        ]
    })
}

/// Mock geocoder knowing the fixtures above.
pub fn geocoder() -> MockGeocoder {
    MockGeocoder::new()
        .with_result("Chicago", chicago())
        .with_result("Cook County", cook_county())
}

/// Address field `address` (id 3) whose layout also has a Number field
/// `serviceRadius` and a Plain Text field `summary`.
pub fn address_field() -> AddressField {
    let layout = StaticFieldLayout::new()
        .with_field("serviceRadius", "7c1d5e2a-radius", FieldKind::Number)
        .with_field("summary", "0b9e44f1-summary", FieldKind::PlainText);
    AddressField::new(3, "address", Arc::new(layout))
}
