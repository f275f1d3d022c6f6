//! Geocoder result parsing.

use serde_json::Value as JsonValue;
use waymark_core::{Coordinates, Error, GeocodedAddress, Result};

use crate::components::restructure_components;

/// Build a [`GeocodedAddress`] from one raw geocoder result.
///
/// Reads `geometry.location`, `types`, `formatted_address`, and `place_id`.
/// A result without a usable location still parses; its `coords` is `None`.
pub fn parse_result(raw: JsonValue) -> Result<GeocodedAddress> {
    if !raw.is_object() {
        return Err(Error::Geocoding(format!(
            "expected a result object, got {raw}"
        )));
    }

    let coords = raw
        .pointer("/geometry/location")
        .and_then(JsonValue::as_object)
        .and_then(Coordinates::from_json_map);

    let types = raw
        .get("types")
        .and_then(JsonValue::as_array)
        .map(|types| {
            types
                .iter()
                .filter_map(JsonValue::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let text = |key: &str| raw.get(key).and_then(JsonValue::as_str).map(str::to_string);

    Ok(GeocodedAddress {
        coords,
        types,
        formatted: text("formatted_address"),
        place_id: text("place_id"),
        parts: restructure_components(&raw),
        raw,
    })
}

/// Pick the best match out of a full geocoder response.
///
/// The first entry of `results` wins; an empty list is no match.
pub fn parse_response(response: &JsonValue) -> Result<Option<GeocodedAddress>> {
    match response
        .get("results")
        .and_then(JsonValue::as_array)
        .and_then(|results| results.first())
    {
        Some(first) => parse_result(first.clone()).map(Some),
        None => Ok(None),
    }
}
