//! Core data models for waymark.
//!
//! These types are shared across all waymark crates and represent the
//! stored address records and the geocoding results they are matched against.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::defaults;

// =============================================================================
// COORDINATES
// =============================================================================

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Read a `{lat, lng}` pair out of a JSON object.
    ///
    /// Numeric strings are accepted, matching how form input arrives.
    /// Returns `None` unless both values are present and finite.
    pub fn from_json_map(map: &Map<String, JsonValue>) -> Option<Self> {
        let lat = json_number(map.get("lat")?)?;
        let lng = json_number(map.get("lng")?)?;
        Some(Self { lat, lng })
    }
}

/// Location searched from when a target cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultLocation {
    pub coords: Coordinates,
    pub zoom: u8,
}

impl Default for DefaultLocation {
    fn default() -> Self {
        Self {
            coords: Coordinates::new(defaults::LATITUDE, defaults::LONGITUDE),
            zoom: defaults::ZOOM,
        }
    }
}

/// Interpret a JSON value as a finite number.
pub(crate) fn json_number(value: &JsonValue) -> Option<f64> {
    let n = match value {
        JsonValue::Number(n) => n.as_f64()?,
        JsonValue::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

// =============================================================================
// ADDRESS RECORDS
// =============================================================================

/// One geocoded address bound to an element/site/field triple.
///
/// `(element_id, site_id, field_id)` is unique. `lat` and `lng` are written
/// together, but queries treat each as independently nullable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct AddressRecord {
    pub id: i64,
    pub element_id: i64,
    pub site_id: i64,
    pub field_id: i64,
    pub formatted: Option<String>,
    /// Full geocoder response, stored as JSON text.
    pub raw: Option<String>,
    pub name: Option<String>,
    pub street1: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub neighborhood: Option<String>,
    pub county: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub place_id: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub zoom: Option<i16>,
    pub date_created: NaiveDateTime,
    pub date_updated: NaiveDateTime,
    pub uid: String,
}

impl AddressRecord {
    /// Coordinates of this address, only when both halves are present.
    pub fn coords(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }

    /// Whether the address carries a street line.
    pub fn has_street_address(&self) -> bool {
        self.street1.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    /// Parse the stored geocoder payload.
    pub fn raw_json(&self) -> crate::Result<Option<JsonValue>> {
        match self.raw.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Ok(Some(serde_json::from_str(raw)?)),
            _ => Ok(None),
        }
    }
}

// =============================================================================
// GEOCODING
// =============================================================================

/// Structured address components synthesized from a geocoder response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressParts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

/// Best match returned by a geocoding lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedAddress {
    /// Coordinates of the match, when the payload carried a location.
    pub coords: Option<Coordinates>,
    /// Classification tags, most specific first (e.g. `locality`).
    pub types: Vec<String>,
    pub formatted: Option<String>,
    pub place_id: Option<String>,
    /// Components synthesized from the payload.
    pub parts: AddressParts,
    /// The full geocoder result.
    pub raw: JsonValue,
}

impl GeocodedAddress {
    /// Primary classification of the match.
    pub fn primary_type(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }

    /// Whether the geocoder supplied any structured components.
    pub fn has_components(&self) -> bool {
        self.raw
            .get("address_components")
            .and_then(JsonValue::as_array)
            .is_some_and(|c| !c.is_empty())
    }
}

/// Input accepted by a geocoding lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeQuery {
    /// Free-text address, e.g. `"Chicago"`.
    Text(String),
    /// Structured filter, e.g. `{"address": "Springfield", "state": "IL"}`.
    Structured(Map<String, JsonValue>),
}

impl GeocodeQuery {
    /// Free text the query was phrased as.
    ///
    /// Structured filters contribute their `address` entry, if any.
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Structured(map) => map.get("address").and_then(JsonValue::as_str).unwrap_or(""),
        }
    }
}
