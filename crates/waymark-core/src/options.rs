//! Proximity search options.
//!
//! Callers hand in a loosely typed option map (the shape templates and query
//! strings produce). [`ProximitySearchOptions::from_json`] sniffs types once
//! and produces tagged unions, so nothing downstream inspects JSON shapes.
//! [`ProximitySearchOptions::normalize`] then applies defaults exactly once.

use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::defaults;
use crate::error::{Error, Result};
use crate::models::{json_number, Coordinates};

// =============================================================================
// UNITS
// =============================================================================

/// Unit system distances are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Miles,
    Kilometers,
}

impl Units {
    /// Parse one of the accepted unit names (`mi`, `km`, `miles`, `kilometers`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mi" | "miles" => Some(Self::Miles),
            "km" | "kilometers" => Some(Self::Kilometers),
            _ => None,
        }
    }

    /// Radius of the Earth in these units.
    pub fn radius(self) -> i64 {
        match self {
            Self::Kilometers => defaults::EARTH_RADIUS_KM,
            Self::Miles => defaults::EARTH_RADIUS_MILES,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Miles => "mi",
            Self::Kilometers => "km",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Radius of the Earth for a unit name. Unknown names fall back to miles.
pub fn haversine_radius(units: &str) -> i64 {
    Units::parse(units).unwrap_or_default().radius()
}

// =============================================================================
// TARGET
// =============================================================================

/// Where a proximity search is centered.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Exact coordinates; no geocoding is performed.
    Literal(Coordinates),
    /// Free-text address to geocode.
    Text(String),
    /// Structured address filter to geocode (lacks `lat`/`lng`).
    StructuredFilter(Map<String, JsonValue>),
    /// Any other non-empty value (a number, `true`, a list). Never
    /// geocoded; the search runs from the default location.
    Unsupported(JsonValue),
}

impl Target {
    /// Classify a raw `target` option. Empty values (`null`, `false`, `0`,
    /// `""`, `[]`, `{}`) yield `None`.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(s) if !s.is_empty() => Some(Self::Text(s.clone())),
            JsonValue::Object(map) if !map.is_empty() => Some(
                Coordinates::from_json_map(map)
                    .map(Self::Literal)
                    .unwrap_or_else(|| Self::StructuredFilter(map.clone())),
            ),
            JsonValue::Bool(true) => Some(Self::Unsupported(value.clone())),
            JsonValue::Number(n) if n.as_f64().is_some_and(|n| n != 0.0) => {
                Some(Self::Unsupported(value.clone()))
            }
            JsonValue::Array(items) if !items.is_empty() => Some(Self::Unsupported(value.clone())),
            _ => None,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Literal(_) => "literal",
            Self::Text(_) => "text",
            Self::StructuredFilter(_) => "structured",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

// =============================================================================
// SUBFIELDS
// =============================================================================

/// Accepted values for a single subfield.
#[derive(Debug, Clone, PartialEq)]
pub enum SubfieldValue {
    Scalar(String),
    List(Vec<String>),
    /// Anything else; the filter builder skips it.
    Invalid,
}

impl SubfieldValue {
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::String(s) => Self::Scalar(s.clone()),
            JsonValue::Number(n) => Self::Scalar(n.to_string()),
            JsonValue::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        JsonValue::String(s) => values.push(s.clone()),
                        JsonValue::Number(n) => values.push(n.to_string()),
                        _ => return Self::Invalid,
                    }
                }
                Self::List(values)
            }
            _ => Self::Invalid,
        }
    }

    /// The accepted values, in order. Empty for `Invalid`.
    pub fn values(&self) -> &[String] {
        match self {
            Self::Scalar(s) => std::slice::from_ref(s),
            Self::List(values) => values,
            Self::Invalid => &[],
        }
    }
}

impl From<&str> for SubfieldValue {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<String> for SubfieldValue {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<Vec<&str>> for SubfieldValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(String::from).collect())
    }
}

/// Ordered mapping of subfield handle to accepted values.
///
/// Insertion order is kept so generated SQL is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubfieldFilter {
    entries: Vec<(String, SubfieldValue)>,
}

impl SubfieldFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`SubfieldFilter::insert`].
    pub fn with(mut self, subfield: impl Into<String>, value: impl Into<SubfieldValue>) -> Self {
        self.insert(subfield, value);
        self
    }

    /// Set the values for a subfield, replacing any earlier entry in place.
    pub fn insert(&mut self, subfield: impl Into<String>, value: impl Into<SubfieldValue>) {
        let subfield = subfield.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == subfield) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((subfield, value)),
        }
    }

    pub fn get(&self, subfield: &str) -> Option<&SubfieldValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == subfield)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SubfieldValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_json_map(map: &Map<String, JsonValue>) -> Self {
        let mut filter = Self::new();
        for (subfield, value) in map {
            filter.insert(subfield.clone(), SubfieldValue::from_json(value));
        }
        filter
    }
}

/// The `subfields` option.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Subfields {
    #[default]
    None,
    Explicit(SubfieldFilter),
    /// Derive a filter from the geocoded target.
    Fallback,
}

impl Subfields {
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::String(s) if s == defaults::SUBFIELDS_FALLBACK => Self::Fallback,
            JsonValue::Object(map) => Self::Explicit(SubfieldFilter::from_json_map(map)),
            _ => Self::None,
        }
    }
}

// =============================================================================
// OPTIONS
// =============================================================================

/// Configuration for a single proximity search, as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProximitySearchOptions {
    /// Search radius; `None`, non-finite, and non-positive values use the default.
    pub range: Option<f64>,
    /// Unit name; omitted units use the default, unknown names use miles.
    pub units: Option<String>,
    pub target: Option<Target>,
    pub subfields: Subfields,
    pub require_coords: bool,
    /// Handle of a Number field holding each record's own radius.
    pub reverse_radius: Option<String>,
    /// Set when parsed from a non-empty option map, even if every value in
    /// it was ignored or defaulted.
    pub supplied: bool,
}

impl ProximitySearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: f64) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_subfields(mut self, subfields: Subfields) -> Self {
        self.subfields = subfields;
        self
    }

    pub fn require_coords(mut self, require: bool) -> Self {
        self.require_coords = require;
        self
    }

    pub fn with_reverse_radius(mut self, handle: impl Into<String>) -> Self {
        self.reverse_radius = Some(handle.into());
        self
    }

    /// Whether no option was supplied at all.
    ///
    /// Options parsed from a non-empty map are never empty.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Parse the option map used by templates and query strings.
    ///
    /// Recognized keys: `range`, `units`, `target`, `subfields`,
    /// `requireCoords`, `reverseRadius`. Unknown keys are ignored and
    /// malformed values are dropped in favor of defaults. Only a
    /// non-object `options` value is rejected.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let map = match value {
            JsonValue::Object(map) => map,
            JsonValue::Null => return Ok(Self::default()),
            other => {
                return Err(Error::InvalidInput(format!(
                    "proximity search options must be an object, got {}",
                    json_kind(other)
                )))
            }
        };

        Ok(Self {
            range: map.get("range").and_then(json_number),
            units: map
                .get("units")
                .and_then(JsonValue::as_str)
                .map(str::to_string),
            target: map.get("target").and_then(Target::from_json),
            subfields: map
                .get("subfields")
                .map(Subfields::from_json)
                .unwrap_or_default(),
            require_coords: map
                .get("requireCoords")
                .is_some_and(json_truthy),
            reverse_radius: map
                .get("reverseRadius")
                .and_then(JsonValue::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            supplied: !map.is_empty(),
        })
    }

    /// Apply the built-in defaults to `range` and `units`.
    pub fn normalize(&self) -> NormalizedOptions {
        self.normalize_with(defaults::RANGE, Units::default())
    }

    /// Apply caller-chosen defaults to `range` and `units`.
    pub fn normalize_with(&self, default_range: f64, default_units: Units) -> NormalizedOptions {
        let range = match self.range {
            Some(r) if r.is_finite() && r > 0.0 => r,
            other => {
                if other.is_some() {
                    debug!(range = ?other, "Invalid range, using default");
                }
                default_range
            }
        };

        // Omitted units take the configured default; unknown names always
        // mean miles.
        let units = match self.units.as_deref() {
            None => default_units,
            Some(name) => Units::parse(name).unwrap_or_else(|| {
                debug!(units = name, "Unknown units, using miles");
                Units::Miles
            }),
        };

        NormalizedOptions {
            range,
            units,
            target: self.target.clone(),
            subfields: self.subfields.clone(),
            require_coords: self.require_coords,
            reverse_radius: self.reverse_radius.clone(),
        }
    }
}

/// Options after defaults have been applied. Read-only during compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOptions {
    pub range: f64,
    pub units: Units,
    pub target: Option<Target>,
    pub subfields: Subfields,
    pub require_coords: bool,
    pub reverse_radius: Option<String>,
}

fn json_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        JsonValue::String(s) => !s.is_empty() && s != "0" && s != "false",
        _ => false,
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_range_uses_default() {
        for range in [None, Some(0.0), Some(-5.0), Some(f64::NAN), Some(f64::INFINITY)] {
            let options = ProximitySearchOptions {
                range,
                ..Default::default()
            };
            assert_eq!(options.normalize().range, 500.0, "range {range:?}");
        }
    }

    #[test]
    fn test_valid_range_is_kept() {
        let options = ProximitySearchOptions::new().with_range(25.5);
        assert_eq!(options.normalize().range, 25.5);
    }

    #[test]
    fn test_normalize_with_custom_defaults() {
        let normalized = ProximitySearchOptions::new().normalize_with(50.0, Units::Kilometers);
        assert_eq!(normalized.range, 50.0);
        assert_eq!(normalized.units, Units::Kilometers);
    }

    #[test]
    fn test_unknown_units_are_miles_regardless_of_default() {
        let normalized = ProximitySearchOptions::new()
            .with_units("leagues")
            .normalize_with(50.0, Units::Kilometers);
        assert_eq!(normalized.units, Units::Miles);
        assert_eq!(normalized.units.radius(), 3959);
    }

    #[test]
    fn test_non_numeric_range_from_json_uses_default() {
        for raw in [json!("far"), json!(true), json!([]), json!("-3"), json!(0)] {
            let options = ProximitySearchOptions::from_json(&json!({"range": raw})).unwrap();
            assert_eq!(options.normalize().range, 500.0, "range {raw}");
        }

        let options = ProximitySearchOptions::from_json(&json!({"range": "50"})).unwrap();
        assert_eq!(options.normalize().range, 50.0);
    }

    #[test]
    fn test_units_normalization() {
        let cases = [
            (Some("mi"), Units::Miles),
            (Some("miles"), Units::Miles),
            (Some("km"), Units::Kilometers),
            (Some("kilometers"), Units::Kilometers),
            (Some("KM"), Units::Miles),
            (Some("furlongs"), Units::Miles),
            (None, Units::Miles),
        ];
        for (input, expected) in cases {
            let options = ProximitySearchOptions {
                units: input.map(String::from),
                ..Default::default()
            };
            assert_eq!(options.normalize().units, expected, "units {input:?}");
        }
    }

    #[test]
    fn test_haversine_radius() {
        assert_eq!(haversine_radius("km"), 6371);
        assert_eq!(haversine_radius("kilometers"), 6371);
        assert_eq!(haversine_radius("mi"), 3959);
        assert_eq!(haversine_radius("miles"), 3959);
        assert_eq!(haversine_radius("parsecs"), 3959);
        assert_eq!(haversine_radius(""), 3959);
    }

    #[test]
    fn test_target_classification() {
        assert_eq!(
            Target::from_json(&json!({"lat": 41.8, "lng": -87.6})),
            Some(Target::Literal(Coordinates::new(41.8, -87.6)))
        );
        assert_eq!(
            Target::from_json(&json!("Chicago")),
            Some(Target::Text("Chicago".to_string()))
        );
        assert!(matches!(
            Target::from_json(&json!({"address": "Chicago", "lat": 41.8})),
            Some(Target::StructuredFilter(_))
        ));
        assert_eq!(Target::from_json(&json!("")), None);
        assert_eq!(Target::from_json(&json!({})), None);
        assert_eq!(Target::from_json(&json!(null)), None);
        assert_eq!(Target::from_json(&json!(0)), None);
        assert_eq!(Target::from_json(&json!(false)), None);
        assert_eq!(Target::from_json(&json!([])), None);
        for raw in [json!(42), json!(true), json!(["Chicago"])] {
            assert_eq!(
                Target::from_json(&raw),
                Some(Target::Unsupported(raw.clone())),
                "target {raw}"
            );
        }
    }

    #[test]
    fn test_subfields_classification() {
        assert_eq!(Subfields::from_json(&json!("fallback")), Subfields::Fallback);
        assert_eq!(Subfields::from_json(&json!("city")), Subfields::None);
        assert_eq!(Subfields::from_json(&json!(["city"])), Subfields::None);

        let Subfields::Explicit(filter) =
            Subfields::from_json(&json!({"city": ["Chicago", "Evanston"], "zip": 60606}))
        else {
            panic!("Expected explicit subfields");
        };
        assert_eq!(
            filter.get("city"),
            Some(&SubfieldValue::List(vec![
                "Chicago".to_string(),
                "Evanston".to_string()
            ]))
        );
        assert_eq!(
            filter.get("zip"),
            Some(&SubfieldValue::Scalar("60606".to_string()))
        );
    }

    #[test]
    fn test_subfield_value_invalid_shapes() {
        assert_eq!(SubfieldValue::from_json(&json!(true)), SubfieldValue::Invalid);
        assert_eq!(SubfieldValue::from_json(&json!(null)), SubfieldValue::Invalid);
        assert_eq!(
            SubfieldValue::from_json(&json!({"nested": "x"})),
            SubfieldValue::Invalid
        );
        assert_eq!(
            SubfieldValue::from_json(&json!(["ok", {"nested": "x"}])),
            SubfieldValue::Invalid
        );
        assert!(SubfieldValue::Invalid.values().is_empty());
    }

    #[test]
    fn test_subfield_filter_insert_replaces_in_place() {
        let mut filter = SubfieldFilter::new().with("city", "Chicago").with("state", "IL");
        filter.insert("city", "Evanston");

        let names: Vec<_> = filter.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["city", "state"]);
        assert_eq!(filter.get("city"), Some(&SubfieldValue::from("Evanston")));
    }

    #[test]
    fn test_from_json_full_option_map() {
        let options = ProximitySearchOptions::from_json(&json!({
            "range": 25,
            "units": "km",
            "target": "Chicago",
            "subfields": "fallback",
            "requireCoords": true,
            "reverseRadius": "serviceRadius",
            "somethingElse": 1
        }))
        .unwrap();

        assert_eq!(options.range, Some(25.0));
        assert_eq!(options.units.as_deref(), Some("km"));
        assert_eq!(options.target, Some(Target::Text("Chicago".to_string())));
        assert_eq!(options.subfields, Subfields::Fallback);
        assert!(options.require_coords);
        assert_eq!(options.reverse_radius.as_deref(), Some("serviceRadius"));
    }

    #[test]
    fn test_from_json_drops_non_string_reverse_radius() {
        let options =
            ProximitySearchOptions::from_json(&json!({"reverseRadius": ["radius"]})).unwrap();
        assert!(options.reverse_radius.is_none());

        let options = ProximitySearchOptions::from_json(&json!({"reverseRadius": ""})).unwrap();
        assert!(options.reverse_radius.is_none());
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(ProximitySearchOptions::from_json(&json!("Chicago")).is_err());
        assert!(ProximitySearchOptions::from_json(&json!(null))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_supplied_map_is_not_empty() {
        assert!(ProximitySearchOptions::from_json(&json!({})).unwrap().is_empty());
        for raw in [
            json!({"requireCoords": false}),
            json!({"subfields": "city"}),
            json!({"range": "far"}),
        ] {
            let options = ProximitySearchOptions::from_json(&raw).unwrap();
            assert!(options.supplied, "options {raw}");
            assert!(!options.is_empty(), "options {raw}");
        }
    }
}
