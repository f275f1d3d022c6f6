//! Address component restructuring.
//!
//! Google-style geocoder results carry an `address_components` array where
//! each entry lists its `types` plus a `long_name` and `short_name`. This
//! module folds that array into the flat [`AddressParts`] the address table
//! stores.

use serde::Deserialize;
use serde_json::Value as JsonValue;
use waymark_core::AddressParts;

/// One entry of a geocoder `address_components` array.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    fn has_type(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t == kind)
    }
}

/// Parse the `address_components` array of a raw result.
///
/// Malformed entries are skipped.
pub fn components(raw: &JsonValue) -> Vec<AddressComponent> {
    raw.get("address_components")
        .and_then(JsonValue::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn find<'a>(components: &'a [AddressComponent], kind: &str) -> Option<&'a AddressComponent> {
    components.iter().find(|c| c.has_type(kind))
}

fn long(components: &[AddressComponent], kind: &str) -> Option<String> {
    find(components, kind).map(|c| c.long_name.clone())
}

fn short(components: &[AddressComponent], kind: &str) -> Option<String> {
    find(components, kind).map(|c| c.short_name.clone())
}

/// Restructure the components of a raw geocoder result.
///
/// | Part | Source |
/// |------|--------|
/// | `street1` | `street_number` + `route` |
/// | `street2` | `subpremise` |
/// | `city` | `locality`, else `postal_town`, else `sublocality` |
/// | `state` | `administrative_area_level_1` (short name) |
/// | `zip` | `postal_code`, with `-suffix` when `postal_code_suffix` exists |
/// | `neighborhood` | `neighborhood` |
/// | `county` | `administrative_area_level_2` |
/// | `country` | `country` (long name) |
/// | `country_code` | `country` (short name) |
pub fn restructure_components(raw: &JsonValue) -> AddressParts {
    let components = components(raw);

    let street1 = match (
        long(&components, "street_number"),
        long(&components, "route"),
    ) {
        (Some(number), Some(route)) => Some(format!("{number} {route}")),
        (None, Some(route)) => Some(route),
        (Some(number), None) => Some(number),
        (None, None) => None,
    };

    let city = long(&components, "locality")
        .or_else(|| long(&components, "postal_town"))
        .or_else(|| long(&components, "sublocality"));

    let zip = long(&components, "postal_code").map(|zip| {
        match long(&components, "postal_code_suffix") {
            Some(suffix) => format!("{zip}-{suffix}"),
            None => zip,
        }
    });

    AddressParts {
        name: raw
            .get("name")
            .and_then(JsonValue::as_str)
            .map(str::to_string),
        street1,
        street2: long(&components, "subpremise"),
        city,
        state: short(&components, "administrative_area_level_1"),
        zip,
        neighborhood: long(&components, "neighborhood"),
        county: long(&components, "administrative_area_level_2"),
        country: long(&components, "country"),
        country_code: short(&components, "country"),
    }
}
