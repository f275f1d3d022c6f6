//! Field configuration consumed by proximity search.
//!
//! The host owns field layouts and subfield settings; waymark only needs to
//! ask which subfields are valid and what type a named sibling field has.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// =============================================================================
// SUBFIELD CONFIGURATION
// =============================================================================

/// Display settings for one address subfield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubfieldSetting {
    pub handle: String,
    pub label: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Ordered list of address subfields an address field exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubfieldConfig {
    pub subfields: Vec<SubfieldSetting>,
}

impl Default for SubfieldConfig {
    fn default() -> Self {
        let subfields = [
            ("name", "Name"),
            ("street1", "Street Address"),
            ("street2", "Apartment or Suite"),
            ("city", "City"),
            ("state", "State"),
            ("zip", "Zip Code"),
            ("neighborhood", "Neighborhood"),
            ("county", "County"),
            ("country", "Country"),
            ("countryCode", "Country Code"),
            ("placeId", "Place ID"),
        ]
        .into_iter()
        .map(|(handle, label)| SubfieldSetting {
            handle: handle.to_string(),
            label: label.to_string(),
            enabled: true,
        })
        .collect();

        Self { subfields }
    }
}

impl SubfieldConfig {
    /// Subfield handles that may be filtered on, including `lat` and `lng`.
    ///
    /// Disabled subfields are still stored, so they remain filterable.
    pub fn whitelist(&self) -> Vec<String> {
        self.subfields
            .iter()
            .map(|s| s.handle.clone())
            .chain(["lat".to_string(), "lng".to_string()])
            .collect()
    }

    pub fn is_filterable(&self, handle: &str) -> bool {
        handle == "lat" || handle == "lng" || self.subfields.iter().any(|s| s.handle == handle)
    }
}

// =============================================================================
// FIELD LAYOUTS
// =============================================================================

/// Storage type of a custom field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    PlainText,
    Address,
    /// Any other field type, by its type name.
    Other(String),
}

impl FieldKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => f.write_str("Number"),
            Self::PlainText => f.write_str("Plain Text"),
            Self::Address => f.write_str("Address"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// A field placed on an element's field layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutField {
    pub handle: String,
    /// Layout element UID; custom field values are keyed by it in element content.
    pub uid: String,
    pub kind: FieldKind,
}

/// Lookup of the fields sharing a layout with an address field.
pub trait FieldLayout: Send + Sync {
    fn field(&self, handle: &str) -> Option<LayoutField>;
}

/// In-memory field layout.
#[derive(Debug, Clone, Default)]
pub struct StaticFieldLayout {
    fields: HashMap<String, LayoutField>,
}

impl StaticFieldLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(
        mut self,
        handle: impl Into<String>,
        uid: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        let handle = handle.into();
        self.fields.insert(
            handle.clone(),
            LayoutField {
                handle,
                uid: uid.into(),
                kind,
            },
        );
        self
    }
}

impl FieldLayout for StaticFieldLayout {
    fn field(&self, handle: &str) -> Option<LayoutField> {
        self.fields.get(handle).cloned()
    }
}

/// The address field a proximity search runs against.
#[derive(Clone)]
pub struct AddressField {
    pub id: i64,
    pub handle: String,
    pub layout: Arc<dyn FieldLayout>,
}

impl AddressField {
    pub fn new(id: i64, handle: impl Into<String>, layout: Arc<dyn FieldLayout>) -> Self {
        Self {
            id,
            handle: handle.into(),
            layout,
        }
    }
}

impl fmt::Debug for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressField")
            .field("id", &self.id)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}
