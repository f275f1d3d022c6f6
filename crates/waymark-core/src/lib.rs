//! # waymark-core
//!
//! Core types, traits, and abstractions for waymark proximity search.
//!
//! This crate provides the data model (address records, geocoding results,
//! search options) and the collaborator traits that the other waymark
//! crates depend on.

pub mod defaults;
pub mod error;
pub mod fields;
pub mod logging;
pub mod models;
pub mod options;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use fields::{
    AddressField, FieldKind, FieldLayout, LayoutField, StaticFieldLayout, SubfieldConfig,
    SubfieldSetting,
};
pub use models::{
    AddressParts, AddressRecord, Coordinates, DefaultLocation, GeocodeQuery, GeocodedAddress,
};
pub use options::{
    haversine_radius, NormalizedOptions, ProximitySearchOptions, SubfieldFilter, SubfieldValue,
    Subfields, Target, Units,
};
pub use traits::GeocodingLookup;
