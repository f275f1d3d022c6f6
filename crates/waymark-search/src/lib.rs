//! # waymark-search
//!
//! Proximity search compiler for waymark.
//!
//! This crate provides:
//! - Target resolution (literal coordinates or geocoded text)
//! - Haversine distance projection with range filtering
//! - Subfield filters, explicit or derived from the geocoded target
//! - Reverse radius search against a per-record Number field
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use serde_json::json;
//! use waymark_core::ProximitySearchOptions;
//! use waymark_geocode::CachedGeocoder;
//! use waymark_search::{ProximitySearch, SearchConfig};
//!
//! let search = ProximitySearch::new(
//!     SearchConfig::from_env(),
//!     Arc::new(CachedGeocoder::new(provider)),
//! );
//!
//! let options = ProximitySearchOptions::from_json(&json!({
//!     "target": "Cook County",
//!     "range": 25,
//!     "subfields": "fallback",
//! }))?;
//!
//! let mut query = search.element_query();
//! search.compile(&mut query, &address_field, &options).await?;
//! let rendered = query.render();
//! ```

pub mod config;
pub mod fallback;
pub mod proximity;
pub mod reverse_radius;
pub mod target;

pub use config::SearchConfig;
pub use fallback::{narrow_subfields, FOCUSED_TYPES};
pub use proximity::{CompiledSearch, ProximitySearch};
pub use reverse_radius::{radius_projection, resolve_radius_field};
pub use target::{Resolution, TargetResolver};
