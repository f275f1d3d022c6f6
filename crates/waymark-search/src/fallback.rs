//! Subfield fallback narrowing.
//!
//! A broad target such as a county or a state geocodes to a single center
//! point, and a radius around that point is a poor stand-in for the region
//! itself. When the caller asks for `subfields: "fallback"`, the geocoder's
//! own classification decides whether the search should also be narrowed
//! to matching address components.

use tracing::{debug, trace};
use waymark_core::{GeocodedAddress, SubfieldFilter};
use waymark_geocode::restructure_components;

/// Classifications precise enough that a radius search alone is accurate.
pub const FOCUSED_TYPES: &[&str] = &[
    "premise",
    "route",
    "intersection",
    "locality",
    "neighborhood",
];

/// Derive a subfield filter from a geocoded target.
///
/// Returns `None` when no narrowing applies:
/// - the match has a street address,
/// - the geocoder returned no address components,
/// - or the match is classified as one of [`FOCUSED_TYPES`].
///
/// Otherwise the filter holds the non-empty `city`, `state`, `zip`,
/// `county`, and `country` of the match. If one of those (in that order)
/// equals the target text, ignoring case and surrounding whitespace, the
/// filter holds that subfield alone.
pub fn narrow_subfields(target_text: &str, address: &GeocodedAddress) -> Option<SubfieldFilter> {
    if address
        .parts
        .street1
        .as_deref()
        .is_some_and(|s| !s.is_empty())
    {
        debug!(
            subsystem = "search",
            component = "fallback",
            op = "narrow",
            "Target has a street address, no narrowing"
        );
        return None;
    }

    if !address.has_components() {
        debug!(
            subsystem = "search",
            component = "fallback",
            op = "narrow",
            "Target has no address components, no narrowing"
        );
        return None;
    }

    let primary = address.primary_type();
    if primary.is_some_and(|t| FOCUSED_TYPES.contains(&t)) {
        debug!(
            subsystem = "search",
            component = "fallback",
            op = "narrow",
            geocode_type = primary.unwrap_or_default(),
            "Target is narrowly focused, no narrowing"
        );
        return None;
    }

    let parts = restructure_components(&address.raw);
    let candidates = [
        ("city", parts.city),
        ("state", parts.state),
        ("zip", parts.zip),
        ("county", parts.county),
        ("country", parts.country),
    ];

    let target = target_text.trim().to_lowercase();
    let mut filter = SubfieldFilter::new();

    for (subfield, value) in candidates {
        let Some(value) = value else {
            continue;
        };

        if value.trim().to_lowercase() == target {
            trace!(subfield, value = %value, "Target matches subfield exactly");
            filter = SubfieldFilter::new().with(subfield, value);
            break;
        }

        trace!(subfield, value = %value, "Adding subfield to fallback filter");
        filter.insert(subfield, value);
    }

    debug!(
        subsystem = "search",
        component = "fallback",
        op = "narrow",
        geocode_type = primary.unwrap_or("unknown"),
        subfield_count = filter.len(),
        "Derived fallback subfield filter"
    );

    (!filter.is_empty()).then_some(filter)
}
