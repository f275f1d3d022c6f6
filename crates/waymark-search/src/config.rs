//! Proximity search configuration.
//!
//! Configuration is loaded from environment variables (`WAYMARK_*`
//! prefixed) or built in code. Invalid environment values are logged at
//! WARN and replaced by their defaults.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `WAYMARK_DB_DRIVER` | `mysql` |
//! | `WAYMARK_DEFAULT_LAT` | `38.8977` |
//! | `WAYMARK_DEFAULT_LNG` | `-77.0365` |
//! | `WAYMARK_DEFAULT_ZOOM` | `11` |
//! | `WAYMARK_DEFAULT_RANGE` | `500` |
//! | `WAYMARK_DEFAULT_UNITS` | `mi` |

use std::env;
use std::str::FromStr;

use tracing::warn;
use waymark_core::{defaults, Coordinates, DefaultLocation, SubfieldConfig, Units};
use waymark_db::dialect::DRIVER_ENV;
use waymark_db::Dialect;

pub const DEFAULT_LAT_ENV: &str = "WAYMARK_DEFAULT_LAT";
pub const DEFAULT_LNG_ENV: &str = "WAYMARK_DEFAULT_LNG";
pub const DEFAULT_ZOOM_ENV: &str = "WAYMARK_DEFAULT_ZOOM";
pub const DEFAULT_RANGE_ENV: &str = "WAYMARK_DEFAULT_RANGE";
pub const DEFAULT_UNITS_ENV: &str = "WAYMARK_DEFAULT_UNITS";

/// Settings shared by every search a [`ProximitySearch`](crate::ProximitySearch) compiles.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Backend new host queries are built for.
    pub dialect: Dialect,
    /// Origin used when a target cannot be resolved.
    pub default_location: DefaultLocation,
    /// Subfields of the address field; drives the filter whitelist.
    pub subfields: SubfieldConfig,
    pub default_range: f64,
    pub default_units: Units,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            default_location: DefaultLocation::default(),
            subfields: SubfieldConfig::default(),
            default_range: defaults::RANGE,
            default_units: Units::default(),
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();

        let dialect = match lookup(DRIVER_ENV) {
            Some(value) => value.parse().unwrap_or_else(|e| {
                warn!(
                    subsystem = "search",
                    component = "config",
                    variable = DRIVER_ENV,
                    value = %value,
                    error = %e,
                    "Invalid database driver, using default"
                );
                base.dialect
            }),
            None => base.dialect,
        };

        let lat = parse_var(&lookup, DEFAULT_LAT_ENV, base.default_location.coords.lat, |v: &f64| {
            (-90.0..=90.0).contains(v)
        });
        let lng = parse_var(&lookup, DEFAULT_LNG_ENV, base.default_location.coords.lng, |v: &f64| {
            (-180.0..=180.0).contains(v)
        });
        let zoom = parse_var(&lookup, DEFAULT_ZOOM_ENV, base.default_location.zoom, |v: &u8| {
            *v <= 22
        });
        let default_range = parse_var(&lookup, DEFAULT_RANGE_ENV, base.default_range, |v: &f64| {
            v.is_finite() && *v > 0.0
        });

        let default_units = match lookup(DEFAULT_UNITS_ENV) {
            Some(value) => Units::parse(value.trim()).unwrap_or_else(|| {
                warn!(
                    subsystem = "search",
                    component = "config",
                    variable = DEFAULT_UNITS_ENV,
                    value = %value,
                    "Invalid units, using default"
                );
                base.default_units
            }),
            None => base.default_units,
        };

        Self {
            dialect,
            default_location: DefaultLocation {
                coords: Coordinates::new(lat, lng),
                zoom,
            },
            subfields: base.subfields,
            default_range,
            default_units,
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_default_location(mut self, location: DefaultLocation) -> Self {
        self.default_location = location;
        self
    }

    pub fn with_subfields(mut self, subfields: SubfieldConfig) -> Self {
        self.subfields = subfields;
        self
    }

    pub fn with_default_range(mut self, range: f64) -> Self {
        self.default_range = range;
        self
    }

    pub fn with_default_units(mut self, units: Units) -> Self {
        self.default_units = units;
        self
    }
}

fn parse_var<F, T, V>(lookup: &F, name: &str, default: T, valid: V) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy,
    V: Fn(&T) -> bool,
{
    let Some(raw) = lookup(name) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        _ => {
            warn!(
                subsystem = "search",
                component = "config",
                variable = name,
                value = %raw,
                "Invalid configuration value, using default"
            );
            default
        }
    }
}
