//! Structured logging field name constants for waymark.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, normalized values, clause placement |
//! | TRACE | Per-item iteration (subfield values, cache keys) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "search", "db", "geocode"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "proximity", "target_resolver", "fallback", "geocode_cache"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "compile", "resolve", "narrow", "lookup"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Handle of the address field being searched.
pub const FIELD_HANDLE: &str = "field_handle";

/// Numeric id of the address field being searched.
pub const FIELD_ID: &str = "field_id";

/// Kind of target supplied ("literal", "text", "structured", "none").
pub const TARGET_KIND: &str = "target_kind";

/// SQL dialect in use ("mysql", "pgsql").
pub const DIALECT: &str = "dialect";

// ─── Search-specific fields ────────────────────────────────────────────────

/// Effective search range after normalization.
pub const RANGE: &str = "range";

/// Effective unit system after normalization.
pub const UNITS: &str = "units";

/// Primary geocoder classification of a resolved target.
pub const GEOCODE_TYPE: &str = "geocode_type";

/// Number of subfields in the effective filter.
pub const SUBFIELD_COUNT: &str = "subfield_count";

/// Clause a computed-column predicate was attached to ("where", "having").
pub const PLACEMENT: &str = "placement";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Whether a lookup was served from cache.
pub const CACHE_HIT: &str = "cache_hit";
