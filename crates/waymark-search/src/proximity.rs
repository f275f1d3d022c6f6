//! Proximity search compiler.
//!
//! [`ProximitySearch::compile`] appends the fragments of one proximity
//! search to a caller-owned [`HostQuery`]. Steps run in a fixed order:
//!
//! 1. Join the address table on `(elementId, fieldId)`
//! 2. Normalize range and units
//! 3. Target: distance projection and range predicate
//! 4. Subfields: explicit filter, or the fallback filter derived in step 3
//! 5. Required coordinates
//! 6. Reverse radius
//!
//! Only a misconfigured reverse radius fails compilation, and it fails
//! before anything is appended. Every other invalid input is corrected or
//! degraded in place.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value as JsonValue;
use tracing::{debug, info, instrument, warn};
use waymark_core::{
    defaults, AddressField, Coordinates, GeocodingLookup, LayoutField, NormalizedOptions,
    ProximitySearchOptions, Result, SubfieldFilter, Subfields, Target,
};
use waymark_db::{
    addresses, distance_expression, AliasOperand, Aliased, AttachedPredicate, CompareOp,
    Condition, Dialect, ElementQuery, Expr, FilterPlacement, HostQuery, Join, Projection,
    QueryParam, SubfieldFilterBuilder,
};

use crate::config::SearchConfig;
use crate::fallback::narrow_subfields;
use crate::reverse_radius::{content_column, radius_projection, resolve_radius_field};
use crate::target::TargetResolver;

/// Summary of what a compilation appended to the host query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledSearch {
    /// Address table join; `None` when no options were given.
    pub join: Option<Join>,
    /// Distance projection. Its expression is `NULL` without a target.
    pub distance: Option<Aliased>,
    /// Predicates in the order they were attached.
    pub predicates: Vec<AttachedPredicate>,
    /// Per-row radius projection, when a reverse radius is set.
    pub reverse_radius: Option<Aliased>,
    /// Search origin, when a target was given.
    pub origin: Option<Coordinates>,
    /// Whether the origin is the configured default location.
    pub used_default_origin: bool,
    /// Subfield filter that was applied.
    pub subfields: Option<SubfieldFilter>,
}

impl CompiledSearch {
    /// Whether nothing was appended.
    pub fn is_empty(&self) -> bool {
        self.join.is_none()
    }

    /// Number of predicates attached to `placement`.
    pub fn predicate_count(&self, placement: FilterPlacement) -> usize {
        self.predicates
            .iter()
            .filter(|p| p.placement == placement)
            .count()
    }
}

/// Compiles proximity searches against host queries.
///
/// Holds only shared, read-only state, so one instance can serve many
/// concurrent compilations.
#[derive(Clone)]
pub struct ProximitySearch {
    config: Arc<SearchConfig>,
    resolver: TargetResolver,
}

impl ProximitySearch {
    pub fn new(config: SearchConfig, geocoder: Arc<dyn GeocodingLookup>) -> Self {
        Self {
            config: Arc::new(config),
            resolver: TargetResolver::new(geocoder),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// A fresh reference host query for the configured backend.
    pub fn element_query(&self) -> ElementQuery {
        ElementQuery::new(self.config.dialect)
    }

    /// Append the search described by `options` to `query`.
    ///
    /// Empty options leave the query untouched.
    ///
    /// # Errors
    ///
    /// [`Error::Config`](waymark_core::Error::Config) when `reverse_radius`
    /// names a missing or non-Number field. The query is not modified.
    #[instrument(skip_all, fields(
        subsystem = "search",
        component = "proximity",
        op = "compile",
        field_handle = %field.handle,
        field_id = field.id,
        dialect = %query.dialect(),
    ))]
    pub async fn compile<Q>(
        &self,
        query: &mut Q,
        field: &AddressField,
        options: &ProximitySearchOptions,
    ) -> Result<CompiledSearch>
    where
        Q: HostQuery + Send + ?Sized,
    {
        if options.is_empty() {
            debug!("No proximity options, query left unchanged");
            return Ok(CompiledSearch::default());
        }

        let start = Instant::now();
        let dialect = query.dialect();
        let normalized =
            options.normalize_with(self.config.default_range, self.config.default_units);

        let radius_field = match &normalized.reverse_radius {
            Some(handle) => Some(resolve_radius_field(field, handle)?),
            None => None,
        };

        let mut compiled = CompiledSearch::default();

        let join = Join {
            table: defaults::ADDRESS_TABLE.to_string(),
            alias: defaults::ADDRESS_ALIAS.to_string(),
            on: addresses::join_condition(field.id),
        };
        query.inner_join(&join.table, &join.alias, join.on.clone());
        compiled.join = Some(join);

        debug!(
            range = normalized.range,
            units = %normalized.units,
            target_kind = normalized.target.as_ref().map_or("none", Target::kind),
            "Normalized proximity options"
        );

        let fallback_filter = self
            .apply_target(query, field, &normalized, dialect, &mut compiled)
            .await;

        self.apply_subfields(query, &normalized, fallback_filter, &mut compiled);
        apply_require_coords(query, &normalized, &mut compiled);

        if let Some(radius_field) = radius_field {
            apply_reverse_radius(query, &radius_field, dialect, &mut compiled);
        }

        info!(
            predicate_count = compiled.predicates.len(),
            where_count = compiled.predicate_count(FilterPlacement::Where),
            having_count = compiled.predicate_count(FilterPlacement::Having),
            used_default_origin = compiled.used_default_origin,
            duration_ms = start.elapsed().as_millis() as u64,
            "Proximity search compiled"
        );

        Ok(compiled)
    }

    /// Add the distance projection and range predicate.
    ///
    /// Returns the fallback subfield filter when one was derived.
    async fn apply_target<Q>(
        &self,
        query: &mut Q,
        field: &AddressField,
        options: &NormalizedOptions,
        dialect: Dialect,
        compiled: &mut CompiledSearch,
    ) -> Option<SubfieldFilter>
    where
        Q: HostQuery + Send + ?Sized,
    {
        let Some(target) = &options.target else {
            let distance = Aliased::new(defaults::DISTANCE_ALIAS, Expr::Null);
            query.add_subquery_select(Projection::aliased(Expr::Null, &distance.alias));
            compiled.distance = Some(distance);
            return None;
        };

        let resolution = self.resolver.resolve(target).await;

        let fallback_filter = match (&options.subfields, &resolution.address) {
            (Subfields::Fallback, Some(address)) => {
                narrow_subfields(&target_text(target), address)
            }
            _ => None,
        };

        let origin = match resolution.coords {
            Some(coords) => coords,
            None => {
                let coords = self.config.default_location.coords;
                warn!(
                    target_kind = target.kind(),
                    lat = coords.lat,
                    lng = coords.lng,
                    "Target could not be resolved, searching from default location"
                );
                compiled.used_default_origin = true;
                coords
            }
        };
        compiled.origin = Some(origin);

        let distance = Aliased::new(
            defaults::DISTANCE_ALIAS,
            distance_expression(
                origin,
                &addresses::lat_column(),
                &addresses::lng_column(),
                options.units,
            ),
        );
        query.add_subquery_select(Projection::aliased(distance.expr.clone(), &distance.alias));
        query.add_select(Projection::aliased(
            Expr::Alias(distance.alias.clone()),
            &field.handle,
        ));

        if options.reverse_radius.is_none() {
            let range = Expr::Param(QueryParam::Float(options.range));
            let predicate =
                dialect.attach_alias_filter(&distance, CompareOp::Le, AliasOperand::Value(&range));
            attach(query, predicate, compiled);
        }

        compiled.distance = Some(distance);
        fallback_filter
    }

    fn apply_subfields<Q>(
        &self,
        query: &mut Q,
        options: &NormalizedOptions,
        fallback_filter: Option<SubfieldFilter>,
        compiled: &mut CompiledSearch,
    ) where
        Q: HostQuery + Send + ?Sized,
    {
        let filter = match &options.subfields {
            Subfields::Explicit(filter) => filter.clone(),
            Subfields::Fallback => match fallback_filter {
                Some(filter) => filter,
                None => return,
            },
            Subfields::None => return,
        };

        let whitelist = self.config.subfields.whitelist();
        let builder = SubfieldFilterBuilder::new(&whitelist, defaults::ADDRESS_ALIAS);
        if let Some(condition) = builder.build(&filter) {
            debug!(subfield_count = filter.len(), "Applying subfield filter");
            attach(
                query,
                AttachedPredicate {
                    placement: FilterPlacement::Where,
                    condition,
                },
                compiled,
            );
            compiled.subfields = Some(filter);
        }
    }
}

fn apply_require_coords<Q>(query: &mut Q, options: &NormalizedOptions, compiled: &mut CompiledSearch)
where
    Q: HostQuery + Send + ?Sized,
{
    if !options.require_coords {
        return;
    }

    let missing = Condition::any(vec![
        Expr::Column(addresses::lat_column()).is_null(),
        Expr::Column(addresses::lng_column()).is_null(),
    ]);
    attach(
        query,
        AttachedPredicate {
            placement: FilterPlacement::Where,
            condition: Condition::not(missing),
        },
        compiled,
    );
}

fn apply_reverse_radius<Q>(
    query: &mut Q,
    radius_field: &LayoutField,
    dialect: Dialect,
    compiled: &mut CompiledSearch,
) where
    Q: HostQuery + Send + ?Sized,
{
    query.add_subquery_select(Projection::new(Expr::Column(content_column())));

    let radius = radius_projection(radius_field);
    query.add_subquery_select(Projection::aliased(radius.expr.clone(), &radius.alias));

    let distance = compiled
        .distance
        .clone()
        .unwrap_or_else(|| Aliased::new(defaults::DISTANCE_ALIAS, Expr::Null));
    let predicate =
        dialect.attach_alias_filter(&distance, CompareOp::Le, AliasOperand::Aliased(&radius));

    debug!(
        radius_field = %radius_field.handle,
        placement = %predicate.placement,
        "Applying reverse radius"
    );

    attach(query, predicate, compiled);
    compiled.reverse_radius = Some(radius);
}

fn attach<Q>(query: &mut Q, predicate: AttachedPredicate, compiled: &mut CompiledSearch)
where
    Q: HostQuery + Send + ?Sized,
{
    compiled.predicates.push(predicate.clone());
    predicate.apply(query);
}

/// Text a target was phrased as, for fallback matching.
fn target_text(target: &Target) -> String {
    match target {
        Target::Text(text) => text.clone(),
        Target::StructuredFilter(map) => map
            .get("address")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string(),
        Target::Literal(_) | Target::Unsupported(_) => String::new(),
    }
}
