//! Subfield filter query builder.
//!
//! Converts a [`SubfieldFilter`] into a predicate over the joined address
//! table: AND across subfields, OR across the values listed for one
//! subfield. All values are parameterized.

use tracing::trace;
use waymark_core::{SubfieldFilter, SubfieldValue};

use crate::sql::{Column, Condition, Expr};

/// Generates a WHERE predicate for a subfield filter.
///
/// # Example
///
/// ```rust,ignore
/// use waymark_core::{SubfieldConfig, SubfieldFilter};
/// use waymark_db::subfield_filter::SubfieldFilterBuilder;
///
/// let whitelist = SubfieldConfig::default().whitelist();
/// let filter = SubfieldFilter::new()
///     .with("city", vec!["Chicago", "Evanston"])
///     .with("state", "IL");
///
/// let condition = SubfieldFilterBuilder::new(&whitelist, "gm_addresses").build(&filter);
/// // (city = $1 OR city = $2) AND state = $3
/// ```
pub struct SubfieldFilterBuilder<'a> {
    whitelist: &'a [String],
    table_alias: &'a str,
}

impl<'a> SubfieldFilterBuilder<'a> {
    /// Create a builder.
    ///
    /// # Parameters
    ///
    /// * `whitelist` - Subfield handles that may be filtered on
    /// * `table_alias` - Alias the address table is joined under
    pub fn new(whitelist: &'a [String], table_alias: &'a str) -> Self {
        Self {
            whitelist,
            table_alias,
        }
    }

    fn is_allowed(&self, subfield: &str) -> bool {
        self.whitelist.iter().any(|h| h == subfield)
    }

    /// Build the predicate, or `None` when nothing valid remains.
    ///
    /// Unknown subfields and malformed values are skipped silently.
    pub fn build(&self, filter: &SubfieldFilter) -> Option<Condition> {
        let mut clauses = Vec::new();

        for (subfield, value) in filter.iter() {
            if !self.is_allowed(subfield) {
                trace!(subfield, "Skipping subfield not in whitelist");
                continue;
            }

            if matches!(value, SubfieldValue::Invalid) {
                trace!(subfield, "Skipping subfield with unsupported value");
                continue;
            }

            let column = Column::new(self.table_alias, subfield);
            let tests: Vec<Condition> = value
                .values()
                .iter()
                .map(|v| Expr::Column(column.clone()).eq(Expr::string(v.as_str())))
                .collect();

            if tests.is_empty() {
                continue;
            }
            clauses.push(Condition::any(tests));
        }

        if clauses.is_empty() {
            None
        } else {
            Some(Condition::all(clauses))
        }
    }
}
