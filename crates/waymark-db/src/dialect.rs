//! SQL dialect adapter.
//!
//! MySQL and PostgreSQL disagree on where a predicate over a computed,
//! aliased projection may live:
//!
//! | Backend    | Alias usable in | Placement | Predicate references |
//! |------------|-----------------|-----------|----------------------|
//! | MySQL      | HAVING          | `Having`  | the alias            |
//! | PostgreSQL | nowhere         | `Where`   | the full expression  |
//!
//! PostgreSQL cannot reference a SELECT alias from WHERE and rejects HAVING
//! without aggregation, so its predicates inline the aliased expression.
//! Every call site asks the adapter independently; two aliased columns are
//! not assumed to share a placement.

use std::fmt;
use std::str::FromStr;

use tracing::debug;
use waymark_core::{Error, Result};

use crate::host::HostQuery;
use crate::sql::{CompareOp, Condition, Expr};

/// Environment variable naming the database driver.
pub const DRIVER_ENV: &str = "WAYMARK_DB_DRIVER";

/// Supported SQL backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    MySql,
    Postgres,
}

/// Clause a predicate is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPlacement {
    Where,
    Having,
}

impl fmt::Display for FilterPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Where => f.write_str("where"),
            Self::Having => f.write_str("having"),
        }
    }
}

/// A computed expression exposed under an alias.
#[derive(Debug, Clone, PartialEq)]
pub struct Aliased {
    pub alias: String,
    pub expr: Expr,
}

impl Aliased {
    pub fn new(alias: impl Into<String>, expr: Expr) -> Self {
        Self {
            alias: alias.into(),
            expr,
        }
    }
}

/// Right-hand side of a comparison against an aliased column.
#[derive(Debug, Clone, Copy)]
pub enum AliasOperand<'a> {
    /// Another aliased column.
    Aliased(&'a Aliased),
    /// A plain value or expression.
    Value(&'a Expr),
}

/// A predicate together with the clause it belongs in.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachedPredicate {
    pub placement: FilterPlacement,
    pub condition: Condition,
}

impl AttachedPredicate {
    /// Append the predicate to the matching clause of the host query.
    pub fn apply<Q: HostQuery + ?Sized>(self, query: &mut Q) {
        match self.placement {
            FilterPlacement::Where => query.and_where(self.condition),
            FilterPlacement::Having => query.and_having(self.condition),
        }
    }
}

impl Dialect {
    /// Read the backend from `WAYMARK_DB_DRIVER`, defaulting to MySQL.
    pub fn from_env() -> Result<Self> {
        match std::env::var(DRIVER_ENV) {
            Ok(value) => value.parse(),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn is_mysql(self) -> bool {
        matches!(self, Self::MySql)
    }

    /// Quote an identifier, doubling any embedded quote character.
    pub fn quote_identifier(self, ident: &str) -> String {
        match self {
            Self::MySql => format!("`{}`", ident.replace('`', "``")),
            Self::Postgres => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    /// Placeholder for the `n`th (1-based) bound parameter.
    pub fn placeholder(self, n: usize) -> String {
        match self {
            Self::MySql => "?".to_string(),
            Self::Postgres => format!("${n}"),
        }
    }

    /// Numeric value stored under `key` in the JSON column `column_sql`.
    pub fn json_extract_number(self, column_sql: &str, key: &str) -> String {
        let key = key.replace('\'', "''");
        match self {
            Self::MySql => format!("JSON_EXTRACT({column_sql}, '$.\"{key}\"')"),
            Self::Postgres => {
                format!("CAST(({column_sql}->>'{key}') AS DOUBLE PRECISION)")
            }
        }
    }

    /// Clause a predicate over an aliased projection must be attached to.
    pub fn alias_filter_placement(self) -> FilterPlacement {
        match self {
            Self::MySql => FilterPlacement::Having,
            Self::Postgres => FilterPlacement::Where,
        }
    }

    /// How an aliased projection is referenced from a predicate.
    pub fn alias_reference(self, aliased: &Aliased) -> Expr {
        match self.alias_filter_placement() {
            FilterPlacement::Having => Expr::Alias(aliased.alias.clone()),
            FilterPlacement::Where => match &aliased.expr {
                Expr::Group(_) => aliased.expr.clone(),
                other => Expr::group(other.clone()),
            },
        }
    }

    /// Build `left <op> right` where `left` is an aliased projection.
    pub fn attach_alias_filter(
        self,
        left: &Aliased,
        op: CompareOp,
        right: AliasOperand<'_>,
    ) -> AttachedPredicate {
        let placement = self.alias_filter_placement();
        let left_expr = self.alias_reference(left);
        let right_expr = match right {
            AliasOperand::Aliased(aliased) => self.alias_reference(aliased),
            AliasOperand::Value(expr) => expr.clone(),
        };

        debug!(
            subsystem = "db",
            component = "dialect",
            dialect = %self,
            alias = %left.alias,
            placement = %placement,
            "Attaching filter on aliased column"
        );

        AttachedPredicate {
            placement,
            condition: Condition::Compare {
                left: left_expr,
                op,
                right: right_expr,
            },
        }
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "pgsql" | "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(Error::Config(format!("Unsupported database driver: {other}"))),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MySql => f.write_str("mysql"),
            Self::Postgres => f.write_str("pgsql"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{QueryParam, SqlWriter};

    fn distance() -> Aliased {
        Aliased::new(
            "distance",
            Expr::func("sqrt", vec![Expr::column("gm_addresses", "lat")]),
        )
    }

    #[test]
    fn test_parse_dialect() {
        assert_eq!("mysql".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("MariaDB".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("pgsql".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!(" PostgreSQL ".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert!("sqlite".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for dialect in [Dialect::MySql, Dialect::Postgres] {
            assert_eq!(dialect.to_string().parse::<Dialect>().unwrap(), dialect);
        }
    }

    #[test]
    fn test_quote_identifier_escapes() {
        assert_eq!(Dialect::MySql.quote_identifier("we`ird"), "`we``ird`");
        assert_eq!(Dialect::Postgres.quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Dialect::MySql.placeholder(3), "?");
        assert_eq!(Dialect::Postgres.placeholder(3), "$3");
    }

    #[test]
    fn test_json_extract_number() {
        assert_eq!(
            Dialect::MySql.json_extract_number("`es`.`content`", "abc-123"),
            "JSON_EXTRACT(`es`.`content`, '$.\"abc-123\"')"
        );
        assert_eq!(
            Dialect::Postgres.json_extract_number("\"es\".\"content\"", "abc-123"),
            "CAST((\"es\".\"content\"->>'abc-123') AS DOUBLE PRECISION)"
        );
        assert!(Dialect::MySql
            .json_extract_number("c", "it's")
            .contains("it''s"));
    }

    #[test]
    fn test_mysql_filters_alias_in_having() {
        let range = Expr::Param(QueryParam::Float(25.0));
        let predicate =
            Dialect::MySql.attach_alias_filter(&distance(), CompareOp::Le, AliasOperand::Value(&range));

        assert_eq!(predicate.placement, FilterPlacement::Having);
        let mut w = SqlWriter::new(Dialect::MySql);
        assert_eq!(w.condition(&predicate.condition), "`distance` <= ?");
    }

    #[test]
    fn test_postgres_inlines_expression_in_where() {
        let range = Expr::Param(QueryParam::Float(25.0));
        let predicate = Dialect::Postgres.attach_alias_filter(
            &distance(),
            CompareOp::Le,
            AliasOperand::Value(&range),
        );

        assert_eq!(predicate.placement, FilterPlacement::Where);
        let mut w = SqlWriter::new(Dialect::Postgres);
        assert_eq!(
            w.condition(&predicate.condition),
            "(sqrt(\"gm_addresses\".\"lat\")) <= $1"
        );
    }

    #[test]
    fn test_alias_to_alias_comparison() {
        let radius = Aliased::new(
            "gm_reverseRadius",
            Expr::JsonNumber {
                column: crate::sql::Column::new("elements_sites", "content"),
                key: "uid-1".to_string(),
            },
        );

        let my = Dialect::MySql.attach_alias_filter(
            &distance(),
            CompareOp::Le,
            AliasOperand::Aliased(&radius),
        );
        let mut w = SqlWriter::new(Dialect::MySql);
        assert_eq!(w.condition(&my.condition), "`distance` <= `gm_reverseRadius`");

        let pg = Dialect::Postgres.attach_alias_filter(
            &distance(),
            CompareOp::Le,
            AliasOperand::Aliased(&radius),
        );
        let mut w = SqlWriter::new(Dialect::Postgres);
        assert_eq!(
            w.condition(&pg.condition),
            "(sqrt(\"gm_addresses\".\"lat\")) <= (CAST((\"elements_sites\".\"content\"->>'uid-1') AS DOUBLE PRECISION))"
        );
    }
}
