//! Host element query.
//!
//! Proximity search does not own the query it filters. It appends fragments
//! to a caller-owned builder through [`HostQuery`]. The builder has two
//! scopes: an inner subquery where rows are joined and filtered, and an
//! outer query whose projection is what callers see.
//!
//! [`ElementQuery`] is the reference builder: it records fragments as
//! dialect-neutral trees and renders them to a single SQL statement.

use sqlx::mysql::{MySql, MySqlArguments};
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;
use waymark_core::defaults;

use crate::dialect::Dialect;
use crate::sql::{Column, Condition, Expr, QueryParam, SqlWriter};

/// A projected expression with an optional alias.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl Projection {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn aliased(expr: Expr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }
}

/// An inner join with its parameterized condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: String,
    pub alias: String,
    pub on: Condition,
}

/// Operations a query builder must support to host a proximity search.
pub trait HostQuery {
    /// Backend the query will run against.
    fn dialect(&self) -> Dialect;

    /// Inner join `table` under `alias` in the subquery.
    fn inner_join(&mut self, table: &str, alias: &str, on: Condition);

    /// Add a column to the subquery projection.
    fn add_subquery_select(&mut self, projection: Projection);

    /// Add a column to the outer (public) projection.
    fn add_select(&mut self, projection: Projection);

    /// AND a predicate into the subquery's WHERE clause.
    fn and_where(&mut self, condition: Condition);

    /// AND a predicate into the subquery's HAVING clause.
    fn and_having(&mut self, condition: Condition);
}

/// SQL text plus its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuery {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

/// Reference element query: `elements` joined to `elements_sites`, wrapped
/// in an outer query.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementQuery {
    dialect: Dialect,
    selects: Vec<Projection>,
    subquery_selects: Vec<Projection>,
    joins: Vec<Join>,
    where_conditions: Vec<Condition>,
    having_conditions: Vec<Condition>,
}

impl ElementQuery {
    /// Alias of the subquery in the outer query.
    pub const SUBQUERY_ALIAS: &'static str = "subquery";

    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            selects: Vec::new(),
            subquery_selects: vec![
                Projection::new(Expr::column(defaults::ELEMENTS_TABLE, "id")),
                Projection::new(Expr::column(defaults::ELEMENTS_SITES_TABLE, "siteId")),
            ],
            joins: Vec::new(),
            where_conditions: Vec::new(),
            having_conditions: Vec::new(),
        }
    }

    pub fn selects(&self) -> &[Projection] {
        &self.selects
    }

    pub fn subquery_selects(&self) -> &[Projection] {
        &self.subquery_selects
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn where_conditions(&self) -> &[Condition] {
        &self.where_conditions
    }

    pub fn having_conditions(&self) -> &[Condition] {
        &self.having_conditions
    }

    /// Render the full statement.
    pub fn render(&self) -> RenderedQuery {
        let mut w = SqlWriter::new(self.dialect);
        let sub = w.dialect().quote_identifier(Self::SUBQUERY_ALIAS);

        // Placeholders are numbered in textual order, so render outer
        // projections before the subquery body.
        let mut outer = vec![format!("{sub}.*")];
        for projection in &self.selects {
            outer.push(render_projection(&mut w, projection));
        }

        let inner: Vec<String> = self
            .subquery_selects
            .iter()
            .map(|p| render_projection(&mut w, p))
            .collect();

        let elements = defaults::ELEMENTS_TABLE;
        let elements_sites = defaults::ELEMENTS_SITES_TABLE;
        let mut body = format!(
            "SELECT {} FROM {} INNER JOIN {} ON {} = {}",
            inner.join(", "),
            w.dialect().quote_identifier(elements),
            w.dialect().quote_identifier(elements_sites),
            w.column(&Column::new(elements_sites, "elementId")),
            w.column(&Column::new(elements, "id")),
        );

        for join in &self.joins {
            let on = w.condition(&join.on);
            body.push_str(&format!(
                " INNER JOIN {} {} ON {}",
                w.dialect().quote_identifier(&join.table),
                w.dialect().quote_identifier(&join.alias),
                on
            ));
        }

        if !self.where_conditions.is_empty() {
            let clauses: Vec<String> = self
                .where_conditions
                .iter()
                .map(|c| w.condition(c))
                .collect();
            body.push_str(" WHERE ");
            body.push_str(&clauses.join(" AND "));
        }

        if !self.having_conditions.is_empty() {
            let clauses: Vec<String> = self
                .having_conditions
                .iter()
                .map(|c| w.condition(c))
                .collect();
            body.push_str(" HAVING ");
            body.push_str(&clauses.join(" AND "));
        }

        let sql = format!("SELECT {} FROM ({}) {}", outer.join(", "), body, sub);
        RenderedQuery {
            sql,
            params: w.into_params(),
        }
    }
}

impl HostQuery for ElementQuery {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn inner_join(&mut self, table: &str, alias: &str, on: Condition) {
        self.joins.push(Join {
            table: table.to_string(),
            alias: alias.to_string(),
            on,
        });
    }

    fn add_subquery_select(&mut self, projection: Projection) {
        self.subquery_selects.push(projection);
    }

    fn add_select(&mut self, projection: Projection) {
        self.selects.push(projection);
    }

    fn and_where(&mut self, condition: Condition) {
        self.where_conditions.push(condition);
    }

    fn and_having(&mut self, condition: Condition) {
        self.having_conditions.push(condition);
    }
}

fn render_projection(w: &mut SqlWriter, projection: &Projection) -> String {
    let expr = w.expr(&projection.expr);
    match &projection.alias {
        Some(alias) => format!("{} AS {}", expr, w.dialect().quote_identifier(alias)),
        None => expr,
    }
}

/// Bind rendered parameters to a PostgreSQL query.
pub fn bind_postgres<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [QueryParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            QueryParam::Int(v) => query.bind(v),
            QueryParam::Float(v) => query.bind(v),
            QueryParam::String(s) => query.bind(s),
        };
    }
    query
}

/// Bind rendered parameters to a MySQL query.
pub fn bind_mysql<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [QueryParam],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            QueryParam::Int(v) => query.bind(v),
            QueryParam::Float(v) => query.bind(v),
            QueryParam::String(s) => query.bind(s),
        };
    }
    query
}
