//! Address table access.
//!
//! The address table is owned by the host application; this module only
//! reads it. It names the joined columns the search compiler filters on and
//! loads single [`AddressRecord`] rows by their composite identity.

use sqlx::{MySqlPool, PgPool};
use waymark_core::{defaults, AddressRecord, Error, Result};

use crate::dialect::Dialect;
use crate::sql::{Column, Condition, Expr, QueryParam};

/// How a stored column is converted before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decode {
    /// Selected as stored.
    AsStored,
    /// `INTEGER` columns, widened so they decode as `i64`.
    BigInt,
    /// `DECIMAL(12,8)` coordinates, converted so they decode as `f64`.
    Double,
}

/// Columns selected when loading an address row.
const RECORD_COLUMNS: &[(&str, Decode)] = &[
    ("id", Decode::BigInt),
    ("elementId", Decode::BigInt),
    ("siteId", Decode::BigInt),
    ("fieldId", Decode::BigInt),
    ("formatted", Decode::AsStored),
    ("raw", Decode::AsStored),
    ("name", Decode::AsStored),
    ("street1", Decode::AsStored),
    ("street2", Decode::AsStored),
    ("city", Decode::AsStored),
    ("state", Decode::AsStored),
    ("zip", Decode::AsStored),
    ("neighborhood", Decode::AsStored),
    ("county", Decode::AsStored),
    ("country", Decode::AsStored),
    ("countryCode", Decode::AsStored),
    ("placeId", Decode::AsStored),
    ("lat", Decode::Double),
    ("lng", Decode::Double),
    ("zoom", Decode::AsStored),
    ("dateCreated", Decode::AsStored),
    ("dateUpdated", Decode::AsStored),
    ("uid", Decode::AsStored),
];

fn select_column(dialect: Dialect, name: &str, decode: Decode) -> String {
    let ident = dialect.quote_identifier(name);
    let target = match (decode, dialect) {
        (Decode::AsStored, _) => return ident,
        (Decode::BigInt, Dialect::MySql) => "SIGNED",
        (Decode::BigInt, Dialect::Postgres) => "BIGINT",
        (Decode::Double, Dialect::MySql) => "DOUBLE",
        (Decode::Double, Dialect::Postgres) => "DOUBLE PRECISION",
    };
    format!("CAST({ident} AS {target}) AS {ident}")
}

/// Column of the joined address table.
pub fn column(name: &str) -> Column {
    Column::new(defaults::ADDRESS_ALIAS, name)
}

/// Latitude column of the joined address table.
pub fn lat_column() -> Column {
    column("lat")
}

/// Longitude column of the joined address table.
pub fn lng_column() -> Column {
    column("lng")
}

/// Join condition tying an address row to its element and field.
///
/// `gm_addresses.elementId = elements.id AND gm_addresses.fieldId = <field_id>`
pub fn join_condition(field_id: i64) -> Condition {
    Condition::all(vec![
        Expr::Column(column("elementId")).eq(Expr::column(defaults::ELEMENTS_TABLE, "id")),
        Expr::Column(column("fieldId")).eq(Expr::Param(QueryParam::Int(field_id))),
    ])
}

/// `SELECT` statement loading one row by `(elementId, siteId, fieldId)`.
///
/// Integer and decimal columns are cast to the widths [`AddressRecord`]
/// decodes.
pub fn select_by_identity_sql(dialect: Dialect) -> String {
    let columns: Vec<String> = RECORD_COLUMNS
        .iter()
        .map(|(name, decode)| select_column(dialect, name, *decode))
        .collect();
    format!(
        "SELECT {} FROM {} WHERE {} = {} AND {} = {} AND {} = {} LIMIT 1",
        columns.join(", "),
        dialect.quote_identifier(defaults::ADDRESS_TABLE),
        dialect.quote_identifier("elementId"),
        dialect.placeholder(1),
        dialect.quote_identifier("siteId"),
        dialect.placeholder(2),
        dialect.quote_identifier("fieldId"),
        dialect.placeholder(3),
    )
}

/// Load the address stored for an element/site/field on PostgreSQL.
pub async fn find_postgres(
    pool: &PgPool,
    element_id: i64,
    site_id: i64,
    field_id: i64,
) -> Result<Option<AddressRecord>> {
    let sql = select_by_identity_sql(Dialect::Postgres);
    sqlx::query_as::<_, AddressRecord>(&sql)
        .bind(element_id)
        .bind(site_id)
        .bind(field_id)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}

/// Load the address stored for an element/site/field on MySQL.
pub async fn find_mysql(
    pool: &MySqlPool,
    element_id: i64,
    site_id: i64,
    field_id: i64,
) -> Result<Option<AddressRecord>> {
    let sql = select_by_identity_sql(Dialect::MySql);
    sqlx::query_as::<_, AddressRecord>(&sql)
        .bind(element_id)
        .bind(site_id)
        .bind(field_id)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}
