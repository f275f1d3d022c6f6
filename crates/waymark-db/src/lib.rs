//! # waymark-db
//!
//! SQL layer for waymark proximity search.
//!
//! This crate provides:
//! - Dialect-neutral expression and condition trees
//! - The MySQL/PostgreSQL dialect adapter (quoting, placeholders, alias filters)
//! - The haversine distance expression
//! - The subfield filter builder
//! - The host query abstraction and a reference element query
//! - Read access to the address table
//!
//! ## Example
//!
//! ```rust,ignore
//! use waymark_db::{Dialect, ElementQuery, HostQuery, bind_postgres};
//!
//! let mut query = ElementQuery::new(Dialect::Postgres);
//! // ... let a proximity search append its fragments ...
//! let rendered = query.render();
//! let rows = bind_postgres(sqlx::query(&rendered.sql), &rendered.params)
//!     .fetch_all(&pool)
//!     .await?;
//! ```

pub mod addresses;
pub mod dialect;
pub mod distance;
pub mod host;
pub mod sql;
pub mod subfield_filter;

pub use dialect::{AliasOperand, Aliased, AttachedPredicate, Dialect, FilterPlacement};
pub use distance::{distance_expression, great_circle_distance};
pub use host::{
    bind_mysql, bind_postgres, ElementQuery, HostQuery, Join, Projection, RenderedQuery,
};
pub use sql::{BinaryOp, Column, CompareOp, Condition, Expr, QueryParam, SqlWriter};
pub use subfield_filter::SubfieldFilterBuilder;
