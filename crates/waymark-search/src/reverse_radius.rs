//! Reverse radius resolution.
//!
//! A reverse proximity search matches records whose own radius reaches the
//! target: each record stores its radius in a Number field, and the search
//! compares the computed distance against that stored value instead of a
//! fixed range.

use waymark_core::{defaults, AddressField, Error, LayoutField, Result};
use waymark_db::{Aliased, Column, Expr};

/// Look up the radius field on the address field's layout.
///
/// Fails with [`Error::Config`] when the field does not exist or is not a
/// Number field.
pub fn resolve_radius_field(field: &AddressField, handle: &str) -> Result<LayoutField> {
    let layout_field = field.layout.field(handle).ok_or_else(|| {
        Error::Config(format!(
            "The \"{handle}\" field does not exist on the layout of \"{}\". \
             Please specify a Number field for the `reverseRadius` option.",
            field.handle
        ))
    })?;

    if !layout_field.kind.is_numeric() {
        return Err(Error::Config(format!(
            "The \"{handle}\" field is a {} field. \
             Please specify a Number field for the `reverseRadius` option.",
            layout_field.kind
        )));
    }

    Ok(layout_field)
}

/// The element content column custom field values are stored in.
pub fn content_column() -> Column {
    Column::new(defaults::ELEMENTS_SITES_TABLE, defaults::CONTENT_COLUMN)
}

/// Per-row radius, extracted from element content and exposed as
/// `gm_reverseRadius`.
pub fn radius_projection(layout_field: &LayoutField) -> Aliased {
    Aliased::new(
        defaults::REVERSE_RADIUS_ALIAS,
        Expr::JsonNumber {
            column: content_column(),
            key: layout_field.uid.clone(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use waymark_core::{FieldKind, StaticFieldLayout};
    use waymark_db::{Dialect, SqlWriter};

    fn field() -> AddressField {
        let layout = StaticFieldLayout::new()
            .with_field("serviceRadius", "uid-radius", FieldKind::Number)
            .with_field("summary", "uid-summary", FieldKind::PlainText)
            .with_field("notes", "uid-notes", FieldKind::Other("Table".into()));
        AddressField::new(3, "address", Arc::new(layout))
    }

    #[test]
    fn test_number_field_resolves() {
        let layout_field = resolve_radius_field(&field(), "serviceRadius").unwrap();
        assert_eq!(layout_field.uid, "uid-radius");
    }

    #[test]
    fn test_non_number_field_names_its_type() {
        let err = resolve_radius_field(&field(), "summary").unwrap_err();
        match err {
            Error::Config(msg) => {
                assert!(msg.contains("\"summary\""));
                assert!(msg.contains("Plain Text"));
            }
            other => panic!("expected config error, got {other:?}"),
        }

        let err = resolve_radius_field(&field(), "notes").unwrap_err();
        assert!(err.to_string().contains("is a Table field"));
    }

    #[test]
    fn test_missing_field_is_config_error() {
        let err = resolve_radius_field(&field(), "nope").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_radius_projection_renders_per_dialect() {
        let layout_field = resolve_radius_field(&field(), "serviceRadius").unwrap();
        let projection = radius_projection(&layout_field);
        assert_eq!(projection.alias, "gm_reverseRadius");

        let mut my = SqlWriter::new(Dialect::MySql);
        assert_eq!(
            my.expr(&projection.expr),
            "JSON_EXTRACT(`elements_sites`.`content`, '$.\"uid-radius\"')"
        );

        let mut pg = SqlWriter::new(Dialect::Postgres);
        assert_eq!(
            pg.expr(&projection.expr),
            "CAST((\"elements_sites\".\"content\"->>'uid-radius') AS DOUBLE PRECISION)"
        );
    }
}
