//! Haversine distance expressions.
//!
//! Produces the great-circle distance between a fixed origin and a row's
//! coordinate columns as a dialect-neutral [`Expr`]:
//!
//! ```text
//! (R * acos(least(1, greatest(-1,
//!     cos(radians(lat0)) * cos(radians(lat)) * cos(radians(lng) - radians(lng0))
//!   + sin(radians(lat0)) * sin(radians(lat))
//! ))))
//! ```
//!
//! `R` is 6371 for kilometers and 3959 for miles. The acos argument is
//! clamped to [-1, 1]: for a row at the origin rounding can push it just
//! past 1, where MySQL yields NULL and PostgreSQL raises an error. Both
//! backends provide `acos`, `cos`, `sin`, `radians`, `least`, and
//! `greatest`, so the tree renders the same on either backend apart from
//! identifier quoting.

use waymark_core::{Coordinates, Units};

use crate::sql::{BinaryOp, Column, Expr};

fn radians(expr: Expr) -> Expr {
    Expr::func("radians", vec![expr])
}

fn mul(left: Expr, right: Expr) -> Expr {
    Expr::binary(left, BinaryOp::Mul, right)
}

/// Distance from `origin` to the point stored in `lat_column`/`lng_column`.
pub fn distance_expression(
    origin: Coordinates,
    lat_column: &Column,
    lng_column: &Column,
    units: Units,
) -> Expr {
    let lat0 = || radians(Expr::Float(origin.lat));
    let lat = || radians(Expr::Column(lat_column.clone()));

    let delta_lng = Expr::binary(
        radians(Expr::Column(lng_column.clone())),
        BinaryOp::Sub,
        radians(Expr::Float(origin.lng)),
    );

    let cos_term = mul(
        mul(
            Expr::func("cos", vec![lat0()]),
            Expr::func("cos", vec![lat()]),
        ),
        Expr::func("cos", vec![delta_lng]),
    );
    let sin_term = mul(
        Expr::func("sin", vec![lat0()]),
        Expr::func("sin", vec![lat()]),
    );

    let cos_angle = Expr::binary(cos_term, BinaryOp::Add, sin_term);
    let clamped = Expr::func(
        "least",
        vec![
            Expr::Int(1),
            Expr::func("greatest", vec![Expr::Int(-1), cos_angle]),
        ],
    );
    let central_angle = Expr::func("acos", vec![clamped]);

    Expr::group(mul(Expr::Int(units.radius()), central_angle))
}

/// Great-circle distance between two points, matching [`distance_expression`].
///
/// The acos argument is clamped the same way as in SQL.
pub fn great_circle_distance(a: Coordinates, b: Coordinates, units: Units) -> f64 {
    let (lat_a, lat_b) = (a.lat.to_radians(), b.lat.to_radians());
    let delta_lng = b.lng.to_radians() - a.lng.to_radians();
    let cos_angle = lat_a.cos() * lat_b.cos() * delta_lng.cos() + lat_a.sin() * lat_b.sin();
    units.radius() as f64 * cos_angle.clamp(-1.0, 1.0).acos()
}
