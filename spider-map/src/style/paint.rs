//! Paint expressions of the spider circle layers.

use super::expression::{Expression, Interpolation};
use crate::color::ColorPair;

const RADIUS_VAR: &str = "radius";

/// Circle radius in pixels.
///
/// Base radius is `5 * point_count ^ 0.25` (1 for single points). It is used between zoom
/// 6 and 10 and the curve goes exponentially (base 2) to 10px at zoom 0 and 14, and to
/// 50px at zoom 22.
pub fn circle_radius() -> Expression {
    let point_count = Expression::Number(
        Box::new(Expression::get("point_count")),
        Box::new(1.0.into()),
    );
    let radius = Expression::Mul(vec![
        5.0.into(),
        Expression::Pow(Box::new(point_count), Box::new(0.25.into())),
    ]);

    Expression::Let {
        name: RADIUS_VAR.into(),
        value: Box::new(radius),
        body: Box::new(Expression::Interpolate {
            interpolation: Interpolation::Exponential(2.0),
            input: Box::new(Expression::Zoom),
            stops: vec![
                (0.0, 10.0.into()),
                (6.0, Expression::var(RADIUS_VAR)),
                (10.0, Expression::var(RADIUS_VAR)),
                (14.0, 10.0.into()),
                (22.0, 50.0.into()),
            ],
        }),
    }
}

/// Circle color, selecting the cluster color for features with `clustered = true`.
pub fn circle_color(colors: &ColorPair) -> Expression {
    Expression::Case {
        branches: vec![(
            Expression::Boolean(
                Box::new(Expression::get("clustered")),
                Box::new(Expression::bool(false)),
            ),
            Expression::string(colors.cluster_css()),
        )],
        fallback: Box::new(Expression::string(colors.point_css())),
    }
}
