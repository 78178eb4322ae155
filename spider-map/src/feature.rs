//! Features returned by the rendering engine for an interaction.

use std::collections::BTreeMap;

use geo_types::Point;
use serde_json::Value;

use crate::error::SpiderMapError;

/// Property set by the engine on cluster features.
pub const CLUSTERED_PROPERTY: &str = "clustered";
/// Number of points aggregated into a cluster.
pub const POINT_COUNT_PROPERTY: &str = "point_count";

/// Longitude/latitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLat {
    /// Longitude in degrees.
    pub lng: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl LngLat {
    /// Creates a new position.
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Position as a `[lng, lat]` array.
    pub const fn to_array(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl From<Point<f64>> for LngLat {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.x(), point.y())
    }
}

/// A rendered point or cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Point geometry, `x` is longitude and `y` is latitude.
    pub position: Point<f64>,
    /// Feature properties by key.
    pub properties: BTreeMap<String, Value>,
}

impl Feature {
    /// Creates a feature at the given position without properties.
    pub fn new(lng: f64, lat: f64) -> Self {
        Self {
            position: Point::new(lng, lat),
            properties: BTreeMap::new(),
        }
    }

    /// Adds a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Position of the feature.
    pub fn lng_lat(&self) -> LngLat {
        self.position.into()
    }

    /// Returns true if the feature is an aggregate of several points.
    pub fn is_clustered(&self) -> bool {
        self.properties
            .get(CLUSTERED_PROPERTY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Number of aggregated points, 1 for single points.
    pub fn point_count(&self) -> u64 {
        self.properties
            .get(POINT_COUNT_PROPERTY)
            .and_then(Value::as_u64)
            .unwrap_or(1)
    }
}

impl TryFrom<geojson::Feature> for Feature {
    type Error = SpiderMapError;

    fn try_from(feature: geojson::Feature) -> Result<Self, Self::Error> {
        let position = match feature.geometry.map(|geometry| geometry.value) {
            Some(geojson::Value::Point(position)) if position.len() >= 2 => {
                Point::new(position[0], position[1])
            }
            _ => return Err(SpiderMapError::UnsupportedGeometry),
        };

        Ok(Self {
            position,
            properties: feature.properties.unwrap_or_default().into_iter().collect(),
        })
    }
}

/// Text of a property value as shown to the user.
///
/// Strings are shown verbatim, other values with their JSON notation.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
