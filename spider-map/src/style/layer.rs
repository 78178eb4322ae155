//! Layer descriptors.

use serde::Serialize;

use super::expression::Expression;

/// One layer of the style.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    /// Unique layer id. Interaction handlers are bound to it.
    pub id: String,
    /// Id of the source the layer draws.
    pub source: String,
    /// Layer name inside a vector source.
    #[serde(rename = "source-layer", skip_serializing_if = "Option::is_none")]
    pub source_layer: Option<String>,
    /// Layer type with its paint properties.
    #[serde(flatten)]
    pub kind: LayerKind,
}

/// Type of a layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerKind {
    /// Raster tiles drawn as is.
    Raster,
    /// Points drawn as circles.
    Circle {
        /// Circle paint properties.
        paint: CirclePaint,
    },
}

/// Paint properties of a circle layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CirclePaint {
    /// Radius in pixels.
    #[serde(rename = "circle-radius")]
    pub circle_radius: Expression,
    /// Fill color.
    #[serde(rename = "circle-color")]
    pub circle_color: Expression,
}

impl Layer {
    /// Raster layer drawing the whole source.
    pub fn raster(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            source_layer: None,
            kind: LayerKind::Raster,
        }
    }

    /// Circle layer drawing one layer of a vector source.
    pub fn circle(
        id: impl Into<String>,
        source: impl Into<String>,
        source_layer: impl Into<String>,
        paint: CirclePaint,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            source_layer: Some(source_layer.into()),
            kind: LayerKind::Circle { paint },
        }
    }
}
