//! Declarative style document consumed by the rendering engine.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::SpiderMapError;

mod builder;
pub use builder::{PageLocation, StyleBuilder};

mod expression;
pub use expression::{Expression, Interpolation, Literal};

mod layer;
pub use layer::{CirclePaint, Layer, LayerKind};

pub mod paint;

mod source;
pub use source::Source;

/// Version of the style format.
pub const STYLE_VERSION: u8 = 8;

/// Complete map style: sources, ordered layers and the default view.
///
/// The engine keeps its own copy of the document after the map is created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleDocument {
    /// Style format version.
    pub version: u8,
    /// Glyph URL template.
    pub glyphs: String,
    /// Default center as `[longitude, latitude]`.
    pub center: [f64; 2],
    /// Default zoom level.
    pub zoom: f64,
    /// Sources by id.
    pub sources: BTreeMap<String, Source>,
    /// Layers in drawing order, bottom first.
    pub layers: Vec<Layer>,
}

impl StyleDocument {
    /// Returns the layer with the given id.
    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Returns the source with the given id.
    pub fn source(&self, id: &str) -> Option<&Source> {
        self.sources.get(id)
    }

    /// Checks that every layer draws an existing source.
    pub fn validate(&self) -> Result<(), SpiderMapError> {
        match self
            .layers
            .iter()
            .find(|layer| !self.sources.contains_key(&layer.source))
        {
            Some(layer) => Err(SpiderMapError::MissingSource(layer.source.clone())),
            None => Ok(()),
        }
    }
}
