//! Tile source descriptors.

use serde::Serialize;

/// Tile source of the style.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    /// Vector tiles described by a TileJSON (or archive) URL.
    Vector {
        /// Source URL.
        url: String,
    },
    /// Raster tiles fetched from URL templates.
    #[serde(rename_all = "camelCase")]
    Raster {
        /// Alternative tile URL templates for the same tiles.
        tiles: Vec<String>,
        /// Tile size in pixels.
        tile_size: u32,
        /// Attribution shown on the map.
        attribution: String,
    },
}

impl Source {
    /// Returns true for vector sources.
    pub fn is_vector(&self) -> bool {
        matches!(self, Source::Vector { .. })
    }
}
