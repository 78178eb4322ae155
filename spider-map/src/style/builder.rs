use std::collections::{BTreeMap, HashMap};

use super::layer::{CirclePaint, Layer};
use super::paint::{circle_color, circle_radius};
use super::source::Source;
use super::{StyleDocument, STYLE_VERSION};
use crate::color::ColorPair;
use crate::config::{BasemapConfig, MapConfig};
use crate::error::SpiderMapError;
use crate::registry::{SpiderId, SpiderRegistry};

/// Location of the hosting page. Archive URLs are resolved relative to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// Scheme with the trailing colon, e.g. `https:`.
    pub protocol: String,
    /// Host with an optional port.
    pub host: String,
    /// Path of the page, e.g. `/map/`.
    pub pathname: String,
}

impl PageLocation {
    /// Creates a new location.
    pub fn new(
        protocol: impl Into<String>,
        host: impl Into<String>,
        pathname: impl Into<String>,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            host: host.into(),
            pathname: pathname.into(),
        }
    }
}

/// Builds the [`StyleDocument`] for a set of spiders.
///
/// ```ignore
/// let style = StyleBuilder::new(&SpiderRegistry::default(), location)
///     .with_zoom(5.0)
///     .build()?;
/// ```
pub struct StyleBuilder<'a> {
    registry: &'a SpiderRegistry,
    location: PageLocation,
    source_url_template: String,
    glyphs: String,
    basemap: BasemapConfig,
    center: [f64; 2],
    zoom: f64,
}

impl<'a> StyleBuilder<'a> {
    /// Creates a builder with the default configuration.
    pub fn new(registry: &'a SpiderRegistry, location: PageLocation) -> Self {
        Self::from_config(registry, location, &MapConfig::default())
    }

    /// Creates a builder with the style related part of the configuration.
    pub fn from_config(
        registry: &'a SpiderRegistry,
        location: PageLocation,
        config: &MapConfig,
    ) -> Self {
        Self {
            registry,
            location,
            source_url_template: config.source_url_template.clone(),
            glyphs: config.glyphs.clone(),
            basemap: config.basemap.clone(),
            center: config.center,
            zoom: config.zoom,
        }
    }

    /// Sets the glyph URL template.
    pub fn with_glyphs(mut self, glyphs: impl Into<String>) -> Self {
        self.glyphs = glyphs.into();
        self
    }

    /// Sets the raster base map.
    pub fn with_basemap(mut self, basemap: BasemapConfig) -> Self {
        self.basemap = basemap;
        self
    }

    /// Sets the default view center.
    pub fn with_center(mut self, longitude: f64, latitude: f64) -> Self {
        self.center = [longitude, latitude];
        self
    }

    /// Sets the default zoom level.
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// URL of the archive of the given spider.
    pub fn source_url(&self, spider: &SpiderId) -> Result<String, SpiderMapError> {
        let vars = HashMap::from([
            ("protocol".to_owned(), self.location.protocol.clone()),
            ("host".to_owned(), self.location.host.clone()),
            ("pathname".to_owned(), self.location.pathname.clone()),
            ("spider".to_owned(), spider.to_string()),
        ]);

        Ok(strfmt::strfmt(&self.source_url_template, &vars)?)
    }

    /// Builds the style.
    ///
    /// The raster base layer goes first, followed by one circle layer per spider in
    /// registry order.
    pub fn build(self) -> Result<StyleDocument, SpiderMapError> {
        let mut sources = BTreeMap::new();
        let mut layers = Vec::with_capacity(self.registry.len() + 1);

        sources.insert(
            self.basemap.source_id.clone(),
            Source::Raster {
                tiles: self.basemap.tiles.clone(),
                tile_size: self.basemap.tile_size,
                attribution: self.basemap.attribution.clone(),
            },
        );
        layers.push(Layer::raster(
            self.basemap.layer_id.clone(),
            self.basemap.source_id.clone(),
        ));

        for (position, spider) in self.registry.iter().enumerate() {
            let url = self.source_url(spider)?;
            if sources
                .insert(spider.to_string(), Source::Vector { url })
                .is_some()
            {
                return Err(SpiderMapError::DuplicateSpider(spider.to_string()));
            }

            let colors = ColorPair::for_index(position + 1);
            layers.push(Layer::circle(
                spider.layer_id(),
                spider.as_str(),
                spider.as_str(),
                CirclePaint {
                    circle_radius: circle_radius(),
                    circle_color: circle_color(&colors),
                },
            ));
        }

        log::debug!(
            "Built style with {} sources and {} layers",
            sources.len(),
            layers.len()
        );

        Ok(StyleDocument {
            version: STYLE_VERSION,
            glyphs: self.glyphs,
            center: self.center,
            zoom: self.zoom,
            sources,
            layers,
        })
    }
}
