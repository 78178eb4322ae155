//! Map configuration.
//!
//! All fields have defaults, so an empty JSON object (or [`MapConfig::default`]) gives the
//! standard map. Partial documents override only the listed fields.

use serde::{Deserialize, Serialize};

use crate::error::SpiderMapError;

/// Configuration of the whole map page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Id of the element the map is rendered into.
    pub container: String,
    /// Initial view center as `[longitude, latitude]`.
    pub center: [f64; 2],
    /// Initial zoom level.
    pub zoom: f64,
    /// Keep the view in sync with the URL hash.
    pub hash: bool,
    /// Glyph URL template required by the style.
    pub glyphs: String,
    /// Template of the per-spider archive URL. Available keys: `protocol`, `host`,
    /// `pathname` and `spider`.
    pub source_url_template: String,
    /// Raster base map.
    pub basemap: BasemapConfig,
    /// Details popup.
    pub popup: PopupConfig,
    /// Geolocation control.
    pub geolocate: GeolocateConfig,
    /// Outbound links in the popup.
    pub links: LinkConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            container: "map".into(),
            center: [-110.0, 44.0],
            zoom: 3.0,
            hash: true,
            glyphs: "https://cdn.protomaps.com/fonts/pbf/{fontstack}/{range}.pbf".into(),
            source_url_template: "pmtiles://{protocol}//{host}{pathname}{spider}.pmtiles".into(),
            basemap: BasemapConfig::default(),
            popup: PopupConfig::default(),
            geolocate: GeolocateConfig::default(),
            links: LinkConfig::default(),
        }
    }
}

impl MapConfig {
    /// Parses configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, SpiderMapError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the container element id.
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = container.into();
        self
    }

    /// Sets the initial view center.
    pub fn with_center(mut self, longitude: f64, latitude: f64) -> Self {
        self.center = [longitude, latitude];
        self
    }

    /// Sets the initial zoom level.
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Enables or disables URL hash synchronization.
    pub fn with_hash(mut self, hash: bool) -> Self {
        self.hash = hash;
        self
    }

    /// Sets the template of the per-spider archive URL.
    pub fn with_source_url_template(mut self, template: impl Into<String>) -> Self {
        self.source_url_template = template.into();
        self
    }

    /// Replaces the base map.
    pub fn with_basemap(mut self, basemap: BasemapConfig) -> Self {
        self.basemap = basemap;
        self
    }
}

/// Raster base map configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasemapConfig {
    /// Id of the raster source.
    pub source_id: String,
    /// Id of the raster layer.
    pub layer_id: String,
    /// Alternative tile URL templates.
    pub tiles: Vec<String>,
    /// Tile size in pixels.
    pub tile_size: u32,
    /// Attribution HTML.
    pub attribution: String,
}

impl Default for BasemapConfig {
    fn default() -> Self {
        Self {
            source_id: "raster-tiles".into(),
            layer_id: "tiles".into(),
            tiles: ["a", "b", "c", "d"]
                .iter()
                .map(|subdomain| {
                    format!(
                        concat!(
                            "https://cartodb-basemaps-{subdomain}.global.ssl.fastly.net",
                            "/light_all/{{z}}/{{x}}/{{y}}{{ratio}}.png"
                        ),
                        subdomain = subdomain
                    )
                })
                .collect(),
            tile_size: 256,
            attribution: concat!(
                "© <a href=\"http://www.openstreetmap.org/copyright\"> OpenStreetMap </a> ",
                "contributors, © <a href=\"https://carto.com/about-carto/\"> CARTO </a>"
            )
            .into(),
        }
    }
}

/// Details popup configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupConfig {
    /// CSS class of the popup container.
    pub class_name: String,
    /// CSS max width of the popup.
    pub max_width: String,
    /// Give keyboard focus back to the map when the popup is closed.
    pub focus_map_on_close: bool,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            class_name: "places-popup".into(),
            max_width: "80%".into(),
            focus_map_on_close: true,
        }
    }
}

/// Geolocation control configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocateConfig {
    /// Request a high accuracy position.
    pub enable_high_accuracy: bool,
    /// Keep following the user position.
    pub track_user_location: bool,
}

impl Default for GeolocateConfig {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            track_user_location: true,
        }
    }
}

/// Targets of the links rendered in the popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Coordinate viewer template with `lat` and `lng` keys.
    pub osm_template: String,
    /// Wikidata entity template with the `id` key.
    pub wikidata_template: String,
    /// Name suggestion index lookup page, receives the `id` query parameter.
    pub nsi_url: String,
    /// Code search page, receives the `q` query parameter.
    pub code_search_url: String,
    /// Template of the code search query with the `spider` key.
    pub code_search_query: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            osm_template: "https://www.openstreetmap.org/?mlat={lat}&mlon={lng}".into(),
            wikidata_template: "https://www.wikidata.org/wiki/{id}".into(),
            nsi_url: "https://nsi.guide/".into(),
            code_search_url: "https://github.com/alltheplaces/alltheplaces/search".into(),
            code_search_query: "path:locations/spiders /name = \"{spider}\"/".into(),
        }
    }
}
