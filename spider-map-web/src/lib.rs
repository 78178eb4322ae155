//! Browser front end of the spider map.
//!
//! Expects the `maplibregl` and `pmtiles` scripts to be loaded by the page. Call
//! `createMap(config)` after module initialization and keep the returned app object.

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod engine;
#[cfg(target_arch = "wasm32")]
pub mod maplibre;

#[cfg(target_arch = "wasm32")]
pub use app::SpiderMapApp;
#[cfg(target_arch = "wasm32")]
pub use engine::WebMapEngine;

#[cfg(target_arch = "wasm32")]
mod entry {
    use spider_map::MapConfig;
    use wasm_bindgen::prelude::*;

    use crate::app::{js_error, SpiderMapApp};

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            log::warn!("Logger is already initialized");
        }
    }

    /// Creates the map in the configured container.
    ///
    /// `config` is an optional object overriding fields of the default configuration.
    #[wasm_bindgen(js_name = createMap)]
    pub fn create_map(config: JsValue) -> Result<SpiderMapApp, JsValue> {
        let config: MapConfig = if config.is_undefined() || config.is_null() {
            MapConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(js_error)?
        };

        SpiderMapApp::create(config)
    }
}
