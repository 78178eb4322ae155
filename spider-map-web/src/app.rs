//! Page wiring: builds the style, creates the map and registers event handlers.

use std::fmt::Display;
use std::rc::Rc;

use serde::Serialize;
use spider_map::controller::ClickEvent;
use spider_map::{
    Feature, LngLat, MapConfig, MapController, PageLocation, SpiderId, SpiderRegistry,
    StyleBuilder, StyleDocument,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::engine::{to_js, WebMapEngine};
use crate::maplibre::{self, GeoJsonFeature, Map, MapLayerMouseEvent, Protocol};

const ARCHIVE_SCHEME: &str = "pmtiles";

type LayerListener = Closure<dyn FnMut(MapLayerMouseEvent)>;

#[derive(Serialize)]
struct MapOptions<'a> {
    container: &'a str,
    style: &'a StyleDocument,
    center: [f64; 2],
    zoom: f64,
    hash: bool,
}

/// Running map application.
///
/// Owns the controller and every event listener. Dropping it detaches the Rust side of
/// the listeners, so the page keeps it for its whole lifetime.
#[wasm_bindgen]
pub struct SpiderMapApp {
    controller: Rc<MapController<WebMapEngine>>,
    _on_load: Closure<dyn FnMut()>,
    _listeners: Vec<LayerListener>,
}

#[wasm_bindgen]
impl SpiderMapApp {
    /// Current zoom level of the map.
    pub fn zoom(&self) -> f64 {
        self.controller.engine().map().get_zoom()
    }

    /// Ids of the layers with interaction handlers.
    #[wasm_bindgen(js_name = layerIds)]
    pub fn layer_ids(&self) -> Vec<String> {
        self.controller
            .bindings()
            .layer_ids()
            .map(str::to_owned)
            .collect()
    }
}

impl SpiderMapApp {
    pub(crate) fn create(config: MapConfig) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
        let document = window.document().ok_or_else(|| js_error("no document"))?;
        let location = window.location();
        let location = PageLocation::new(
            location.protocol()?,
            location.host()?,
            location.pathname()?,
        );

        let registry = SpiderRegistry::default();
        let style = StyleBuilder::from_config(&registry, location, &config)
            .build()
            .map_err(js_error)?;
        style.validate().map_err(js_error)?;

        // Sources are resolved lazily, but the scheme must be known before the map exists.
        let protocol = Protocol::new();
        maplibre::add_protocol(ARCHIVE_SCHEME, &protocol.tile());

        let options = to_js(&MapOptions {
            container: &config.container,
            style: &style,
            center: config.center,
            zoom: config.zoom,
            hash: config.hash,
        })?;
        let map = Map::new(&options);

        let engine = WebMapEngine::new(map, document);
        let controller = Rc::new(
            MapController::from_config(engine, &registry, &style, &config).map_err(js_error)?,
        );
        controller.initialize();

        let on_load = {
            let controller = Rc::clone(&controller);
            Closure::<dyn FnMut()>::new(move || controller.handle_load())
        };
        controller
            .engine()
            .map()
            .on("load", on_load.as_ref().unchecked_ref());

        let mut listeners = Vec::with_capacity(controller.bindings().len() * 3);
        for (layer_id, spider) in controller.bindings().iter() {
            for (event, listener) in layer_listeners(&controller, spider) {
                controller
                    .engine()
                    .map()
                    .on_layer(event, layer_id, listener.as_ref().unchecked_ref());
                listeners.push(listener);
            }
        }

        log::info!(
            "Spider map created with {} layers and {} listeners",
            style.layers.len(),
            listeners.len()
        );

        Ok(Self {
            controller,
            _on_load: on_load,
            _listeners: listeners,
        })
    }
}

fn layer_listeners(
    controller: &Rc<MapController<WebMapEngine>>,
    spider: &SpiderId,
) -> [(&'static str, LayerListener); 3] {
    let click = {
        let controller = Rc::clone(controller);
        let spider = spider.clone();
        LayerListener::new(move |event: MapLayerMouseEvent| {
            let outcome = controller.handle_click(&spider, &click_event(&event));
            log::debug!("Click on {spider}: {outcome:?}");
        })
    };
    let enter = {
        let controller = Rc::clone(controller);
        let spider = spider.clone();
        LayerListener::new(move |_: MapLayerMouseEvent| controller.handle_mouse_enter(&spider))
    };
    let leave = {
        let controller = Rc::clone(controller);
        let spider = spider.clone();
        LayerListener::new(move |_: MapLayerMouseEvent| controller.handle_mouse_leave(&spider))
    };

    [("click", click), ("mouseenter", enter), ("mouseleave", leave)]
}

fn click_event(event: &MapLayerMouseEvent) -> ClickEvent {
    let lng_lat = event.lng_lat();
    let features = event
        .features()
        .map(|features| features.iter().filter_map(|f| feature_from_js(&f)).collect())
        .unwrap_or_default();

    ClickEvent {
        lng_lat: LngLat::new(lng_lat.lng(), lng_lat.lat()),
        features,
    }
}

fn feature_from_js(value: &JsValue) -> Option<Feature> {
    let json = value.unchecked_ref::<GeoJsonFeature>().to_json();
    let feature: geojson::Feature = match serde_wasm_bindgen::from_value(json) {
        Ok(feature) => feature,
        Err(err) => {
            log::warn!("Skipping feature that is not valid GeoJSON: {err}");
            return None;
        }
    };

    match Feature::try_from(feature) {
        Ok(feature) => Some(feature),
        Err(err) => {
            log::warn!("Skipping feature: {err}");
            None
        }
    }
}

pub(crate) fn js_error(err: impl Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}
