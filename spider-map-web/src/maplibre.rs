//! Bindings to the `maplibregl` and `pmtiles` globals loaded by the page.

use js_sys::{Array, Function};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, Node};

#[wasm_bindgen]
extern "C" {
    /// Registers a handler for a custom URL scheme used by sources.
    #[wasm_bindgen(js_namespace = maplibregl, js_name = addProtocol)]
    pub fn add_protocol(name: &str, handler: &Function);

    /// Map instance.
    #[wasm_bindgen(js_namespace = maplibregl)]
    pub type Map;

    /// Creates the map from an options object.
    #[wasm_bindgen(constructor, js_namespace = maplibregl)]
    pub fn new(options: &JsValue) -> Map;

    #[wasm_bindgen(method, js_name = addControl)]
    pub fn add_control(this: &Map, control: &JsValue);

    #[wasm_bindgen(method, getter)]
    pub fn keyboard(this: &Map) -> KeyboardHandler;

    #[wasm_bindgen(method, js_name = getCanvas)]
    pub fn get_canvas(this: &Map) -> HtmlCanvasElement;

    #[wasm_bindgen(method, js_name = getZoom)]
    pub fn get_zoom(this: &Map) -> f64;

    #[wasm_bindgen(method, js_name = easeTo)]
    pub fn ease_to(this: &Map, options: &JsValue);

    #[wasm_bindgen(method)]
    pub fn resize(this: &Map);

    /// Listens to a map event.
    #[wasm_bindgen(method)]
    pub fn on(this: &Map, event: &str, listener: &Function);

    /// Listens to a map event restricted to features of one layer.
    #[wasm_bindgen(method, js_name = on)]
    pub fn on_layer(this: &Map, event: &str, layer_id: &str, listener: &Function);

    /// Keyboard interaction handler of the map.
    pub type KeyboardHandler;

    #[wasm_bindgen(method, js_name = disableRotation)]
    pub fn disable_rotation(this: &KeyboardHandler);

    /// Zoom and compass buttons.
    #[wasm_bindgen(js_namespace = maplibregl)]
    pub type NavigationControl;

    #[wasm_bindgen(constructor, js_namespace = maplibregl)]
    pub fn new() -> NavigationControl;

    /// User location button.
    #[wasm_bindgen(js_namespace = maplibregl)]
    pub type GeolocateControl;

    #[wasm_bindgen(constructor, js_namespace = maplibregl)]
    pub fn new(options: &JsValue) -> GeolocateControl;

    /// Popup attached to a map position.
    #[wasm_bindgen(js_namespace = maplibregl)]
    pub type Popup;

    #[wasm_bindgen(constructor, js_namespace = maplibregl)]
    pub fn new(options: &JsValue) -> Popup;

    #[wasm_bindgen(method, js_name = setLngLat)]
    pub fn set_lng_lat(this: &Popup, lng_lat: &JsValue) -> Popup;

    #[wasm_bindgen(method, js_name = setDOMContent)]
    pub fn set_dom_content(this: &Popup, content: &Node) -> Popup;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Popup, map: &Map) -> Popup;

    #[wasm_bindgen(method)]
    pub fn once(this: &Popup, event: &str, listener: &Function);

    /// Mouse event delivered to layer listeners.
    pub type MapLayerMouseEvent;

    #[wasm_bindgen(method, getter)]
    pub fn features(this: &MapLayerMouseEvent) -> Option<Array>;

    #[wasm_bindgen(method, getter, js_name = lngLat)]
    pub fn lng_lat(this: &MapLayerMouseEvent) -> LngLat;

    /// Geographic position.
    pub type LngLat;

    #[wasm_bindgen(method, getter)]
    pub fn lng(this: &LngLat) -> f64;

    #[wasm_bindgen(method, getter)]
    pub fn lat(this: &LngLat) -> f64;

    /// Feature returned by the engine. Its geometry is a lazy getter, so it is read
    /// through the plain `toJSON()` form.
    pub type GeoJsonFeature;

    #[wasm_bindgen(method, js_name = toJSON)]
    pub fn to_json(this: &GeoJsonFeature) -> JsValue;
}

#[wasm_bindgen]
extern "C" {
    /// Archive protocol of the `pmtiles` library.
    #[wasm_bindgen(js_namespace = pmtiles)]
    pub type Protocol;

    #[wasm_bindgen(constructor, js_namespace = pmtiles)]
    pub fn new() -> Protocol;

    /// Tile request handler to register with [`add_protocol`].
    #[wasm_bindgen(method, getter)]
    pub fn tile(this: &Protocol) -> Function;
}
