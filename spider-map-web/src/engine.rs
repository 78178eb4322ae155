//! [`MapEngine`] implementation over a maplibre map.

use serde::Serialize;
use spider_map::config::GeolocateConfig;
use spider_map::controller::{Cursor, EaseTo, MapEngine, PopupCloseAction, PopupRequest};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Document;

use crate::dom::popup_element;
use crate::maplibre::{GeolocateControl, Map, NavigationControl, Popup};

#[derive(Serialize)]
struct EaseOptions {
    center: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    zoom: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PopupOptions<'a> {
    class_name: &'a str,
    max_width: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PositionOptions {
    enable_high_accuracy: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeolocateOptions {
    position_options: PositionOptions,
    track_user_location: bool,
}

/// Converts a value into a plain JS object (no `Map`s).
pub(crate) fn to_js<T: Serialize + ?Sized>(
    value: &T,
) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

/// Map engine backed by a `maplibregl.Map`.
pub struct WebMapEngine {
    map: Map,
    document: Document,
}

impl WebMapEngine {
    /// Wraps the map. Popup elements are created in the given document.
    pub fn new(map: Map, document: Document) -> Self {
        Self { map, document }
    }

    /// Underlying map.
    pub fn map(&self) -> &Map {
        &self.map
    }

    fn try_open_popup(&self, request: PopupRequest) -> Result<(), JsValue> {
        let content = popup_element(&self.document, &request.content)?;
        let options = to_js(&PopupOptions {
            class_name: &request.class_name,
            max_width: &request.max_width,
        })?;
        let anchor = to_js(&request.anchor.to_array())?;

        let popup = Popup::new(&options)
            .set_lng_lat(&anchor)
            .set_dom_content(&content)
            .add_to(&self.map);

        if request.on_close == PopupCloseAction::FocusCanvas {
            let canvas = self.map.get_canvas();
            let on_close = Closure::once_into_js(move || {
                if let Err(err) = canvas.focus() {
                    log::warn!("Failed to focus map canvas: {err:?}");
                }
            });
            popup.once("close", on_close.unchecked_ref());
        }

        Ok(())
    }
}

impl MapEngine for WebMapEngine {
    fn zoom(&self) -> f64 {
        self.map.get_zoom()
    }

    fn ease_to(&self, target: EaseTo) {
        let options = EaseOptions {
            center: target.center.to_array(),
            zoom: target.zoom,
        };
        match to_js(&options) {
            Ok(options) => self.map.ease_to(&options),
            Err(err) => log::error!("Failed to convert camera options: {err}"),
        }
    }

    fn open_popup(&self, popup: PopupRequest) {
        if let Err(err) = self.try_open_popup(popup) {
            log::error!("Failed to open popup: {err:?}");
        }
    }

    fn set_cursor(&self, cursor: Cursor) {
        if let Err(err) = self
            .map
            .get_canvas()
            .style()
            .set_property("cursor", cursor.css())
        {
            log::warn!("Failed to set cursor: {err:?}");
        }
    }

    fn focus_canvas(&self) {
        if let Err(err) = self.map.get_canvas().focus() {
            log::warn!("Failed to focus map canvas: {err:?}");
        }
    }

    fn resize(&self) {
        self.map.resize();
    }

    fn add_navigation_control(&self) {
        self.map.add_control(&NavigationControl::new());
    }

    fn add_geolocate_control(&self, config: &GeolocateConfig) {
        let options = GeolocateOptions {
            position_options: PositionOptions {
                enable_high_accuracy: config.enable_high_accuracy,
            },
            track_user_location: config.track_user_location,
        };
        match to_js(&options) {
            Ok(options) => self.map.add_control(&GeolocateControl::new(&options)),
            Err(err) => log::error!("Failed to convert geolocate options: {err}"),
        }
    }

    fn disable_keyboard_rotation(&self) {
        self.map.keyboard().disable_rotation();
    }
}
