//! Interaction logic of the map.
//!
//! [`MapController`] reacts to engine events (load, clicks, hover) by calling into the
//! engine through the [`MapEngine`] trait. The engine itself lives outside of this crate.

use std::collections::BTreeMap;

use crate::config::{GeolocateConfig, MapConfig, PopupConfig};
use crate::error::SpiderMapError;
use crate::feature::{Feature, LngLat};
use crate::registry::{SpiderId, SpiderRegistry};
use crate::render::{FeatureRenderer, PopupContent};
use crate::style::StyleDocument;

/// Mouse cursor over the map canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Hand cursor shown over markers.
    Pointer,
    /// Engine default cursor.
    Default,
}

impl Cursor {
    /// CSS `cursor` value. The default cursor clears the property.
    pub fn css(&self) -> &'static str {
        match self {
            Cursor::Pointer => "pointer",
            Cursor::Default => "",
        }
    }
}

/// Eased camera transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EaseTo {
    /// New view center.
    pub center: LngLat,
    /// New zoom level. The zoom is kept if `None`.
    pub zoom: Option<f64>,
}

/// What to do when the user closes a popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupCloseAction {
    /// Give keyboard focus back to the map canvas.
    FocusCanvas,
    /// Nothing.
    None,
}

/// Popup to open on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupRequest {
    /// Position the popup points at.
    pub anchor: LngLat,
    /// Rendered content.
    pub content: PopupContent,
    /// CSS class of the popup.
    pub class_name: String,
    /// CSS max width of the popup.
    pub max_width: String,
    /// Action on close.
    pub on_close: PopupCloseAction,
}

/// Operations of the rendering engine used by the controller.
///
/// All calls happen on the UI thread from inside engine event handlers.
pub trait MapEngine {
    /// Current zoom level.
    fn zoom(&self) -> f64;
    /// Starts an eased camera transition.
    fn ease_to(&self, target: EaseTo);
    /// Opens a popup. The engine closes a previously opened one.
    fn open_popup(&self, popup: PopupRequest);
    /// Changes the cursor over the canvas.
    fn set_cursor(&self, cursor: Cursor);
    /// Moves keyboard focus to the map canvas.
    fn focus_canvas(&self);
    /// Recomputes the canvas size from its container.
    fn resize(&self);
    /// Adds zoom and compass buttons.
    fn add_navigation_control(&self);
    /// Adds the "show my location" button.
    fn add_geolocate_control(&self, config: &GeolocateConfig);
    /// Prevents rotating the map with the keyboard.
    fn disable_keyboard_rotation(&self);
}

/// Click on a spider layer with the features under the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    /// Map position of the click.
    pub lng_lat: LngLat,
    /// Features of the layer at the click position.
    pub features: Vec<Feature>,
}

/// Result of handling a click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// There were no features under the click.
    Ignored,
    /// A cluster was clicked and the map zooms into it.
    ZoomedToCluster {
        /// Cluster position.
        center: LngLat,
        /// Target zoom level.
        zoom: f64,
    },
    /// A popup with the given number of features was opened.
    OpenedPopup {
        /// Number of rendered features.
        features: usize,
    },
}

/// Layers that interaction handlers are registered for, by layer id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerBindings {
    by_layer: BTreeMap<String, SpiderId>,
}

impl LayerBindings {
    /// Binds every spider of the registry to its layer, checking the style contains the
    /// layer and that the layer draws the spider's source.
    pub fn validate(
        registry: &SpiderRegistry,
        style: &StyleDocument,
    ) -> Result<Self, SpiderMapError> {
        let mut by_layer = BTreeMap::new();
        for spider in registry {
            let layer_id = spider.layer_id();
            let layer = style
                .layer(&layer_id)
                .ok_or_else(|| SpiderMapError::UnknownLayer(layer_id.clone()))?;

            if layer.source != spider.as_str()
                || layer.source_layer.as_deref() != Some(spider.as_str())
                || style.source(spider.as_str()).is_none()
            {
                return Err(SpiderMapError::MissingSource(spider.to_string()));
            }

            by_layer.insert(layer_id, spider.clone());
        }

        Ok(Self { by_layer })
    }

    /// Ids of the bound layers.
    pub fn layer_ids(&self) -> impl Iterator<Item = &str> {
        self.by_layer.keys().map(String::as_str)
    }

    /// Bound `(layer id, spider)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpiderId)> {
        self.by_layer.iter().map(|(id, spider)| (id.as_str(), spider))
    }

    /// Spider drawn by the layer.
    pub fn spider(&self, layer_id: &str) -> Option<&SpiderId> {
        self.by_layer.get(layer_id)
    }

    /// Number of bound layers.
    pub fn len(&self) -> usize {
        self.by_layer.len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.by_layer.is_empty()
    }
}

/// Owns the engine handle and reacts to map events.
pub struct MapController<E: MapEngine> {
    engine: E,
    bindings: LayerBindings,
    renderer: FeatureRenderer,
    popup: PopupConfig,
    geolocate: GeolocateConfig,
}

impl<E: MapEngine> MapController<E> {
    /// Creates a controller with already validated bindings.
    pub fn new(
        engine: E,
        bindings: LayerBindings,
        renderer: FeatureRenderer,
        config: &MapConfig,
    ) -> Self {
        Self {
            engine,
            bindings,
            renderer,
            popup: config.popup.clone(),
            geolocate: config.geolocate,
        }
    }

    /// Creates a controller, validating the bindings and the link configuration.
    pub fn from_config(
        engine: E,
        registry: &SpiderRegistry,
        style: &StyleDocument,
        config: &MapConfig,
    ) -> Result<Self, SpiderMapError> {
        let bindings = LayerBindings::validate(registry, style)?;
        let renderer = FeatureRenderer::new(&config.links)?;
        Ok(Self::new(engine, bindings, renderer, config))
    }

    /// Engine handle.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Layers interaction handlers must be registered for.
    pub fn bindings(&self) -> &LayerBindings {
        &self.bindings
    }

    /// Adds the controls and prepares keyboard interaction. Call once after the map is
    /// created.
    pub fn initialize(&self) {
        self.engine.add_navigation_control();
        self.engine.add_geolocate_control(&self.geolocate);
        self.engine.disable_keyboard_rotation();
        self.engine.focus_canvas();

        log::info!(
            "Map controller initialized with {} spider layers",
            self.bindings.len()
        );
    }

    /// Handles the engine `load` event. The container layout is final only by now.
    pub fn handle_load(&self) {
        log::debug!("Map loaded, resizing canvas");
        self.engine.resize();
    }

    /// Handles a click on a spider layer.
    ///
    /// A click on a cluster zooms one level into it. Otherwise a popup lists all the
    /// features under the click and the map is centered on the first one.
    pub fn handle_click(&self, spider: &SpiderId, event: &ClickEvent) -> ClickOutcome {
        let Some(first) = event.features.first() else {
            return ClickOutcome::Ignored;
        };

        if let Some(cluster) = event.features.iter().find(|f| f.is_clustered()) {
            let center = cluster.lng_lat();
            let zoom = self.engine.zoom() + 1.0;
            self.engine.ease_to(EaseTo {
                center,
                zoom: Some(zoom),
            });

            log::debug!(
                "Zooming into {spider} cluster of {} points",
                cluster.point_count()
            );
            return ClickOutcome::ZoomedToCluster { center, zoom };
        }

        let content = self.renderer.render_popup(&event.features);
        self.engine.open_popup(PopupRequest {
            anchor: event.lng_lat,
            content,
            class_name: self.popup.class_name.clone(),
            max_width: self.popup.max_width.clone(),
            on_close: if self.popup.focus_map_on_close {
                PopupCloseAction::FocusCanvas
            } else {
                PopupCloseAction::None
            },
        });
        self.engine.ease_to(EaseTo {
            center: first.lng_lat(),
            zoom: None,
        });

        log::debug!("Showing {} {spider} features", event.features.len());
        ClickOutcome::OpenedPopup {
            features: event.features.len(),
        }
    }

    /// Handles the cursor entering a spider layer.
    pub fn handle_mouse_enter(&self, spider: &SpiderId) {
        log::trace!("Cursor entered {spider}");
        self.engine.set_cursor(Cursor::Pointer);
    }

    /// Handles the cursor leaving a spider layer.
    pub fn handle_mouse_leave(&self, spider: &SpiderId) {
        log::trace!("Cursor left {spider}");
        self.engine.set_cursor(Cursor::Default);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::render::PopupItem;
    use crate::style::{PageLocation, StyleBuilder};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        EaseTo(EaseTo),
        OpenPopup(PopupRequest),
        SetCursor(Cursor),
        FocusCanvas,
        Resize,
        AddNavigation,
        AddGeolocate(GeolocateConfig),
        DisableKeyboardRotation,
    }

    #[derive(Default)]
    struct RecordingEngine {
        zoom: f64,
        calls: RefCell<Vec<Call>>,
    }

    impl RecordingEngine {
        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn record(&self, call: Call) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl MapEngine for RecordingEngine {
        fn zoom(&self) -> f64 {
            self.zoom
        }
        fn ease_to(&self, target: EaseTo) {
            self.record(Call::EaseTo(target));
        }
        fn open_popup(&self, popup: PopupRequest) {
            self.record(Call::OpenPopup(popup));
        }
        fn set_cursor(&self, cursor: Cursor) {
            self.record(Call::SetCursor(cursor));
        }
        fn focus_canvas(&self) {
            self.record(Call::FocusCanvas);
        }
        fn resize(&self) {
            self.record(Call::Resize);
        }
        fn add_navigation_control(&self) {
            self.record(Call::AddNavigation);
        }
        fn add_geolocate_control(&self, config: &GeolocateConfig) {
            self.record(Call::AddGeolocate(*config));
        }
        fn disable_keyboard_rotation(&self) {
            self.record(Call::DisableKeyboardRotation);
        }
    }

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn style(registry: &SpiderRegistry) -> StyleDocument {
        StyleBuilder::new(registry, PageLocation::new("http:", "localhost", "/"))
            .build()
            .unwrap()
    }

    fn controller(zoom: f64) -> MapController<RecordingEngine> {
        controller_with_config(zoom, &MapConfig::default())
    }

    fn controller_with_config(zoom: f64, config: &MapConfig) -> MapController<RecordingEngine> {
        init_logger();
        let registry = SpiderRegistry::default();
        let engine = RecordingEngine {
            zoom,
            ..Default::default()
        };
        MapController::from_config(engine, &registry, &style(&registry), config).unwrap()
    }

    fn chipotle() -> SpiderId {
        SpiderId::new("chipotle").unwrap()
    }

    #[test]
    fn initialize_adds_controls() {
        let controller = controller(3.0);
        controller.initialize();
        assert_eq!(
            controller.engine().calls(),
            [
                Call::AddNavigation,
                Call::AddGeolocate(GeolocateConfig {
                    enable_high_accuracy: true,
                    track_user_location: true,
                }),
                Call::DisableKeyboardRotation,
                Call::FocusCanvas,
            ]
        );

        controller.handle_load();
        assert_eq!(controller.engine().calls().last(), Some(&Call::Resize));
    }

    #[test]
    fn click_on_cluster_zooms_in() {
        let controller = controller(4.5);
        let event = ClickEvent {
            lng_lat: LngLat::new(1.1, 2.1),
            features: vec![Feature::new(1.0, 2.0)
                .with_property("clustered", true)
                .with_property("point_count", 12)],
        };

        let outcome = controller.handle_click(&chipotle(), &event);
        assert_eq!(
            outcome,
            ClickOutcome::ZoomedToCluster {
                center: LngLat::new(1.0, 2.0),
                zoom: 5.5,
            }
        );
        assert_eq!(
            controller.engine().calls(),
            [Call::EaseTo(EaseTo {
                center: LngLat::new(1.0, 2.0),
                zoom: Some(5.5),
            })]
        );
    }

    #[test]
    fn any_cluster_wins_over_points() {
        let controller = controller(2.0);
        let event = ClickEvent {
            lng_lat: LngLat::new(0.0, 0.0),
            features: vec![
                Feature::new(5.0, 5.0),
                Feature::new(7.0, 8.0).with_property("clustered", true),
            ],
        };

        let outcome = controller.handle_click(&chipotle(), &event);
        assert!(matches!(
            outcome,
            ClickOutcome::ZoomedToCluster { center, .. } if center == LngLat::new(7.0, 8.0)
        ));
        assert!(controller
            .engine()
            .calls()
            .iter()
            .all(|call| !matches!(call, Call::OpenPopup(_))));
    }

    #[test]
    fn click_on_points_opens_popup() {
        let controller = controller(12.0);
        let event = ClickEvent {
            lng_lat: LngLat::new(-104.99, 39.74),
            features: vec![
                Feature::new(-105.0, 39.75).with_property("brand", "Chipotle"),
                Feature::new(-105.0, 39.75).with_property("brand", "Qdoba"),
            ],
        };

        let outcome = controller.handle_click(&chipotle(), &event);
        assert_eq!(outcome, ClickOutcome::OpenedPopup { features: 2 });

        let calls = controller.engine().calls();
        assert_eq!(calls.len(), 2);
        let Call::OpenPopup(popup) = &calls[0] else {
            panic!("expected a popup, got {:?}", calls[0]);
        };
        assert_eq!(popup.anchor, LngLat::new(-104.99, 39.74));
        assert_eq!(popup.class_name, "places-popup");
        assert_eq!(popup.max_width, "80%");
        assert_eq!(popup.on_close, PopupCloseAction::FocusCanvas);
        assert_eq!(popup.content.separator_count(), 1);

        let items = popup.content.items();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1], PopupItem::Separator);

        assert_eq!(
            calls[1],
            Call::EaseTo(EaseTo {
                center: LngLat::new(-105.0, 39.75),
                zoom: None,
            })
        );
    }

    #[test]
    fn popup_close_can_leave_focus_alone() {
        let mut config = MapConfig::default();
        config.popup.focus_map_on_close = false;
        let controller = controller_with_config(12.0, &config);
        let event = ClickEvent {
            lng_lat: LngLat::new(1.0, 2.0),
            features: vec![Feature::new(1.0, 2.0)],
        };

        controller.handle_click(&chipotle(), &event);

        let calls = controller.engine().calls();
        let Call::OpenPopup(popup) = &calls[0] else {
            panic!("expected a popup, got {:?}", calls[0]);
        };
        assert_eq!(popup.on_close, PopupCloseAction::None);
    }

    #[test]
    fn empty_click_is_ignored() {
        let controller = controller(3.0);
        let event = ClickEvent {
            lng_lat: LngLat::new(0.0, 0.0),
            features: vec![],
        };
        assert_eq!(
            controller.handle_click(&chipotle(), &event),
            ClickOutcome::Ignored
        );
        assert!(controller.engine().calls().is_empty());
    }

    #[test]
    fn hover_changes_cursor() {
        let controller = controller(3.0);
        controller.handle_mouse_enter(&chipotle());
        controller.handle_mouse_leave(&chipotle());
        assert_eq!(
            controller.engine().calls(),
            [
                Call::SetCursor(Cursor::Pointer),
                Call::SetCursor(Cursor::Default)
            ]
        );
        assert_eq!(Cursor::Default.css(), "");
    }

    #[test]
    fn bindings_cover_every_spider() {
        let registry = SpiderRegistry::default();
        let bindings = LayerBindings::validate(&registry, &style(&registry)).unwrap();
        assert_eq!(bindings.len(), registry.len());
        assert_eq!(bindings.spider("output-qdoba").map(SpiderId::as_str), Some("qdoba"));
        assert!(bindings.spider("tiles").is_none());
        assert!(bindings.layer_ids().all(|id| id.starts_with("output-")));
    }

    #[test]
    fn bindings_detect_missing_layer() {
        let registry = SpiderRegistry::default();
        let mut style = style(&registry);
        style.layers.retain(|layer| layer.id != "output-starbucks");

        assert!(matches!(
            LayerBindings::validate(&registry, &style),
            Err(SpiderMapError::UnknownLayer(id)) if id == "output-starbucks"
        ));
    }

    #[test]
    fn bindings_detect_mismatched_source() {
        let registry = SpiderRegistry::default();
        let mut style = style(&registry);
        if let Some(layer) = style.layers.iter_mut().find(|l| l.id == "output-qdoba") {
            layer.source_layer = Some("qdoba_us".into());
        }

        assert!(matches!(
            LayerBindings::validate(&registry, &style),
            Err(SpiderMapError::MissingSource(id)) if id == "qdoba"
        ));
    }

    #[test]
    fn bindings_for_unstyled_registry() {
        let styled = SpiderRegistry::new(["qdoba"]).unwrap();
        let other = SpiderRegistry::new(["qdoba", "wendys"]).unwrap();
        assert!(matches!(
            LayerBindings::validate(&other, &style(&styled)),
            Err(SpiderMapError::UnknownLayer(id)) if id == "output-wendys"
        ));
    }
}
