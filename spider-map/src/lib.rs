//! Logic of a point-of-interest map that shows one clustered circle layer per data
//! source ("spider").
//!
//! The crate builds the declarative style handed to the rendering engine, derives the
//! per-spider marker colors, formats clicked features into popup content and contains the
//! interaction logic. The engine is reached through the [`MapEngine`] trait, so everything
//! here runs (and is tested) outside of a browser.

pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod feature;
pub mod registry;
pub mod render;
pub mod style;

pub use color::{ColorPair, Rgb};
pub use config::MapConfig;
pub use controller::{ClickEvent, ClickOutcome, LayerBindings, MapController, MapEngine};
pub use error::SpiderMapError;
pub use feature::{Feature, LngLat};
pub use registry::{SpiderId, SpiderRegistry};
pub use render::{FeatureRenderer, PopupContent};
pub use style::{PageLocation, StyleBuilder, StyleDocument};
