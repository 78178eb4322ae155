//! Error type of the crate.

use thiserror::Error;

/// Errors that can happen while building or wiring the map.
#[derive(Debug, Error)]
pub enum SpiderMapError {
    /// The same spider identifier appears more than once in a registry.
    #[error("spider `{0}` is registered more than once")]
    DuplicateSpider(String),

    /// A spider identifier is empty.
    #[error("spider identifier cannot be empty")]
    EmptySpiderId,

    /// A handler is bound to a layer that the style does not contain.
    #[error("layer `{0}` is not present in the style")]
    UnknownLayer(String),

    /// A layer references a source that the style does not contain.
    #[error("source `{0}` is not present in the style")]
    MissingSource(String),

    /// A URL template could not be formatted.
    #[error("failed to format url template: {0}")]
    Template(String),

    /// A configured URL is not valid.
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    /// Feature geometry is not a point.
    #[error("feature geometry is not a point")]
    UnsupportedGeometry,

    /// Configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<strfmt::FmtError> for SpiderMapError {
    fn from(value: strfmt::FmtError) -> Self {
        Self::Template(value.to_string())
    }
}
