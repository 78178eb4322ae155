//! Ordered list of the data sources shown on the map.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SpiderMapError;

const LAYER_PREFIX: &str = "output-";

/// Spiders shown when no custom registry is given. Order seeds the marker colors.
pub const DEFAULT_SPIDERS: &[&str] = &[
    "anytime_fitness",
    "caribou_coffee_us",
    "chipotle",
    "mcdonalds",
    "natural_grocers_us",
    "qdoba",
    "sprouts_farmer_market",
    "starbucks",
    "sweetgreen_us",
    "trader_joes_us",
    "whole_foods",
];

/// Name of one data source. Also used as the tile source id and source layer name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SpiderId(String);

impl SpiderId {
    /// Creates a new identifier. Fails on an empty string.
    pub fn new(id: impl Into<String>) -> Result<Self, SpiderMapError> {
        let id = id.into();
        if id.is_empty() {
            return Err(SpiderMapError::EmptySpiderId);
        }

        Ok(Self(id))
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id of the circle layer displaying this spider.
    pub fn layer_id(&self) -> String {
        format!("{LAYER_PREFIX}{}", self.0)
    }
}

impl fmt::Display for SpiderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SpiderId {
    type Error = SpiderMapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SpiderId> for String {
    fn from(value: SpiderId) -> Self {
        value.0
    }
}

/// Ordered set of spiders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiderRegistry {
    spiders: Vec<SpiderId>,
}

impl SpiderRegistry {
    /// Builds a registry preserving the given order.
    ///
    /// Identifiers must be unique and non-empty.
    pub fn new<I, S>(spiders: I) -> Result<Self, SpiderMapError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self { spiders: vec![] };
        for spider in spiders {
            let id = SpiderId::new(spider)?;
            if registry.contains(&id) {
                return Err(SpiderMapError::DuplicateSpider(id.0));
            }

            registry.spiders.push(id);
        }

        Ok(registry)
    }

    /// Number of spiders.
    pub fn len(&self) -> usize {
        self.spiders.len()
    }

    /// Returns true if the registry has no spiders.
    pub fn is_empty(&self) -> bool {
        self.spiders.is_empty()
    }

    /// Iterates over spiders in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &SpiderId> {
        self.spiders.iter()
    }

    /// Returns true if the spider is registered.
    pub fn contains(&self, id: &SpiderId) -> bool {
        self.spiders.contains(id)
    }

    /// 1-based position of the spider, used to derive its colors.
    pub fn color_index(&self, id: &SpiderId) -> Option<usize> {
        self.spiders
            .iter()
            .position(|spider| spider == id)
            .map(|index| index + 1)
    }

    /// Finds the spider displayed by the layer with the given id.
    pub fn by_layer_id(&self, layer_id: &str) -> Option<&SpiderId> {
        let name = layer_id.strip_prefix(LAYER_PREFIX)?;
        self.spiders.iter().find(|spider| spider.as_str() == name)
    }
}

impl Default for SpiderRegistry {
    fn default() -> Self {
        Self {
            spiders: DEFAULT_SPIDERS
                .iter()
                .map(|id| SpiderId((*id).to_owned()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SpiderRegistry {
    type Item = &'a SpiderId;
    type IntoIter = std::slice::Iter<'a, SpiderId>;

    fn into_iter(self) -> Self::IntoIter {
        self.spiders.iter()
    }
}
