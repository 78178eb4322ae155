//! Popup contents for clicked features.
//!
//! Rendering produces a DOM-agnostic tree. The web front end turns it into elements, one
//! `<pre>` per feature and `<hr>` between features.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::Value;
use url::Url;

use crate::config::LinkConfig;
use crate::error::SpiderMapError;
use crate::feature::{display_value, Feature};

/// Target of every rendered link.
pub const LINK_TARGET: &str = "_blank";

const COORDINATE_DECIMALS: usize = 6;

/// Shift past an exact rounding tie. Far below the 6th decimal, far above the f64 error of
/// a coordinate.
const TIE_NUDGE: f64 = 1e-9;

/// ASCII punctuation in collation order, all of it sorted before digits and letters.
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Hyperlink opened in a new browsing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Link target.
    pub href: String,
    /// Visible text.
    pub text: String,
}

/// Piece of rendered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Plain text.
    Text(String),
    /// Hyperlink.
    Link(Link),
}

impl Node {
    fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Visible text of the node.
    pub fn text_content(&self) -> &str {
        match self {
            Node::Text(text) => text,
            Node::Link(link) => &link.text,
        }
    }
}

/// One `key=value` property line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyLine {
    /// Property key.
    pub key: String,
    /// Rendered value.
    pub value: Node,
}

/// Rendered feature: its coordinate followed by its properties in key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureBlock {
    /// Coordinate of the feature, linked to a map viewer.
    pub coordinate: Node,
    /// Property lines sorted by key.
    pub properties: Vec<PropertyLine>,
}

impl FeatureBlock {
    /// Flat sequence of nodes, with the newlines between lines as text nodes.
    pub fn nodes(&self) -> Vec<Node> {
        let mut nodes = Vec::with_capacity(2 + self.properties.len() * 4);
        nodes.push(self.coordinate.clone());
        nodes.push(Node::text("\n"));

        for (i, line) in self.properties.iter().enumerate() {
            nodes.push(Node::text(line.key.clone()));
            nodes.push(Node::text("="));
            nodes.push(line.value.clone());
            if i + 1 < self.properties.len() {
                nodes.push(Node::text("\n"));
            }
        }

        nodes
    }

    /// Visible text of the block.
    pub fn text_content(&self) -> String {
        self.nodes().iter().map(Node::text_content).collect()
    }
}

/// Item of the popup content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupItem<'a> {
    /// Rendered feature.
    Block(&'a FeatureBlock),
    /// Horizontal rule between two features.
    Separator,
}

/// Content of a details popup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupContent {
    /// One block per feature under the click.
    pub blocks: Vec<FeatureBlock>,
}

impl PopupContent {
    /// Blocks interleaved with separators.
    pub fn items(&self) -> Vec<PopupItem<'_>> {
        let mut items = Vec::with_capacity(self.blocks.len() * 2);
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                items.push(PopupItem::Separator);
            }
            items.push(PopupItem::Block(block));
        }

        items
    }

    /// Number of separators between blocks.
    pub fn separator_count(&self) -> usize {
        self.blocks.len().saturating_sub(1)
    }
}

/// Formats features into popup blocks.
#[derive(Debug, Clone)]
pub struct FeatureRenderer {
    osm_template: String,
    wikidata_template: String,
    nsi_url: Url,
    code_search_url: Url,
    code_search_query: String,
}

impl FeatureRenderer {
    /// Creates a renderer with the given link targets.
    ///
    /// Fails if a base URL cannot be parsed or a template refers to unknown keys.
    pub fn new(links: &LinkConfig) -> Result<Self, SpiderMapError> {
        let renderer = Self {
            osm_template: links.osm_template.clone(),
            wikidata_template: links.wikidata_template.clone(),
            nsi_url: Url::parse(&links.nsi_url)?,
            code_search_url: Url::parse(&links.code_search_url)?,
            code_search_query: links.code_search_query.clone(),
        };

        renderer.osm_href("0", "0")?;
        format_template(&renderer.wikidata_template, &[("id", "Q0")])?;
        format_template(&renderer.code_search_query, &[("spider", "sample")])?;

        Ok(renderer)
    }

    /// Renders one feature.
    pub fn render(&self, feature: &Feature) -> FeatureBlock {
        let lng = round_coordinate(feature.position.x());
        let lat = round_coordinate(feature.position.y());
        let text = format!("{lng},{lat}");
        let coordinate = match self.osm_href(&lat, &lng) {
            Ok(href) => Node::Link(Link { href, text }),
            Err(err) => {
                log::warn!("Failed to build coordinate link: {err}");
                Node::Text(text)
            }
        };

        let mut entries: Vec<_> = feature.properties.iter().collect();
        entries.sort_by(|(a, _), (b, _)| compare_keys(a, b));

        let properties = entries
            .into_iter()
            .map(|(key, value)| PropertyLine {
                key: key.clone(),
                value: self.format_value(key, value),
            })
            .collect();

        FeatureBlock {
            coordinate,
            properties,
        }
    }

    /// Renders all features under a click into one popup.
    pub fn render_popup<'a>(
        &self,
        features: impl IntoIterator<Item = &'a Feature>,
    ) -> PopupContent {
        PopupContent {
            blocks: features.into_iter().map(|f| self.render(f)).collect(),
        }
    }

    fn format_value(&self, key: &str, value: &Value) -> Node {
        let text = display_value(value);
        let href = match key {
            "website" => Ok(text.clone()),
            "brand:wikidata" => format_template(&self.wikidata_template, &[("id", text.as_str())]),
            "nsi_id" => Ok(with_query(&self.nsi_url, "id", &text)),
            "@spider" => format_template(&self.code_search_query, &[("spider", text.as_str())])
                .map(|query| with_query(&self.code_search_url, "q", &query)),
            _ => return Node::Text(text),
        };

        match href {
            Ok(href) => Node::Link(Link { href, text }),
            Err(err) => {
                log::warn!("Failed to build link for property {key}: {err}");
                Node::Text(text)
            }
        }
    }

    fn osm_href(&self, lat: &str, lng: &str) -> Result<String, SpiderMapError> {
        format_template(&self.osm_template, &[("lat", lat), ("lng", lng)])
    }
}

fn format_template(template: &str, vars: &[(&str, &str)]) -> Result<String, SpiderMapError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    Ok(strfmt::strfmt(template, &vars)?)
}

/// Sets the query parameter, replacing earlier values of the same key.
fn with_query(base: &Url, key: &str, value: &str) -> String {
    let mut url = base.clone();
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(key, value);
    url.into()
}

/// Orders property keys like a locale collation: punctuation before digits before
/// letters, case ignored first and lowercase before uppercase on a case-only difference.
fn compare_keys(a: &str, b: &str) -> Ordering {
    a.chars()
        .map(collation_weight)
        .cmp(b.chars().map(collation_weight))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

fn collation_weight(c: char) -> (u8, u32) {
    if c.is_whitespace() {
        (0, u32::from(c))
    } else if let Some(position) = PUNCTUATION_ORDER.find(c) {
        (1, position as u32)
    } else if c.is_ascii_digit() {
        (2, u32::from(c))
    } else {
        (3, u32::from(c.to_lowercase().next().unwrap_or(c)))
    }
}

/// Rounds to 6 decimals and drops trailing zeros, so `-110.0` is shown as `-110`.
///
/// Exact ties are rounded away from zero.
fn round_coordinate(value: f64) -> String {
    let rounded: f64 = format!("{:.*}", COORDINATE_DECIMALS, away_from_tie(value))
        .parse()
        .unwrap_or(value);
    // Negative zero is shown as 0.
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    rounded.to_string()
}

/// Moves a value lying exactly halfway between two 6 decimal numbers away from zero.
///
/// Such values are multiples of `2^-7`, so their decimal expansion has 7 digits and its
/// last digit is 5.
fn away_from_tie(value: f64) -> f64 {
    let tie_denominator = f64::from(1u32 << (COORDINATE_DECIMALS + 1));
    let is_tie = (value * tie_denominator).fract() == 0.0
        && format!("{:.*}", COORDINATE_DECIMALS + 1, value).ends_with('5');

    if is_tie {
        value + value.signum() * TIE_NUDGE
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> FeatureRenderer {
        FeatureRenderer::new(&LinkConfig::default()).unwrap()
    }

    fn link(node: &Node) -> &Link {
        match node {
            Node::Link(link) => link,
            Node::Text(text) => panic!("expected a link, got text {text:?}"),
        }
    }

    #[test]
    fn coordinate_is_rounded() {
        let block = renderer().render(&Feature::new(-104.123456789, 39.987654321));
        let coordinate = link(&block.coordinate);
        assert_eq!(coordinate.text, "-104.123457,39.987654");
        assert_eq!(
            coordinate.href,
            "https://www.openstreetmap.org/?mlat=39.987654&mlon=-104.123457"
        );
    }

    #[test]
    fn trailing_zeros_are_dropped() {
        assert_eq!(round_coordinate(-110.0), "-110");
        assert_eq!(round_coordinate(44.5), "44.5");
        assert_eq!(round_coordinate(-0.0000001), "0");
        assert_eq!(round_coordinate(7.1234564), "7.123456");
    }

    #[test]
    fn ties_round_away_from_zero() {
        assert_eq!(round_coordinate(0.3515625), "0.351563");
        assert_eq!(round_coordinate(1.0078125), "1.007813");
        assert_eq!(round_coordinate(-0.3515625), "-0.351563");
        assert_eq!(round_coordinate(45.0), "45");

        let block = renderer().render(&Feature::new(0.3515625, 1.0078125));
        assert_eq!(block.coordinate.text_content(), "0.351563,1.007813");
    }

    #[test]
    fn properties_are_sorted_and_linked() {
        let feature = Feature::new(1.0, 2.0)
            .with_property("website", "http://example.com")
            .with_property("foo", "bar");
        let block = renderer().render(&feature);

        assert_eq!(block.properties.len(), 2);
        assert_eq!(block.properties[0].key, "foo");
        assert_eq!(block.properties[0].value, Node::Text("bar".into()));
        assert_eq!(block.properties[1].key, "website");
        assert_eq!(
            block.properties[1].value,
            Node::Link(Link {
                href: "http://example.com".into(),
                text: "http://example.com".into(),
            })
        );
    }

    #[test]
    fn text_has_no_trailing_newline() {
        let feature = Feature::new(1.0, 2.0)
            .with_property("brand", "Qdoba")
            .with_property("addr:postcode", "80202");
        insta::assert_snapshot!(
            renderer().render(&feature).text_content(),
            @r"
        1,2
        addr:postcode=80202
        brand=Qdoba
        "
        );
    }

    #[test]
    fn feature_without_properties() {
        let block = renderer().render(&Feature::new(1.5, 2.0));
        assert_eq!(block.text_content(), "1.5,2\n");
    }

    #[test]
    fn special_keys() {
        let feature = Feature::new(0.0, 0.0)
            .with_property("brand:wikidata", "Q465264")
            .with_property("nsi_id", "chipotle-a9b8f7")
            .with_property("@spider", "chipotle");
        let block = renderer().render(&feature);
        let keys: Vec<_> = block.properties.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, ["@spider", "brand:wikidata", "nsi_id"]);

        assert_eq!(
            link(&block.properties[0].value).href,
            concat!(
                "https://github.com/alltheplaces/alltheplaces/search",
                "?q=path%3Alocations%2Fspiders+%2Fname+%3D+%22chipotle%22%2F"
            )
        );
        assert_eq!(
            link(&block.properties[1].value).href,
            "https://www.wikidata.org/wiki/Q465264"
        );
        assert_eq!(
            link(&block.properties[2].value).href,
            "https://nsi.guide/?id=chipotle-a9b8f7"
        );
        assert_eq!(link(&block.properties[2].value).text, "chipotle-a9b8f7");
    }

    #[test]
    fn malformed_website_is_still_a_link() {
        let feature = Feature::new(0.0, 0.0).with_property("website", "not a url");
        let block = renderer().render(&feature);
        assert_eq!(link(&block.properties[0].value).href, "not a url");
    }

    #[test]
    fn sort_ignores_case() {
        let feature = Feature::new(0.0, 0.0)
            .with_property("b", "1")
            .with_property("A", "2")
            .with_property("a", "3");
        let block = renderer().render(&feature);
        let keys: Vec<_> = block.properties.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, ["a", "A", "b"]);
    }

    #[test]
    fn punctuation_sorts_like_collation() {
        let feature = Feature::new(0.0, 0.0)
            .with_property("addr:y", "1")
            .with_property("addr_x", "2")
            .with_property("A", "3")
            .with_property("a", "4")
            .with_property("addr1", "5");
        let block = renderer().render(&feature);
        let keys: Vec<_> = block.properties.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, ["a", "A", "addr_x", "addr:y", "addr1"]);
    }

    #[test]
    fn popup_separators() {
        let features = [Feature::new(0.0, 0.0), Feature::new(1.0, 1.0)];
        let popup = renderer().render_popup(&features);
        let items = popup.items();

        assert_eq!(items.len(), 3);
        assert!(matches!(items[0], PopupItem::Block(_)));
        assert_eq!(items[1], PopupItem::Separator);
        assert!(matches!(items[2], PopupItem::Block(_)));
        assert_eq!(popup.separator_count(), 1);

        assert!(renderer().render_popup(&features[..1]).items().len() == 1);
    }

    #[test]
    fn invalid_link_config() {
        let links = LinkConfig {
            nsi_url: "nsi.guide".into(),
            ..LinkConfig::default()
        };
        assert!(matches!(
            FeatureRenderer::new(&links),
            Err(SpiderMapError::InvalidUrl(_))
        ));

        let links = LinkConfig {
            wikidata_template: "https://www.wikidata.org/wiki/{qid}".into(),
            ..LinkConfig::default()
        };
        assert!(matches!(
            FeatureRenderer::new(&links),
            Err(SpiderMapError::Template(_))
        ));
    }
}
