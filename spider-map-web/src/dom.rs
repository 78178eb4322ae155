//! Materializes rendered popup content as DOM elements.

use spider_map::render::{FeatureBlock, Link, Node, PopupContent, PopupItem, LINK_TARGET};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlAnchorElement};

/// Popup container: a `<div>` with one `<pre>` per feature separated by `<hr>`.
pub fn popup_element(document: &Document, content: &PopupContent) -> Result<Element, JsValue> {
    let container = document.create_element("div")?;
    for item in content.items() {
        match item {
            PopupItem::Block(block) => {
                container.append_with_node_1(&block_element(document, block)?)?
            }
            PopupItem::Separator => {
                container.append_with_node_1(&document.create_element("hr")?)?
            }
        }
    }

    Ok(container)
}

fn block_element(document: &Document, block: &FeatureBlock) -> Result<Element, JsValue> {
    let pre = document.create_element("pre")?;
    for node in block.nodes() {
        match node {
            Node::Text(text) => pre.append_with_str_1(&text)?,
            Node::Link(link) => pre.append_with_node_1(&anchor(document, &link)?)?,
        }
    }

    Ok(pre)
}

fn anchor(document: &Document, link: &Link) -> Result<HtmlAnchorElement, JsValue> {
    let anchor: HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into()
        .map_err(JsValue::from)?;
    anchor.set_target(LINK_TARGET);
    anchor.set_href(&link.href);
    anchor.set_text_content(Some(&link.text));

    Ok(anchor)
}

#[cfg(test)]
mod tests {
    use spider_map::config::LinkConfig;
    use spider_map::feature::Feature;
    use spider_map::render::FeatureRenderer;
    use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    #[wasm_bindgen_test]
    fn features_are_separated_by_rules() {
        let renderer = FeatureRenderer::new(&LinkConfig::default()).unwrap();
        let content = renderer.render_popup(&[
            Feature::new(1.5, 2.0).with_property("brand", "Chipotle"),
            Feature::new(3.0, 4.0),
        ]);

        let element = popup_element(&document(), &content).unwrap();
        let children = element.children();
        assert_eq!(children.length(), 3);
        let tags: Vec<_> = (0..children.length())
            .filter_map(|i| children.item(i))
            .map(|child| child.tag_name())
            .collect();
        assert_eq!(tags, ["PRE", "HR", "PRE"]);

        let first = children.item(0).unwrap();
        assert_eq!(first.text_content().unwrap(), "1.5,2\nbrand=Chipotle");
    }

    #[wasm_bindgen_test]
    fn links_open_in_new_tab() {
        let renderer = FeatureRenderer::new(&LinkConfig::default()).unwrap();
        let content = renderer.render_popup(&[Feature::new(-110.0, 44.0)]);

        let element = popup_element(&document(), &content).unwrap();
        let anchor: HtmlAnchorElement = element
            .query_selector("a")
            .unwrap()
            .unwrap()
            .dyn_into()
            .unwrap();
        assert_eq!(anchor.target(), LINK_TARGET);
        assert_eq!(
            anchor.href(),
            "https://www.openstreetmap.org/?mlat=44&mlon=-110"
        );
        assert_eq!(anchor.text_content().unwrap(), "-110,44");
    }
}
