//! HTML parsing support.
//!
//! Saved conversation pages are parsed with scraper (html5ever) and converted
//! into the owned [`Node`] tree the exporter works on.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::Node;

/// Elements whose contents never belong in the export
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Parse a complete HTML page into a Node tree rooted at `<html>`.
///
/// # Example
///
/// ```rust
/// use chatdown::parse_document;
///
/// let root = parse_document("<title>Chat</title><p>Hello</p>");
/// assert_eq!(root.tag_name(), "html");
/// assert_eq!(root.text_content(), "ChatHello");
/// ```
pub fn parse_document(html: &str) -> Node {
    let document = Html::parse_document(html);
    scraper_to_node(document.root_element())
}

/// Parse an HTML snippet; the result is an `<html>` element wrapping it
pub fn parse_fragment(html: &str) -> Node {
    let document = Html::parse_fragment(html);
    scraper_to_node(document.root_element())
}

/// Convert a scraper ElementRef to our Node structure
fn scraper_to_node(element: ElementRef) -> Node {
    let attrs: Vec<(&str, &str)> = element.value().attrs().collect();
    let mut node = Node::element_with_attrs(element.value().name(), attrs);

    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => {
                node.add_child(Node::text(&text.text));
            }
            ScraperNode::Element(el) if SKIPPED_ELEMENTS.contains(&el.name()) => {}
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    node.add_child(scraper_to_node(child_element));
                }
            }
            _ => {}
        }
    }

    node
}
