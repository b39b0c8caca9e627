//! Dropping the language labels the page renders above code blocks.
//!
//! The chat UI prints the language name as a small caption right before each
//! `<pre>`. The fence already carries that name as its info string, so the
//! caption would otherwise show up twice.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::node::NodeRef;

static BARE_IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_+-]+$").unwrap());

/// Classes of the caption element
const CAPTION_CLASSES: [&str; 2] = ["text-text-500", "font-small"];

/// Class that marks a real paragraph of body text
const BODY_TEXT_CLASS: &str = "whitespace-normal";

fn is_bare_identifier(node: &NodeRef) -> bool {
    BARE_IDENTIFIER.is_match(node.text_content().trim())
}

/// The current caption shape: `<div class="text-text-500 font-small …">python</div>`
fn is_caption(node: &NodeRef) -> bool {
    node.tag_name() == "div"
        && CAPTION_CLASSES.iter().all(|c| node.has_class(c))
        && is_bare_identifier(node)
}

/// The older shape: a lone-child `<p>`/`<div>` holding just the name
fn is_legacy_caption(node: &NodeRef) -> bool {
    matches!(node.tag_name(), "p" | "div")
        && node.node.children().len() == 1
        && is_bare_identifier(node)
        && !node.has_class(BODY_TEXT_CLASS)
}

/// Remove language captions that sit immediately before a `<pre>`.
///
/// "Immediately" means the very next node in `children`, text nodes
/// included. A caption followed by anything else is kept.
pub fn skip_language_labels<'a>(children: Vec<NodeRef<'a>>) -> Vec<NodeRef<'a>> {
    let followed_by_pre: Vec<bool> = (0..children.len())
        .map(|i| {
            children
                .get(i + 1)
                .is_some_and(|next| next.tag_name() == "pre")
        })
        .collect();

    children
        .into_iter()
        .zip(followed_by_pre)
        .filter(|(node, before_pre)| {
            let label = *before_pre && (is_caption(node) || is_legacy_caption(node));
            if label {
                log::trace!("dropping language label {:?}", node.text_content().trim());
            }
            !label
        })
        .map(|(node, _)| node)
        .collect()
}
