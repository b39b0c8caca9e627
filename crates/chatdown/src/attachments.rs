//! Finding the file attachments that belong to a user turn.
//!
//! The page renders a turn's uploaded files in a sibling block *before* the
//! message rather than inside it, and how far up the tree that block sits
//! varies between layouts. [`locate`] walks up from the turn looking at each
//! ancestor's previous sibling.

use std::fmt;

use crate::node::{Node, NodeRef};

/// `data-testid` value of a single attachment card
pub const FILE_THUMBNAIL: &str = "file-thumbnail";

/// Class of a user message root
pub const USER_MESSAGE_CLASS: &str = "font-user-message";

/// Class of an assistant response root
pub const ASSISTANT_MESSAGE_CLASS: &str = "font-claude-response";

/// One uploaded file as shown on its card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDescriptor {
    pub filename: String,
    /// Secondary caption such as `"120 lines"`
    pub size_hint: Option<String>,
}

impl fmt::Display for AttachmentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.size_hint {
            Some(hint) => write!(f, "{} ({})", self.filename, hint),
            None => f.write_str(&self.filename),
        }
    }
}

pub fn is_file_thumbnail(node: &Node) -> bool {
    node.attr("data-testid") == Some(FILE_THUMBNAIL)
}

pub fn is_turn_marker(node: &Node) -> bool {
    node.has_class(USER_MESSAGE_CLASS) || node.has_class(ASSISTANT_MESSAGE_CLASS)
}

/// Find the attachment block for the turn rooted at `turn`.
///
/// First the element right before the turn's parent is tried. Failing that,
/// each ancestor (at most `max_depth` of them) has its previous element
/// sibling inspected. A candidate that holds a message is rejected: such a
/// block belongs to an earlier turn.
pub fn locate<'a>(turn: &NodeRef<'a>, max_depth: usize) -> Option<NodeRef<'a>> {
    let parent = turn.parent()?;

    if let Some(prev) = parent.previous_element_sibling() {
        if prev.contains(is_file_thumbnail) {
            return Some(prev);
        }
    }

    let mut current = Some(parent.clone());
    let mut depth = 0;
    while let Some(ancestor) = current {
        if depth >= max_depth {
            log::debug!("attachment search stopped after {max_depth} ancestors");
            break;
        }
        if let Some(prev) = ancestor.previous_element_sibling() {
            if prev.contains(is_file_thumbnail) && !prev.contains(is_turn_marker) {
                return Some(prev);
            }
        }
        current = ancestor.parent().cloned();
        depth += 1;
    }

    None
}

/// Read the cards inside an attachment block.
///
/// The filename comes from the card's `<h3>`; the first `<p>` becomes the size
/// hint when it mentions `lines`. Cards without a heading are skipped.
pub fn extract(container: &NodeRef<'_>) -> Vec<AttachmentDescriptor> {
    container
        .find_all(is_file_thumbnail)
        .iter()
        .filter_map(|card| {
            let title = card.find(|n| n.tag_name() == "h3")?;
            let size_hint = card
                .find(|n| n.tag_name() == "p")
                .map(|p| p.text_content())
                .filter(|text| text.contains("lines"))
                .map(|text| text.trim().to_string());
            Some(AttachmentDescriptor {
                filename: title.text_content().trim().to_string(),
                size_hint,
            })
        })
        .collect()
}
