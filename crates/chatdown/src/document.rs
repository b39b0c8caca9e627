//! Whole-document assembly and final cleanup.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::node::NodeRef;
use crate::options::{ChatDateMode, ExportOptions};
use crate::render::Renderer;
use crate::turn::{Role, Turn, TurnAssembler};

static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

static BLANK_BEFORE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\n(#+\s)").unwrap());

/// Values for the link line at the top of the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHeader {
    /// Formatted export time
    pub timestamp: String,
    /// Page location, used verbatim as the link target
    pub location: String,
    /// Formatted conversation date, if one was found
    pub chat_date: Option<String>,
}

/// Every turn under `root`, in document order
pub fn collect_turns<'a>(root: &NodeRef<'a>) -> Vec<Turn<'a>> {
    root.descendants()
        .into_iter()
        .filter_map(|node| Role::of(node.node).map(|role| Turn { role, node }))
        .collect()
}

/// Assemble the Markdown for a conversation rooted at `root`
pub fn assemble(
    root: &NodeRef<'_>,
    header: &DocumentHeader,
    renderer: &Renderer,
    options: &ExportOptions,
) -> String {
    let mut markdown = format!(
        "[{} {}]({})\n\n",
        options.export_label, header.timestamp, header.location
    );

    if options.chat_date == ChatDateMode::Include {
        if let Some(date) = &header.chat_date {
            markdown.push_str(&format!("**Chat Date:** {date}\n\n"));
        }
    }
    markdown.push_str("\n\n");

    let turns = collect_turns(root);
    log::debug!("found {} turn(s)", turns.len());

    let assembler = TurnAssembler::new(renderer, options);
    for turn in &turns {
        if let Some(text) = assembler.turn(turn) {
            markdown.push_str(&text);
        }
    }

    normalize_whitespace(&markdown)
}

/// Collapse blank-line runs, pull headings up to the preceding line, trim.
pub fn normalize_whitespace(markdown: &str) -> String {
    let collapsed = EXCESS_NEWLINES.replace_all(markdown, "\n\n");
    let tightened = BLANK_BEFORE_HEADING.replace_all(&collapsed, "\n$1");
    tightened.trim().to_string()
}
