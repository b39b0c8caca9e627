//! # chatdown
//!
//! Convert rendered conversation pages to Markdown.
//!
//! A saved chat page is a tree of marked-up content: user messages, assistant
//! responses, attachment cards and artifact cards scattered across wrapper
//! elements. chatdown walks that tree once and writes a single Markdown
//! document in which user turns are quoted under a speaker line, assistant
//! turns keep their headings, lists, tables and fenced code, and attachments
//! are listed with the turn they were uploaded with.
//!
//! ## Design
//!
//! - **Owned tree, borrowed cursors**: [`Node`] owns its children; [`NodeRef`]
//!   remembers the path it was reached by so lookups can go up and sideways.
//! - **Parser agnostic**: any HTML parser can build a [`Node`] tree; the
//!   default `html` feature ships one based on scraper.
//! - **Pure conversion**: the export timestamp is passed in, nothing is read
//!   from the environment, and only [`ExportService::save`] touches disk.
//!
//! ## Example (Node-based)
//!
//! ```rust
//! use chatdown::{ExportService, Node, Page};
//! use chrono::{TimeZone, Utc};
//!
//! let message = Node::element_with_class("div", "font-user-message")
//!     .with_child(Node::element("p").with_text("Hello"));
//! let page = Page::new(
//!     Node::element("body").with_child(message),
//!     "Greeting - Claude",
//!     "https://claude.ai/chat/1",
//! );
//!
//! let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
//! let markdown = ExportService::new().export(&page, at);
//! assert!(markdown.contains("> Hello"));
//! ```
//!
//! ## Example (HTML string)
//!
//! ```rust
//! use chatdown::{ExportService, Page};
//!
//! let page = Page::from_html(
//!     r#"<div class="font-claude-response"><div class="standard-markdown"><h2>Hi</h2></div></div>"#,
//!     "https://claude.ai/chat/2",
//! );
//! let markdown = ExportService::new().export_now(&page);
//! assert!(markdown.ends_with("## Hi"));
//! ```

pub mod attachments;
pub mod document;
mod escape;
mod filter;
#[cfg(feature = "html")]
pub mod html;
pub mod node;
mod options;
pub mod page;
mod render;
pub mod save;
mod service;
pub mod turn;

pub use attachments::AttachmentDescriptor;
pub use document::{assemble, normalize_whitespace, DocumentHeader};
pub use escape::{escape, prefix_lines, EscapeContext};
pub use filter::skip_language_labels;
#[cfg(feature = "html")]
pub use html::{parse_document, parse_fragment};
pub use node::{Element, Node, NodeRef};
pub use options::{ChatDateMode, ExportOptions};
pub use page::Page;
pub use render::{RenderContext, Renderer};
pub use service::ExportService;
pub use turn::{ArtifactDescriptor, ContentPart, Role, Turn, TurnAssembler};

/// Error type for export operations
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No data to save")]
    NoData,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
