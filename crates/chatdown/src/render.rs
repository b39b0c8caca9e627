//! Recursive node to Markdown rendering.
//!
//! Every node is first classified into a [`Shape`]; the order of the checks in
//! [`Shape::of`] is the precedence order, so a `<pre>` holding a table is seen
//! as a table wrapper before it can be seen as a code block.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::escape::{escape, prefix_lines, EscapeContext};
use crate::filter::skip_language_labels;
use crate::node::{Node, NodeRef};

/// Fence used for code blocks
pub const FENCE: &str = "```";

/// Prefix for quoted lines
pub const QUOTE_PREFIX: &str = "> ";

static LANGUAGE_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"language-(\w+)").unwrap());

/// `**12. Title**rest` as produced by bold-only numbered lists
static BOLD_NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*\*(\d+)\.\s*([^*]+?)\*\*(.*)$").unwrap());

/// State threaded through recursive rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderContext {
    /// Paragraph text gets a `> ` prefix on every line
    pub in_blockquote: bool,
}

impl RenderContext {
    fn quoted(self) -> Self {
        Self {
            in_blockquote: true,
        }
    }
}

/// What a node renders as
#[derive(Debug)]
enum Shape<'a> {
    Text(&'a str),
    Heading(usize),
    InlineCode,
    Strong,
    Emphasis,
    Link(&'a str),
    /// A `<pre>` that only wraps a table
    PreformattedTable(NodeRef<'a>),
    CodeBlock,
    BulletList,
    OrderedList,
    ListItem,
    Table,
    TableCell,
    Paragraph,
    Blockquote,
    /// Any other element: render children, no wrapper
    Container,
}

impl<'a> Shape<'a> {
    fn of(node: &NodeRef<'a>) -> Self {
        let tag = match node.node {
            Node::Text(text) => return Shape::Text(text),
            Node::Element(el) => el.tag.as_str(),
        };

        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                Shape::Heading(usize::from(tag.as_bytes()[1] - b'0'))
            }
            "code" if node.parent_tag() != Some("pre") => Shape::InlineCode,
            "strong" | "b" => Shape::Strong,
            "em" | "i" => Shape::Emphasis,
            "a" => match node.attr("href").map(str::trim) {
                Some(href) if !href.is_empty() => Shape::Link(href),
                _ => Shape::Container,
            },
            "pre" => match node.find(|n| n.tag_name() == "table") {
                Some(table) => Shape::PreformattedTable(table),
                None => Shape::CodeBlock,
            },
            "ul" => Shape::BulletList,
            "ol" => Shape::OrderedList,
            "li" => Shape::ListItem,
            "table" => Shape::Table,
            "th" | "td" => Shape::TableCell,
            "p" => Shape::Paragraph,
            "blockquote" => Shape::Blockquote,
            _ => Shape::Container,
        }
    }
}

/// Converts nodes to Markdown fragments.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    /// Page location that relative link targets are resolved against
    base_url: Option<Url>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative `href`s against `base_url`
    pub fn with_base_url(base_url: Option<Url>) -> Self {
        Self { base_url }
    }

    /// Render `node` and everything below it.
    ///
    /// ```
    /// use chatdown::{Node, NodeRef, RenderContext, Renderer};
    ///
    /// let h3 = Node::element("h3").with_text("Plan");
    /// let md = Renderer::new().render(&NodeRef::new(&h3), RenderContext::default());
    /// assert_eq!(md, "### Plan\n\n");
    /// ```
    pub fn render(&self, node: &NodeRef<'_>, ctx: RenderContext) -> String {
        match Shape::of(node) {
            Shape::Text(text) => escape(text, EscapeContext::Plain),
            Shape::Heading(level) => {
                format!("{} {}\n\n", "#".repeat(level), self.render_children(node, ctx))
            }
            Shape::InlineCode => {
                format!("`{}`", escape(&node.text_content(), EscapeContext::InlineCode))
            }
            Shape::Strong => format!("**{}**", self.render_children(node, ctx)),
            Shape::Emphasis => format!("*{}*", self.render_children(node, ctx)),
            Shape::Link(href) => {
                format!("[{}]({})", self.render_children(node, ctx), self.resolve(href))
            }
            Shape::PreformattedTable(table) => self.render(&table, ctx),
            Shape::CodeBlock => code_block(node),
            Shape::BulletList => self.list(node, "- ", ctx),
            Shape::OrderedList => self.list(node, "1. ", ctx),
            Shape::ListItem | Shape::TableCell => self.render_children(node, ctx),
            Shape::Table => self.table(node, ctx),
            Shape::Paragraph => self.paragraph(node, ctx),
            Shape::Blockquote => {
                let text = self.render_children(node, ctx.quoted());
                format!("{}\n\n", prefix_lines(&text, QUOTE_PREFIX))
            }
            Shape::Container => skip_language_labels(node.children().collect())
                .iter()
                .map(|child| self.render(child, ctx))
                .collect(),
        }
    }

    /// Render the child nodes of `node` and concatenate them
    pub fn render_children(&self, node: &NodeRef<'_>, ctx: RenderContext) -> String {
        node.children().map(|child| self.render(&child, ctx)).collect()
    }

    fn resolve(&self, href: &str) -> String {
        if Url::parse(href).is_ok() {
            return href.to_string();
        }
        self.base_url
            .as_ref()
            .and_then(|base| base.join(href).ok())
            .map_or_else(|| href.to_string(), String::from)
    }

    fn list(&self, node: &NodeRef<'_>, marker: &str, ctx: RenderContext) -> String {
        let mut out = String::from("\n");
        for item in node.element_children().filter(|c| c.tag_name() == "li") {
            out.push_str(marker);
            out.push_str(&self.render(&item, ctx));
            out.push('\n');
        }
        out
    }

    fn table(&self, node: &NodeRef<'_>, ctx: RenderContext) -> String {
        let mut out = String::new();

        if let Some(thead) = node.find(|n| n.tag_name() == "thead") {
            let headers: Vec<String> = thead
                .find_all(|n| n.tag_name() == "th")
                .iter()
                .map(|th| self.render(th, ctx))
                .collect();
            out.push_str(&table_row(&headers));
            out.push_str(&table_row(&vec!["---".to_string(); headers.len()]));
        }

        if let Some(tbody) = node.find(|n| n.tag_name() == "tbody") {
            for tr in tbody.find_all(|n| n.tag_name() == "tr") {
                // Direct children keep cells aligned with their columns
                let cells: Vec<String> = tr
                    .element_children()
                    .map(|cell| self.render(&cell, ctx))
                    .collect();
                out.push_str(&table_row(&cells));
            }
        }

        format!("\n{out}\n")
    }

    fn paragraph(&self, node: &NodeRef<'_>, ctx: RenderContext) -> String {
        let text = self.render_children(node, ctx);
        let text = BOLD_NUMBERED.replace(&text, "1. **$2**$3");
        if ctx.in_blockquote {
            format!("{}\n\n", prefix_lines(&text, QUOTE_PREFIX))
        } else {
            format!("{text}\n\n")
        }
    }
}

fn table_row(cells: &[String]) -> String {
    format!("| {} |\n", cells.join(" | "))
}

fn code_block(pre: &NodeRef<'_>) -> String {
    let code = pre.find(|n| n.tag_name() == "code");
    let language = code
        .as_ref()
        .and_then(|c| language_hint(c.node))
        .unwrap_or_default();
    let body = code.map_or_else(|| pre.text_content(), |c| c.text_content());
    format!("\n{FENCE}{language}\n{body}\n{FENCE}\n")
}

/// The `<name>` of the first `language-<name>` class
fn language_hint(code: &Node) -> Option<String> {
    code.classes().find_map(|class| {
        LANGUAGE_CLASS
            .captures(class)
            .map(|caps| caps[1].to_string())
    })
}
