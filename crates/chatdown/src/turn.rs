//! Per-turn assembly.
//!
//! User turns are written as quotations headed by a speaker line. A fenced
//! code block cannot live inside the quote, so each code block closes the
//! quotation and the next quoted part announces the speaker again.
//! Assistant turns are written unquoted, after a summary of any artifacts.

use crate::attachments::{self, AttachmentDescriptor, ASSISTANT_MESSAGE_CLASS, USER_MESSAGE_CLASS};
use crate::escape::prefix_lines;
use crate::node::{Node, NodeRef};
use crate::options::ExportOptions;
use crate::render::{RenderContext, Renderer, QUOTE_PREFIX};

/// Class of an artifact card inside an assistant turn
pub const ARTIFACT_CLASS: &str = "artifact-block-cell";

/// Classes that together mark an artifact card's title
pub const ARTIFACT_TITLE_CLASSES: [&str; 2] = ["leading-tight", "text-sm"];

/// Class of the rendered body of an assistant turn
pub const RESPONSE_BODY_CLASS: &str = "standard-markdown";

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Role of a turn root, judged by its marker class
    pub fn of(node: &Node) -> Option<Role> {
        if node.has_class(USER_MESSAGE_CLASS) {
            Some(Role::User)
        } else if node.has_class(ASSISTANT_MESSAGE_CLASS) {
            Some(Role::Assistant)
        } else {
            None
        }
    }
}

/// One message of the conversation, in document order
#[derive(Debug, Clone)]
pub struct Turn<'a> {
    pub role: Role,
    pub node: NodeRef<'a>,
}

/// A segment of a user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// Markdown to be quoted line by line
    Blockquote(String),
    /// A rendered code block, emitted outside the quotation
    Code(String),
}

/// A piece of generated content referenced from an assistant turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub title: String,
}

/// `> 🗣️ name 🗣️` followed by an empty quoted line
pub fn speaker_header(speaker: &str) -> String {
    format!("> 🗣️ {speaker} 🗣️\n>\n")
}

/// Speaker header plus the list of attached files
pub fn attachment_header(speaker: &str, attachments: &[AttachmentDescriptor]) -> String {
    let mut out = speaker_header(speaker);
    out.push_str("> **Attachments**:\n");
    for attachment in attachments {
        out.push_str(&format!("> - {attachment}\n"));
    }
    out.push_str(">\n");
    out
}

/// Builds the Markdown of individual turns
pub struct TurnAssembler<'r> {
    renderer: &'r Renderer,
    options: &'r ExportOptions,
}

impl<'r> TurnAssembler<'r> {
    pub fn new(renderer: &'r Renderer, options: &'r ExportOptions) -> Self {
        Self { renderer, options }
    }

    /// Render one turn; `None` when it has no recognizable content root
    pub fn turn(&self, turn: &Turn<'_>) -> Option<String> {
        match turn.role {
            Role::User => self.user_turn(&turn.node),
            Role::Assistant => self.assistant_turn(&turn.node),
        }
    }

    pub fn user_turn(&self, turn: &NodeRef<'_>) -> Option<String> {
        let message = if turn.has_class(USER_MESSAGE_CLASS) {
            turn.clone()
        } else {
            let Some(found) = turn.find(|n| n.has_class(USER_MESSAGE_CLASS)) else {
                log::debug!("skipping user turn without a message root");
                return None;
            };
            found
        };

        // A located block always holds at least one card, titled or not
        let attachments = attachments::locate(turn, self.options.max_ancestor_depth)
            .map(|container| attachments::extract(&container));

        let mut out = String::new();
        if let Some(attachments) = &attachments {
            log::debug!("user turn has {} titled attachment(s)", attachments.len());
            out.push_str(&attachment_header(&self.options.speaker_name, attachments));
        }

        let mut parts = self.content_parts(&message);
        if parts.is_empty() {
            if let Some(p) = turn.find(|n| n.tag_name() == "p") {
                parts.push(ContentPart::Blockquote(self.quoted_text(&p)));
            }
        }

        out.push_str(&flatten_parts(
            &parts,
            &self.options.speaker_name,
            attachments.is_none(),
        ));
        Some(out)
    }

    /// Classify the direct element children of a user message
    pub fn content_parts(&self, message: &NodeRef<'_>) -> Vec<ContentPart> {
        message
            .element_children()
            .filter_map(|child| match child.tag_name() {
                "p" | "blockquote" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    Some(ContentPart::Blockquote(self.quoted_text(&child)))
                }
                "div" if wraps_code_block(&child) => Some(ContentPart::Code(
                    self.renderer.render(&child, RenderContext::default()),
                )),
                _ if !child.text_content().trim().is_empty() => {
                    Some(ContentPart::Blockquote(self.quoted_text(&child)))
                }
                _ => None,
            })
            .collect()
    }

    fn quoted_text(&self, node: &NodeRef<'_>) -> String {
        self.renderer
            .render(node, RenderContext::default())
            .trim_end_matches('\n')
            .to_string()
    }

    pub fn assistant_turn(&self, turn: &NodeRef<'_>) -> Option<String> {
        let Some(body) = turn.find(|n| n.has_class(RESPONSE_BODY_CLASS)) else {
            log::debug!("skipping assistant turn without a response body");
            return None;
        };

        let mut out = String::new();
        let cards = turn.find_all(|n| n.has_class(ARTIFACT_CLASS));
        if !cards.is_empty() {
            out.push_str("**Artifacts**:\n");
            for artifact in cards.iter().filter_map(artifact) {
                out.push_str(&format!("- {}\n", artifact.title));
            }
            out.push('\n');
        }

        out.push_str(&self.renderer.render(&body, RenderContext::default()));
        out.push('\n');
        Some(out)
    }
}

/// A `<div>` holding a `<pre>` with a `<code>` inside
fn wraps_code_block(node: &NodeRef<'_>) -> bool {
    node.find_all(|n| n.tag_name() == "pre")
        .iter()
        .any(|pre| pre.contains(|n| n.tag_name() == "code"))
}

/// The titled descriptor of one artifact card, if it has a title
pub fn artifact(card: &NodeRef<'_>) -> Option<ArtifactDescriptor> {
    card.find(|n| ARTIFACT_TITLE_CLASSES.iter().all(|c| n.has_class(c)))
        .map(|title| ArtifactDescriptor {
            title: title.text_content().trim().to_string(),
        })
}

/// Write the parts of a user turn in order.
///
/// `needs_speaker` is false when an attachment header has already introduced
/// the speaker.
pub fn flatten_parts(parts: &[ContentPart], speaker: &str, mut needs_speaker: bool) -> String {
    let mut out = String::new();

    for part in parts {
        match part {
            ContentPart::Blockquote(text) => {
                if needs_speaker {
                    out.push_str(&speaker_header(speaker));
                    needs_speaker = false;
                } else if !out.is_empty() && !out.ends_with(">\n") {
                    out.push_str(">\n");
                }
                out.push_str(&prefix_lines(text, QUOTE_PREFIX));
                out.push('\n');
            }
            ContentPart::Code(fragment) => {
                out = close_quote(&out).trim().to_string();
                out.push_str("\n\n");
                out.push_str(fragment);
                out.push_str("\n\n");
                needs_speaker = true;
            }
        }
    }

    format!("{}\n\n", out.trim())
}

/// Drop a dangling bare `>` line left at the end of a quotation
fn close_quote(text: &str) -> &str {
    let text = text.trim_end();
    if text == ">" {
        return "";
    }
    text.strip_suffix("\n>").unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembler_output(page: &Node, role: Role) -> Option<String> {
        let renderer = Renderer::new();
        let options = ExportOptions::default();
        let root = NodeRef::new(page);
        let turn_node = root
            .find(|n| Role::of(n) == Some(role))
            .unwrap_or_else(|| root.clone());
        TurnAssembler::new(&renderer, &options).turn(&Turn {
            role,
            node: turn_node,
        })
    }

    fn user(children: Vec<Node>) -> Node {
        let message = children
            .into_iter()
            .fold(Node::element_with_class("div", USER_MESSAGE_CLASS), Node::with_child);
        Node::element("div").with_child(message)
    }

    fn code_div(lang: &str, body: &str) -> Node {
        Node::element("div").with_child(
            Node::element("pre").with_child(
                Node::element_with_class("code", &format!("language-{lang}")).with_text(body),
            ),
        )
    }

    fn p(text: &str) -> Node {
        Node::element("p").with_text(text)
    }

    #[test]
    fn test_single_paragraph() {
        let page = user(vec![p("Hello there")]);
        assert_eq!(
            assembler_output(&page, Role::User).unwrap(),
            "> 🗣️ User 🗣️\n>\n> Hello there\n\n"
        );
    }

    #[test]
    fn test_paragraphs_separated_by_empty_quote_line() {
        let page = user(vec![p("one"), p("two")]);
        assert_eq!(
            assembler_output(&page, Role::User).unwrap(),
            "> 🗣️ User 🗣️\n>\n> one\n>\n> two\n\n"
        );
    }

    #[test]
    fn test_speaker_reannounced_after_code() {
        let page = user(vec![p("before"), code_div("py", "x = 1"), p("after")]);
        let out = assembler_output(&page, Role::User).unwrap();
        assert_eq!(out.matches("🗣️ User 🗣️").count(), 2);
        assert_eq!(
            out,
            "> 🗣️ User 🗣️\n>\n> before\n\n\n```py\nx = 1\n```\n\n\n> 🗣️ User 🗣️\n>\n> after\n\n"
        );
    }

    #[test]
    fn test_parts_classified_in_order() {
        let renderer = Renderer::new();
        let options = ExportOptions::default();
        let message = Node::element_with_class("div", USER_MESSAGE_CLASS)
            .with_child(p("text"))
            .with_child(code_div("sh", "ls"))
            .with_child(Node::element("ul").with_child(Node::element("li").with_text("item")))
            .with_child(Node::element("h2").with_text("Head"))
            .with_child(Node::element("span").with_text("loose"))
            .with_child(Node::element("div").with_text("   "));
        let parts = TurnAssembler::new(&renderer, &options).content_parts(&NodeRef::new(&message));
        assert_eq!(
            parts,
            vec![
                ContentPart::Blockquote("text".into()),
                ContentPart::Code("\n```sh\nls\n```\n".into()),
                ContentPart::Blockquote("\n- item".into()),
                ContentPart::Blockquote("## Head".into()),
                ContentPart::Blockquote("loose".into()),
            ]
        );
    }

    #[test]
    fn test_fallback_paragraph() {
        let wrapper = Node::element_with_class("div", USER_MESSAGE_CLASS)
            .with_child(Node::text("bare text is not an element"));
        let page = Node::element("section")
            .with_child(wrapper.with_child(Node::element("br")))
            .with_child(p("outside"));
        let renderer = Renderer::new();
        let options = ExportOptions::default();
        let root = NodeRef::new(&page);
        let out = TurnAssembler::new(&renderer, &options)
            .user_turn(&root)
            .unwrap();
        assert_eq!(out, "> 🗣️ User 🗣️\n>\n> outside\n\n");
    }

    #[test]
    fn test_user_turn_without_message_root() {
        let page = Node::element("div").with_child(p("x"));
        let renderer = Renderer::new();
        let options = ExportOptions::default();
        let out = TurnAssembler::new(&renderer, &options).user_turn(&NodeRef::new(&page));
        assert!(out.is_none());
    }

    #[test]
    fn test_attachments_replace_first_speaker_header() {
        let card = Node::element_with_attrs("div", vec![("data-testid", "file-thumbnail")])
            .with_child(Node::element("h3").with_text("main.rs"))
            .with_child(Node::element("p").with_text("80 lines"));
        let page = Node::element("div")
            .with_child(Node::element("div").with_child(card))
            .with_child(user(vec![p("look")]));
        let out = assembler_output(&page, Role::User).unwrap();
        assert_eq!(
            out,
            "> 🗣️ User 🗣️\n>\n> **Attachments**:\n> - main.rs (80 lines)\n>\n> look\n\n"
        );
    }

    #[test]
    fn test_custom_speaker_name() {
        assert_eq!(speaker_header("Kim"), "> 🗣️ Kim 🗣️\n>\n");
    }

    #[test]
    fn test_flatten_code_only() {
        let parts = vec![ContentPart::Code("\n```\nx\n```\n".into())];
        assert_eq!(flatten_parts(&parts, "U", true), "```\nx\n```\n\n");
    }

    #[test]
    fn test_flatten_multiline_part() {
        let parts = vec![ContentPart::Blockquote("a\nb".into())];
        assert_eq!(flatten_parts(&parts, "U", true), "> 🗣️ U 🗣️\n>\n> a\n> b\n\n");
    }

    #[test]
    fn test_close_quote() {
        assert_eq!(close_quote("> a\n>\n"), "> a");
        assert_eq!(close_quote("> a\n"), "> a");
        assert_eq!(close_quote(">\n"), "");
        assert_eq!(close_quote("> Use Vec<u8>\n"), "> Use Vec<u8>");
    }

    #[test]
    fn test_trailing_angle_bracket_kept_before_code() {
        let page = user(vec![p("Use Vec<u8>"), code_div("rs", "x")]);
        let out = assembler_output(&page, Role::User).unwrap();
        assert_eq!(out, "> 🗣️ User 🗣️\n>\n> Use Vec<u8>\n\n\n```rs\nx\n```\n\n");
    }

    fn assistant(children: Vec<Node>) -> Node {
        children
            .into_iter()
            .fold(Node::element_with_class("div", ASSISTANT_MESSAGE_CLASS), Node::with_child)
    }

    fn body(children: Vec<Node>) -> Node {
        children
            .into_iter()
            .fold(Node::element_with_class("div", RESPONSE_BODY_CLASS), Node::with_child)
    }

    #[test]
    fn test_assistant_body() {
        let page = assistant(vec![body(vec![p("Sure.")])]);
        assert_eq!(assembler_output(&page, Role::Assistant).unwrap(), "Sure.\n\n\n");
    }

    #[test]
    fn test_assistant_artifacts() {
        let artifact = |title: &str| {
            Node::element_with_class("div", ARTIFACT_CLASS).with_child(
                Node::element_with_class("div", "leading-tight text-sm").with_text(title),
            )
        };
        let page = assistant(vec![
            artifact(" Plan "),
            artifact("Script"),
            body(vec![p("Done.")]),
        ]);
        assert_eq!(
            assembler_output(&page, Role::Assistant).unwrap(),
            "**Artifacts**:\n- Plan\n- Script\n\nDone.\n\n\n"
        );
    }

    #[test]
    fn test_untitled_artifact_keeps_label() {
        let page = assistant(vec![
            Node::element_with_class("div", ARTIFACT_CLASS)
                .with_child(Node::element("span").with_text("no title")),
            body(vec![p("Done.")]),
        ]);
        assert_eq!(
            assembler_output(&page, Role::Assistant).unwrap(),
            "**Artifacts**:\n\nDone.\n\n\n"
        );
    }

    #[test]
    fn test_untitled_attachment_keeps_header() {
        let card = Node::element_with_attrs("div", vec![("data-testid", "file-thumbnail")])
            .with_child(Node::element("p").with_text("image"));
        let page = Node::element("div")
            .with_child(Node::element("div").with_child(card))
            .with_child(user(vec![p("see this")]));
        assert_eq!(
            assembler_output(&page, Role::User).unwrap(),
            "> 🗣️ User 🗣️\n>\n> **Attachments**:\n>\n> see this\n\n"
        );
    }

    #[test]
    fn test_assistant_without_body_skipped() {
        let page = assistant(vec![p("draft")]);
        assert!(assembler_output(&page, Role::Assistant).is_none());
    }

    #[test]
    fn test_role_of() {
        assert_eq!(
            Role::of(&Node::element_with_class("div", USER_MESSAGE_CLASS)),
            Some(Role::User)
        );
        assert_eq!(
            Role::of(&Node::element_with_class("div", ASSISTANT_MESSAGE_CLASS)),
            Some(Role::Assistant)
        );
        assert_eq!(Role::of(&Node::element("div")), None);
    }
}
