//! DOM node structure for conversation pages.
//!
//! A [`Node`] owns its children and never points back at its parent. Code that
//! needs to look upward or sideways (the attachment locator, the inline-code
//! check) works through a [`NodeRef`], a borrowed cursor that remembers the
//! path it was reached by.

use std::rc::Rc;

/// An element: lowercase tag name, attributes in source order, and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// A node of the conversation page tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Node::Element(Element {
            tag: tag_name.to_lowercase(),
            ..Element::default()
        })
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        Node::Element(Element {
            tag: tag_name.to_lowercase(),
            attributes: attrs
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect(),
            children: Vec::new(),
        })
    }

    /// Create an element carrying the given whitespace-separated classes
    pub fn element_with_class(tag_name: &str, class: &str) -> Self {
        Self::element_with_attrs(tag_name, vec![("class", class)])
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Node::Text(content.to_string())
    }

    /// Builder form of [`Node::add_child`]
    pub fn with_child(mut self, child: Node) -> Self {
        self.add_child(child);
        self
    }

    /// Builder form of [`Node::add_child`] for a single text child
    pub fn with_text(self, content: &str) -> Self {
        self.with_child(Node::text(content))
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Get the tag name (lowercase), empty for text nodes
    pub fn tag_name(&self) -> &str {
        match self {
            Node::Element(el) => &el.tag,
            Node::Text(_) => "",
        }
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        let Node::Element(el) = self else {
            return None;
        };
        el.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Class names in source order
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    /// Check whether the class list contains `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Get all child nodes
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(el) => &el.children,
            Node::Text(_) => &[],
        }
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children().iter().filter(|n| n.is_element())
    }

    /// Add a child node. Text nodes cannot hold children; the call is ignored.
    pub fn add_child(&mut self, child: Node) {
        if let Node::Element(el) = self {
            el.children.push(child);
        }
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
        }
    }
}

/// A reference to a node with its ancestry.
///
/// Each cursor shares its parent cursor through an `Rc`, so walking children
/// is cheap and any cursor can step back up to the root it came from.
#[derive(Debug, Clone)]
pub struct NodeRef<'a> {
    /// The node itself
    pub node: &'a Node,
    parent: Option<Rc<NodeRef<'a>>>,
    /// Position among the parent's child nodes
    index: usize,
}

impl<'a> NodeRef<'a> {
    /// Create a root cursor with no ancestry
    pub fn new(node: &'a Node) -> Self {
        Self {
            node,
            parent: None,
            index: 0,
        }
    }

    pub fn parent(&self) -> Option<&NodeRef<'a>> {
        self.parent.as_deref()
    }

    /// Get the parent tag name if known
    pub fn parent_tag(&self) -> Option<&'a str> {
        self.parent.as_ref().map(|p| p.node.tag_name())
    }

    /// Cursors for every child node, text nodes included
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> {
        let parent = Rc::new(self.clone());
        self.node
            .children()
            .iter()
            .enumerate()
            .map(move |(index, node)| NodeRef {
                node,
                parent: Some(Rc::clone(&parent)),
                index,
            })
    }

    pub fn element_children(&self) -> impl Iterator<Item = NodeRef<'a>> {
        self.children().filter(|c| c.is_element())
    }

    /// The nearest element before this one under the same parent
    pub fn previous_element_sibling(&self) -> Option<NodeRef<'a>> {
        let parent = self.parent.as_ref()?;
        let siblings = parent.node.children();
        (0..self.index)
            .rev()
            .find(|&i| siblings[i].is_element())
            .map(|index| NodeRef {
                node: &siblings[index],
                parent: Some(Rc::clone(parent)),
                index,
            })
    }

    /// The nearest element after this one under the same parent
    pub fn next_element_sibling(&self) -> Option<NodeRef<'a>> {
        let parent = self.parent.as_ref()?;
        let siblings = parent.node.children();
        (self.index + 1..siblings.len())
            .find(|&i| siblings[i].is_element())
            .map(|index| NodeRef {
                node: &siblings[index],
                parent: Some(Rc::clone(parent)),
                index,
            })
    }

    /// All descendants in document order, excluding `self`
    pub fn descendants(&self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<NodeRef<'a>>) {
        for child in self.children() {
            let has_children = !child.node.children().is_empty();
            out.push(child.clone());
            if has_children {
                child.collect_descendants(out);
            }
        }
    }

    /// First descendant (document order, excluding `self`) matching `pred`
    pub fn find<P>(&self, pred: P) -> Option<NodeRef<'a>>
    where
        P: Fn(&Node) -> bool,
    {
        self.find_by(&pred)
    }

    fn find_by(&self, pred: &dyn Fn(&Node) -> bool) -> Option<NodeRef<'a>> {
        for child in self.children() {
            if pred(child.node) {
                return Some(child);
            }
            if let Some(hit) = child.find_by(pred) {
                return Some(hit);
            }
        }
        None
    }

    /// Every descendant matching `pred`, in document order
    pub fn find_all<P>(&self, pred: P) -> Vec<NodeRef<'a>>
    where
        P: Fn(&Node) -> bool,
    {
        self.descendants()
            .into_iter()
            .filter(|n| pred(n.node))
            .collect()
    }

    /// True when some descendant matches `pred`
    pub fn contains<P>(&self, pred: P) -> bool
    where
        P: Fn(&Node) -> bool,
    {
        self.find_by(&pred).is_some()
    }

    /// Delegate to Node methods
    pub fn is_element(&self) -> bool {
        self.node.is_element()
    }

    pub fn tag_name(&self) -> &'a str {
        self.node.tag_name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.attr(name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.node.has_class(class)
    }

    pub fn text_content(&self) -> String {
        self.node.text_content()
    }
}
