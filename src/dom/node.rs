//! XML Node representation
//!
//! A node owns its content outright: there are no parent links and no shared
//! nodes, so a tree is traversed top-down only and is `Send + Sync` once built.

use crate::core::scanner::is_space;
use std::collections::HashMap;

/// Attribute count above which name lookups go through a hash index
const INDEX_THRESHOLD: usize = 16;

/// Type of XML node and its type-specific payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element node
    Element {
        name: String,
        /// `None` when the element has no attributes
        attributes: Option<Attributes>,
    },
    /// Comment; the body is the single text run in the content
    Comment,
    /// Processing instruction; the raw body is the single text run in the content
    ProcessingInstruction,
}

/// One entry of a node's content sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Decoded character data
    Text(String),
    /// A child node
    Node(Node),
}

impl Content {
    /// Get the child node, if this entry is one
    #[inline]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Content::Node(node) => Some(node),
            Content::Text(_) => None,
        }
    }

    /// Get the text run, if this entry is one
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Node(_) => None,
        }
    }
}

/// A name/value attribute pair (value already entity-decoded)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Attribute set of an element
///
/// Names are unique. Insertion order is kept for serialization but does not
/// take part in equality.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    items: Vec<Attribute>,
    /// Name to position, built once the set outgrows a linear scan
    index: Option<HashMap<String, usize>>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute; a repeated name keeps its position and takes the new value
    pub fn insert(&mut self, name: &str, value: String) {
        if let Some(pos) = self.position(name) {
            self.items[pos].value = value;
            return;
        }

        let pos = self.items.len();
        self.items.push(Attribute {
            name: name.to_string(),
            value,
        });
        if let Some(index) = &mut self.index {
            index.insert(name.to_string(), pos);
        } else if self.items.len() > INDEX_THRESHOLD {
            let index = self
                .items
                .iter()
                .enumerate()
                .map(|(i, a)| (a.name.clone(), i))
                .collect();
            self.index = Some(index);
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        match &self.index {
            Some(index) => index.get(name).copied(),
            None => self.items.iter().position(|a| a.name == name),
        }
    }

    /// Get attribute value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|pos| self.items[pos].value.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Attribute] {
        &self.items
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .items
                .iter()
                .all(|a| other.get(&a.name) == Some(a.value.as_str()))
    }
}

impl Eq for Attributes {}

/// An XML node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    content: Vec<Content>,
}

impl Drop for Node {
    // Descendants are detached onto a worklist; drop depth stays constant
    fn drop(&mut self) {
        if !self.content.iter().any(|c| matches!(c, Content::Node(_))) {
            return;
        }
        let mut pending: Vec<Node> = Vec::new();
        detach_children(&mut self.content, &mut pending);
        while let Some(mut node) = pending.pop() {
            detach_children(&mut node.content, &mut pending);
        }
    }
}

fn detach_children(content: &mut Vec<Content>, pending: &mut Vec<Node>) {
    for item in content.drain(..) {
        if let Content::Node(child) = item {
            pending.push(child);
        }
    }
}

impl Node {
    /// Create an empty document node
    pub(crate) fn document() -> Self {
        Node {
            kind: NodeKind::Document,
            content: Vec::new(),
        }
    }

    /// Create an element node with no content
    pub(crate) fn element(name: String, attributes: Option<Attributes>) -> Self {
        Node {
            kind: NodeKind::Element { name, attributes },
            content: Vec::new(),
        }
    }

    /// Create a comment node holding `body`
    pub(crate) fn comment(body: String) -> Self {
        let mut node = Node {
            kind: NodeKind::Comment,
            content: Vec::new(),
        };
        node.push_text(body);
        node
    }

    /// Create a processing instruction node holding its raw `body`
    pub(crate) fn processing_instruction(body: String) -> Self {
        let mut node = Node {
            kind: NodeKind::ProcessingInstruction,
            content: Vec::new(),
        };
        node.push_text(body);
        node
    }

    /// Append a text run, merging with a trailing run
    pub(crate) fn push_text(&mut self, text: String) {
        if let Some(Content::Text(last)) = self.content.last_mut() {
            last.push_str(&text);
            return;
        }
        self.content.push(Content::Text(text));
    }

    /// Append a child node
    pub(crate) fn push_node(&mut self, node: Node) {
        self.content.push(Content::Node(node));
    }

    /// Get the kind of this node
    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Check if this is an element node
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    /// Element name; `None` for other kinds
    #[inline]
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Ordered content: interleaved text runs and child nodes
    #[inline]
    pub fn content(&self) -> &[Content] {
        &self.content
    }

    /// Attributes of an element (empty for elements without any, and non-elements)
    pub fn attributes(&self) -> &[Attribute] {
        match &self.kind {
            NodeKind::Element {
                attributes: Some(attrs),
                ..
            } => attrs.as_slice(),
            _ => &[],
        }
    }

    /// Get attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match &self.kind {
            NodeKind::Element {
                attributes: Some(attrs),
                ..
            } => attrs.get(name),
            _ => None,
        }
    }

    /// Check if this node has attributes
    #[inline]
    pub fn has_attributes(&self) -> bool {
        !self.attributes().is_empty()
    }

    /// Iterate over direct child elements
    pub fn elements(&self) -> impl Iterator<Item = &Node> + '_ {
        self.content
            .iter()
            .filter_map(Content::as_node)
            .filter(|n| n.is_element())
    }

    /// Iterate over direct child elements called `name` (`"*"` or `""` match all)
    pub fn elements_named<'n>(&'n self, name: &'n str) -> impl Iterator<Item = &'n Node> + 'n {
        let any = name.is_empty() || name == "*";
        self.elements().filter(move |n| any || n.name() == Some(name))
    }

    /// First direct child element
    pub fn first_element(&self) -> Option<&Node> {
        self.elements().next()
    }

    /// Document element of a document node
    #[inline]
    pub fn root_element(&self) -> Option<&Node> {
        self.first_element()
    }

    /// Target of a processing instruction (first token of its body)
    pub fn target(&self) -> Option<&str> {
        match self.kind {
            NodeKind::ProcessingInstruction => self
                .content
                .first()
                .and_then(Content::as_text)
                .and_then(|body| body.split(is_space).find(|t| !t.is_empty())),
            _ => None,
        }
    }
}
