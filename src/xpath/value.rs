//! Selection Result Types
//!
//! A query yields nothing, exactly one match, or several matches in document
//! order. A match is either an element or an attribute.

use crate::dom::{Attribute, Node};

/// A single query match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match<'a> {
    Node(&'a Node),
    Attribute(&'a Attribute),
}

impl<'a> Match<'a> {
    /// Get the matched node, if this is one
    pub fn as_node(&self) -> Option<&'a Node> {
        match *self {
            Match::Node(node) => Some(node),
            Match::Attribute(_) => None,
        }
    }

    /// Get the attribute value, if this is an attribute match
    pub fn as_value(&self) -> Option<&'a str> {
        match *self {
            Match::Attribute(attr) => Some(&attr.value),
            Match::Node(_) => None,
        }
    }

    /// String-value: the attribute value, or the node's text
    pub fn text(&self) -> String {
        match *self {
            Match::Node(node) => node.text(),
            Match::Attribute(attr) => attr.value.clone(),
        }
    }

    /// Identity of the matched item within its tree
    pub(crate) fn address(&self) -> *const () {
        match *self {
            Match::Node(node) => node as *const Node as *const (),
            Match::Attribute(attr) => attr as *const Attribute as *const (),
        }
    }
}

/// Result of a path query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[must_use]
pub enum Selection<'a> {
    /// Nothing matched
    #[default]
    Empty,
    /// Exactly one match
    One(Match<'a>),
    /// Two or more matches, in document order
    Many(Vec<Match<'a>>),
}

impl<'a> Selection<'a> {
    /// Collapse a match list: zero is `Empty`, one is `One`
    pub fn from_matches(mut matches: Vec<Match<'a>>) -> Self {
        match matches.len() {
            0 => Selection::Empty,
            1 => matches.pop().map_or(Selection::Empty, Selection::One),
            _ => Selection::Many(matches),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }

    pub fn len(&self) -> usize {
        match self {
            Selection::Empty => 0,
            Selection::One(_) => 1,
            Selection::Many(items) => items.len(),
        }
    }

    /// All matches as a slice, whatever the shape
    pub fn as_slice(&self) -> &[Match<'a>] {
        match self {
            Selection::Empty => &[],
            Selection::One(item) => std::slice::from_ref(item),
            Selection::Many(items) => items,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match<'a>> {
        self.as_slice().iter()
    }

    pub fn first(&self) -> Option<Match<'a>> {
        self.as_slice().first().copied()
    }

    /// The single matched node
    pub fn as_node(&self) -> Option<&'a Node> {
        match self {
            Selection::One(item) => item.as_node(),
            _ => None,
        }
    }

    /// The single matched attribute value
    pub fn as_value(&self) -> Option<&'a str> {
        match self {
            Selection::One(item) => item.as_value(),
            _ => None,
        }
    }

    /// Matched nodes, skipping attribute matches
    pub fn nodes(&self) -> impl Iterator<Item = &'a Node> + '_ {
        self.iter().filter_map(Match::as_node)
    }

    /// Matched attribute values, skipping node matches
    pub fn values(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.iter().filter_map(Match::as_value)
    }

    /// String-value of the first match (empty when nothing matched)
    pub fn text(&self) -> String {
        self.first().map(|m| m.text()).unwrap_or_default()
    }

    pub fn into_vec(self) -> Vec<Match<'a>> {
        match self {
            Selection::Empty => Vec::new(),
            Selection::One(item) => vec![item],
            Selection::Many(items) => items,
        }
    }
}

impl<'a> IntoIterator for Selection<'a> {
    type Item = Match<'a>;
    type IntoIter = std::vec::IntoIter<Match<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}
