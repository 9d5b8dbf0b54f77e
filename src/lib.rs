//! pocketxml - small permissive XML parsing
//!
//! Parses markup into an owned, read-only tree of document, element, comment
//! and processing-instruction nodes, answers restricted path queries, and
//! serializes any node back to markup or plain text.
//!
//! Parsing never fails: truncated or malformed input produces a best-effort
//! tree.
//!
//! ```
//! let doc = pocketxml::parse("<!DOCTYPE d [<!ENTITY x \"hi\">]><a k=\"1\">&x;<b/></a>");
//! assert_eq!(doc.select("/a/@k").as_value(), Some("1"));
//! assert_eq!(doc.text(), "hi");
//! assert_eq!(doc.xml(), "<a k=\"1\">hi<b/></a>");
//! ```
//!
//! Modules:
//! - core: scanner, entity table and escaping
//! - dom: node model, tree builder and serializer
//! - xpath: path compilation, evaluation and caching
//! - strategy: parallel evaluation (feature `parallel`)

pub mod core;
pub mod dom;
#[cfg(feature = "parallel")]
pub mod strategy;
pub mod xpath;

pub use crate::core::{encode_text, EntityPolicy};
pub use dom::{parse, parse_with_options, Attribute, Content, Node, NodeKind, ParseOptions};
pub use xpath::{Match, Path, PathCache, PathError, Selection};

#[cfg(feature = "parallel")]
pub use strategy::{select_map, select_parallel};
