//! DOM Module - owned XML tree
//!
//! - Node: closed set of node kinds with an ordered, mixed content sequence
//! - Document: tree construction from a scanner
//! - Serial: markup and text output

pub mod document;
pub mod node;
pub mod serial;

pub use document::{parse, parse_with_options, ParseOptions};
pub use node::{Attribute, Attributes, Content, Node, NodeKind};
