//! Core XML scanning primitives
//!
//! - Scanner: character cursor with transparent entity expansion and the
//!   DOCTYPE/DTD sub-grammar
//! - Entities: entity table, reference resolution and output escaping

pub mod entities;
pub mod scanner;

pub use entities::{encode_text, EntityPolicy, EntityTable};
pub use scanner::{Decoded, Scanner};
