//! Path Query Engine
//!
//! Restricted XPath subset:
//! - Child steps by name or `*`
//! - `//` for recursive (any depth) steps
//! - A final `@name` step for attribute values
//! - Compiled path caching

pub mod cache;
pub mod eval;
pub mod parser;
pub mod value;

pub use cache::PathCache;
pub use eval::evaluate;
pub use parser::{Path, PathError, Step, StepTest};
pub use value::{Match, Selection};
