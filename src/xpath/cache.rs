//! Compiled Path Cache
//!
//! Keeps recently used paths compiled so repeated queries skip parsing.

use super::parser::Path;
use super::value::Selection;
use crate::dom::Node;
use lru::LruCache;
use std::num::NonZeroUsize;

const DEFAULT_CAPACITY: usize = 64;

/// LRU cache of compiled paths keyed by their source text
pub struct PathCache {
    paths: LruCache<String, Path>,
}

impl PathCache {
    /// Create a cache holding at most `capacity` paths (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        PathCache {
            paths: LruCache::new(capacity),
        }
    }

    /// Get the compiled form of `path`, compiling it on a miss
    pub fn compiled(&mut self, path: &str) -> &Path {
        self.paths
            .get_or_insert(path.to_string(), || Path::compile(path))
    }

    /// Select from `node` using the cached compilation of `path`
    pub fn select<'n>(&mut self, node: &'n Node, path: &str) -> Selection<'n> {
        node.select_path(self.compiled(path))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.paths.cap().get()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
