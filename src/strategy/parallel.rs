//! Parallel Path Evaluation
//!
//! Uses Rayon to evaluate many queries against one tree. A parsed tree is
//! never mutated, so every worker reads it without locking.

use crate::dom::Node;
use crate::xpath::{Match, Selection};
use rayon::prelude::*;

/// Evaluate multiple paths in parallel; results keep the order of `paths`
pub fn select_parallel<'a>(node: &'a Node, paths: &[&str]) -> Vec<Selection<'a>> {
    paths.par_iter().map(|path| node.select(path)).collect()
}

/// Evaluate keyed paths in parallel, pairing each result with its key
pub fn select_map<'a>(node: &'a Node, queries: &[(&str, &str)]) -> Vec<(String, Selection<'a>)> {
    queries
        .par_iter()
        .map(|(key, path)| (key.to_string(), node.select(path)))
        .collect()
}

/// Evaluate one path and map every match in parallel
pub fn map_matches<'a, F, T>(node: &'a Node, path: &str, mapper: F) -> Vec<T>
where
    F: Fn(Match<'a>) -> T + Sync + Send,
    T: Send,
{
    node.select(path).into_vec().into_par_iter().map(mapper).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    #[test]
    fn test_parallel_select() {
        let doc = parse("<root><a/><b/><b/><c x=\"1\"/></root>");
        let paths = ["//a", "//b", "//c/@x", "//missing"];

        let results = select_parallel(&doc, &paths);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].len(), 1);
        assert_eq!(results[1].len(), 2);
        assert_eq!(results[2].as_value(), Some("1"));
        assert!(results[3].is_empty());
    }

    #[test]
    fn test_select_map() {
        let doc = parse("<root><a>1</a><b>2</b></root>");
        let queries = [("first", "//a"), ("second", "//b")];

        let results = select_map(&doc, &queries);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "first");
        assert_eq!(results[0].1.text(), "1");
        assert_eq!(results[1].1.text(), "2");
    }

    #[test]
    fn test_map_matches() {
        let doc = parse("<r><i>a</i><i>bb</i><i>ccc</i></r>");
        let lengths = map_matches(&doc, "/r/i", |m| m.text().len());
        assert_eq!(lengths, [1, 2, 3]);
    }
}
