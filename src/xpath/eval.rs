//! Path Evaluation Engine
//!
//! Evaluates compiled paths against a node. Steps are applied top-down from
//! the context node; a recursive step is retried below every child element.

use super::parser::{Path, Step, StepTest};
use super::value::{Match, Selection};
use crate::dom::Node;
use std::collections::{HashMap, HashSet};

impl Node {
    /// Select elements or attribute values by path
    ///
    /// Returns [`Selection::Empty`] when nothing matches, [`Selection::One`]
    /// for a single match, and [`Selection::Many`] otherwise.
    pub fn select(&self, path: &str) -> Selection<'_> {
        self.select_path(&Path::compile(path))
    }

    /// Select using a precompiled path
    pub fn select_path(&self, path: &Path) -> Selection<'_> {
        Selection::from_matches(evaluate(self, path))
    }
}

/// Evaluate `path` from `context`, returning matches in document order
pub fn evaluate<'a>(context: &'a Node, path: &Path) -> Vec<Match<'a>> {
    let mut collector = Collector::default();
    collect(context, path.steps(), &mut collector);

    let mut matches = collector.items;
    if path.has_recursion() && matches.len() > 1 {
        // Matches from deeper recursion can be found before shallower ones
        let order = document_order(context);
        matches.sort_by_key(|m| order.get(&m.address()).copied().unwrap_or(usize::MAX));
    }
    matches
}

/// Accumulates matches, keeping the first occurrence of each item
#[derive(Default)]
struct Collector<'a> {
    items: Vec<Match<'a>>,
    seen: HashSet<*const ()>,
}

impl<'a> Collector<'a> {
    fn push(&mut self, item: Match<'a>) {
        if self.seen.insert(item.address()) {
            self.items.push(item);
        }
    }
}

/// Pending evaluation work: apply `steps[index..]` to a node, or record a match
enum Task<'a> {
    Visit(&'a Node, usize),
    Emit(Match<'a>),
}

/// Walk the steps with an explicit task stack, emitting in the same order a
/// depth-first recursive walk would
fn collect<'a>(context: &'a Node, steps: &[Step], out: &mut Collector<'a>) {
    if steps.is_empty() {
        return;
    }
    let mut stack = vec![Task::Visit(context, 0)];
    let mut next: Vec<Task<'a>> = Vec::new();

    while let Some(task) = stack.pop() {
        let (node, index) = match task {
            Task::Emit(item) => {
                out.push(item);
                continue;
            }
            Task::Visit(node, index) => (node, index),
        };
        let step = &steps[index];
        let last = index + 1 == steps.len();

        match &step.test {
            StepTest::Attribute(name) => {
                // Ends the path: any steps after an attribute are ignored
                if let Some(attr) = node.attributes().iter().find(|a| a.name == *name) {
                    next.push(Task::Emit(Match::Attribute(attr)));
                }
                if step.recursive {
                    next.extend(node.elements().map(|child| Task::Visit(child, index)));
                }
            }
            StepTest::Any | StepTest::Name(_) => {
                for child in node.elements() {
                    if matches_step(step, child) {
                        next.push(if last {
                            Task::Emit(Match::Node(child))
                        } else {
                            Task::Visit(child, index + 1)
                        });
                    }
                    if step.recursive {
                        next.push(Task::Visit(child, index));
                    }
                }
            }
        }
        stack.extend(next.drain(..).rev());
    }
}

#[inline]
fn matches_step(step: &Step, element: &Node) -> bool {
    match &step.test {
        StepTest::Any => true,
        StepTest::Name(name) => element.name() == Some(name.as_str()),
        StepTest::Attribute(_) => false,
    }
}

/// Pre-order position of every element and attribute under `root`
fn document_order(root: &Node) -> HashMap<*const (), usize> {
    let mut order = HashMap::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let next = order.len();
        order.insert(Match::Node(node).address(), next);
        for attr in node.attributes() {
            let next = order.len();
            order.insert(Match::Attribute(attr).address(), next);
        }
        let children: Vec<&Node> = node.elements().collect();
        stack.extend(children.into_iter().rev());
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    fn names(selection: &Selection<'_>) -> Vec<String> {
        selection
            .nodes()
            .map(|n| format!("{}{}", n.name().unwrap_or(""), n.attribute("id").unwrap_or("")))
            .collect()
    }

    #[test]
    fn test_attribute_query() {
        let doc = parse("<a x=\"1\"/>");
        assert_eq!(doc.select("/a/@x").as_value(), Some("1"));
        assert!(doc.select("/a/@y").is_empty());
        assert!(doc.select("/b/@x").is_empty());
    }

    #[test]
    fn test_child_query_single() {
        let doc = parse("<a><b><c/></b><c/></a>");
        let direct = doc.select("/a/c");
        assert!(matches!(direct, Selection::One(Match::Node(_))));
        assert_eq!(direct.as_node().and_then(Node::name), Some("c"));
    }

    #[test]
    fn test_descendant_query_document_order() {
        let doc = parse("<a><b><c id=\"1\"/></b><c id=\"2\"/></a>");
        let all = doc.select("//c");
        assert_eq!(all.len(), 2);
        assert_eq!(names(&all), ["c1", "c2"]);
    }

    #[test]
    fn test_descendant_with_trailing_steps() {
        let doc = parse(
            "<r><b id=\"1\"><c id=\"1\"/><x><b id=\"2\"><c id=\"2\"/></b></x><c id=\"3\"/></b></r>",
        );
        let found = doc.select("//b/c");
        assert_eq!(names(&found), ["c1", "c2", "c3"]);
    }

    #[test]
    fn test_nested_recursion_deduplicates() {
        let doc = parse("<a id=\"1\"><a id=\"2\"><b/></a></a>");
        let found = doc.select("//a//b");
        assert_eq!(found.len(), 1);
        assert_eq!(doc.select("//a").len(), 2);
    }

    #[test]
    fn test_wildcard() {
        let doc = parse("<r><a/><b/>text<c/></r>");
        assert_eq!(doc.select("/r/*").len(), 3);
        assert_eq!(doc.select("/*").as_node().and_then(Node::name), Some("r"));
        assert_eq!(doc.select("//*").len(), 4);
    }

    #[test]
    fn test_recursive_attribute() {
        let doc = parse("<r id=\"r\"><a id=\"a\"><b id=\"b\"/></a><c/><d id=\"d\"/></r>");
        let ids: Vec<&str> = doc.select("//@id").values().collect();
        assert_eq!(ids, ["r", "a", "b", "d"]);
    }

    #[test]
    fn test_relative_to_element() {
        let doc = parse("<r><a><b>1</b></a><a><b>2</b></a></r>");
        let r = doc.first_element().unwrap();
        let second = r.elements_named("a").nth(1).unwrap();
        assert_eq!(second.select("b").text(), "2");
        assert_eq!(r.select("a/b").len(), 2);
    }

    #[test]
    fn test_no_match_is_empty() {
        let doc = parse("<r><a/></r>");
        assert_eq!(doc.select("/r/z"), Selection::Empty);
        assert_eq!(doc.select("//z"), Selection::Empty);
        assert_eq!(doc.select(""), Selection::Empty);
    }

    #[test]
    fn test_attribute_step_ends_path() {
        let doc = parse("<r k=\"v\"><a/></r>");
        assert_eq!(doc.select("/r/@k/a").as_value(), Some("v"));
    }

    #[test]
    fn test_self_closing_siblings_query() {
        let doc = parse("<r><x/><y><x id=\"1\"/>t<x id=\"2\"/></y><x id=\"3\"/></r>");
        assert_eq!(names(&doc.select("//x")), ["x", "x1", "x2", "x3"]);
        assert_eq!(doc.select("/r/x").len(), 2);
        assert_eq!(doc.select("/r/y/x").len(), 2);
        assert_eq!(doc.select("//y").as_node().map(|y| y.elements().count()), Some(2));
    }

    #[test]
    fn test_deep_recursive_query() {
        let depth = 200_000;
        let input = format!("{}<leaf/>{}", "<d>".repeat(depth), "</d>".repeat(depth));
        let doc = parse(&input);
        assert_eq!(doc.select("//leaf").as_node().and_then(Node::name), Some("leaf"));
        assert_eq!(doc.select("//d").len(), depth);
    }

    #[test]
    fn test_select_path_reuse() {
        let doc = parse("<r><a>x</a></r>");
        let path: Path = "/r/a".parse().unwrap();
        assert_eq!(doc.select_path(&path).text(), "x");
        assert_eq!(doc.select_path(&path), doc.select("/r/a"));
    }
}
