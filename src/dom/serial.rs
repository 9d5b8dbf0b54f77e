//! XML serializer.
//!
//! `xml()` writes markup, `text()` writes character data only. Comments and
//! processing instructions stay in the tree but are not written back out.

use std::fmt;

use super::node::{Content, Node, NodeKind};
use crate::core::entities::encode_text;

impl Node {
    /// Serialize this node to markup
    ///
    /// Text and attribute values are escaped; an element without content is
    /// written in self-closing form.
    pub fn xml(&self) -> String {
        let mut out = String::new();
        write_xml(self, &mut out);
        out
    }

    /// Concatenated decoded character data of this node and its descendants
    ///
    /// For a comment or processing instruction this is its body.
    pub fn text(&self) -> String {
        let mut out = String::new();
        match self.kind() {
            NodeKind::Comment | NodeKind::ProcessingInstruction => {
                for item in self.content() {
                    if let Content::Text(text) = item {
                        out.push_str(text);
                    }
                }
            }
            NodeKind::Document | NodeKind::Element { .. } => write_text(self, &mut out),
        }
        out
    }
}

/// Pending serializer work, processed from an explicit stack
enum Emit<'a> {
    Node(&'a Node),
    Text(&'a str),
    Close(&'a str),
}

fn push_content<'a>(node: &'a Node, stack: &mut Vec<Emit<'a>>) {
    for item in node.content().iter().rev() {
        stack.push(match item {
            Content::Text(text) => Emit::Text(text),
            Content::Node(child) => Emit::Node(child),
        });
    }
}

fn write_xml(root: &Node, out: &mut String) {
    let mut stack = vec![Emit::Node(root)];
    while let Some(emit) = stack.pop() {
        match emit {
            Emit::Text(text) => out.push_str(&encode_text(text)),
            Emit::Close(name) => {
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            Emit::Node(node) => match node.kind() {
                NodeKind::Element { name, .. } => {
                    out.push('<');
                    out.push_str(name);
                    for attr in node.attributes() {
                        out.push(' ');
                        out.push_str(&attr.name);
                        out.push_str("=\"");
                        out.push_str(&encode_text(&attr.value));
                        out.push('"');
                    }
                    if node.content().is_empty() {
                        out.push_str("/>");
                    } else {
                        out.push('>');
                        stack.push(Emit::Close(name));
                        push_content(node, &mut stack);
                    }
                }
                NodeKind::Document => push_content(node, &mut stack),
                NodeKind::Comment | NodeKind::ProcessingInstruction => {}
            },
        }
    }
}

fn write_text(root: &Node, out: &mut String) {
    let mut stack = Vec::new();
    push_content(root, &mut stack);
    while let Some(emit) = stack.pop() {
        match emit {
            Emit::Text(text) => out.push_str(text),
            Emit::Node(node) => match node.kind() {
                NodeKind::Element { .. } | NodeKind::Document => push_content(node, &mut stack),
                NodeKind::Comment | NodeKind::ProcessingInstruction => {}
            },
            Emit::Close(_) => {}
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.xml())
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::parse;

    #[test]
    fn test_serialize_roundtrip() {
        let input = "<root a=\"1\" b=\"x y\"><child>Hello</child><empty/></root>";
        assert_eq!(parse(input).xml(), input);
    }

    #[test]
    fn test_empty_element_self_closes() {
        assert_eq!(parse("<a></a>").xml(), "<a/>");
        assert_eq!(parse("<a/>").xml(), "<a/>");
    }

    #[test]
    fn test_escaping() {
        let doc = parse("<a t=\"&quot;q&apos;\">&lt;&gt;&amp;</a>");
        assert_eq!(doc.xml(), "<a t=\"&quot;q&apos;\">&lt;&gt;&amp;</a>");
        assert_eq!(doc.text(), "<>&");
    }

    #[test]
    fn test_numeric_reference_text() {
        assert_eq!(parse("<a>&#65;</a>").text(), "A");
    }

    #[test]
    fn test_cdata_is_escaped_on_output() {
        let doc = parse("<a><![CDATA[<b>]]></a>");
        assert_eq!(doc.text(), "<b>");
        assert_eq!(doc.xml(), "<a>&lt;b&gt;</a>");
    }

    #[test]
    fn test_comments_and_pis_not_emitted() {
        let doc = parse("<?xml version=\"1.0\"?><!--c--><a>x<!--d-->y<?pi z?></a>");
        assert_eq!(doc.xml(), "<a>xy</a>");
        assert_eq!(doc.text(), "xy");

        let comment = &doc.content()[1];
        let comment = comment.as_node().unwrap();
        assert_eq!(comment.xml(), "");
        assert_eq!(comment.text(), "c");
    }

    #[test]
    fn test_text_descends() {
        let doc = parse("<p>one <b>two</b> three<br/></p>");
        assert_eq!(doc.text(), "one two three");
        assert_eq!(doc.first_element().unwrap().to_string(), "<p>one <b>two</b> three<br/></p>");
    }

    #[test]
    fn test_self_closing_siblings() {
        let doc = parse("<r><br/>x<hr/><p>y<br/></p></r>");
        assert_eq!(doc.xml(), "<r><br/>x<hr/><p>y<br/></p></r>");
        assert_eq!(doc.text(), "xy");
    }

    #[test]
    fn test_deep_tree_serializes() {
        let depth = 200_000;
        let input = format!("{}x{}", "<d>".repeat(depth), "</d>".repeat(depth));
        let doc = parse(&input);
        assert_eq!(doc.text(), "x");
        assert_eq!(doc.xml(), input);
    }

    #[test]
    fn test_idempotent_reparse() {
        let input = "<!DOCTYPE r [<!ENTITY e \"&amp;x\">]>\n<r k=\"&e;\">\n  <s>&e;<![CDATA[ ]]]]></s>\n</r>";
        let first = parse(input);
        let second = parse(&first.xml());
        assert_eq!(first, second);
        assert_eq!(first.text(), second.text());
    }
}
