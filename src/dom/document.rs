//! Document builder
//!
//! Drives the scanner over the whole input and assembles a [`Node`] tree.
//! Open elements are kept on an explicit stack: a closing tag finishes the
//! innermost one, and end of input finishes all of them, so a truncated
//! document still yields every node read so far.

use super::node::{Attributes, Node};
use crate::core::scanner::{is_spaces, Decoded, Scanner};
use crate::core::EntityPolicy;

/// Options controlling how input is turned into a tree
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Substitution for entity references that cannot be resolved
    pub entity_policy: EntityPolicy,
    /// Keep whitespace-only text between tags. Defaults to `false`.
    pub keep_whitespace_text: bool,
}

impl ParseOptions {
    /// Sets the policy for unresolved entity references.
    #[must_use]
    pub fn entity_policy(mut self, policy: EntityPolicy) -> Self {
        self.entity_policy = policy;
        self
    }

    /// Enables or disables keeping whitespace-only text runs.
    #[must_use]
    pub fn keep_whitespace_text(mut self, keep: bool) -> Self {
        self.keep_whitespace_text = keep;
        self
    }
}

/// Parse a document with default options
///
/// Never fails: malformed or truncated markup yields a best-effort tree.
pub fn parse(input: &str) -> Node {
    parse_with_options(input, &ParseOptions::default())
}

/// Parse a document with explicit options
pub fn parse_with_options(input: &str, options: &ParseOptions) -> Node {
    let mut scanner = Scanner::with_policy(input, options.entity_policy);
    let mut builder = TreeBuilder {
        stack: vec![Node::document()],
        text: String::new(),
        keep_whitespace: options.keep_whitespace_text,
    };
    builder.run(&mut scanner);
    let doc = builder.finish();
    log::debug!(
        "parsed {} bytes into {} top-level items",
        input.len(),
        doc.content().len()
    );
    doc
}

struct TreeBuilder {
    /// Document node at the bottom, open elements above it
    stack: Vec<Node>,
    /// Pending character data for the innermost open node
    text: String,
    keep_whitespace: bool,
}

impl TreeBuilder {
    fn current(&mut self) -> &mut Node {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn flush_text(&mut self) {
        let text = std::mem::take(&mut self.text);
        if !text.is_empty() && (self.keep_whitespace || !is_spaces(&text)) {
            self.current().push_text(text);
        }
    }

    fn run(&mut self, scanner: &mut Scanner<'_>) {
        while let Some(unit) = scanner.next_char() {
            if !unit.is('<') {
                unit.push_to(&mut self.text);
                continue;
            }

            self.flush_text();
            let Some(next) = scanner.next_char() else {
                break;
            };

            if next.is('!') {
                self.markup_declaration(scanner);
            } else if next.is('?') {
                let body = scanner.consume_until_raw("?>").to_string();
                self.current().push_node(Node::processing_instruction(body));
            } else if next.is('/') {
                scanner.consume_until(">");
                self.close_element();
            } else {
                self.start_element(scanner, next);
            }
        }
        self.flush_text();
    }

    /// `<!` has been read: comment, CDATA section, DOCTYPE, or unknown
    fn markup_declaration(&mut self, scanner: &mut Scanner<'_>) {
        if scanner.consume_string("--") {
            let body = scanner.consume_until_raw("-->").to_string();
            self.current().push_node(Node::comment(body));
        } else if scanner.consume_string("[CDATA[") {
            let text = scanner.consume_until_raw("]]>").to_string();
            self.current().push_text(text);
        } else if scanner.consume_string("DOCTYPE") {
            scanner.parse_dtd();
        } else {
            let skipped = scanner.consume_until(">");
            log::debug!("skipping unknown declaration <!{}>", skipped);
        }
    }

    /// `<` and the first character of the name have been read
    fn start_element(&mut self, scanner: &mut Scanner<'_>, first: Decoded) {
        let mut name = String::new();
        first.push_to(&mut name);
        name.push_str(scanner.read_name());

        let mut attributes: Option<Attributes> = None;
        loop {
            scanner.skip_space();
            match scanner.peek() {
                None | Some('/') | Some('>') => break,
                _ => {}
            }

            let attr_name = scanner.read_name();
            scanner.skip_space();
            let has_value = scanner.consume('=').is_some();
            if attr_name.is_empty() && !has_value {
                // Stray markup character inside the tag
                scanner.read();
                continue;
            }

            let value = if has_value {
                scanner.skip_space();
                let raw = scanner.read_quoted_string();
                scanner.entities().decode_entities(raw).into_owned()
            } else {
                String::new()
            };
            if !attr_name.is_empty() {
                attributes
                    .get_or_insert_with(Attributes::new)
                    .insert(attr_name, value);
            }
        }

        let element = Node::element(name, attributes);
        if scanner.consume('/').is_some() {
            scanner.consume('>');
            self.current().push_node(element);
        } else if scanner.consume('>').is_some() {
            self.stack.push(element);
        } else {
            // Input ended inside the tag
            self.current().push_node(element);
        }
    }

    fn close_element(&mut self) {
        if self.stack.len() > 1 {
            if let Some(element) = self.stack.pop() {
                self.current().push_node(element);
            }
        } else {
            log::debug!("ignoring closing tag at document level");
        }
    }

    /// Close every element still open and return the document node
    fn finish(mut self) -> Node {
        while self.stack.len() > 1 {
            self.close_element();
        }
        self.stack.pop().unwrap_or_else(Node::document)
    }
}
