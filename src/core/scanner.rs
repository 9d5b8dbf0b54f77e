//! Character scanner for permissive XML parsing
//!
//! Wraps the input string and a forward-only cursor. All markup-level reads go
//! through [`Scanner::next_char`], which expands entity references in place, so
//! substitution is transparent to the tree builder. Nothing here fails: at end
//! of input every read returns `None` and every loop stops.

use super::entities::{EntityPolicy, EntityTable};

/// One decoded unit of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A character taken verbatim from the input
    Char(char),
    /// The replacement text of one entity reference
    Entity(String),
}

impl Decoded {
    /// True if this is the literal (markup-significant) character `c`
    #[inline]
    pub fn is(&self, c: char) -> bool {
        matches!(self, Decoded::Char(x) if *x == c)
    }

    /// Append the decoded text to `buf`
    #[inline]
    pub fn push_to(&self, buf: &mut String) {
        match self {
            Decoded::Char(c) => buf.push(*c),
            Decoded::Entity(s) => buf.push_str(s),
        }
    }
}

/// XML whitespace: space, tab, newline, carriage return
#[inline]
pub fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// True if every character of `s` is whitespace (vacuously true when empty)
#[inline]
pub fn is_spaces(s: &str) -> bool {
    s.chars().all(is_space)
}

/// Byte offset of the `;` closing the reference that starts `rest`
///
/// `None` if whitespace, `<` or another sigil comes first. The scan stops at
/// the first delimiter, so a run of bare sigils is read in linear time.
pub(crate) fn reference_end(rest: &str) -> Option<usize> {
    rest.bytes()
        .position(|b| matches!(b, b';' | b'<' | b'&' | b'%' | b' ' | b'\t' | b'\n' | b'\r'))
        .filter(|&end| rest.as_bytes()[end] == b';')
}

/// Characters that end a name token besides whitespace
#[inline]
fn is_markup(c: char) -> bool {
    matches!(c, '<' | '>' | '/' | '?' | '!' | '&' | '=')
}

/// Scanner over an in-memory document
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    entities: EntityTable,
    in_dtd: bool,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner with the default entity policy
    pub fn new(input: &'a str) -> Self {
        Self::with_policy(input, EntityPolicy::default())
    }

    /// Create a new scanner that treats unresolved references per `policy`
    pub fn with_policy(input: &'a str, policy: EntityPolicy) -> Self {
        Scanner {
            input,
            pos: 0,
            entities: EntityTable::new(policy),
            in_dtd: false,
        }
    }

    /// Get the current byte position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Check if we've reached the end
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Entities known so far (predefined plus declared)
    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }

    #[inline]
    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Peek at the current raw character without advancing
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Read the current raw character
    #[inline]
    pub fn read(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Read the raw character only if it equals `c`
    #[inline]
    pub fn consume(&mut self, c: char) -> Option<char> {
        if self.peek() == Some(c) {
            self.read()
        } else {
            None
        }
    }

    /// Read the next decoded unit, expanding `&name;` (and `%name;` inside a DTD)
    pub fn next_char(&mut self) -> Option<Decoded> {
        let c = self.read()?;
        if c == '&' || (self.in_dtd && c == '%') {
            let rest = self.remaining();
            // A sigil without a well-formed `name;` after it is plain text
            if let Some(end) = reference_end(rest) {
                self.pos += end + 1;
                return Some(Decoded::Entity(self.entities.resolve(&rest[..end], c)));
            }
        }
        Some(Decoded::Char(c))
    }

    /// Read up to `n` decoded units
    pub fn read_string(&mut self, n: usize) -> Vec<Decoded> {
        let mut units = Vec::with_capacity(n);
        while units.len() < n {
            match self.next_char() {
                Some(unit) => units.push(unit),
                None => break,
            }
        }
        units
    }

    /// Peek up to `n` decoded units; the cursor is restored exactly
    pub fn peek_string(&mut self, n: usize) -> Vec<Decoded> {
        let saved = self.pos;
        let units = self.read_string(n);
        self.pos = saved;
        units
    }

    /// Consume `s` if the next decoded units are exactly its literal characters
    pub fn consume_string(&mut self, s: &str) -> bool {
        let saved = self.pos;
        for expected in s.chars() {
            match self.next_char() {
                Some(unit) if unit.is(expected) => {}
                _ => {
                    self.pos = saved;
                    return false;
                }
            }
        }
        true
    }

    /// Accumulate decoded text until `marker` is consumed
    ///
    /// The marker is excluded from the result. At end of input whatever was
    /// accumulated is returned.
    pub fn consume_until(&mut self, marker: &str) -> String {
        let mut chars = marker.chars();
        let first = chars.next();
        let rest = chars.as_str();
        let mut text = String::new();
        while let Some(unit) = self.next_char() {
            if let Some(first) = first {
                if unit.is(first) && self.consume_string(rest) {
                    return text;
                }
            }
            unit.push_to(&mut text);
        }
        text
    }

    /// Like [`consume_until`](Self::consume_until), but without entity expansion
    ///
    /// Used for sections whose body is literal: CDATA, comments and
    /// processing instructions.
    pub fn consume_until_raw(&mut self, marker: &str) -> &'a str {
        let rest = self.remaining();
        match rest.find(marker) {
            Some(end) => {
                self.pos += end + marker.len();
                &rest[..end]
            }
            None => {
                self.pos = self.input.len();
                rest
            }
        }
    }

    /// Skip raw whitespace characters
    #[inline]
    pub fn skip_space(&mut self) {
        while self.peek().is_some_and(is_space) {
            self.pos += 1;
        }
    }

    /// Read a raw name token, ending at whitespace or a markup character
    pub fn read_name(&mut self) -> &'a str {
        let rest = self.remaining();
        let end = rest
            .find(|c: char| is_space(c) || is_markup(c))
            .unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    /// Read a quoted literal; the first character read is the delimiter
    pub fn read_quoted_string(&mut self) -> &'a str {
        let Some(quote) = self.read() else {
            return "";
        };
        let rest = self.remaining();
        match rest.find(quote) {
            Some(end) => {
                self.pos += end + quote.len_utf8();
                &rest[..end]
            }
            None => {
                self.pos = self.input.len();
                rest
            }
        }
    }

    /// Parse a DOCTYPE declaration; the `<!DOCTYPE` keyword is already consumed
    ///
    /// Only entity declarations have an effect; everything else is skipped.
    pub fn parse_dtd(&mut self) {
        self.in_dtd = true;
        self.skip_space();
        let root = self.read_name();
        log::debug!("doctype for root '{}'", root);
        self.skip_space();
        self.parse_external_id();
        self.skip_space();

        if self.consume_string(">") {
            self.in_dtd = false;
            return;
        }
        if !self.consume_string("[") {
            self.consume_until(">");
            self.in_dtd = false;
            return;
        }

        self.skip_space();
        while !self.is_eof() && !self.consume_string("]") {
            self.parse_decl();
            self.skip_space();
        }
        self.consume_until(">");
        self.in_dtd = false;
    }

    /// `SYSTEM "uri"` or `PUBLIC "id" "uri"`; the literals are discarded
    fn parse_external_id(&mut self) {
        if self.consume_string("SYSTEM") {
            self.skip_space();
            self.read_quoted_string();
        } else if self.consume_string("PUBLIC") {
            self.skip_space();
            self.read_quoted_string();
            self.skip_space();
            self.read_quoted_string();
        }
    }

    /// Parse one markup declaration inside the internal subset
    fn parse_decl(&mut self) {
        if self.peek() == Some('%') {
            let skipped = self.next_char();
            log::debug!("skipping parameter entity reference {:?}", skipped);
            return;
        }
        if self.consume_string("<?") {
            self.consume_until("?>");
            return;
        }
        if !self.consume_string("<!") {
            // Stray character between declarations
            self.next_char();
            return;
        }

        if self.consume_string("--") {
            self.consume_until("-->");
        } else if self.peek() == Some('[') {
            if self.consume_string("[INCLUDE[") {
                self.skip_space();
                while !self.is_eof() && !self.consume_string("]]>") {
                    self.parse_decl();
                    self.skip_space();
                }
            } else {
                self.consume_until("]]>");
            }
        } else if self.consume_string("ENTITY") {
            self.parse_entity_decl();
        } else {
            self.consume_until(">");
        }
    }

    /// `<!ENTITY [%] name "value">`; the value is entity-substituted before storage
    fn parse_entity_decl(&mut self) {
        self.skip_space();
        self.consume('%');
        self.skip_space();
        let name = self.read_name();
        self.skip_space();
        let raw = self.read_quoted_string();
        let value = self.entities.decode_entities(raw).into_owned();
        self.consume_until(">");
        if !name.is_empty() {
            self.entities.declare(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(units: &[Decoded]) -> String {
        let mut buf = String::new();
        for unit in units {
            unit.push_to(&mut buf);
        }
        buf
    }

    #[test]
    fn test_read_and_peek() {
        let mut scanner = Scanner::new("ab");
        assert_eq!(scanner.peek(), Some('a'));
        assert_eq!(scanner.consume('b'), None);
        assert_eq!(scanner.read(), Some('a'));
        assert_eq!(scanner.consume('b'), Some('b'));
        assert_eq!(scanner.read(), None);
        assert!(scanner.is_eof());
    }

    #[test]
    fn test_next_char_expands_entities() {
        let mut scanner = Scanner::new("x&lt;&#65;");
        assert_eq!(scanner.next_char(), Some(Decoded::Char('x')));
        let lt = scanner.next_char().unwrap();
        assert_eq!(lt, Decoded::Entity("<".to_string()));
        assert!(!lt.is('<'));
        assert_eq!(scanner.next_char(), Some(Decoded::Entity("A".to_string())));
        assert_eq!(scanner.next_char(), None);
    }

    #[test]
    fn test_bare_ampersand_is_literal() {
        let mut scanner = Scanner::new("& b;<");
        assert_eq!(scanner.next_char(), Some(Decoded::Char('&')));
        assert_eq!(scanner.next_char(), Some(Decoded::Char(' ')));

        let mut open = Scanner::new("&amp");
        assert_eq!(open.next_char(), Some(Decoded::Char('&')));
        assert_eq!(open.read_name(), "amp");
    }

    #[test]
    fn test_name_stops_at_slash() {
        let mut scanner = Scanner::new("br/>x");
        assert_eq!(scanner.read_name(), "br");
        assert_eq!(scanner.peek(), Some('/'));
    }

    #[test]
    fn test_reference_end_stops_at_first_delimiter() {
        assert_eq!(reference_end("amp;rest"), Some(3));
        assert_eq!(reference_end("a b;"), None);
        assert_eq!(reference_end("a<b;"), None);
        assert_eq!(reference_end("&amp;"), None);
        assert_eq!(reference_end("x%y;"), None);
        assert_eq!(reference_end("abc"), None);

        let input = "&".repeat(1_000_000);
        let mut scanner = Scanner::new(&input);
        let mut count = 0;
        while let Some(unit) = scanner.next_char() {
            assert!(unit.is('&'));
            count += 1;
        }
        assert_eq!(count, 1_000_000);
    }

    #[test]
    fn test_consume_until_raw() {
        let mut scanner = Scanner::new("a &amp; <b>]]>tail");
        assert_eq!(scanner.consume_until_raw("]]>"), "a &amp; <b>");
        assert_eq!(scanner.read_name(), "tail");

        let mut open = Scanner::new("x & y");
        assert_eq!(open.consume_until_raw("-->"), "x & y");
        assert!(open.is_eof());
    }

    #[test]
    fn test_percent_is_literal_outside_dtd() {
        let mut scanner = Scanner::new("%x;");
        assert_eq!(scanner.next_char(), Some(Decoded::Char('%')));
    }

    #[test]
    fn test_peek_string_restores_cursor() {
        let mut scanner = Scanner::new("&amp;bc");
        let peeked = scanner.peek_string(2);
        assert_eq!(text(&peeked), "&b");
        assert_eq!(scanner.position(), 0);
        assert_eq!(text(&scanner.read_string(10)), "&bc");
    }

    #[test]
    fn test_consume_string_is_atomic() {
        let mut scanner = Scanner::new("--x");
        assert!(!scanner.consume_string("--y"));
        assert_eq!(scanner.position(), 0);
        assert!(scanner.consume_string("--"));
        assert_eq!(scanner.peek(), Some('x'));
    }

    #[test]
    fn test_consume_until() {
        let mut scanner = Scanner::new(" a - b --> tail");
        assert_eq!(scanner.consume_until("-->"), " a - b ");
        assert_eq!(scanner.peek(), Some(' '));

        let mut open = Scanner::new("never closed");
        assert_eq!(open.consume_until("]]>"), "never closed");
    }

    #[test]
    fn test_escaped_marker_does_not_terminate() {
        let mut scanner = Scanner::new("a&gt;b>");
        assert_eq!(scanner.consume_until(">"), "a>b");
    }

    #[test]
    fn test_read_name_and_quoted() {
        let mut scanner = Scanner::new("element-name=\"v&amp;1\" rest");
        assert_eq!(scanner.read_name(), "element-name");
        assert_eq!(scanner.consume('='), Some('='));
        assert_eq!(scanner.read_quoted_string(), "v&amp;1");
        assert_eq!(scanner.peek(), Some(' '));

        let mut single = Scanner::new("'it\"s'");
        assert_eq!(single.read_quoted_string(), "it\"s");
    }

    #[test]
    fn test_skip_space() {
        let mut scanner = Scanner::new("  \t\n\r hello");
        scanner.skip_space();
        assert_eq!(scanner.position(), 6);
    }

    #[test]
    fn test_parse_dtd_entities() {
        let mut scanner = Scanner::new(
            " d SYSTEM \"d.dtd\" [\n<!-- a > comment -->\n<!ENTITY x \"hi\">\n\
             <!ENTITY y \"&x; there\">\n<!ELEMENT d ANY>\n\
             <![INCLUDE[ <!ENTITY z 'zed'> ]]>\n<![IGNORE[ <!ENTITY w 'no'> ]]>\n]>rest",
        );
        scanner.parse_dtd();
        assert_eq!(scanner.entities().get("x"), Some("hi"));
        assert_eq!(scanner.entities().get("y"), Some("hi there"));
        assert_eq!(scanner.entities().get("z"), Some("zed"));
        assert_eq!(scanner.entities().get("w"), None);
        assert_eq!(scanner.read_name(), "rest");
    }

    #[test]
    fn test_parse_dtd_public_without_subset() {
        let mut scanner = Scanner::new(" html PUBLIC \"-//W3C//DTD\" \"x.dtd\"><a/>");
        scanner.parse_dtd();
        assert_eq!(scanner.peek(), Some('<'));
    }

    #[test]
    fn test_parse_dtd_truncated_terminates() {
        let mut scanner = Scanner::new(" d [ <!ENTITY x \"1\"> <!ELEMENT");
        scanner.parse_dtd();
        assert!(scanner.is_eof());
        assert_eq!(scanner.entities().get("x"), Some("1"));
    }

    #[test]
    fn test_stray_text_in_subset() {
        let mut scanner = Scanner::new(" d [ junk <!ENTITY x \"1\"> ]><a/>");
        scanner.parse_dtd();
        assert_eq!(scanner.entities().get("x"), Some("1"));
        assert_eq!(scanner.peek(), Some('<'));
    }

    #[test]
    fn test_parameter_entities_in_dtd() {
        let mut scanner = Scanner::new(" d [ <!ENTITY % p \"pe\"> %p; <!ENTITY q \"q\"> ]>");
        scanner.parse_dtd();
        assert_eq!(scanner.entities().get("p"), Some("pe"));
        assert_eq!(scanner.entities().get("q"), Some("q"));
    }
}
