//! XML Entity Resolution
//!
//! Handles resolution of entity references:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//! - Entities declared in a DOCTYPE internal subset
//!
//! The table is owned by a single scanner and dropped with it.

use super::scanner::reference_end;
use memchr::memchr;
use std::borrow::Cow;
use std::collections::HashMap;

/// What to substitute for a reference the table cannot resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityPolicy {
    /// Substitute the bare name (`&foo;` becomes `foo`)
    #[default]
    PassName,
    /// Keep the reference text as-is (`&foo;` stays `&foo;`)
    KeepRaw,
}

/// Mutable name -> replacement text table
#[derive(Debug, Clone)]
pub struct EntityTable {
    entries: HashMap<String, String>,
    policy: EntityPolicy,
}

impl Default for EntityTable {
    fn default() -> Self {
        Self::new(EntityPolicy::default())
    }
}

impl EntityTable {
    /// Create a table seeded with the five predefined entities
    pub fn new(policy: EntityPolicy) -> Self {
        let entries = [("lt", "<"), ("gt", ">"), ("amp", "&"), ("apos", "'"), ("quot", "\"")]
            .into_iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        EntityTable { entries, policy }
    }

    /// Register a declared entity. The first declaration of a name wins.
    ///
    /// Returns false if the name was already declared.
    pub fn declare(&mut self, name: &str, value: String) -> bool {
        if self.entries.contains_key(name) {
            log::debug!("ignoring redeclaration of entity '{}'", name);
            return false;
        }
        log::debug!("declared entity '{}' ({} bytes)", name, value.len());
        self.entries.insert(name.to_string(), value);
        true
    }

    /// Look up a declared entity by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Number of known entities, predefined ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the body of a reference (without `&`/`%` and `;`)
    ///
    /// `sigil` is the character that opened the reference; it is only used
    /// when the policy keeps unresolved references raw.
    pub fn resolve(&self, name: &str, sigil: char) -> String {
        let resolved = match name.strip_prefix('#') {
            Some(num) => decode_numeric(num).map(String::from),
            None => self.get(name).map(str::to_string),
        };
        match resolved {
            Some(text) => text,
            None => {
                log::trace!("unresolved entity '{}', policy {:?}", name, self.policy);
                match self.policy {
                    EntityPolicy::PassName => name.to_string(),
                    EntityPolicy::KeepRaw => format!("{}{};", sigil, name),
                }
            }
        }
    }

    /// Replace every `&name;` reference in `input`
    ///
    /// Returns Borrowed if no references are present.
    pub fn decode_entities<'s>(&self, input: &'s str) -> Cow<'s, str> {
        let bytes = input.as_bytes();
        if memchr(b'&', bytes).is_none() {
            return Cow::Borrowed(input);
        }

        let mut result = String::with_capacity(input.len());
        let mut pos = 0;
        while let Some(amp) = memchr(b'&', &bytes[pos..]) {
            let start = pos + amp;
            result.push_str(&input[pos..start]);
            match reference_end(&input[start + 1..]) {
                Some(len) => {
                    let name = &input[start + 1..start + 1 + len];
                    result.push_str(&self.resolve(name, '&'));
                    pos = start + len + 2;
                }
                None => {
                    // No terminator, keep the ampersand
                    result.push('&');
                    pos = start + 1;
                }
            }
        }
        result.push_str(&input[pos..]);
        Cow::Owned(result)
    }
}

/// Decode a numeric character reference body (after the `#`)
fn decode_numeric(entity: &str) -> Option<char> {
    let codepoint = match entity.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => entity.parse::<u32>().ok()?,
    };
    char::from_u32(codepoint)
}

/// Encode text for XML output (escape special characters)
pub fn encode_text(input: &str) -> Cow<'_, str> {
    // Fast path: check if any escaping needed
    if !input.bytes().any(|b| matches!(b, b'<' | b'>' | b'&' | b'"' | b'\'')) {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}
