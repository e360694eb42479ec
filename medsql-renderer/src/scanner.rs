//! Placeholder scanner.
//!
//! Recognizes the four placeholder shapes of a query skeleton:
//!
//! ```text
//! <SCHEMA>
//! <TAG-TEMPLATE><ARG-DOMAIN><INDEX>
//! <ARG-DOMAIN><INDEX>
//! <TAG-TEMPLATE>
//! ```
//!
//! `TAG` and `DOMAIN` are (possibly empty) runs of word characters (Unicode
//! alphanumerics and `_`); `INDEX` is one or more ASCII digits. Matching is
//! exact-or-nothing: anything else is ordinary text.

use std::fmt;

pub(crate) const SCHEMA_MARKER: &str = "<SCHEMA>";
const TEMPLATE_SUFFIX: &str = "-TEMPLATE>";
const ARG_PREFIX: &str = "<ARG-";

/// One placeholder grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    /// `<SCHEMA>`
    Schema,
    /// `<TAG-TEMPLATE><ARG-DOMAIN><INDEX>`
    TemplateArg,
    /// `<ARG-DOMAIN><INDEX>`
    BareArg,
    /// `<TAG-TEMPLATE>`
    NoArgTemplate,
}

impl Grammar {
    /// Tried in this order when several grammars match at the same offset.
    const BY_SPECIFICITY: [Grammar; 4] = [
        Grammar::Schema,
        Grammar::TemplateArg,
        Grammar::NoArgTemplate,
        Grammar::BareArg,
    ];
}

/// A parsed placeholder borrowing its components from the scanned text.
///
/// `index` is kept as the literal digit run; it is parsed when resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder<'a> {
    SchemaMarker,
    TemplateArg {
        tag: &'a str,
        domain: &'a str,
        index: &'a str,
    },
    BareArg {
        domain: &'a str,
        index: &'a str,
    },
    NoArgTemplate {
        tag: &'a str,
    },
}

impl Placeholder<'_> {
    pub fn grammar(&self) -> Grammar {
        match self {
            Placeholder::SchemaMarker => Grammar::Schema,
            Placeholder::TemplateArg { .. } => Grammar::TemplateArg,
            Placeholder::BareArg { .. } => Grammar::BareArg,
            Placeholder::NoArgTemplate { .. } => Grammar::NoArgTemplate,
        }
    }
}

impl fmt::Display for Placeholder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::SchemaMarker => f.write_str(SCHEMA_MARKER),
            Placeholder::TemplateArg { tag, domain, index } => {
                write!(f, "<{tag}-TEMPLATE><ARG-{domain}><{index}>")
            }
            Placeholder::BareArg { domain, index } => write!(f, "<ARG-{domain}><{index}>"),
            Placeholder::NoArgTemplate { tag } => write!(f, "<{tag}-TEMPLATE>"),
        }
    }
}

/// A placeholder and its byte range in the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderMatch<'a> {
    pub start: usize,
    pub end: usize,
    pub placeholder: Placeholder<'a>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Leftmost match of exactly `grammar` in `text`.
pub fn find_first(text: &str, grammar: Grammar) -> Option<PlaceholderMatch<'_>> {
    text.match_indices('<')
        .find_map(|(start, _)| match_at(text, start, grammar))
}

/// Lazily scan `text` for non-overlapping placeholders of any grammar, leftmost first.
///
/// When several grammars match at one offset the most specific wins:
/// schema marker, then argument-qualified template, then bare template,
/// then bare argument.
pub fn scan(text: &str) -> Scan<'_> {
    Scan { text, pos: 0 }
}

/// Iterator returned by [`scan`].
#[derive(Debug, Clone)]
pub struct Scan<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Scan<'a> {
    type Item = PlaceholderMatch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(offset) = self.text[self.pos..].find('<') {
            let start = self.pos + offset;
            let found = Grammar::BY_SPECIFICITY
                .iter()
                .find_map(|g| match_at(self.text, start, *g));
            match found {
                Some(m) => {
                    self.pos = m.end;
                    return Some(m);
                }
                None => self.pos = start + 1,
            }
        }
        self.pos = self.text.len();
        None
    }
}

// ---------------------------------------------------------------------------
// Grammar matchers
// ---------------------------------------------------------------------------

fn match_at(text: &str, start: usize, grammar: Grammar) -> Option<PlaceholderMatch<'_>> {
    let rest = &text[start..];
    let (len, placeholder) = match grammar {
        Grammar::Schema => rest
            .starts_with(SCHEMA_MARKER)
            .then_some((SCHEMA_MARKER.len(), Placeholder::SchemaMarker))?,
        Grammar::TemplateArg => {
            let (tag_len, tag) = template_tag(rest)?;
            let (arg_len, domain, index) = bare_arg(&rest[tag_len..])?;
            (tag_len + arg_len, Placeholder::TemplateArg { tag, domain, index })
        }
        Grammar::BareArg => {
            let (len, domain, index) = bare_arg(rest)?;
            (len, Placeholder::BareArg { domain, index })
        }
        Grammar::NoArgTemplate => {
            let (len, tag) = template_tag(rest)?;
            (len, Placeholder::NoArgTemplate { tag })
        }
    };
    Some(PlaceholderMatch {
        start,
        end: start + len,
        placeholder,
    })
}

/// `<TAG-TEMPLATE>` at the start of `s` → (length, tag).
fn template_tag(s: &str) -> Option<(usize, &str)> {
    let body = s.strip_prefix('<')?;
    let tag_len = word_len(body);
    body[tag_len..]
        .starts_with(TEMPLATE_SUFFIX)
        .then(|| (1 + tag_len + TEMPLATE_SUFFIX.len(), &body[..tag_len]))
}

/// `<ARG-DOMAIN><INDEX>` at the start of `s` → (length, domain, index).
fn bare_arg(s: &str) -> Option<(usize, &str, &str)> {
    let body = s.strip_prefix(ARG_PREFIX)?;
    let domain_len = word_len(body);
    let domain = &body[..domain_len];
    let after = body[domain_len..].strip_prefix("><")?;
    let digits = after.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || !after[digits..].starts_with('>') {
        return None;
    }
    let len = ARG_PREFIX.len() + domain_len + 2 + digits + 1;
    Some((len, domain, &after[..digits]))
}

fn word_len(s: &str) -> usize {
    s.char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
