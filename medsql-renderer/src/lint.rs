//! Unrendered-token lint.
//!
//! Rendering leaves malformed placeholders alone. This pass finds anything
//! still shaped like `<WORD>` in the output (word characters and hyphens
//! between angle brackets) so it can be reported instead of reaching the
//! warehouse as a syntax error.

use serde::Serialize;

use crate::scanner::is_word_char;

/// One leftover token and its byte range in the rendered SQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnrenderedToken {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Every `<WORD>`-shaped token in `sql`, leftmost first, non-overlapping.
pub fn find_unrendered(sql: &str) -> Vec<UnrenderedToken> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    while let Some(offset) = sql[pos..].find('<') {
        let start = pos + offset;
        let body = &sql[start + 1..];
        let len = body
            .char_indices()
            .find(|(_, c)| !(is_word_char(*c) || *c == '-'))
            .map(|(i, _)| i)
            .unwrap_or(body.len());
        if len > 0 && body[len..].starts_with('>') {
            let end = start + 1 + len + 1;
            tokens.push(UnrenderedToken {
                start,
                end,
                text: sql[start..end].to_string(),
            });
            pos = end;
        } else {
            pos = start + 1;
        }
    }
    tokens
}
