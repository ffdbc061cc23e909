//! Post-processing of finalized spans into logical values
//!
//! Two fixed stages: sentinel resolution first (on the pre-unescape text,
//! unquoted fields only), then unescaping. Unescaped fields come back as
//! zero-copy slices of the original buffer; only fields where escaping
//! actually occurred allocate.

use std::borrow::Cow;

use crate::dialect::Dialect;
use crate::span::Span;

/// Converts a raw matched span into its logical value.
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer<'d> {
    dialect: &'d Dialect,
}

impl<'d> Sanitizer<'d> {
    pub fn new(dialect: &'d Dialect) -> Self {
        Sanitizer { dialect }
    }

    /// Resolve the logical value of `span` within `buffer`.
    ///
    /// Returns `None` when the field is the null sentinel. A quoted field
    /// whose text equals the null sequence is never treated as null: the
    /// quoting makes it an explicit literal.
    pub fn sanitize<'a>(&self, buffer: &'a str, span: &Span) -> Option<Cow<'a, str>> {
        let raw = span.slice(buffer);

        // Stage 1: sentinel matching, on the raw text, unquoted only.
        if !span.was_quoted {
            if self.dialect.null_sequence() == Some(raw) {
                return None;
            }
            if self.dialect.empty_sequence() == Some(raw) {
                return Some(Cow::Borrowed(""));
            }
        }

        // Stage 2: unescape only when an escape actually occurred.
        if !span.is_escaped {
            return Some(Cow::Borrowed(raw));
        }
        Some(Cow::Owned(self.unescape(raw)))
    }

    /// Single pass collapsing escape-char pairs and doubled quotes to one
    /// literal character. A trailing escape char with no follower is kept
    /// literally.
    fn unescape(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();
        while let Some(ch) = chars.next() {
            if self.dialect.escape() == Some(ch) {
                match chars.next() {
                    Some(next) => out.push(next),
                    None => out.push(ch),
                }
                continue;
            }
            if self.dialect.quote() == Some(ch)
                && self.dialect.double_quote()
                && chars.peek() == Some(&ch)
            {
                chars.next();
                out.push(ch);
                continue;
            }
            out.push(ch);
        }
        out
    }
}
