//! Zero-copy span references into the source buffer
//!
//! A [`Span`] is an offset/length pair into the caller-owned character
//! buffer, plus the metadata flags the sanitizer needs. The parsing engine
//! owns no character data itself, only offsets and flags, which keeps the
//! per-character hot path allocation-free.

/// An offset/length reference into the source buffer.
///
/// Offsets are byte offsets, so a span can be sliced directly out of the
/// original `&str`. `children` is non-empty only for array fields: the
/// parent span covers the whole bracketed sub-buffer including prefix and
/// suffix, while each child spans only its own element content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character of the value
    pub start: usize,
    /// Byte length of the value
    pub len: usize,
    /// False until the field-ending condition was observed
    pub is_complete: bool,
    /// The value was enclosed in quote characters
    pub was_quoted: bool,
    /// An escape sequence or doubled quote occurred; the sanitizer must run
    pub is_escaped: bool,
    /// Element spans for array fields, in source appearance order
    pub children: Vec<Span>,
}

impl Span {
    /// Create a span covering `buffer[start..start + len]`.
    pub fn new(start: usize, len: usize) -> Self {
        Span {
            start,
            len,
            ..Span::default()
        }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// True when the span covers no characters.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slice the referenced text out of the source buffer.
    pub fn slice<'a>(&self, buffer: &'a str) -> &'a str {
        &buffer[self.start..self.start + self.len]
    }

    /// Grow the span so it ends at `end` (exclusive).
    pub fn extend_to(&mut self, end: usize) {
        debug_assert!(end >= self.start);
        self.len = end - self.start;
    }
}
