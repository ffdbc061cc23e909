//! Shared mutable context advanced by the CSV sub-parsers
//!
//! One `ParserContext` lives for the duration of a field stream and is
//! mutated character by character: the span under construction, the escape
//! session flag, and the multi-character line-terminator look-ahead state.
//! The look-ahead count is an explicit field (not hidden in a closure) so
//! `reset` and `parse_eof` can inspect and clear it deterministically.

use crate::dialect::Dialect;
use crate::span::Span;

/// Outcome of feeding one character to the terminator look-ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TerminatorMatch {
    /// The full terminator has now been matched
    Complete,
    /// The character extends a partial match; more characters needed
    Partial,
    /// The character does not continue the match; the provisionally
    /// consumed terminator characters belong to the field content
    Mismatch,
}

/// Mutable state shared by the sub-parsers of one field parser.
#[derive(Debug, Default)]
pub struct ParserContext {
    span: Span,
    started: bool,
    escaping: bool,
    terminator_matched: usize,
    terminator_start: usize,
}

impl ParserContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all per-field state, ready for the next field.
    pub fn reset(&mut self) {
        self.span = Span::default();
        self.started = false;
        self.escaping = false;
        self.terminator_matched = 0;
        self.terminator_start = 0;
    }

    /// Begin the value span at `start`.
    pub fn start_value(&mut self, start: usize, was_quoted: bool) {
        self.span.start = start;
        self.span.len = 0;
        self.span.was_quoted = was_quoted;
        self.started = true;
    }

    /// Include the character at `pos` in the value, starting the span if
    /// this is the first content character.
    pub fn extend_value(&mut self, pos: usize, ch: char) {
        if !self.started {
            self.start_value(pos, false);
        }
        self.span.extend_to(pos + ch.len_utf8());
    }

    /// Finalize the span so it ends at `end` (exclusive). An empty field
    /// that never started yields a zero-length span at `end`.
    pub fn end_value(&mut self, end: usize) {
        if !self.started {
            self.span.start = end;
            self.started = true;
        }
        self.span.extend_to(end);
        self.span.is_complete = true;
    }

    /// Mark the span complete without moving its end.
    pub fn finish_value(&mut self) {
        self.span.is_complete = true;
    }

    pub fn start_escaping(&mut self) {
        self.escaping = true;
    }

    pub fn end_escaping(&mut self) {
        self.escaping = false;
    }

    pub fn is_escaping(&self) -> bool {
        self.escaping
    }

    /// Record that an escape sequence or doubled quote occurred, so the
    /// sanitizer must run on this field.
    pub fn mark_escaped(&mut self) {
        self.span.is_escaped = true;
    }

    /// Append a finished element span to the current array field.
    pub fn push_child(&mut self, child: Span) {
        if child.is_escaped {
            self.span.is_escaped = true;
        }
        self.span.children.push(child);
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Hand the finished span to the caller, leaving a default in place.
    pub fn take_span(&mut self) -> Span {
        std::mem::take(&mut self.span)
    }

    /// Number of terminator characters provisionally matched so far.
    pub fn pending_terminator(&self) -> usize {
        self.terminator_matched
    }

    /// Position where the current partial terminator match began.
    pub fn terminator_start(&self) -> usize {
        self.terminator_start
    }

    /// Start a terminator match with the character at `pos` already
    /// counted as matched.
    pub fn begin_terminator(&mut self, pos: usize) {
        self.terminator_matched = 1;
        self.terminator_start = pos;
    }

    pub fn clear_terminator(&mut self) {
        self.terminator_matched = 0;
    }

    /// Advance the terminator look-ahead with `ch`. On `Mismatch` the
    /// character is not consumed; the caller re-dispatches it after calling
    /// [`ParserContext::absorb_pending_terminator`].
    pub(crate) fn feed_terminator(&mut self, dialect: &Dialect, ch: char) -> TerminatorMatch {
        match dialect.terminator_char(self.terminator_matched) {
            Some(expected) if expected == ch => {
                self.terminator_matched += 1;
                if self.terminator_matched == dialect.terminator_char_count() {
                    TerminatorMatch::Complete
                } else {
                    TerminatorMatch::Partial
                }
            }
            _ => TerminatorMatch::Mismatch,
        }
    }

    /// Retroactively include all provisionally consumed terminator
    /// characters in the field content. `pos` is the position of the first
    /// character after them. No backtracking re-parse happens; the field
    /// length is simply extended.
    pub fn absorb_pending_terminator(&mut self, pos: usize) {
        if self.terminator_matched == 0 {
            return;
        }
        if !self.started {
            let start = self.terminator_start;
            self.start_value(start, false);
        }
        self.span.extend_to(pos);
        self.terminator_matched = 0;
    }
}
