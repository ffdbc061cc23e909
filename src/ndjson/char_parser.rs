//! Character-level parser for newline-delimited JSON-like records
//!
//! Recognizes one flat object of scalar values per record: quoted labels,
//! `:` separators, quoted or bare values, `,` between fields, `}` to close
//! the record, then the configured line terminator. This is intentionally
//! not a general JSON parser: nested objects and arrays as values are
//! grammar errors, and only enough of the grammar is validated to delimit
//! labels and values.

use crate::span::Span;
use crate::state::ParserState;

/// Label and value spans of one finished field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdjsonField {
    pub label: Span,
    pub value: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NdjsonState {
    /// Skipping whitespace, expecting the record-open bracket
    RecordStart,
    /// Skipping whitespace, expecting a quoted label (or `}`)
    LabelStart,
    /// Inside a quoted label
    Label,
    /// After a backslash inside a label
    LabelEscape,
    /// Skipping whitespace, expecting `:`
    Separator,
    /// Skipping whitespace, classifying the value as quoted or bare
    ValueStart,
    /// Inside a quoted value
    QuotedValue,
    /// After a backslash inside a quoted value
    QuotedValueEscape,
    /// After the closing quote of a value, expecting `,` or `}`
    AfterQuotedValue,
    /// Inside a bare literal (number, bool, null)
    BareValue,
    /// After a whitespace-ended bare value, expecting `,` or `}`
    AfterValue,
    /// After `}`, consuming the line terminator
    RecordEnd,
    /// An error was signaled; latched until reset
    Failed,
}

/// Streaming parser for one-object-per-line JSON-like input.
///
/// Drive it with [`parse`] one character at a time; the absolute position
/// is tracked internally (byte offsets, starting at zero from the last
/// [`reset`]). After a `Field` or `Record` signal, [`take_field`] returns
/// the finished label/value span pair; a `Record` for an empty object `{}`
/// has no field to take. After the record closes, the machine consumes the
/// line terminator and rolls straight into the next record, so one parser
/// instance can chew through an entire multi-record stream.
///
/// [`parse`]: NdjsonCharParser::parse
/// [`reset`]: NdjsonCharParser::reset
/// [`take_field`]: NdjsonCharParser::take_field
#[derive(Debug)]
pub struct NdjsonCharParser {
    terminator: String,
    state: NdjsonState,
    pos: usize,
    label: Span,
    value: Span,
    finished: Option<NdjsonField>,
    terminator_matched: usize,
}

impl NdjsonCharParser {
    /// Parser with the default `\n` record terminator.
    pub fn new() -> Self {
        Self::with_terminator("\n")
    }

    /// Parser with a custom record terminator (e.g. `"\r\n"`).
    pub fn with_terminator(terminator: impl Into<String>) -> Self {
        NdjsonCharParser {
            terminator: terminator.into(),
            state: NdjsonState::RecordStart,
            pos: 0,
            label: Span::default(),
            value: Span::default(),
            finished: None,
            terminator_matched: 0,
        }
    }

    /// Current absolute byte position (characters fed since reset).
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Return to the initial state, position zero, nothing pending.
    pub fn reset(&mut self) {
        self.state = NdjsonState::RecordStart;
        self.pos = 0;
        self.label = Span::default();
        self.value = Span::default();
        self.finished = None;
        self.terminator_matched = 0;
    }

    /// Label/value spans of the field finished by the last `Field` or
    /// `Record` signal.
    pub fn take_field(&mut self) -> Option<NdjsonField> {
        self.finished.take()
    }

    /// Feed one character.
    pub fn parse(&mut self, ch: char) -> ParserState {
        let pos = self.pos;
        self.pos += ch.len_utf8();
        let signal = self.step(ch, pos);
        if signal == ParserState::Error {
            self.state = NdjsonState::Failed;
        }
        signal
    }

    /// Flush at end of input. A record must be closed by `}` before EOF;
    /// a partially consumed trailing terminator is accepted.
    pub fn parse_eof(&mut self) -> ParserState {
        match self.state {
            NdjsonState::RecordStart | NdjsonState::RecordEnd => ParserState::Eof,
            _ => ParserState::Error,
        }
    }

    fn step(&mut self, ch: char, pos: usize) -> ParserState {
        match self.state {
            NdjsonState::RecordStart => {
                if ch.is_whitespace() {
                    return ParserState::Continue;
                }
                if ch == '{' {
                    self.state = NdjsonState::LabelStart;
                    return ParserState::Continue;
                }
                ParserState::Error
            }
            NdjsonState::LabelStart => {
                if ch.is_whitespace() {
                    return ParserState::Continue;
                }
                if ch == '"' {
                    self.label = Span::new(pos + 1, 0);
                    self.label.was_quoted = true;
                    self.state = NdjsonState::Label;
                    return ParserState::Continue;
                }
                if ch == '}' {
                    self.state = NdjsonState::RecordEnd;
                    return ParserState::Record;
                }
                ParserState::Error
            }
            NdjsonState::Label => {
                if ch == '"' {
                    self.label.is_complete = true;
                    self.state = NdjsonState::Separator;
                    return ParserState::Continue;
                }
                if ch == '\\' {
                    self.label.is_escaped = true;
                    self.label.extend_to(pos + 1);
                    self.state = NdjsonState::LabelEscape;
                    return ParserState::Continue;
                }
                self.label.extend_to(pos + ch.len_utf8());
                ParserState::Continue
            }
            NdjsonState::LabelEscape => {
                self.label.extend_to(pos + ch.len_utf8());
                self.state = NdjsonState::Label;
                ParserState::Continue
            }
            NdjsonState::Separator => {
                if ch.is_whitespace() {
                    return ParserState::Continue;
                }
                if ch == ':' {
                    self.state = NdjsonState::ValueStart;
                    return ParserState::Continue;
                }
                ParserState::Error
            }
            NdjsonState::ValueStart => {
                if ch.is_whitespace() {
                    return ParserState::Continue;
                }
                if ch == '"' {
                    self.value = Span::new(pos + 1, 0);
                    self.value.was_quoted = true;
                    self.state = NdjsonState::QuotedValue;
                    return ParserState::Continue;
                }
                // Flat objects of scalar values only
                if ch == '{' || ch == '[' || ch == ',' || ch == '}' {
                    return ParserState::Error;
                }
                self.value = Span::new(pos, 0);
                self.value.extend_to(pos + ch.len_utf8());
                self.state = NdjsonState::BareValue;
                ParserState::Continue
            }
            NdjsonState::QuotedValue => {
                if ch == '"' {
                    self.value.is_complete = true;
                    self.state = NdjsonState::AfterQuotedValue;
                    return ParserState::Continue;
                }
                if ch == '\\' {
                    self.value.is_escaped = true;
                    self.value.extend_to(pos + 1);
                    self.state = NdjsonState::QuotedValueEscape;
                    return ParserState::Continue;
                }
                self.value.extend_to(pos + ch.len_utf8());
                ParserState::Continue
            }
            NdjsonState::QuotedValueEscape => {
                self.value.extend_to(pos + ch.len_utf8());
                self.state = NdjsonState::QuotedValue;
                ParserState::Continue
            }
            NdjsonState::AfterQuotedValue | NdjsonState::AfterValue => {
                if ch.is_whitespace() {
                    return ParserState::Continue;
                }
                if ch == ',' {
                    self.finish_field();
                    self.state = NdjsonState::LabelStart;
                    return ParserState::Field;
                }
                if ch == '}' {
                    self.finish_field();
                    self.state = NdjsonState::RecordEnd;
                    return ParserState::Record;
                }
                ParserState::Error
            }
            NdjsonState::BareValue => {
                if ch == ',' {
                    self.finish_field();
                    self.state = NdjsonState::LabelStart;
                    return ParserState::Field;
                }
                if ch == '}' {
                    self.finish_field();
                    self.state = NdjsonState::RecordEnd;
                    return ParserState::Record;
                }
                if ch.is_whitespace() {
                    self.value.is_complete = true;
                    self.state = NdjsonState::AfterValue;
                    return ParserState::Continue;
                }
                self.value.extend_to(pos + ch.len_utf8());
                ParserState::Continue
            }
            NdjsonState::RecordEnd => {
                match self.terminator.chars().nth(self.terminator_matched) {
                    Some(expected) if expected == ch => {
                        self.terminator_matched += 1;
                        if self.terminator_matched == self.terminator.chars().count() {
                            self.terminator_matched = 0;
                            self.state = NdjsonState::RecordStart;
                        }
                        ParserState::Continue
                    }
                    _ if self.terminator_matched == 0 && ch.is_whitespace() => {
                        // Trailing whitespace before the terminator
                        ParserState::Continue
                    }
                    _ => ParserState::Error,
                }
            }
            NdjsonState::Failed => ParserState::Error,
        }
    }

    fn finish_field(&mut self) {
        self.label.is_complete = true;
        self.value.is_complete = true;
        self.finished = Some(NdjsonField {
            label: std::mem::take(&mut self.label),
            value: std::mem::take(&mut self.value),
        });
    }
}

impl Default for NdjsonCharParser {
    fn default() -> Self {
        Self::new()
    }
}
