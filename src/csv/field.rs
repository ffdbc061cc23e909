//! Top-level field parser dispatching the CSV sub-parsers

use crate::csv::array::ArrayParser;
use crate::csv::context::ParserContext;
use crate::csv::quoted::QuotedParser;
use crate::csv::raw::RawParser;
use crate::dialect::Dialect;
use crate::span::Span;
use crate::state::ParserState;

/// Which sub-parser is active for the current field.
#[derive(Debug)]
enum Active {
    /// No character classified yet for this field
    Unset,
    Raw,
    Quoted,
    Array,
    /// A `Field` or `Record` signal was returned; waiting for `reset`
    Done,
    /// An `Error` signal was returned; latched until `reset`
    Failed,
}

/// How the first significant character of a field classifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueStart {
    Whitespace,
    Quote(char),
    ArrayPrefix,
    Other,
}

/// Streaming CSV field parser.
///
/// Feed one character at a time with its absolute byte position; each call
/// returns a [`ParserState`] signal. After consuming a `Field` or `Record`
/// signal the caller takes the finished span and must call [`reset`] before
/// feeding the next character; skipping the reset leaves field boundaries
/// undefined. After an `Error` signal the parser latches: every further
/// call keeps returning `Error` until `reset`.
///
/// [`reset`]: FieldParser::reset
///
/// # Examples
///
/// ```
/// use flatstream::{Dialect, FieldParser, ParserState};
///
/// let mut parser = FieldParser::new(Dialect::csv());
/// let input = "foo,bar\n";
/// let mut fields = Vec::new();
/// for (pos, ch) in input.char_indices() {
///     match parser.parse(ch, pos) {
///         ParserState::Field | ParserState::Record => {
///             fields.push(parser.take_span().slice(input).to_string());
///             parser.reset();
///         }
///         _ => {}
///     }
/// }
/// assert_eq!(fields, vec!["foo", "bar"]);
/// ```
#[derive(Debug)]
pub struct FieldParser {
    dialect: Dialect,
    ctx: ParserContext,
    state: Active,
    raw: RawParser,
    quoted: QuotedParser,
    array: Option<ArrayParser>,
}

impl FieldParser {
    pub fn new(dialect: Dialect) -> Self {
        let quote = dialect.quote().unwrap_or('"');
        let double_quote = dialect.double_quote();
        let array = dialect.element_dialect().map(ArrayParser::new);
        FieldParser {
            dialect,
            ctx: ParserContext::new(),
            state: Active::Unset,
            raw: RawParser,
            quoted: QuotedParser::new(quote, double_quote),
            array,
        }
    }

    /// The dialect this parser was built with.
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Feed one character at absolute byte position `pos`.
    pub fn parse(&mut self, ch: char, pos: usize) -> ParserState {
        let signal = match self.state {
            Active::Unset => match self.classify(ch) {
                ValueStart::Whitespace => ParserState::Continue,
                ValueStart::Quote(quote) => {
                    self.ctx.start_value(pos + ch.len_utf8(), true);
                    self.quoted = QuotedParser::new(quote, self.dialect.double_quote());
                    self.state = Active::Quoted;
                    ParserState::Continue
                }
                ValueStart::ArrayPrefix => {
                    self.ctx.start_value(pos, false);
                    self.ctx.extend_value(pos, ch);
                    if let Some(array) = self.array.as_mut() {
                        array.reset();
                    }
                    self.state = Active::Array;
                    ParserState::Continue
                }
                ValueStart::Other => {
                    self.state = Active::Raw;
                    self.raw.parse(&self.dialect, &mut self.ctx, ch, pos)
                }
            },
            Active::Raw => self.raw.parse(&self.dialect, &mut self.ctx, ch, pos),
            Active::Quoted => self.quoted.parse(&self.dialect, &mut self.ctx, ch, pos),
            Active::Array => match self.array.as_mut() {
                Some(array) => array.parse(&self.dialect, &mut self.ctx, ch, pos),
                None => ParserState::Error,
            },
            Active::Done | Active::Failed => ParserState::Error,
        };
        self.settle(signal)
    }

    /// Flush pending state at end of input. Returns `Field` for a pending
    /// non-empty field, `Error` for an unterminated quoted field or
    /// unclosed array, and `Eof` when nothing was pending.
    pub fn parse_eof(&mut self, pos: usize) -> ParserState {
        let signal = match self.state {
            Active::Unset | Active::Done => ParserState::Eof,
            Active::Raw => {
                // A trailing escape character stays literal content
                if self.ctx.is_escaping() {
                    self.ctx.end_escaping();
                }
                self.ctx.absorb_pending_terminator(pos);
                if self.ctx.started() {
                    self.ctx.end_value(pos);
                    ParserState::Field
                } else {
                    ParserState::Eof
                }
            }
            Active::Quoted => self.quoted.parse_eof(&mut self.ctx),
            Active::Array => match self.array.as_mut() {
                Some(array) => array.parse_eof(&mut self.ctx),
                None => ParserState::Error,
            },
            Active::Failed => ParserState::Error,
        };
        self.settle(signal)
    }

    /// Clear the context and return to the unset state, ready for the next
    /// field.
    pub fn reset(&mut self) {
        self.ctx.reset();
        self.state = Active::Unset;
    }

    /// The span under construction (finished after `Field`/`Record`).
    pub fn span(&self) -> &Span {
        self.ctx.span()
    }

    /// Take the finished span, leaving an empty one behind.
    pub fn take_span(&mut self) -> Span {
        self.ctx.take_span()
    }

    /// Value-start classifier, consulted exactly once per field on the
    /// first significant character.
    fn classify(&self, ch: char) -> ValueStart {
        if self.dialect.is_whitespace(ch) {
            return ValueStart::Whitespace;
        }
        if self.dialect.quote() == Some(ch) {
            return ValueStart::Quote(ch);
        }
        if self.dialect.array_prefix() == Some(ch) {
            return ValueStart::ArrayPrefix;
        }
        ValueStart::Other
    }

    fn settle(&mut self, signal: ParserState) -> ParserState {
        match signal {
            ParserState::Field | ParserState::Record => self.state = Active::Done,
            ParserState::Error => self.state = Active::Failed,
            ParserState::Continue | ParserState::Eof => {}
        }
        signal
    }
}
