//! Sub-parser for quoted field content, including the doubled-quote variant

use crate::csv::context::{ParserContext, TerminatorMatch};
use crate::dialect::Dialect;
use crate::state::ParserState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuotedState {
    /// Between the quotes, consuming content
    Inside,
    /// A quote was seen; it is either the closing quote or, with
    /// doubled-quote enabled, the first half of a literal quote pair
    QuoteSeen { quote_pos: usize },
    /// The field closed on a multi-character terminator start; the rest of
    /// the terminator must follow
    Closed,
}

/// Character classifier for quoted fields.
///
/// The value span covers the content between the outer quotes; doubled
/// quotes stay raw in the span and are collapsed by the sanitizer. When
/// `double_quote` is enabled the `QuoteSeen` state resolves run-length
/// parity of consecutive quotes: each pair folds back to `Inside`, so an
/// odd trailing quote is the field terminator.
#[derive(Debug)]
pub(crate) struct QuotedParser {
    quote: char,
    double_quote: bool,
    state: QuotedState,
}

impl QuotedParser {
    pub(crate) fn new(quote: char, double_quote: bool) -> Self {
        QuotedParser {
            quote,
            double_quote,
            state: QuotedState::Inside,
        }
    }

    pub(crate) fn parse(
        &mut self,
        dialect: &Dialect,
        ctx: &mut ParserContext,
        ch: char,
        pos: usize,
    ) -> ParserState {
        match self.state {
            QuotedState::Inside => {
                if ctx.is_escaping() {
                    ctx.end_escaping();
                    ctx.extend_value(pos, ch);
                    return ParserState::Continue;
                }
                // Escape-char handling is checked before doubled-quote
                // handling; the order is fixed by the dialect contract.
                if dialect.escape() == Some(ch) {
                    ctx.start_escaping();
                    ctx.mark_escaped();
                    ctx.extend_value(pos, ch);
                    return ParserState::Continue;
                }
                if ch == self.quote {
                    self.state = QuotedState::QuoteSeen { quote_pos: pos };
                    return ParserState::Continue;
                }
                ctx.extend_value(pos, ch);
                ParserState::Continue
            }
            QuotedState::QuoteSeen { quote_pos } => {
                if ch == self.quote && self.double_quote {
                    // Doubled quote: one literal quote character
                    ctx.mark_escaped();
                    ctx.extend_value(pos, ch);
                    self.state = QuotedState::Inside;
                    return ParserState::Continue;
                }
                if ch == dialect.delimiter() {
                    ctx.end_value(quote_pos);
                    return ParserState::Field;
                }
                if ch == dialect.terminator_first() {
                    ctx.end_value(quote_pos);
                    ctx.begin_terminator(pos);
                    if dialect.terminator_char_count() == 1 {
                        ctx.clear_terminator();
                        return ParserState::Record;
                    }
                    self.state = QuotedState::Closed;
                    return ParserState::Continue;
                }
                // Content after a closing quote violates the grammar
                ParserState::Error
            }
            QuotedState::Closed => match ctx.feed_terminator(dialect, ch) {
                TerminatorMatch::Complete => {
                    ctx.clear_terminator();
                    ParserState::Record
                }
                TerminatorMatch::Partial => ParserState::Continue,
                TerminatorMatch::Mismatch => ParserState::Error,
            },
        }
    }

    /// Flush at end of input: a pending closing quote yields `Field`; an
    /// unterminated quote or a half-matched terminator is a grammar error.
    pub(crate) fn parse_eof(&mut self, ctx: &mut ParserContext) -> ParserState {
        match self.state {
            QuotedState::Inside => ParserState::Error,
            QuotedState::QuoteSeen { quote_pos } => {
                ctx.end_value(quote_pos);
                ParserState::Field
            }
            QuotedState::Closed => ParserState::Error,
        }
    }
}
