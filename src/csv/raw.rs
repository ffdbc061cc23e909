//! Sub-parser for raw (unquoted) field content

use crate::csv::context::{ParserContext, TerminatorMatch};
use crate::dialect::Dialect;
use crate::state::ParserState;

/// Character classifier for unquoted fields.
///
/// All mutable state lives in the shared [`ParserContext`]: the escape
/// session flag and the terminator look-ahead count, both of which must
/// survive across per-character calls.
#[derive(Debug, Default)]
pub(crate) struct RawParser;

impl RawParser {
    pub(crate) fn parse(
        &mut self,
        dialect: &Dialect,
        ctx: &mut ParserContext,
        ch: char,
        pos: usize,
    ) -> ParserState {
        // An open escape session takes the character literally, even if it
        // would otherwise be a delimiter or terminator start.
        if ctx.is_escaping() {
            ctx.end_escaping();
            ctx.extend_value(pos, ch);
            return ParserState::Continue;
        }

        if ctx.pending_terminator() > 0 {
            match ctx.feed_terminator(dialect, ch) {
                TerminatorMatch::Complete => {
                    let end = ctx.terminator_start();
                    ctx.end_value(end);
                    ctx.clear_terminator();
                    return ParserState::Record;
                }
                TerminatorMatch::Partial => return ParserState::Continue,
                TerminatorMatch::Mismatch => {
                    // The partial match was field content after all. The
                    // mismatching character is re-classified below: it may
                    // itself be a delimiter, escape char or terminator start.
                    ctx.absorb_pending_terminator(pos);
                }
            }
        }

        if dialect.escape() == Some(ch) {
            ctx.start_escaping();
            ctx.mark_escaped();
            ctx.extend_value(pos, ch);
            return ParserState::Continue;
        }

        if ch == dialect.delimiter() {
            ctx.end_value(pos);
            return ParserState::Field;
        }

        if ch == dialect.terminator_first() {
            ctx.begin_terminator(pos);
            if dialect.terminator_char_count() == 1 {
                ctx.end_value(pos);
                ctx.clear_terminator();
                return ParserState::Record;
            }
            return ParserState::Continue;
        }

        ctx.extend_value(pos, ch);
        ParserState::Continue
    }
}
