//! Parser signal shared by the CSV and NDJSON character machines

/// Result of feeding one character into a parser.
///
/// The machines never abort a stream themselves: `Error` marks the position
/// where the input stopped matching the dialect grammar, and the caller
/// decides whether to skip the record or propagate a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// More characters are needed to finish the current field
    Continue,
    /// A field boundary was reached (delimiter consumed)
    Field,
    /// A record boundary was reached (line terminator consumed)
    Record,
    /// The input violates the dialect grammar at this position
    Error,
    /// End of input with no pending field or record
    Eof,
}

impl ParserState {
    /// True for `Field` and `Record`, the two states that finalize a span.
    pub fn is_boundary(self) -> bool {
        matches!(self, ParserState::Field | ParserState::Record)
    }
}
