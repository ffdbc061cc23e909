//! Sub-parser for array fields (one level of bracketed sub-values)

use crate::csv::context::{ParserContext, TerminatorMatch};
use crate::csv::quoted::QuotedParser;
use crate::csv::raw::RawParser;
use crate::dialect::Dialect;
use crate::state::ParserState;

#[derive(Debug)]
enum ArrayState {
    /// Expecting the first character of an element, or the suffix
    ElementStart { first: bool },
    /// Inside an unquoted element
    RawElement,
    /// Inside a quoted element
    QuotedElement(QuotedParser),
    /// The suffix was consumed; expecting the field delimiter or terminator
    AfterSuffix,
}

/// Character classifier for array fields.
///
/// Re-enters the raw and quoted sub-parsers for each element, driven by a
/// derived element dialect in which the array delimiter plays the field
/// delimiter role and the suffix plays the (single-character) terminator
/// role. Each finished element becomes a child span of the outer field
/// span; the outer span covers the whole bracketed region including prefix
/// and suffix. Nesting depth is exactly one: a prefix character inside an
/// element is ordinary content.
#[derive(Debug)]
pub(crate) struct ArrayParser {
    element_dialect: Dialect,
    elem_ctx: ParserContext,
    raw: RawParser,
    state: ArrayState,
}

impl ArrayParser {
    pub(crate) fn new(element_dialect: Dialect) -> Self {
        ArrayParser {
            element_dialect,
            elem_ctx: ParserContext::new(),
            raw: RawParser,
            state: ArrayState::ElementStart { first: true },
        }
    }

    /// Prepare for a new array field.
    pub(crate) fn reset(&mut self) {
        self.elem_ctx.reset();
        self.state = ArrayState::ElementStart { first: true };
    }

    pub(crate) fn parse(
        &mut self,
        dialect: &Dialect,
        ctx: &mut ParserContext,
        ch: char,
        pos: usize,
    ) -> ParserState {
        match &mut self.state {
            ArrayState::ElementStart { first } => {
                let first = *first;
                ctx.extend_value(pos, ch);
                if dialect.array_suffix() == Some(ch) {
                    if !first {
                        // Trailing empty element, like a trailing delimiter
                        self.elem_ctx.end_value(pos);
                        self.finish_element(ctx);
                    }
                    ctx.finish_value();
                    self.state = ArrayState::AfterSuffix;
                    return ParserState::Continue;
                }
                if dialect.is_whitespace(ch) {
                    return ParserState::Continue;
                }
                if self.element_dialect.quote() == Some(ch) {
                    self.elem_ctx.start_value(pos + ch.len_utf8(), true);
                    self.state = ArrayState::QuotedElement(QuotedParser::new(
                        ch,
                        self.element_dialect.double_quote(),
                    ));
                    return ParserState::Continue;
                }
                self.state = ArrayState::RawElement;
                let signal = self.raw.parse(&self.element_dialect, &mut self.elem_ctx, ch, pos);
                self.dispatch(ctx, signal)
            }
            ArrayState::RawElement => {
                ctx.extend_value(pos, ch);
                let signal = self.raw.parse(&self.element_dialect, &mut self.elem_ctx, ch, pos);
                self.dispatch(ctx, signal)
            }
            ArrayState::QuotedElement(quoted) => {
                ctx.extend_value(pos, ch);
                let signal = quoted.parse(&self.element_dialect, &mut self.elem_ctx, ch, pos);
                self.dispatch(ctx, signal)
            }
            ArrayState::AfterSuffix => {
                if ctx.pending_terminator() > 0 {
                    return match ctx.feed_terminator(dialect, ch) {
                        TerminatorMatch::Complete => {
                            ctx.clear_terminator();
                            ParserState::Record
                        }
                        TerminatorMatch::Partial => ParserState::Continue,
                        TerminatorMatch::Mismatch => ParserState::Error,
                    };
                }
                if ch == dialect.delimiter() {
                    return ParserState::Field;
                }
                if ch == dialect.terminator_first() {
                    ctx.begin_terminator(pos);
                    if dialect.terminator_char_count() == 1 {
                        ctx.clear_terminator();
                        return ParserState::Record;
                    }
                    return ParserState::Continue;
                }
                // Content after the array suffix violates the grammar
                ParserState::Error
            }
        }
    }

    /// Flush at end of input. Only a fully closed array can be flushed;
    /// anything mid-array is an unclosed bracket.
    pub(crate) fn parse_eof(&mut self, ctx: &mut ParserContext) -> ParserState {
        match self.state {
            ArrayState::AfterSuffix if ctx.pending_terminator() == 0 => ParserState::Field,
            _ => ParserState::Error,
        }
    }

    /// Map an element-level signal onto the outer field.
    fn dispatch(&mut self, ctx: &mut ParserContext, signal: ParserState) -> ParserState {
        match signal {
            ParserState::Continue => ParserState::Continue,
            ParserState::Field => {
                // Element delimiter: next element follows
                self.finish_element(ctx);
                self.state = ArrayState::ElementStart { first: false };
                ParserState::Continue
            }
            ParserState::Record => {
                // Element terminator is the array suffix
                self.finish_element(ctx);
                ctx.finish_value();
                self.state = ArrayState::AfterSuffix;
                ParserState::Continue
            }
            ParserState::Error | ParserState::Eof => ParserState::Error,
        }
    }

    fn finish_element(&mut self, ctx: &mut ParserContext) {
        let child = self.elem_ctx.take_span();
        ctx.push_child(child);
        self.elem_ctx.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialect() -> Dialect {
        Dialect::builder()
            .delimiter(';')
            .array('[', '|', ']')
            .build()
            .unwrap()
    }

    /// Drive the array parser the way the orchestrator does: the prefix
    /// character opens the outer span, everything after goes through parse.
    fn feed(dialect: &Dialect, input: &str) -> (Vec<ParserState>, ParserContext) {
        let mut parser = ArrayParser::new(dialect.element_dialect().unwrap());
        let mut ctx = ParserContext::new();
        let mut signals = Vec::new();
        for (pos, ch) in input.char_indices() {
            if pos == 0 {
                ctx.start_value(pos, false);
                ctx.extend_value(pos, ch);
                continue;
            }
            let state = parser.parse(dialect, &mut ctx, ch, pos);
            if state != ParserState::Continue {
                signals.push(state);
            }
        }
        (signals, ctx)
    }

    #[test]
    fn test_three_elements() {
        let d = dialect();
        let input = "[foo|bar|qrz];";
        let (signals, ctx) = feed(&d, input);
        assert_eq!(signals, vec![ParserState::Field]);
        let span = ctx.span();
        assert_eq!(span.slice(input), "[foo|bar|qrz]");
        assert_eq!(span.children.len(), 3);
        assert_eq!(span.children[0].slice(input), "foo");
        assert_eq!(span.children[1].slice(input), "bar");
        assert_eq!(span.children[2].slice(input), "qrz");
        assert!(span.children.iter().all(|c| c.is_complete));
    }

    #[test]
    fn test_empty_array() {
        let d = dialect();
        let (signals, ctx) = feed(&d, "[];");
        assert_eq!(signals, vec![ParserState::Field]);
        assert!(ctx.span().children.is_empty());
        assert_eq!(ctx.span().slice("[];"), "[]");
    }

    #[test]
    fn test_empty_elements() {
        let d = dialect();
        let input = "[a||];";
        let (signals, ctx) = feed(&d, input);
        assert_eq!(signals, vec![ParserState::Field]);
        let span = ctx.span();
        assert_eq!(span.children.len(), 3);
        assert_eq!(span.children[0].slice(input), "a");
        assert!(span.children[1].is_empty());
        assert!(span.children[2].is_empty());
    }

    #[test]
    fn test_quoted_element() {
        let d = dialect();
        let input = "[\"a|b\"|c];";
        let (signals, ctx) = feed(&d, input);
        assert_eq!(signals, vec![ParserState::Field]);
        let span = ctx.span();
        assert_eq!(span.children.len(), 2);
        assert_eq!(span.children[0].slice(input), "a|b");
        assert!(span.children[0].was_quoted);
        assert_eq!(span.children[1].slice(input), "c");
    }

    #[test]
    fn test_nested_prefix_is_content() {
        let d = dialect();
        let input = "[a[b|c];";
        let (signals, ctx) = feed(&d, input);
        assert_eq!(signals, vec![ParserState::Field]);
        assert_eq!(ctx.span().children[0].slice(input), "a[b");
    }

    #[test]
    fn test_record_terminator_after_suffix() {
        let d = dialect();
        let input = "[a|b]\n";
        let (signals, ctx) = feed(&d, input);
        assert_eq!(signals, vec![ParserState::Record]);
        assert_eq!(ctx.span().children.len(), 2);
    }

    #[test]
    fn test_content_after_suffix_is_error() {
        let d = dialect();
        let (signals, _) = feed(&d, "[a]x");
        assert_eq!(signals, vec![ParserState::Error]);
    }

    #[test]
    fn test_eof_mid_array_is_error() {
        let d = dialect();
        let mut parser = ArrayParser::new(d.element_dialect().unwrap());
        let mut ctx = ParserContext::new();
        ctx.start_value(0, false);
        ctx.extend_value(0, '[');
        for (pos, ch) in "[a|".char_indices().skip(1) {
            parser.parse(&d, &mut ctx, ch, pos);
        }
        assert_eq!(parser.parse_eof(&mut ctx), ParserState::Error);
    }
}
