//! Character-level CSV parsing engine
//!
//! Composable per-character sub-parsers (raw, quoted, array) advancing a
//! shared [`ParserContext`], orchestrated by [`FieldParser`]. The engine
//! emits byte-offset [`crate::Span`]s into the caller's buffer and never
//! copies character data.

mod array;
mod context;
mod field;
mod quoted;
mod raw;

pub use context::ParserContext;
pub use field::FieldParser;
