//! Newline-delimited JSON-like record parsing
//!
//! Restricted to flat objects of scalar values: one object per line, no
//! nesting. [`NdjsonCharParser`] is the character-level machine;
//! [`NdjsonReader`] drives it over a buffered stream and exposes a
//! cursor-style accessor API keyed by per-record ordinals.

mod char_parser;
mod reader;

pub use char_parser::{NdjsonCharParser, NdjsonField};
pub use reader::NdjsonReader;
