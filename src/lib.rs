//! # flatstream
//!
//! Streaming, span-based parsing for delimited flat files and NDJSON.
//!
//! The core engine consumes input one character at a time and emits
//! byte-offset spans into the caller's buffer instead of copying field
//! text. Everything about the flat-file shape is configurable through a
//! [`Dialect`]: delimiter, quoting, escaping, multi-character line
//! terminators, null/empty sentinels, comment lines, and single-level
//! array fields.
//!
//! ## Layers
//!
//! - [`FieldParser`]: the character-level machine. Feed `(char, pos)`
//!   pairs, get [`ParserState`] signals and finished [`Span`]s. No I/O,
//!   no allocation per field.
//! - [`CsvReader`] / [`NdjsonReader`]: buffered readers that drive the
//!   machines over files or any [`std::io::BufRead`] and materialize
//!   records.
//! - [`Sanitizer`]: turns a raw span into its logical value, sentinel
//!   resolution first, then unescaping, zero-copy when no escape occurred.
//!
//! ## Quick Start
//!
//! ```no_run
//! use flatstream::{CsvReader, Dialect};
//!
//! let mut reader = CsvReader::open("data.csv").unwrap().has_header(true);
//! for record in reader.records() {
//!     let record = record.unwrap();
//!     println!("{:?}", record.to_strings());
//! }
//! ```
//!
//! Character-level use, without a reader:
//!
//! ```
//! use flatstream::{Dialect, FieldParser, ParserState};
//!
//! let input = "one;two\n";
//! let dialect = Dialect::builder().delimiter(';').build().unwrap();
//! let mut parser = FieldParser::new(dialect);
//! let mut fields = Vec::new();
//! for (pos, ch) in input.char_indices() {
//!     if parser.parse(ch, pos).is_boundary() {
//!         fields.push(parser.take_span().slice(input));
//!         parser.reset();
//!     }
//! }
//! assert_eq!(fields, vec!["one", "two"]);
//! ```

pub mod csv;
pub mod csv_reader;
pub mod dialect;
pub mod error;
pub mod ndjson;
pub mod sanitize;
pub mod span;
pub mod state;
pub mod types;

pub use csv::FieldParser;
pub use csv_reader::{CsvReader, CsvRecordIterator};
pub use dialect::{Dialect, DialectBuilder};
pub use error::{FlatError, Result};
pub use ndjson::{NdjsonCharParser, NdjsonField, NdjsonReader};
pub use sanitize::Sanitizer;
pub use span::Span;
pub use state::ParserState;
pub use types::{FieldValue, Record};
