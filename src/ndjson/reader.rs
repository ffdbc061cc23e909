//! Cursor-style reader over newline-delimited JSON-like records
//!
//! Pumps a buffered byte stream through the [`NdjsonCharParser`] one record
//! at a time. Field identity is positional-by-appearance-order *per
//! record*: the ordinal→label mapping is rebuilt for every record, because
//! object keys may change between records. Looking up a label absent from
//! the current record fails even if it appeared in a previous one.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use indexmap::IndexSet;

use crate::error::{FlatError, Result};
use crate::ndjson::char_parser::{NdjsonCharParser, NdjsonField};
use crate::span::Span;
use crate::state::ParserState;

/// Streaming NDJSON record reader.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use flatstream::NdjsonReader;
///
/// let input = "{\"foo\":1,\"bar\":2}\n{\"bar\":3}\n";
/// let mut reader = NdjsonReader::from_reader(Cursor::new(input));
///
/// assert!(reader.read_record().unwrap());
/// assert_eq!(reader.field_count(), 2);
/// assert_eq!(reader.ordinal("foo").unwrap(), 0);
///
/// assert!(reader.read_record().unwrap());
/// assert_eq!(reader.field_count(), 1);
/// assert!(reader.ordinal("foo").is_err());
/// assert_eq!(reader.ordinal("bar").unwrap(), 0);
/// ```
pub struct NdjsonReader<R: BufRead> {
    reader: R,
    parser: NdjsonCharParser,
    terminator: String,
    /// Record text buffer, reused across records (cleared, never shrunk)
    record_buf: String,
    /// Raw chunk buffer rented per fill and returned by clearing
    chunk: Vec<u8>,
    /// Labels of the current record in first-seen order
    labels: IndexSet<String>,
    /// Value spans aligned with `labels`
    values: Vec<Span>,
    /// Fields finished within one chunk, drained after each chunk (reused)
    finished: Vec<NdjsonField>,
    record_count: u64,
}

impl NdjsonReader<BufReader<File>> {
    /// Open an NDJSON file with the default `\n` terminator.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            FlatError::ReadError(format!("Failed to open NDJSON file: {}", e))
        })?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> NdjsonReader<R> {
    /// Wrap an existing buffered reader.
    pub fn from_reader(reader: R) -> Self {
        NdjsonReader {
            reader,
            parser: NdjsonCharParser::new(),
            terminator: "\n".to_string(),
            record_buf: String::with_capacity(1024),
            chunk: Vec::with_capacity(1024),
            labels: IndexSet::new(),
            values: Vec::new(),
            finished: Vec::new(),
            record_count: 0,
        }
    }

    /// Set a custom record terminator (builder pattern). The terminator's
    /// final character must be ASCII so records can be read incrementally.
    pub fn terminator(mut self, terminator: impl Into<String>) -> Self {
        self.terminator = terminator.into();
        self.parser = NdjsonCharParser::with_terminator(self.terminator.clone());
        self
    }

    /// Advance to the next record. Returns `false` at end of input.
    pub fn read_record(&mut self) -> Result<bool> {
        let stop = self.terminator_stop_byte()?;
        self.labels.clear();
        self.values.clear();
        self.record_buf.clear();
        self.parser.reset();
        self.finished.clear();

        loop {
            self.chunk.clear();
            let n = self.reader.read_until(stop, &mut self.chunk)?;
            if n == 0 {
                return match self.parser.parse_eof() {
                    ParserState::Eof => Ok(false),
                    _ => Err(FlatError::Parse {
                        position: self.parser.position(),
                        message: "unterminated record at end of input".to_string(),
                    }),
                };
            }
            let text = std::str::from_utf8(&self.chunk)
                .map_err(|e| FlatError::ReadError(format!("invalid UTF-8 in input: {}", e)))?;
            self.record_buf.push_str(text);

            let mut got_record = false;
            for ch in text.chars() {
                match self.parser.parse(ch) {
                    ParserState::Continue => {}
                    ParserState::Field => self.finished.extend(self.parser.take_field()),
                    ParserState::Record => {
                        self.finished.extend(self.parser.take_field());
                        got_record = true;
                    }
                    ParserState::Error | ParserState::Eof => {
                        return Err(FlatError::Parse {
                            position: self.parser.position(),
                            message: "malformed record".to_string(),
                        });
                    }
                }
            }
            // The vec swaps out and back so collect_field can borrow self
            // while the buffer's capacity is kept for the next chunk.
            let mut finished = std::mem::take(&mut self.finished);
            for field in finished.drain(..) {
                self.collect_field(field);
            }
            self.finished = finished;
            if got_record {
                self.record_count += 1;
                return Ok(true);
            }
            // Record spans past this chunk (e.g. a quoted value containing
            // the terminator byte); keep filling.
        }
    }

    /// Number of fields in the current record.
    pub fn field_count(&self) -> usize {
        self.values.len()
    }

    /// Ordinal of `label` within the current record's first-seen order.
    pub fn ordinal(&self, label: &str) -> Result<usize> {
        self.labels
            .get_index_of(label)
            .ok_or_else(|| FlatError::UnknownField(label.to_string()))
    }

    /// Label at `ordinal` within the current record.
    pub fn label(&self, ordinal: usize) -> Result<&str> {
        self.labels
            .get_index(ordinal)
            .map(String::as_str)
            .ok_or(FlatError::ColumnOutOfRange {
                index: ordinal,
                count: self.values.len(),
            })
    }

    /// Raw text of the value at `ordinal`, unescaped if needed. Bare
    /// literals come back verbatim (`"null"` for a null field).
    pub fn get_str(&self, ordinal: usize) -> Result<Cow<'_, str>> {
        let span = self.value_span(ordinal)?;
        let raw = span.slice(&self.record_buf);
        if span.is_escaped {
            Ok(Cow::Owned(unescape_json(raw).into_owned()))
        } else {
            Ok(Cow::Borrowed(raw))
        }
    }

    /// Value text looked up by label within the current record.
    pub fn get_by_name(&self, label: &str) -> Result<Cow<'_, str>> {
        let ordinal = self.ordinal(label)?;
        self.get_str(ordinal)
    }

    /// True when the value at `ordinal` is the bare `null` literal.
    pub fn is_null(&self, ordinal: usize) -> Result<bool> {
        let span = self.value_span(ordinal)?;
        Ok(!span.was_quoted && span.slice(&self.record_buf) == "null")
    }

    /// Integer value at `ordinal`; `None` for null.
    pub fn get_i64(&self, ordinal: usize) -> Result<Option<i64>> {
        if self.is_null(ordinal)? {
            return Ok(None);
        }
        let text = self.get_str(ordinal)?;
        text.parse()
            .map(Some)
            .map_err(|e| FlatError::Conversion(format!("'{}' is not an integer: {}", text, e)))
    }

    /// Float value at `ordinal`; `None` for null.
    pub fn get_f64(&self, ordinal: usize) -> Result<Option<f64>> {
        if self.is_null(ordinal)? {
            return Ok(None);
        }
        let text = self.get_str(ordinal)?;
        text.parse()
            .map(Some)
            .map_err(|e| FlatError::Conversion(format!("'{}' is not a number: {}", text, e)))
    }

    /// Boolean value at `ordinal`; `None` for null.
    pub fn get_bool(&self, ordinal: usize) -> Result<Option<bool>> {
        if self.is_null(ordinal)? {
            return Ok(None);
        }
        let text = self.get_str(ordinal)?;
        match text.as_ref() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            other => Err(FlatError::Conversion(format!(
                "'{}' is not a boolean",
                other
            ))),
        }
    }

    /// Number of records read so far.
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    fn value_span(&self, ordinal: usize) -> Result<&Span> {
        self.values.get(ordinal).ok_or(FlatError::ColumnOutOfRange {
            index: ordinal,
            count: self.values.len(),
        })
    }

    fn collect_field(&mut self, field: NdjsonField) {
        let raw = field.label.slice(&self.record_buf);
        let label = if field.label.is_escaped {
            unescape_json(raw).into_owned()
        } else {
            raw.to_string()
        };
        let (idx, inserted) = self.labels.insert_full(label);
        if inserted {
            self.values.push(field.value);
        } else {
            // Duplicate label in one record: last value wins, the ordinal
            // keeps its first-seen position
            self.values[idx] = field.value;
        }
    }

    fn terminator_stop_byte(&self) -> Result<u8> {
        let last = self.terminator.chars().last().ok_or_else(|| {
            FlatError::InvalidDialect("line terminator must not be empty".to_string())
        })?;
        if !last.is_ascii() {
            return Err(FlatError::InvalidDialect(
                "line terminator must end with an ASCII character".to_string(),
            ));
        }
        Ok(last as u8)
    }
}

/// Collapse JSON backslash escapes to their literal characters. Unicode
/// escapes (`\uXXXX`) are left verbatim: this layer only delimits and
/// unquotes, it is not a full JSON string decoder.
pub(crate) fn unescape_json(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                out.push('\\');
                out.push('u');
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}
