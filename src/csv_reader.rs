//! Streaming CSV record reading
//!
//! Drives the character-level [`FieldParser`] over a buffered byte stream
//! and materializes finished spans into owned [`Record`]s through the
//! [`Sanitizer`]. Input is consumed in terminator-bounded chunks, so a
//! quoted field containing the terminator simply extends the current
//! record across chunks. Memory usage is bounded by the largest record.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::csv::FieldParser;
use crate::dialect::Dialect;
use crate::error::{FlatError, Result};
use crate::sanitize::Sanitizer;
use crate::span::Span;
use crate::state::ParserState;
use crate::types::{FieldValue, Record};

/// Streaming CSV reader over any buffered source.
///
/// Reads records one at a time using an iterator pattern. The dialect is
/// fully configurable; malformed records surface as [`FlatError::Parse`]
/// and the reader resynchronizes at the next line, so one bad record does
/// not poison the rest of the stream.
///
/// # Examples
///
/// ```no_run
/// use flatstream::CsvReader;
///
/// let mut reader = CsvReader::open("data.csv").unwrap();
///
/// for record in reader.records() {
///     let record = record.unwrap();
///     println!("{:?}", record.to_strings());
/// }
/// ```
///
/// # With Headers
///
/// ```no_run
/// use flatstream::CsvReader;
///
/// let mut reader = CsvReader::open("data.csv")
///     .unwrap()
///     .has_header(true);
///
/// let first = reader.read_record().unwrap();
/// if let Some(headers) = reader.headers() {
///     println!("Headers: {:?}", headers);
/// }
/// # let _ = first;
/// ```
pub struct CsvReader<R: BufRead = BufReader<File>> {
    reader: R,
    parser: FieldParser,

    /// Current record text, reused across records (cleared, never shrunk)
    record_buf: String,
    /// Raw chunk buffer between the source and `record_buf`
    chunk: Vec<u8>,

    header_pending: bool,
    headers: Vec<String>,
    record_count: u64,
    eof: bool,
}

impl CsvReader<BufReader<File>> {
    /// Open a CSV file with the default comma dialect.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use flatstream::{CsvReader, Dialect};
    ///
    /// let reader = CsvReader::open("data.csv").unwrap();
    ///
    /// // Tab-separated with a custom dialect
    /// let reader = CsvReader::open("data.tsv")
    ///     .unwrap()
    ///     .dialect(Dialect::tsv());
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| FlatError::ReadError(format!("Failed to open CSV file: {}", e)))?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> CsvReader<R> {
    /// Wrap an existing buffered reader.
    pub fn from_reader(reader: R) -> Self {
        CsvReader {
            reader,
            parser: FieldParser::new(Dialect::csv()),
            record_buf: String::with_capacity(1024),
            chunk: Vec::with_capacity(1024),
            header_pending: false,
            headers: Vec::new(),
            record_count: 0,
            eof: false,
        }
    }

    /// Set the dialect (builder pattern).
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.parser = FieldParser::new(dialect);
        self
    }

    /// Indicate that the first record contains headers (builder pattern).
    ///
    /// The header record is consumed by the first read and accessible via
    /// [`headers`](CsvReader::headers) afterwards.
    pub fn has_header(mut self, has: bool) -> Self {
        self.header_pending = has;
        self
    }

    /// Get the header record if one was parsed.
    pub fn headers(&self) -> Option<&[String]> {
        if self.headers.is_empty() {
            None
        } else {
            Some(&self.headers)
        }
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` at end of input. On a malformed record the error
    /// carries the byte offset within that record's text; the next call
    /// resumes at the following line.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        if self.header_pending {
            self.header_pending = false;
            if let Some(record) = self.next_record()? {
                self.headers = record.to_strings();
            }
        }
        let record = self.next_record()?;
        if record.is_some() {
            self.record_count += 1;
        }
        Ok(record)
    }

    /// Get an iterator over records.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use flatstream::CsvReader;
    ///
    /// let mut reader = CsvReader::open("data.csv").unwrap();
    /// let total: usize = reader.records().map(|r| r.unwrap().len()).sum();
    /// ```
    pub fn records(&mut self) -> CsvRecordIterator<'_, R> {
        CsvRecordIterator { reader: self }
    }

    /// Number of data records returned so far (headers excluded).
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    fn next_record(&mut self) -> Result<Option<Record>> {
        if self.eof {
            return Ok(None);
        }
        let stop = self.terminator_stop_byte()?;
        self.record_buf.clear();
        self.parser.reset();
        let mut spans: Vec<Span> = Vec::new();

        loop {
            self.chunk.clear();
            let n = self.reader.read_until(stop, &mut self.chunk)?;
            if n == 0 {
                self.eof = true;
                match self.parser.parse_eof(self.record_buf.len()) {
                    ParserState::Field => spans.push(self.parser.take_span()),
                    ParserState::Eof => {}
                    _ => {
                        return Err(FlatError::Parse {
                            position: self.record_buf.len(),
                            message: "unterminated field at end of input".to_string(),
                        })
                    }
                }
                if spans.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(self.materialize(&spans)));
            }

            let text = std::str::from_utf8(&self.chunk)
                .map_err(|e| FlatError::ReadError(format!("invalid UTF-8 in input: {}", e)))?;

            // Comment lines are only recognized at a record boundary; a
            // comment character inside a multi-chunk record is content. The
            // comment char must be the first significant character, so the
            // skip-initial-space set is consumed before the check.
            if self.record_buf.is_empty() && spans.is_empty() {
                let dialect = self.parser.dialect();
                if let Some(comment) = dialect.comment() {
                    let significant = text.trim_start_matches(|c| dialect.is_whitespace(c));
                    if significant.starts_with(comment) {
                        continue;
                    }
                }
            }

            let base = self.record_buf.len();
            self.record_buf.push_str(text);

            let mut record_done = false;
            for (off, ch) in self.record_buf[base..].char_indices() {
                match self.parser.parse(ch, base + off) {
                    ParserState::Continue => {}
                    ParserState::Field => {
                        spans.push(self.parser.take_span());
                        self.parser.reset();
                    }
                    ParserState::Record => {
                        spans.push(self.parser.take_span());
                        self.parser.reset();
                        record_done = true;
                        break;
                    }
                    ParserState::Error | ParserState::Eof => {
                        // Resync at line granularity: the rest of this
                        // chunk is dropped, the next read starts fresh.
                        return Err(FlatError::Parse {
                            position: base + off,
                            message: "malformed record".to_string(),
                        });
                    }
                }
            }
            if record_done {
                return Ok(Some(self.materialize(&spans)));
            }
            // No record boundary yet (e.g. a quoted field containing the
            // terminator); keep filling.
        }
    }

    fn materialize(&self, spans: &[Span]) -> Record {
        let sanitizer = Sanitizer::new(self.parser.dialect());
        let fields = spans
            .iter()
            .map(|span| self.field_value(&sanitizer, span))
            .collect();
        Record::new(fields)
    }

    fn field_value(&self, sanitizer: &Sanitizer, span: &Span) -> FieldValue {
        if self.is_array_span(span) {
            let items = span
                .children
                .iter()
                .map(|child| match sanitizer.sanitize(&self.record_buf, child) {
                    None => FieldValue::Null,
                    Some(text) => FieldValue::Text(text.into_owned()),
                })
                .collect();
            return FieldValue::Array(items);
        }
        match sanitizer.sanitize(&self.record_buf, span) {
            None => FieldValue::Null,
            Some(text) => FieldValue::Text(text.into_owned()),
        }
    }

    /// An unquoted field starting with the array prefix was parsed by the
    /// array sub-parser; a childless one is an empty array.
    fn is_array_span(&self, span: &Span) -> bool {
        if span.was_quoted {
            return false;
        }
        match self.parser.dialect().array_prefix() {
            Some(prefix) => span.slice(&self.record_buf).starts_with(prefix),
            None => false,
        }
    }

    fn terminator_stop_byte(&self) -> Result<u8> {
        let terminator = self.parser.dialect().terminator();
        let last = terminator.chars().last().ok_or_else(|| {
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

/// Iterator over CSV records
pub struct CsvRecordIterator<'a, R: BufRead> {
    reader: &'a mut CsvReader<R>,
}

impl<'a, R: BufRead> Iterator for CsvRecordIterator<'a, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(input: &str) -> CsvReader<Cursor<&str>> {
        CsvReader::from_reader(Cursor::new(input))
    }

    fn strings(record: &Record) -> Vec<String> {
        record.to_strings()
    }

    #[test]
    fn test_read_plain_records() {
        let mut r = reader("a,b,c\nd,e,f\n");
        let first = r.read_record().unwrap().unwrap();
        assert_eq!(strings(&first), vec!["a", "b", "c"]);
        let second = r.read_record().unwrap().unwrap();
        assert_eq!(strings(&second), vec!["d", "e", "f"]);
        assert!(r.read_record().unwrap().is_none());
        assert_eq!(r.record_count(), 2);
    }

    #[test]
    fn test_missing_final_terminator() {
        let mut r = reader("a,b\nc,d");
        r.read_record().unwrap().unwrap();
        let last = r.read_record().unwrap().unwrap();
        assert_eq!(strings(&last), vec!["c", "d"]);
        assert!(r.read_record().unwrap().is_none());
    }

    #[test]
    fn test_headers_consumed() {
        let mut r = reader("id,name\n1,Alice\n2,Bob\n").has_header(true);
        assert_eq!(r.headers(), None);
        let first = r.read_record().unwrap().unwrap();
        assert_eq!(
            r.headers(),
            Some(&["id".to_string(), "name".to_string()][..])
        );
        assert_eq!(strings(&first), vec!["1", "Alice"]);
        assert_eq!(r.record_count(), 1);
    }

    #[test]
    fn test_quoted_field_spanning_lines() {
        let mut r = reader("\"a\nb\",c\n");
        let record = r.read_record().unwrap().unwrap();
        assert_eq!(strings(&record), vec!["a\nb", "c"]);
        assert!(r.read_record().unwrap().is_none());
    }

    #[test]
    fn test_null_sequence_materializes_null() {
        let dialect = Dialect::builder().null_sequence("NULL").build().unwrap();
        let mut r = reader("a,NULL,\"NULL\"\n").dialect(dialect);
        let record = r.read_record().unwrap().unwrap();
        assert_eq!(record.get_str(0).unwrap(), Some("a"));
        assert_eq!(record.get_str(1).unwrap(), None);
        assert_eq!(record.get_str(2).unwrap(), Some("NULL"));
    }

    #[test]
    fn test_array_field_materializes_elements() {
        let dialect = Dialect::builder()
            .delimiter(';')
            .array('[', '|', ']')
            .build()
            .unwrap();
        let mut r = reader("[x|y|z];plain;[]\n").dialect(dialect);
        let record = r.read_record().unwrap().unwrap();
        assert_eq!(
            record.get(0).unwrap().as_array().map(|a| a.len()),
            Some(3)
        );
        assert_eq!(record.get(0).unwrap().as_string(), "x,y,z");
        assert_eq!(record.get_str(1).unwrap(), Some("plain"));
        assert_eq!(record.get(2).unwrap(), &FieldValue::Array(Vec::new()));
    }

    #[test]
    fn test_comment_lines_skipped() {
        let dialect = Dialect::builder().comment('#').build().unwrap();
        let mut r = reader("# generated file\na,b\n# trailing note\nc,d\n").dialect(dialect);
        assert_eq!(strings(&r.read_record().unwrap().unwrap()), vec!["a", "b"]);
        assert_eq!(strings(&r.read_record().unwrap().unwrap()), vec!["c", "d"]);
        assert!(r.read_record().unwrap().is_none());
    }

    #[test]
    fn test_indented_comment_line_skipped() {
        let dialect = Dialect::builder()
            .whitespace([' '])
            .comment('#')
            .build()
            .unwrap();
        let mut r = reader("  # note\na,b\n").dialect(dialect);
        assert_eq!(strings(&r.read_record().unwrap().unwrap()), vec!["a", "b"]);
        assert!(r.read_record().unwrap().is_none());
    }

    #[test]
    fn test_tsv_dialect() {
        let mut r = reader("a\tb\tc\n").dialect(Dialect::tsv());
        let record = r.read_record().unwrap().unwrap();
        assert_eq!(strings(&record), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_crlf_terminator() {
        let dialect = Dialect::builder().terminator("\r\n").build().unwrap();
        let mut r = reader("a,b\r\nc,d\r\n").dialect(dialect);
        assert_eq!(strings(&r.read_record().unwrap().unwrap()), vec!["a", "b"]);
        assert_eq!(strings(&r.read_record().unwrap().unwrap()), vec!["c", "d"]);
        assert!(r.read_record().unwrap().is_none());
    }

    #[test]
    fn test_malformed_record_resyncs_at_next_line() {
        let mut r = reader("\"a\"x,b\nok,2\n");
        let err = r.read_record();
        assert!(matches!(err, Err(FlatError::Parse { position: 3, .. })));
        let record = r.read_record().unwrap().unwrap();
        assert_eq!(strings(&record), vec!["ok", "2"]);
    }

    #[test]
    fn test_unterminated_quote_at_eof_is_error() {
        let mut r = reader("\"abc");
        assert!(matches!(r.read_record(), Err(FlatError::Parse { .. })));
    }

    #[test]
    fn test_escaped_delimiter_unescaped_on_materialize() {
        let dialect = Dialect::builder()
            .delimiter(';')
            .escape('\\')
            .build()
            .unwrap();
        let mut r = reader("fo\\;o;bar\n").dialect(dialect);
        let record = r.read_record().unwrap().unwrap();
        assert_eq!(strings(&record), vec!["fo;o", "bar"]);
    }

    #[test]
    fn test_records_iterator() {
        let mut r = reader("1,a\n2,b\n3,c\n");
        let rows: Vec<Vec<String>> = r
            .records()
            .map(|record| record.unwrap().to_strings())
            .collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], vec!["3", "c"]);
    }

    #[test]
    fn test_empty_input() {
        let mut r = reader("");
        assert!(r.read_record().unwrap().is_none());
    }

    #[test]
    fn test_typed_column_access() {
        let mut r = reader("42,2.5,true\n");
        let record = r.read_record().unwrap().unwrap();
        assert_eq!(record.get_i64(0).unwrap(), Some(42));
        assert_eq!(record.get_f64(1).unwrap(), Some(2.5));
        assert_eq!(record.get_bool(2).unwrap(), Some(true));
    }
}
