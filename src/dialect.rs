//! Dialect configuration for delimiter-based flat-file formats
//!
//! A [`Dialect`] is an immutable description of one format variant:
//! delimiter, quoting, escaping, line terminator, array sub-fields,
//! whitespace skipping, comment lines and null/empty sentinels. It carries
//! no behavior of its own; the parsing machines consume it read-only.

use crate::error::{FlatError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable lexical rules for one flat-file format variant.
///
/// Construct via [`Dialect::csv`], [`Dialect::tsv`] or [`Dialect::builder`].
///
/// # Examples
///
/// ```
/// use flatstream::Dialect;
///
/// let dialect = Dialect::builder()
///     .delimiter(';')
///     .escape('\\')
///     .terminator("\r\n")
///     .build()
///     .unwrap();
/// assert_eq!(dialect.delimiter(), ';');
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "DialectConfig"))]
pub struct Dialect {
    delimiter: char,
    quote: Option<char>,
    escape: Option<char>,
    double_quote: bool,
    terminator: String,
    array_prefix: Option<char>,
    array_delimiter: Option<char>,
    array_suffix: Option<char>,
    whitespace: Vec<char>,
    comment: Option<char>,
    null_sequence: Option<String>,
    empty_sequence: Option<String>,
}

impl Dialect {
    /// RFC 4180-style CSV: comma delimiter, `"` quote with doubled-quote
    /// escaping, `\n` terminator.
    pub fn csv() -> Self {
        Dialect {
            delimiter: ',',
            quote: Some('"'),
            escape: None,
            double_quote: true,
            terminator: "\n".to_string(),
            array_prefix: None,
            array_delimiter: None,
            array_suffix: None,
            whitespace: Vec::new(),
            comment: None,
            null_sequence: None,
            empty_sequence: None,
        }
    }

    /// Tab-separated values: tab delimiter, otherwise like [`Dialect::csv`].
    pub fn tsv() -> Self {
        let mut d = Self::csv();
        d.delimiter = '\t';
        d
    }

    /// Start building a custom dialect from the CSV defaults.
    pub fn builder() -> DialectBuilder {
        DialectBuilder {
            dialect: Self::csv(),
        }
    }

    /// Field delimiter character.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Quote character, if quoting is enabled.
    pub fn quote(&self) -> Option<char> {
        self.quote
    }

    /// Escape character, if escaping is enabled. Escape handling always
    /// takes precedence over doubled-quote detection.
    pub fn escape(&self) -> Option<char> {
        self.escape
    }

    /// Whether a doubled quote character inside a quoted field is one
    /// literal quote.
    pub fn double_quote(&self) -> bool {
        self.double_quote
    }

    /// Record terminator string, length >= 1, possibly multi-character.
    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    /// First character of the terminator.
    pub(crate) fn terminator_first(&self) -> char {
        // Invariant: terminator is non-empty (enforced by the builder).
        self.terminator.chars().next().unwrap_or('\n')
    }

    /// Terminator character at position `idx`, for incremental matching.
    pub(crate) fn terminator_char(&self, idx: usize) -> Option<char> {
        self.terminator.chars().nth(idx)
    }

    /// Number of characters in the terminator.
    pub(crate) fn terminator_char_count(&self) -> usize {
        self.terminator.chars().count()
    }

    /// Opening character of an array sub-field.
    pub fn array_prefix(&self) -> Option<char> {
        self.array_prefix
    }

    /// Delimiter between array elements.
    pub fn array_delimiter(&self) -> Option<char> {
        self.array_delimiter
    }

    /// Closing character of an array sub-field.
    pub fn array_suffix(&self) -> Option<char> {
        self.array_suffix
    }

    /// True when all three array settings are configured.
    pub fn has_arrays(&self) -> bool {
        self.array_prefix.is_some()
    }

    /// True when `ch` belongs to the skip-initial-space set.
    pub fn is_whitespace(&self, ch: char) -> bool {
        self.whitespace.contains(&ch)
    }

    /// Comment-line prefix character.
    pub fn comment(&self) -> Option<char> {
        self.comment
    }

    /// Text that marks an unquoted field as "no value".
    pub fn null_sequence(&self) -> Option<&str> {
        self.null_sequence.as_deref()
    }

    /// Text that an unquoted field substitutes with the empty string.
    pub fn empty_sequence(&self) -> Option<&str> {
        self.empty_sequence.as_deref()
    }

    /// Derived dialect for parsing array elements: the array delimiter
    /// plays the field delimiter role and the suffix plays the terminator
    /// role. Nesting is exactly one level, so array settings are cleared.
    pub(crate) fn element_dialect(&self) -> Option<Dialect> {
        let delimiter = self.array_delimiter?;
        let suffix = self.array_suffix?;
        Some(Dialect {
            delimiter,
            quote: self.quote,
            escape: self.escape,
            double_quote: self.double_quote,
            terminator: suffix.to_string(),
            array_prefix: None,
            array_delimiter: None,
            array_suffix: None,
            whitespace: self.whitespace.clone(),
            comment: None,
            null_sequence: self.null_sequence.clone(),
            empty_sequence: self.empty_sequence.clone(),
        })
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::csv()
    }
}

/// Fluent builder for [`Dialect`].
///
/// # Examples
///
/// ```
/// use flatstream::Dialect;
///
/// let dialect = Dialect::builder()
///     .delimiter(';')
///     .array('[', '|', ']')
///     .null_sequence("\\N")
///     .build()
///     .unwrap();
/// assert!(dialect.has_arrays());
/// ```
#[derive(Debug, Clone)]
pub struct DialectBuilder {
    dialect: Dialect,
}

impl DialectBuilder {
    /// Set the field delimiter.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.dialect.delimiter = delimiter;
        self
    }

    /// Set the quote character.
    pub fn quote(mut self, quote: char) -> Self {
        self.dialect.quote = Some(quote);
        self
    }

    /// Disable quoting entirely.
    pub fn no_quoting(mut self) -> Self {
        self.dialect.quote = None;
        self
    }

    /// Set the escape character.
    pub fn escape(mut self, escape: char) -> Self {
        self.dialect.escape = Some(escape);
        self
    }

    /// Enable or disable doubled-quote escaping.
    pub fn double_quote(mut self, enabled: bool) -> Self {
        self.dialect.double_quote = enabled;
        self
    }

    /// Set the record terminator string (may be multi-character).
    pub fn terminator(mut self, terminator: impl Into<String>) -> Self {
        self.dialect.terminator = terminator.into();
        self
    }

    /// Enable array sub-fields with the given prefix, element delimiter
    /// and suffix.
    pub fn array(mut self, prefix: char, delimiter: char, suffix: char) -> Self {
        self.dialect.array_prefix = Some(prefix);
        self.dialect.array_delimiter = Some(delimiter);
        self.dialect.array_suffix = Some(suffix);
        self
    }

    /// Set the skip-initial-space character set. Leading characters from
    /// this set are consumed before a field value starts and excluded from
    /// the value span.
    pub fn whitespace(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.dialect.whitespace = chars.into_iter().collect();
        self
    }

    /// Set the comment-line prefix character.
    pub fn comment(mut self, comment: char) -> Self {
        self.dialect.comment = Some(comment);
        self
    }

    /// Set the null sentinel sequence.
    pub fn null_sequence(mut self, sequence: impl Into<String>) -> Self {
        self.dialect.null_sequence = Some(sequence.into());
        self
    }

    /// Set the empty-string sentinel sequence.
    pub fn empty_sequence(mut self, sequence: impl Into<String>) -> Self {
        self.dialect.empty_sequence = Some(sequence.into());
        self
    }

    /// Validate and freeze the dialect.
    pub fn build(self) -> Result<Dialect> {
        let d = self.dialect;
        if d.terminator.is_empty() {
            return Err(FlatError::InvalidDialect(
                "line terminator must not be empty".to_string(),
            ));
        }
        if let (Some(q), Some(e)) = (d.quote, d.escape) {
            if q == e {
                return Err(FlatError::InvalidDialect(
                    "quote and escape characters must differ".to_string(),
                ));
            }
        }
        let arrays = [d.array_prefix, d.array_delimiter, d.array_suffix];
        let set = arrays.iter().filter(|c| c.is_some()).count();
        if set != 0 && set != 3 {
            return Err(FlatError::InvalidDialect(
                "array prefix, delimiter and suffix must be configured together".to_string(),
            ));
        }
        if d.whitespace.contains(&d.delimiter) {
            return Err(FlatError::InvalidDialect(
                "whitespace set must not contain the delimiter".to_string(),
            ));
        }
        Ok(d)
    }
}

/// Mirror of [`Dialect`] that deserialization goes through, so the builder
/// invariants hold for deserialized dialects too.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct DialectConfig {
    delimiter: char,
    quote: Option<char>,
    escape: Option<char>,
    double_quote: bool,
    terminator: String,
    array_prefix: Option<char>,
    array_delimiter: Option<char>,
    array_suffix: Option<char>,
    whitespace: Vec<char>,
    comment: Option<char>,
    null_sequence: Option<String>,
    empty_sequence: Option<String>,
}

#[cfg(feature = "serde")]
impl TryFrom<DialectConfig> for Dialect {
    type Error = FlatError;

    fn try_from(config: DialectConfig) -> Result<Self> {
        let dialect = Dialect {
            delimiter: config.delimiter,
            quote: config.quote,
            escape: config.escape,
            double_quote: config.double_quote,
            terminator: config.terminator,
            array_prefix: config.array_prefix,
            array_delimiter: config.array_delimiter,
            array_suffix: config.array_suffix,
            whitespace: config.whitespace,
            comment: config.comment,
            null_sequence: config.null_sequence,
            empty_sequence: config.empty_sequence,
        };
        DialectBuilder { dialect }.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_defaults() {
        let d = Dialect::csv();
        assert_eq!(d.delimiter(), ',');
        assert_eq!(d.quote(), Some('"'));
        assert_eq!(d.escape(), None);
        assert!(d.double_quote());
        assert_eq!(d.terminator(), "\n");
        assert!(!d.has_arrays());
    }

    #[test]
    fn test_tsv_preset() {
        assert_eq!(Dialect::tsv().delimiter(), '\t');
    }

    #[test]
    fn test_builder_roundtrip() {
        let d = Dialect::builder()
            .delimiter(';')
            .quote('\'')
            .escape('\\')
            .terminator("\r\n")
            .array('[', '|', ']')
            .comment('#')
            .null_sequence("NULL")
            .build()
            .unwrap();
        assert_eq!(d.delimiter(), ';');
        assert_eq!(d.quote(), Some('\''));
        assert_eq!(d.terminator_char_count(), 2);
        assert_eq!(d.terminator_char(1), Some('\n'));
        assert_eq!(d.array_delimiter(), Some('|'));
        assert_eq!(d.null_sequence(), Some("NULL"));
    }

    #[test]
    fn test_empty_terminator_rejected() {
        let err = Dialect::builder().terminator("").build().unwrap_err();
        assert!(matches!(err, FlatError::InvalidDialect(_)));
    }

    #[test]
    fn test_partial_array_config_rejected() {
        let mut builder = Dialect::builder();
        builder.dialect.array_prefix = Some('[');
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_quote_equal_escape_rejected() {
        let err = Dialect::builder().quote('"').escape('"').build().unwrap_err();
        assert!(matches!(err, FlatError::InvalidDialect(_)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_runs_validation() {
        let mut value = serde_json::to_value(Dialect::csv()).unwrap();
        value["terminator"] = serde_json::Value::String(String::new());
        assert!(serde_json::from_value::<Dialect>(value).is_err());

        let roundtrip: Dialect =
            serde_json::from_value(serde_json::to_value(Dialect::tsv()).unwrap()).unwrap();
        assert_eq!(roundtrip, Dialect::tsv());
    }

    #[test]
    fn test_element_dialect() {
        let d = Dialect::builder().array('[', '|', ']').build().unwrap();
        let elem = d.element_dialect().unwrap();
        assert_eq!(elem.delimiter(), '|');
        assert_eq!(elem.terminator(), "]");
        assert!(!elem.has_arrays());
        assert!(Dialect::csv().element_dialect().is_none());
    }
}
