//! Error types for flatstream

use thiserror::Error;

/// Errors surfaced by the reader adapters and configuration layer.
///
/// Grammar violations inside the character-level machines are reported as
/// [`crate::ParserState::Error`] signals, not as `Err` values. Only the
/// reader adapters convert a persistent signal into [`FlatError::Parse`].
#[derive(Debug, Error)]
pub enum FlatError {
    /// Underlying I/O failure while pulling bytes from the source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to read or decode the input stream
    #[error("Read error: {0}")]
    ReadError(String),

    /// Invalid dialect configuration
    #[error("Invalid dialect: {0}")]
    InvalidDialect(String),

    /// The input violates the dialect grammar at a specific byte position
    #[error("Parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },

    /// A field index outside the current record was requested
    #[error("Column index {index} out of range (record has {count} fields)")]
    ColumnOutOfRange { index: usize, count: usize },

    /// A label absent from the current record was requested
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A field value could not be converted to the requested type
    #[error("Conversion error: {0}")]
    Conversion(String),
}

/// Result type alias for flatstream operations
pub type Result<T> = std::result::Result<T, FlatError>;
