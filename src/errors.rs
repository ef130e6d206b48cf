//! Error types for newsdesk
//!
//! One error enum for the whole crate. Clustering-path errors abort the run;
//! query-path errors are scoped to the query that raised them.

use thiserror::Error;

/// Main error type for the clustering and question-answering paths
#[derive(Error, Debug)]
pub enum NewsdeskError {
    /// A document is missing a required field or is not an object
    #[error("Malformed document at index {index}: {reason}")]
    FormatError { index: usize, reason: String },

    /// Text could not be embedded, or the embedding output is unusable
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// Configuration outside its valid range
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Failure, timeout or empty response from the completion service
    #[error("Retrieval service error: {0}")]
    RetrievalServiceError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for newsdesk operations
pub type Result<T> = std::result::Result<T, NewsdeskError>;

impl From<candle_core::Error> for NewsdeskError {
    fn from(err: candle_core::Error) -> Self {
        NewsdeskError::EncodingError(err.to_string())
    }
}

impl NewsdeskError {
    /// Whether the error aborts a whole clustering run
    pub fn is_fatal_for_run(&self) -> bool {
        !matches!(self, NewsdeskError::FormatError { .. })
    }
}
