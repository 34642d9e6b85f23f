use thiserror::Error;

/// Result type for edit store operations
pub type Result<T> = std::result::Result<T, EditStoreError>;

/// Errors that can occur while building, loading or saving edits
#[derive(Error, Debug)]
pub enum EditStoreError {
    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A saved record line could not be decoded
    #[error("Invalid record on line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },

    /// Date/time fields do not describe a real instant
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Block type table could not be parsed
    #[error("Registry error: {0}")]
    Registry(String),
}

impl EditStoreError {
    /// Create an invalid record error
    pub fn invalid_record(line: usize, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            line,
            reason: reason.into(),
        }
    }

    /// Create an invalid timestamp error
    pub fn invalid_timestamp(msg: impl Into<String>) -> Self {
        Self::InvalidTimestamp(msg.into())
    }
}
