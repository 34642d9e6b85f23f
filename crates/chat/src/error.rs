use thiserror::Error;

/// Result type for chat processing operations
pub type Result<T> = std::result::Result<T, ChatError>;

/// Errors raised while building the dispatcher or decoding a matched line
#[derive(Error, Debug)]
pub enum ChatError {
    /// A line matched a pattern but one of its fields could not be decoded
    #[error("Malformed {kind} line: {reason}")]
    Malformed { kind: &'static str, reason: String },

    /// A line pattern failed to compile
    #[error("Invalid pattern for {kind}: {source}")]
    InvalidPattern {
        kind: &'static str,
        #[source]
        source: regex::Error,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ChatError {
    /// Create a malformed line error
    pub fn malformed(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            kind,
            reason: reason.into(),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
