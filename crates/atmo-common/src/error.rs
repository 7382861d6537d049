//! Error types for the atmosphere engine.

use thiserror::Error;

/// Result type alias using AtmoError.
pub type AtmoResult<T> = Result<T, AtmoError>;

/// Primary error type for loading and sampling atmosphere data.
#[derive(Debug, Error)]
pub enum AtmoError {
    // === Load-time errors ===
    #[error("Invalid config node '{node}': {message}")]
    Config { node: String, message: String },

    #[error("Truncated file {source_name}: needed {needed} more bytes, {remaining} remaining")]
    TruncatedFile {
        source_name: String,
        needed: usize,
        remaining: usize,
    },

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("IO error: {0}")]
    Io(String),

    // === Query-time errors ===
    #[error("Numeric error: {0}")]
    Numeric(String),

    #[error("No data: {0}")]
    NoData(String),
}

impl AtmoError {
    /// Create a Config error for the named node.
    pub fn config(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            node: node.into(),
            message: message.into(),
        }
    }

    /// Create a TruncatedFile error.
    pub fn truncated(source_name: impl Into<String>, needed: usize, remaining: usize) -> Self {
        Self::TruncatedFile {
            source_name: source_name.into(),
            needed,
            remaining,
        }
    }

    /// Create a Numeric error.
    pub fn numeric(msg: impl Into<String>) -> Self {
        Self::Numeric(msg.into())
    }

    /// Whether this error happened while sampling rather than loading.
    pub fn is_query_error(&self) -> bool {
        matches!(self, AtmoError::Numeric(_) | AtmoError::NoData(_))
    }
}

impl From<std::io::Error> for AtmoError {
    fn from(err: std::io::Error) -> Self {
        AtmoError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_message() {
        let err = AtmoError::truncated("wind_x.bin", 16, 4);
        let msg = err.to_string();
        assert!(msg.contains("wind_x.bin"));
        assert!(msg.contains("16"));
        assert!(!err.is_query_error());
    }

    #[test]
    fn test_numeric_is_query_error() {
        assert!(AtmoError::numeric("NaN pressure").is_query_error());
    }
}
