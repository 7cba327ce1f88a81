//! Error types for sqlpipe

use thiserror::Error;

/// Result type alias for sqlpipe operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Error types raised while building or rendering statements
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    /// A required argument was empty or had the wrong shape
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operator outside the comparison allow-list
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    /// Missing or unparsable configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The active dialect cannot express a requested construct
    #[error("{dialect} does not support {feature}")]
    Unsupported {
        dialect: &'static str,
        feature: &'static str,
    },
}

impl SqlError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an invalid operator error
    pub fn invalid_operator(op: impl Into<String>) -> Self {
        Self::InvalidOperator(op.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is an invalid operator error
    pub fn is_invalid_operator(&self) -> bool {
        matches!(self, Self::InvalidOperator(_))
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is an unsupported feature error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

impl From<toml::de::Error> for SqlError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}
