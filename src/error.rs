//! Error type for MAC data handling.
//!
//! Integrity failures carry no detail on purpose: callers must not be able to
//! tell which part of a comparison failed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MacError {
    /// The DER structure is malformed (wrong tag, wrong element count).
    #[error("malformed MAC data: {0}")]
    Format(String),

    /// An object identifier or algorithm name is unknown or not allowed here.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A required argument is missing or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Key derivation or HMAC computation failed.
    #[error("{operation} failed: {cause}")]
    Crypto {
        operation: &'static str,
        cause: String,
    },

    #[error("failed integrity checking")]
    IntegrityCheckFailed,
}

impl MacError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        MacError::Format(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        MacError::UnsupportedAlgorithm(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        MacError::InvalidArgument(msg.into())
    }

    pub(crate) fn crypto(operation: &'static str, cause: impl std::fmt::Display) -> Self {
        MacError::Crypto {
            operation,
            cause: cause.to_string(),
        }
    }
}

impl From<der::Error> for MacError {
    fn from(err: der::Error) -> Self {
        MacError::Format(err.to_string())
    }
}

/// Result type alias for MAC operations.
pub type Result<T> = std::result::Result<T, MacError>;
