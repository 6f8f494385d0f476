use thiserror::Error;

/// Error type for session token operations.
///
/// `Malformed`, `InvalidSignature` and `Expired` are mutually exclusive and
/// reported in that order of precedence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token lifetime of {0} seconds is out of range")]
    LifetimeOutOfRange(i64),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,
}
