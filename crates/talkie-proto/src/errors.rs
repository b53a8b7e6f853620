//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised at the wire boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame contained no data.
    #[error("empty frame")]
    EmptyFrame,

    /// Frame was not a valid envelope (bad JSON, unknown type, missing field).
    #[error("failed to decode envelope: {0}")]
    Decode(String),

    /// Envelope could not be serialized.
    #[error("failed to encode envelope: {0}")]
    Encode(String),
}
