//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding bridge messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Payload was not valid JSON, or a known message had the wrong shape.
    #[error("malformed message: {0}")]
    Malformed(String),

    /// Payload was a JSON object whose `type` is not part of the catalog.
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// State tag is not one of the recognized motion states.
    #[error("unknown motion state: {0:?}")]
    UnknownState(String),

    /// Outbound message could not be serialized.
    #[error("failed to encode message: {0}")]
    Encode(String),
}

impl ProtocolError {
    /// Whether this error describes input that never parsed as JSON at all.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}
