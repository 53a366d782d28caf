//! Error types for the protocol layer.
//!
//! Each crate defines its own error enum, so a `ProtocolError` always
//! means a serialization problem, never networking or room state.

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing a value into bytes failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The bytes are malformed, truncated, or do not match the
    /// expected message type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but violates a protocol rule, such as an
    /// empty session token.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
