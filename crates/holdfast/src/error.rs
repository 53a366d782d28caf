//! Unified error type for the Holdfast server.

use holdfast_protocol::ProtocolError;
use holdfast_registry::RegistryError;
use holdfast_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From`
/// impls, so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum HoldfastError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A registry-level error (refused request, actor unavailable).
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let holdfast_err: HoldfastError = err.into();
        assert!(matches!(holdfast_err, HoldfastError::Transport(_)));
        assert!(holdfast_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let holdfast_err: HoldfastError = err.into();
        assert!(matches!(holdfast_err, HoldfastError::Protocol(_)));
    }

    #[test]
    fn test_from_registry_error() {
        let err = RegistryError::Unavailable;
        let holdfast_err: HoldfastError = err.into();
        assert!(matches!(holdfast_err, HoldfastError::Registry(_)));
    }
}
