//! Error types for the transport layer.

/// Errors that can occur at the transport level.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Accepting or upgrading an incoming connection failed.
    #[error("failed to accept connection: {0}")]
    AcceptFailed(std::io::Error),

    /// Sending on an established connection failed.
    #[error("failed to send: {0}")]
    SendFailed(std::io::Error),

    /// Receiving on an established connection failed.
    #[error("failed to receive: {0}")]
    ReceiveFailed(std::io::Error),

    /// The connection was closed by the peer.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),
}
