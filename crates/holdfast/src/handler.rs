//! Per-connection handler: frame pumping and request routing.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler, plus a small outbound task. The flow is:
//!   1. Attach an event channel with the registry.
//!   2. Outbound task: registry events → codec → socket frames.
//!   3. Inbound loop: socket frames → codec → registry requests.
//!   4. On any exit, report the disconnect so the recovery window
//!      starts.

use holdfast_protocol::{
    ClientEvent, Codec, ConnectionId, ErrorCode, ServerEvent,
};
use holdfast_registry::RegistryHandle;
use holdfast_transport::{Connection, WebSocketConnection};

use crate::HoldfastError;

/// Drop guard that reports the disconnect when the handler exits.
///
/// This ensures the recovery window starts even if the handler
/// panics. `Drop` is synchronous, so it spawns a fire-and-forget task
/// for the async send.
struct DisconnectGuard {
    connection: ConnectionId,
    registry: RegistryHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let connection = self.connection;
        let registry = self.registry.clone();
        tokio::spawn(async move {
            let _ = registry.disconnect(connection).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec + Clone>(
    conn: WebSocketConnection,
    registry: RegistryHandle,
    codec: C,
) -> Result<(), HoldfastError> {
    let connection = conn.id();
    tracing::debug!(%connection, "handling new connection");

    let (event_tx, mut event_rx) =
        tokio::sync::mpsc::unbounded_channel::<ServerEvent>();
    registry.attach(connection, event_tx.clone()).await?;
    let _guard = DisconnectGuard {
        connection,
        registry: registry.clone(),
    };

    // Outbound pump: everything the registry says to this client goes
    // through here, so the socket has a single writer.
    let outbound_conn = conn.clone();
    let outbound_codec = codec.clone();
    let outbound = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let bytes = match outbound_codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(
                        %connection,
                        error = %e,
                        "failed to encode outbound event"
                    );
                    continue;
                }
            };
            if outbound_conn.send(&bytes).await.is_err() {
                break;
            }
        }
    });

    // Inbound loop: decode frames and hand them to the registry. A
    // malformed frame gets an error reply but keeps the connection.
    loop {
        match conn.recv().await {
            Ok(Some(data)) => {
                match codec.decode::<ClientEvent>(&data) {
                    Ok(event) => {
                        if registry
                            .request(connection, event)
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!(
                            %connection,
                            error = %e,
                            "undecodable frame"
                        );
                        let _ = event_tx.send(ServerEvent::Error {
                            code: ErrorCode::InvalidPayload,
                            message: "could not parse request".into(),
                        });
                    }
                }
            }
            Ok(None) => {
                tracing::info!(%connection, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(%connection, error = %e, "recv error");
                break;
            }
        }
    }

    outbound.abort();
    // _guard drops here → disconnect is reported.
    Ok(())
}
