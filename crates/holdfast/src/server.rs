//! `HoldfastServer` builder and accept loop.
//!
//! This is the entry point for running a Holdfast server. It ties the
//! layers together: transport accepts sockets, the protocol codec
//! translates frames, and the registry actor owns all room and
//! session state.

use holdfast_protocol::JsonCodec;
use holdfast_registry::{
    AnswerJudge, RegistryConfig, RegistryHandle, spawn_registry,
};
use holdfast_transport::{Transport, WebSocketTransport};

use crate::HoldfastError;
use crate::handler::handle_connection;

/// Builder for configuring and starting a Holdfast server.
///
/// # Example
///
/// ```rust,ignore
/// use holdfast::HoldfastServer;
/// use holdfast_registry::NoScoring;
///
/// let server = HoldfastServer::builder()
///     .bind("0.0.0.0:3001")
///     .build(NoScoring)
///     .await?;
/// server.run().await
/// ```
pub struct HoldfastServerBuilder {
    bind_addr: String,
    registry_config: RegistryConfig,
}

impl HoldfastServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
            registry_config: RegistryConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the registry configuration.
    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry_config = config;
        self
    }

    /// Builds and starts the server with the given answer judge.
    ///
    /// Binds the WebSocket listener and spawns the registry actor;
    /// connections are not accepted until [`HoldfastServer::run`].
    pub async fn build(
        self,
        judge: impl AnswerJudge,
    ) -> Result<HoldfastServer, HoldfastError> {
        let transport =
            WebSocketTransport::bind(&self.bind_addr).await?;
        let registry = spawn_registry(self.registry_config, judge);

        Ok(HoldfastServer {
            transport,
            registry,
        })
    }
}

impl Default for HoldfastServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Holdfast server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct HoldfastServer {
    transport: WebSocketTransport,
    registry: RegistryHandle,
}

impl HoldfastServer {
    /// Creates a new builder.
    pub fn builder() -> HoldfastServerBuilder {
        HoldfastServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task per connection. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), HoldfastError> {
        tracing::info!("Holdfast server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let registry = self.registry.clone();
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, registry, JsonCodec)
                                .await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
