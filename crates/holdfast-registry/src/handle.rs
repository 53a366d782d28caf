//! Public handle to a running registry actor.

use holdfast_cleanup::CleanupScheduler;
use holdfast_protocol::{ClientEvent, ConnectionId, Room, RoomCode};
use tokio::sync::{mpsc, oneshot};

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::judge::AnswerJudge;
use crate::notifier::EventSender;
use crate::service::{Command, Registry};

/// Handle to a running registry. Cheap to clone; every connection task
/// holds one.
///
/// All methods return [`RegistryError::Unavailable`] once the actor
/// has shut down.
#[derive(Clone)]
pub struct RegistryHandle {
    sender: mpsc::Sender<Command>,
}

impl RegistryHandle {
    /// Registers the outbound event channel for a connection. Must be
    /// called before any request from that connection, or its direct
    /// responses have nowhere to go.
    pub async fn attach(
        &self,
        connection: ConnectionId,
        sender: EventSender,
    ) -> Result<(), RegistryError> {
        self.sender
            .send(Command::Attach { connection, sender })
            .await
            .map_err(|_| RegistryError::Unavailable)
    }

    /// Submits a decoded client request. Fire-and-forget: the outcome,
    /// success or ERROR, arrives on the attached event channel.
    pub async fn request(
        &self,
        connection: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), RegistryError> {
        self.sender
            .send(Command::Request { connection, event })
            .await
            .map_err(|_| RegistryError::Unavailable)
    }

    /// Reports a lost connection. Starts the recovery window for the
    /// session attached on it, if any.
    pub async fn disconnect(
        &self,
        connection: ConnectionId,
    ) -> Result<(), RegistryError> {
        self.sender
            .send(Command::Disconnect { connection })
            .await
            .map_err(|_| RegistryError::Unavailable)
    }

    /// Returns a snapshot of one room, or `None` if no room has that
    /// code.
    pub async fn room(
        &self,
        code: RoomCode,
    ) -> Result<Option<Room>, RegistryError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(Command::RoomSnapshot {
                code,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RegistryError::Unavailable)?;
        reply_rx.await.map_err(|_| RegistryError::Unavailable)
    }

    /// Returns the number of live rooms.
    pub async fn room_count(&self) -> Result<usize, RegistryError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(Command::RoomCount { reply: reply_tx })
            .await
            .map_err(|_| RegistryError::Unavailable)?;
        reply_rx.await.map_err(|_| RegistryError::Unavailable)
    }

    /// Tells the registry to stop.
    pub async fn shutdown(&self) -> Result<(), RegistryError> {
        self.sender
            .send(Command::Shutdown)
            .await
            .map_err(|_| RegistryError::Unavailable)
    }
}

/// Spawns the registry actor and its cleanup wiring, returning a
/// handle to it.
///
/// Expired cleanup timers are forwarded into the same command channel
/// the handles use, so evictions are serialized with reconnects and
/// every other transition.
pub fn spawn_registry(
    config: RegistryConfig,
    judge: impl AnswerJudge,
) -> RegistryHandle {
    let config = config.validated();
    let (cleanup, mut expired_rx) =
        CleanupScheduler::new(config.cleanup_window);
    let (tx, rx) = mpsc::channel(config.command_buffer);

    let expiry_tx = tx.clone();
    tokio::spawn(async move {
        while let Some(token) = expired_rx.recv().await {
            if expiry_tx
                .send(Command::CleanupExpired { token })
                .await
                .is_err()
            {
                break;
            }
        }
    });

    let actor = Registry::new(config, Box::new(judge), cleanup, rx);
    tokio::spawn(actor.run());

    RegistryHandle { sender: tx }
}
