//! Outbound event delivery.
//!
//! The notifier maps connection ids to the per-connection outbound
//! channels registered by the transport layer. Delivery is best
//! effort: a send to a closed or missing channel is silently dropped,
//! because the disconnect machinery will catch up with that player
//! through its own path.

use std::collections::HashMap;

use holdfast_protocol::{ConnectionId, Room, ServerEvent, SessionToken};
use tokio::sync::mpsc;
use tracing::trace;

/// Channel on which a connection task receives its outbound events.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

#[derive(Default)]
pub(crate) struct Notifier {
    senders: HashMap<ConnectionId, EventSender>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the outbound channel for a connection.
    pub fn attach(&mut self, connection: ConnectionId, sender: EventSender) {
        self.senders.insert(connection, sender);
    }

    /// Unregisters a connection's channel.
    pub fn detach(&mut self, connection: ConnectionId) {
        self.senders.remove(&connection);
    }

    /// Sends an event to one connection.
    pub fn send_to(&self, connection: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&connection) {
            let _ = sender.send(event);
        } else {
            trace!(%connection, "dropping event for detached connection");
        }
    }

    /// Sends an event to every online player in the room.
    pub fn broadcast(&self, room: &Room, event: ServerEvent) {
        for player in room.players.iter().filter(|p| p.is_online) {
            self.send_to(player.connection_id, event.clone());
        }
    }

    /// Sends an event to every online player in the room except one,
    /// identified by session token. Used for membership deltas where
    /// the subject already received a direct response.
    pub fn broadcast_except(
        &self,
        room: &Room,
        except: &SessionToken,
        event: ServerEvent,
    ) {
        for player in room
            .players
            .iter()
            .filter(|p| p.is_online && &p.session_token != except)
        {
            self.send_to(player.connection_id, event.clone());
        }
    }

    #[cfg(test)]
    pub fn attached_count(&self) -> usize {
        self.senders.len()
    }
}
