//! Owned state tables: the room store and the session index.
//!
//! Plain maps, no locking. Only the registry actor touches them, so
//! every lookup and mutation happens on one task.

use std::collections::HashMap;

use holdfast_protocol::{ConnectionId, Room, RoomCode, SessionToken};

// ---------------------------------------------------------------------------
// RoomStore
// ---------------------------------------------------------------------------

/// All live rooms, keyed by room code.
#[derive(Debug, Default)]
pub(crate) struct RoomStore {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn get_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    /// Inserts a new room. The code must be fresh; generation checks
    /// collisions before minting it.
    pub fn insert(&mut self, room: Room) {
        self.rooms.insert(room.code.clone(), room);
    }

    pub fn remove(&mut self, code: &RoomCode) -> Option<Room> {
        self.rooms.remove(code)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }
}

// ---------------------------------------------------------------------------
// SessionIndex
// ---------------------------------------------------------------------------

/// Two lookup directions over live sessions, kept in sync:
///
/// - `by_token`: durable. A token maps to its room for as long as the
///   player record exists, across any number of disconnects.
/// - `by_connection`: volatile. Only currently attached connections
///   appear here; entries come and go with the physical socket.
///
/// The asymmetry is the whole reconnection model: after a disconnect
/// the connection entry is gone but the token entry survives, which is
/// what lets a later connection with the same token find its room.
#[derive(Debug, Default)]
pub(crate) struct SessionIndex {
    by_token: HashMap<SessionToken, RoomCode>,
    by_connection: HashMap<ConnectionId, SessionToken>,
}

impl SessionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a session to a room and its current connection.
    pub fn bind(
        &mut self,
        token: SessionToken,
        room_code: RoomCode,
        connection: ConnectionId,
    ) {
        self.by_token.insert(token.clone(), room_code);
        self.by_connection.insert(connection, token);
    }

    /// Points an existing session at a new connection.
    ///
    /// Removes the old connection entry first so a late disconnect on
    /// the replaced socket resolves to nothing.
    pub fn rebind_connection(
        &mut self,
        token: &SessionToken,
        old: ConnectionId,
        new: ConnectionId,
    ) {
        if self.by_connection.get(&old) == Some(token) {
            self.by_connection.remove(&old);
        }
        self.by_connection.insert(new, token.clone());
    }

    /// Drops the connection entry, returning the token it carried.
    /// The token's room binding is untouched.
    pub fn release_connection(
        &mut self,
        connection: ConnectionId,
    ) -> Option<SessionToken> {
        self.by_connection.remove(&connection)
    }

    /// Removes the session entirely, both directions.
    pub fn remove(&mut self, token: &SessionToken) {
        self.by_token.remove(token);
        self.by_connection.retain(|_, t| t != token);
    }

    /// The room a session is bound to, if any.
    pub fn room_for(&self, token: &SessionToken) -> Option<&RoomCode> {
        self.by_token.get(token)
    }

    /// The session currently attached on a connection, if any.
    #[cfg(test)]
    pub fn token_for(
        &self,
        connection: ConnectionId,
    ) -> Option<&SessionToken> {
        self.by_connection.get(&connection)
    }

    #[cfg(test)]
    pub fn connection_count(&self) -> usize {
        self.by_connection.len()
    }
}
