//! The room and player data model.
//!
//! These types travel on the wire as JSON snapshots, so their serde
//! shape is part of the protocol: struct fields are camelCase and
//! enum values are SCREAMING_SNAKE, matching what browser clients
//! expect.
//!
//! Identity rules, which everything above this crate relies on:
//! - A [`SessionToken`] is durable. The client generates it once and
//!   presents it on every connect. It is the primary key for a player
//!   across the whole registry.
//! - A [`ConnectionId`] is volatile. It changes on every reconnect and
//!   is only ever a delivery address, never identity.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use holdfast_transport::ConnectionId;
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch, the timestamp unit used on the
/// wire (what `Date.now()` produces on the client side).
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A durable, client-generated identifier for one human participant.
///
/// Newtype over the opaque token string. `#[serde(transparent)]` keeps
/// the wire form a bare string. The server never inspects the contents;
/// possession of the token is the whole authentication model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

impl SessionToken {
    /// Returns `true` if the token is empty (a malformed payload).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Display shows only a prefix. Tokens are secrets; full values must
/// never end up in logs.
impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(8).collect();
        if self.0.chars().count() > 8 {
            write!(f, "{prefix}..")
        } else {
            write!(f, "{prefix}")
        }
    }
}

/// A short human-shareable identifier for a live room.
///
/// Always stored uppercase: the serde `from = "String"` conversion
/// normalizes at the deserialization boundary, so a client typing
/// `"xj4p"` finds the room stored as `"XJ4P"`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Creates a room code, normalizing to uppercase.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomCode {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One human participant's logical identity within a room.
///
/// Created on first successful join. On reconnect only the volatile
/// fields change (`connection_id`, `is_online`, `last_seen_at`);
/// everything that matters to the game (`score`, `is_host`, join
/// order) survives the connection churn. Removed only by explicit
/// leave or cleanup-timer expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Durable identity, stable across reconnects.
    pub session_token: SessionToken,
    /// Current physical connection. Changes every reconnect.
    pub connection_id: ConnectionId,
    pub username: String,
    pub score: i64,
    pub is_host: bool,
    pub is_online: bool,
    /// When the player first joined, Unix millis.
    pub joined_at: u64,
    /// Last connect/disconnect activity, Unix millis.
    pub last_seen_at: u64,
}

impl Player {
    /// Creates a fresh player record for a first-time join.
    pub fn new(
        session_token: SessionToken,
        connection_id: ConnectionId,
        username: impl Into<String>,
        is_host: bool,
    ) -> Self {
        let now = now_millis();
        Self {
            session_token,
            connection_id,
            username: username.into(),
            score: 0,
            is_host,
            is_online: true,
            joined_at: now,
            last_seen_at: now,
        }
    }

    /// Rebinds the player to a new physical connection.
    ///
    /// This is the heart of session recovery: identity stays, the
    /// delivery address is overwritten.
    pub fn mark_online(&mut self, connection_id: ConnectionId) {
        self.connection_id = connection_id;
        self.is_online = true;
        self.last_seen_at = now_millis();
    }

    /// Marks the player offline after a transport-level disconnect.
    /// The record is kept; removal is the cleanup scheduler's call.
    pub fn mark_offline(&mut self) {
        self.is_online = false;
        self.last_seen_at = now_millis();
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// Lifecycle status of a room.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    /// In the lobby, accepting players.
    Waiting,
    /// Game in progress. New joins only if late join is allowed.
    Playing,
    /// Game over. The room lingers until the last player leaves.
    Finished,
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "WAITING"),
            Self::Playing => write!(f, "PLAYING"),
            Self::Finished => write!(f, "FINISHED"),
        }
    }
}

/// Per-room settings, fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    pub max_players: usize,
    /// Seconds per round. Carried for clients; the registry itself
    /// runs no round timer (game rules live elsewhere).
    pub round_time_limit: u64,
    pub allow_late_join: bool,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            max_players: 8,
            round_time_limit: 30,
            allow_late_join: true,
        }
    }
}

/// One game session: a code, an ordered player list, and a status.
///
/// The registry's room store exclusively owns these records. The
/// invariants the accessors below maintain:
/// - `players` is never empty while the room exists in the store.
/// - Session tokens are unique within `players`.
/// - Exactly one player has `is_host == true`, and it matches
///   `host_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub code: RoomCode,
    /// The hosting player's session token. Authority pointer, not
    /// ownership: the host's record lives in `players` like everyone
    /// else's.
    pub host_id: SessionToken,
    /// Insertion order is join order.
    pub players: Vec<Player>,
    pub status: RoomStatus,
    pub current_round: u32,
    pub max_rounds: u32,
    pub settings: RoomSettings,
    /// Unix millis.
    pub created_at: u64,
}

impl Room {
    /// Creates a room with the given player as sole member and host.
    pub fn new(
        code: RoomCode,
        host: Player,
        settings: RoomSettings,
        max_rounds: u32,
    ) -> Self {
        Self {
            code,
            host_id: host.session_token.clone(),
            players: vec![host],
            status: RoomStatus::Waiting,
            current_round: 0,
            max_rounds,
            settings,
            created_at: now_millis(),
        }
    }

    /// Looks up a player by session token. The canonical lookup:
    /// identity is the token, never the username or connection.
    pub fn player(&self, token: &SessionToken) -> Option<&Player> {
        self.players.iter().find(|p| &p.session_token == token)
    }

    /// Mutable variant of [`player`](Self::player).
    pub fn player_mut(
        &mut self,
        token: &SessionToken,
    ) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.session_token == token)
    }

    /// Returns `true` if any present player already uses this
    /// username, compared case-insensitively.
    pub fn is_username_taken(&self, username: &str) -> bool {
        self.players
            .iter()
            .any(|p| p.username.eq_ignore_ascii_case(username))
    }

    /// Number of players currently marked online.
    pub fn online_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_online).count()
    }

    /// Returns `true` if the room has reached `settings.max_players`.
    pub fn is_full(&self) -> bool {
        self.players.len() >= self.settings.max_players
    }

    /// Returns `true` if no players remain. A room in this state must
    /// be deleted from the store synchronously.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Removes a player by token, returning the removed record.
    pub fn remove_player(
        &mut self,
        token: &SessionToken,
    ) -> Option<Player> {
        let idx = self
            .players
            .iter()
            .position(|p| &p.session_token == token)?;
        Some(self.players.remove(idx))
    }

    /// Reassigns host authority after the host left.
    ///
    /// Prefers the first online player so the new authority can
    /// actually act; falls back to the first player in join order.
    /// Returns the new host's token, or `None` if the room is empty.
    pub fn reassign_host(&mut self) -> Option<SessionToken> {
        for p in &mut self.players {
            p.is_host = false;
        }
        let idx = self
            .players
            .iter()
            .position(|p| p.is_online)
            .unwrap_or(0);
        let new_host = self.players.get_mut(idx)?;
        new_host.is_host = true;
        self.host_id = new_host.session_token.clone();
        Some(self.host_id.clone())
    }
}

// =========================================================================
// Tests
// =========================================================================
