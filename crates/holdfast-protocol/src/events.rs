//! The event vocabulary exchanged between clients and the registry.
//!
//! Both directions use internally tagged JSON: every message is an
//! object with a `"type"` discriminator in SCREAMING_SNAKE_CASE and
//! camelCase payload fields. A create request looks like:
//!
//! ```json
//! {"type":"CREATE_ROOM","username":"ana","sessionToken":"tok-1"}
//! ```
//!
//! Client events carry the session token explicitly where the server
//! needs durable identity; the transport-level connection id alone is
//! never trusted as identity.

use serde::{Deserialize, Serialize};

use crate::types::{Player, Room, RoomCode, SessionToken};

// ---------------------------------------------------------------------------
// Client -> server
// ---------------------------------------------------------------------------

/// Requests a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Create a new room with the sender as host.
    CreateRoom {
        username: String,
        session_token: SessionToken,
    },
    /// Join an existing room, or reconnect to it if the session token
    /// already names a player there.
    JoinRoom {
        room_code: RoomCode,
        /// Optional on reconnect; the stored username wins anyway.
        #[serde(default)]
        username: Option<String>,
        session_token: SessionToken,
    },
    /// Leave the room for good. Not the same as disconnecting:
    /// leaving removes the player record immediately.
    LeaveRoom {
        room_code: RoomCode,
        session_token: SessionToken,
    },
    /// Host-only: move the room from the lobby into play.
    StartGame {
        room_code: RoomCode,
        session_token: SessionToken,
    },
    /// Submit an answer for the current round.
    SubmitAnswer {
        room_code: RoomCode,
        answer: String,
        session_token: SessionToken,
    },
}

// ---------------------------------------------------------------------------
// Server -> client
// ---------------------------------------------------------------------------

/// What happened to a player, carried inside [`ServerEvent::PlayerUpdate`]
/// so clients can distinguish a fresh join from a recovered session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerEvent {
    Joined,
    Left,
    Reconnected,
    Disconnected,
    ScoreUpdate,
}

/// Machine-readable reasons a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The request was missing or malformed data.
    InvalidPayload,
    /// The session token is already bound to a different room.
    AlreadyInRoom,
    /// No room exists under the given code.
    RoomNotFound,
    /// The room is at its player capacity.
    RoomFull,
    /// The room is past the lobby and late join is disabled.
    GameInProgress,
    /// Another present player already uses that username.
    UsernameTaken,
    /// A host-only action was attempted by a non-host.
    NotHost,
    /// Starting requires at least two players.
    NotEnoughPlayers,
}

/// Messages the registry sends to clients.
///
/// Direct responses go only to the requester; `PlayerUpdate`,
/// `GameStarted`, and `GameEnded` are broadcast deltas that keep every
/// client in a room converged on the same state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// Direct response to a successful `CREATE_ROOM`.
    RoomCreated { room: Room, player: Player },
    /// Direct response to a successful first-time `JOIN_ROOM`.
    JoinSuccess { room: Room, player: Player },
    /// Direct response when a `JOIN_ROOM` recovered an existing
    /// session instead of creating a new player.
    ReconnectSuccess {
        room: Room,
        player: Player,
        /// Human-readable hint, e.g. "reconnected to game in progress",
        /// so thin clients can route without inspecting `room.status`.
        message: String,
    },
    /// Broadcast whenever room membership or presence changes. Carries
    /// the full player list so clients reconcile rather than patch.
    PlayerUpdate {
        players: Vec<Player>,
        event: PlayerEvent,
        /// The player the event is about. Absent for updates with no
        /// single subject.
        #[serde(skip_serializing_if = "Option::is_none", default)]
        affected_player_id: Option<SessionToken>,
    },
    /// Broadcast to everyone in the room when the host starts play.
    GameStarted { room: Room, round: u32 },
    /// Broadcast when the game concludes. Final scores travel in the
    /// room snapshot.
    GameEnded { room: Room },
    /// Direct response when a request was refused. Never broadcast.
    Error { code: ErrorCode, message: String },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RoomSettings, RoomStatus};
    use holdfast_transport::ConnectionId;

    fn sample_player() -> Player {
        Player::new(
            SessionToken::from("tok-ana"),
            ConnectionId::new(7),
            "ana",
            true,
        )
    }

    fn sample_room() -> Room {
        Room::new(
            RoomCode::new("XJ4P"),
            sample_player(),
            RoomSettings::default(),
            10,
        )
    }

    // -- client events ----------------------------------------------------

    #[test]
    fn test_create_room_wire_shape() {
        let event = ClientEvent::CreateRoom {
            username: "ana".to_string(),
            session_token: SessionToken::from("tok-1"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "CREATE_ROOM");
        assert_eq!(json["username"], "ana");
        assert_eq!(json["sessionToken"], "tok-1");
    }

    #[test]
    fn test_join_room_parses_without_username() {
        // A reconnecting client may omit the username entirely.
        let event: ClientEvent = serde_json::from_str(
            r#"{"type":"JOIN_ROOM","roomCode":"xj4p","sessionToken":"tok-1"}"#,
        )
        .unwrap();
        match event {
            ClientEvent::JoinRoom {
                room_code,
                username,
                session_token,
            } => {
                assert_eq!(room_code, RoomCode::new("XJ4P"));
                assert_eq!(username, None);
                assert_eq!(session_token, SessionToken::from("tok-1"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_leave_room_wire_shape() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"type":"LEAVE_ROOM","roomCode":"XJ4P","sessionToken":"tok-1"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::LeaveRoom {
                room_code: RoomCode::new("XJ4P"),
                session_token: SessionToken::from("tok-1"),
            }
        );
    }

    #[test]
    fn test_submit_answer_wire_shape() {
        let event = ClientEvent::SubmitAnswer {
            room_code: RoomCode::new("XJ4P"),
            answer: "42".to_string(),
            session_token: SessionToken::from("tok-1"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SUBMIT_ANSWER");
        assert_eq!(json["roomCode"], "XJ4P");
        assert_eq!(json["answer"], "42");
    }

    // -- server events ----------------------------------------------------

    #[test]
    fn test_room_created_wire_shape() {
        let event = ServerEvent::RoomCreated {
            room: sample_room(),
            player: sample_player(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ROOM_CREATED");
        assert_eq!(json["room"]["code"], "XJ4P");
        assert_eq!(json["player"]["isHost"], true);
    }

    #[test]
    fn test_reconnect_success_carries_message() {
        let event = ServerEvent::ReconnectSuccess {
            room: sample_room(),
            player: sample_player(),
            message: "reconnected to lobby".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "RECONNECT_SUCCESS");
        assert_eq!(json["message"], "reconnected to lobby");
        assert_eq!(json["room"]["status"], "WAITING");
    }

    #[test]
    fn test_player_update_omits_absent_subject() {
        let event = ServerEvent::PlayerUpdate {
            players: vec![sample_player()],
            event: PlayerEvent::Joined,
            affected_player_id: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PLAYER_UPDATE");
        assert_eq!(json["event"], "JOINED");
        assert!(
            json.get("affectedPlayerId").is_none(),
            "absent subject must be omitted, not null"
        );
    }

    #[test]
    fn test_player_update_includes_subject() {
        let event = ServerEvent::PlayerUpdate {
            players: vec![sample_player()],
            event: PlayerEvent::Disconnected,
            affected_player_id: Some(SessionToken::from("tok-ana")),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "DISCONNECTED");
        assert_eq!(json["affectedPlayerId"], "tok-ana");
    }

    #[test]
    fn test_game_started_wire_shape() {
        let mut room = sample_room();
        room.status = RoomStatus::Playing;
        room.current_round = 1;
        let event = ServerEvent::GameStarted { room, round: 1 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "GAME_STARTED");
        assert_eq!(json["round"], 1);
        assert_eq!(json["room"]["status"], "PLAYING");
    }

    #[test]
    fn test_error_wire_shape() {
        let event = ServerEvent::Error {
            code: ErrorCode::RoomNotFound,
            message: "no room with code XJ4P".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ERROR");
        assert_eq!(json["code"], "ROOM_NOT_FOUND");
    }

    #[test]
    fn test_error_codes_serialize_screaming_snake() {
        let cases = [
            (ErrorCode::InvalidPayload, "INVALID_PAYLOAD"),
            (ErrorCode::AlreadyInRoom, "ALREADY_IN_ROOM"),
            (ErrorCode::RoomFull, "ROOM_FULL"),
            (ErrorCode::GameInProgress, "GAME_IN_PROGRESS"),
            (ErrorCode::UsernameTaken, "USERNAME_TAKEN"),
            (ErrorCode::NotHost, "NOT_HOST"),
            (ErrorCode::NotEnoughPlayers, "NOT_ENOUGH_PLAYERS"),
        ];
        for (code, expected) in cases {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{expected}\""));
        }
    }
}
