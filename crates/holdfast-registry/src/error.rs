//! Error types for the registry layer.

use holdfast_protocol::{ErrorCode, RoomCode, ServerEvent, SessionToken};

/// Why a registry request was refused.
///
/// Most variants map 1:1 onto a wire [`ErrorCode`]; the registry
/// converts them with [`RegistryError::to_event`] and delivers the
/// result only to the requester. `Unavailable` is the exception: it
/// means the actor itself is gone and there is no one left to answer.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The request was missing or malformed data.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The session is already bound to a room.
    #[error("session {0} is already in room {1}")]
    AlreadyInRoom(SessionToken, RoomCode),

    /// No room exists under the given code.
    #[error("no room with code {0}")]
    RoomNotFound(RoomCode),

    /// The room is at capacity.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The room is past the lobby and late join is disabled.
    #[error("game in progress in room {0}")]
    GameInProgress(RoomCode),

    /// Another present player already uses this username.
    #[error("username \"{0}\" is already taken in room {1}")]
    UsernameTaken(String, RoomCode),

    /// A host-only action was attempted by a non-host.
    #[error("only the host can do that")]
    NotHost,

    /// Starting requires more online players.
    #[error("need at least {0} online players to start")]
    NotEnoughPlayers(usize),

    /// The registry actor has shut down.
    #[error("registry is unavailable")]
    Unavailable,
}

impl RegistryError {
    /// The wire-level error code, or `None` for failures that cannot
    /// be delivered to a client anyway.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::InvalidPayload(_) => Some(ErrorCode::InvalidPayload),
            Self::AlreadyInRoom(..) => Some(ErrorCode::AlreadyInRoom),
            Self::RoomNotFound(_) => Some(ErrorCode::RoomNotFound),
            Self::RoomFull(_) => Some(ErrorCode::RoomFull),
            Self::GameInProgress(_) => Some(ErrorCode::GameInProgress),
            Self::UsernameTaken(..) => Some(ErrorCode::UsernameTaken),
            Self::NotHost => Some(ErrorCode::NotHost),
            Self::NotEnoughPlayers(_) => {
                Some(ErrorCode::NotEnoughPlayers)
            }
            Self::Unavailable => None,
        }
    }

    /// Converts the refusal into the wire event sent back to the
    /// requester.
    pub(crate) fn to_event(&self) -> Option<ServerEvent> {
        Some(ServerEvent::Error {
            code: self.code()?,
            message: self.to_string(),
        })
    }
}
