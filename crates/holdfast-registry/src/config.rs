//! Registry configuration.

use std::time::Duration;

use holdfast_protocol::RoomSettings;
use tracing::warn;

/// Minimum online players required before a game can start.
pub(crate) const MIN_PLAYERS_TO_START: usize = 2;

/// Configuration for the registry actor.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// How long a disconnected player's seat is held before eviction.
    /// Default: 5 minutes.
    pub cleanup_window: Duration,
    /// Settings applied to every newly created room.
    pub room_settings: RoomSettings,
    /// Rounds per game.
    pub max_rounds: u32,
    /// Command channel capacity. If the channel fills up, callers wait
    /// (bounded channel, backpressure).
    pub command_buffer: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            cleanup_window: Duration::from_secs(300),
            room_settings: RoomSettings::default(),
            max_rounds: 10,
            command_buffer: 64,
        }
    }
}

impl RegistryConfig {
    /// Clamp and fix any out-of-range values so the config is safe to
    /// use. Called automatically by the spawn path.
    pub fn validated(mut self) -> Self {
        if self.room_settings.max_players < MIN_PLAYERS_TO_START {
            warn!(
                max_players = self.room_settings.max_players,
                min = MIN_PLAYERS_TO_START,
                "max_players below starting minimum, raising"
            );
            self.room_settings.max_players = MIN_PLAYERS_TO_START;
        }
        if self.max_rounds == 0 {
            self.max_rounds = 1;
        }
        if self.command_buffer == 0 {
            self.command_buffer = 1;
        }
        self
    }
}
