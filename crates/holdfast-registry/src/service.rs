//! The registry actor: one task that owns every room and session.
//!
//! All mutation flows through [`Command`]s on a single channel, which
//! includes cleanup expiries fed back in by the spawn wiring. That
//! gives every transition a total order: a reconnect and an eviction
//! for the same session can never interleave, whichever command
//! arrives first simply wins.
//!
//! Validation happens before any state change, so a refused request
//! leaves the registry exactly as it was.

use holdfast_cleanup::CleanupScheduler;
use holdfast_protocol::{
    ClientEvent, ConnectionId, Player, PlayerEvent, Room, RoomCode,
    RoomStatus, ServerEvent, SessionToken,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::code::generate_room_code;
use crate::config::{MIN_PLAYERS_TO_START, RegistryConfig};
use crate::error::RegistryError;
use crate::judge::AnswerJudge;
use crate::notifier::{EventSender, Notifier};
use crate::store::{RoomStore, SessionIndex};

/// Commands sent to the registry actor through its channel.
pub(crate) enum Command {
    /// Register the outbound channel for a new connection.
    Attach {
        connection: ConnectionId,
        sender: EventSender,
    },
    /// A decoded client request. Fire-and-forget: responses and
    /// refusals alike come back through the attached channel.
    Request {
        connection: ConnectionId,
        event: ClientEvent,
    },
    /// The transport lost a connection.
    Disconnect { connection: ConnectionId },
    /// A recovery window elapsed for a disconnected session.
    CleanupExpired { token: SessionToken },
    /// Request a snapshot of one room.
    RoomSnapshot {
        code: RoomCode,
        reply: oneshot::Sender<Option<Room>>,
    },
    /// Request the number of live rooms.
    RoomCount { reply: oneshot::Sender<usize> },
    /// Stop the actor.
    Shutdown,
}

/// The internal actor state. Runs inside a Tokio task.
pub(crate) struct Registry {
    config: RegistryConfig,
    rooms: RoomStore,
    sessions: SessionIndex,
    notifier: Notifier,
    cleanup: CleanupScheduler<SessionToken>,
    judge: Box<dyn AnswerJudge>,
    receiver: mpsc::Receiver<Command>,
}

impl Registry {
    pub(crate) fn new(
        config: RegistryConfig,
        judge: Box<dyn AnswerJudge>,
        cleanup: CleanupScheduler<SessionToken>,
        receiver: mpsc::Receiver<Command>,
    ) -> Self {
        Self {
            config,
            rooms: RoomStore::new(),
            sessions: SessionIndex::new(),
            notifier: Notifier::new(),
            cleanup,
            judge,
            receiver,
        }
    }

    /// Runs the actor loop, processing commands until shutdown.
    pub(crate) async fn run(mut self) {
        info!(
            window_secs = self.config.cleanup_window.as_secs(),
            "registry started"
        );

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                Command::Attach { connection, sender } => {
                    self.notifier.attach(connection, sender);
                }
                Command::Request { connection, event } => {
                    self.handle_request(connection, event);
                }
                Command::Disconnect { connection } => {
                    self.handle_disconnect(connection);
                }
                Command::CleanupExpired { token } => {
                    self.handle_cleanup_expired(token);
                }
                Command::RoomSnapshot { code, reply } => {
                    let _ = reply.send(self.rooms.get(&code).cloned());
                }
                Command::RoomCount { reply } => {
                    let _ = reply.send(self.rooms.len());
                }
                Command::Shutdown => {
                    info!("registry shutting down");
                    break;
                }
            }
        }

        info!("registry stopped");
    }

    /// Dispatches a client request; refusals go back to the requester
    /// as an ERROR event and touch no state.
    fn handle_request(
        &mut self,
        connection: ConnectionId,
        event: ClientEvent,
    ) {
        let result = match event {
            ClientEvent::CreateRoom {
                username,
                session_token,
            } => self.handle_create_room(connection, username, session_token),
            ClientEvent::JoinRoom {
                room_code,
                username,
                session_token,
            } => self.handle_join_room(
                connection,
                room_code,
                username,
                session_token,
            ),
            ClientEvent::LeaveRoom {
                room_code,
                session_token,
            } => self.handle_leave_room(room_code, session_token),
            ClientEvent::StartGame {
                room_code,
                session_token,
            } => self.handle_start_game(room_code, session_token),
            ClientEvent::SubmitAnswer {
                room_code,
                answer,
                session_token,
            } => self.handle_submit_answer(room_code, answer, session_token),
        };

        if let Err(err) = result {
            debug!(%connection, %err, "request refused");
            if let Some(event) = err.to_event() {
                self.notifier.send_to(connection, event);
            }
        }
    }

    fn handle_create_room(
        &mut self,
        connection: ConnectionId,
        username: String,
        token: SessionToken,
    ) -> Result<(), RegistryError> {
        let username = username.trim().to_string();
        if token.is_empty() || username.is_empty() {
            return Err(RegistryError::InvalidPayload(
                "username and sessionToken are required".into(),
            ));
        }
        if let Some(code) = self.sessions.room_for(&token) {
            return Err(RegistryError::AlreadyInRoom(
                token.clone(),
                code.clone(),
            ));
        }

        let code = generate_room_code(|c| self.rooms.contains(c));
        let player = Player::new(token.clone(), connection, username, true);
        let room = Room::new(
            code.clone(),
            player.clone(),
            self.config.room_settings.clone(),
            self.config.max_rounds,
        );

        self.sessions.bind(token, code.clone(), connection);
        self.rooms.insert(room.clone());
        info!(%code, host = %player.username, "room created");

        self.notifier
            .send_to(connection, ServerEvent::RoomCreated { room, player });
        Ok(())
    }

    fn handle_join_room(
        &mut self,
        connection: ConnectionId,
        room_code: RoomCode,
        username: Option<String>,
        token: SessionToken,
    ) -> Result<(), RegistryError> {
        if token.is_empty() {
            return Err(RegistryError::InvalidPayload(
                "sessionToken is required".into(),
            ));
        }
        if !self.rooms.contains(&room_code) {
            return Err(RegistryError::RoomNotFound(room_code));
        }

        // A token with a seat in this room is reconnecting, whatever
        // the rest of the payload says.
        let has_seat = self
            .rooms
            .get(&room_code)
            .is_some_and(|r| r.player(&token).is_some());
        if has_seat {
            return self.handle_reconnect(connection, room_code, token);
        }
        if let Some(bound) = self.sessions.room_for(&token) {
            if bound != &room_code {
                return Err(RegistryError::AlreadyInRoom(
                    token,
                    bound.clone(),
                ));
            }
            // Indexed to this room without a seat: a stale binding.
            self.sessions.remove(&token);
        }

        let username = username.unwrap_or_default().trim().to_string();
        if username.is_empty() {
            return Err(RegistryError::InvalidPayload(
                "username is required to join".into(),
            ));
        }

        let Some(room) = self.rooms.get_mut(&room_code) else {
            return Err(RegistryError::RoomNotFound(room_code));
        };
        if room.is_full() {
            return Err(RegistryError::RoomFull(room_code));
        }
        if room.status != RoomStatus::Waiting
            && !room.settings.allow_late_join
        {
            return Err(RegistryError::GameInProgress(room_code));
        }
        if room.is_username_taken(&username) {
            return Err(RegistryError::UsernameTaken(username, room_code));
        }

        let player = Player::new(token.clone(), connection, username, false);
        room.players.push(player.clone());
        let snapshot = room.clone();

        self.sessions.bind(token.clone(), room_code.clone(), connection);
        info!(
            %room_code,
            player = %player.username,
            players = snapshot.players.len(),
            "player joined"
        );

        self.notifier.send_to(
            connection,
            ServerEvent::JoinSuccess {
                room: snapshot.clone(),
                player,
            },
        );
        self.notifier.broadcast_except(
            &snapshot,
            &token,
            ServerEvent::PlayerUpdate {
                players: snapshot.players.clone(),
                event: PlayerEvent::Joined,
                affected_player_id: Some(token.clone()),
            },
        );
        Ok(())
    }

    /// Recovers an existing session onto a new connection. The caller
    /// has already verified the seat exists.
    fn handle_reconnect(
        &mut self,
        connection: ConnectionId,
        room_code: RoomCode,
        token: SessionToken,
    ) -> Result<(), RegistryError> {
        let Some(room) = self.rooms.get_mut(&room_code) else {
            return Err(RegistryError::RoomNotFound(room_code));
        };
        let Some(player) = room.player_mut(&token) else {
            return Err(RegistryError::RoomNotFound(room_code));
        };

        let old_connection = player.connection_id;
        player.mark_online(connection);
        let player = player.clone();
        let snapshot = room.clone();

        self.cleanup.cancel(&token);
        self.sessions
            .rebind_connection(&token, old_connection, connection);

        let message = match snapshot.status {
            RoomStatus::Waiting => "reconnected to lobby",
            RoomStatus::Playing => "reconnected to game in progress",
            RoomStatus::Finished => "reconnected to finished game",
        };
        info!(
            %room_code,
            player = %player.username,
            %connection,
            "session recovered"
        );

        self.notifier.send_to(
            connection,
            ServerEvent::ReconnectSuccess {
                room: snapshot.clone(),
                player,
                message: message.to_string(),
            },
        );
        self.notifier.broadcast_except(
            &snapshot,
            &token,
            ServerEvent::PlayerUpdate {
                players: snapshot.players.clone(),
                event: PlayerEvent::Reconnected,
                affected_player_id: Some(token.clone()),
            },
        );
        Ok(())
    }

    /// An explicit leave removes the player immediately; there is no
    /// recovery window. A leave naming a room the session is not
    /// seated in is ignored.
    fn handle_leave_room(
        &mut self,
        room_code: RoomCode,
        token: SessionToken,
    ) -> Result<(), RegistryError> {
        let seated = self
            .rooms
            .get(&room_code)
            .is_some_and(|r| r.player(&token).is_some());
        if !seated {
            debug!(%room_code, %token, "leave without a seat, ignoring");
            return Ok(());
        }
        self.remove_player(&token, PlayerEvent::Left);
        Ok(())
    }

    fn handle_start_game(
        &mut self,
        room_code: RoomCode,
        token: SessionToken,
    ) -> Result<(), RegistryError> {
        let Some(room) = self.rooms.get_mut(&room_code) else {
            return Err(RegistryError::RoomNotFound(room_code));
        };

        if room.host_id != token {
            return Err(RegistryError::NotHost);
        }
        if room.status != RoomStatus::Waiting {
            return Err(RegistryError::GameInProgress(room_code));
        }
        if room.online_count() < MIN_PLAYERS_TO_START {
            return Err(RegistryError::NotEnoughPlayers(
                MIN_PLAYERS_TO_START,
            ));
        }

        room.status = RoomStatus::Playing;
        room.current_round = 1;
        let snapshot = room.clone();
        info!(%room_code, players = snapshot.players.len(), "game started");

        self.notifier.broadcast(
            &snapshot,
            ServerEvent::GameStarted {
                room: snapshot.clone(),
                round: 1,
            },
        );
        Ok(())
    }

    /// Answers for unknown rooms, or from sessions not seated in the
    /// room, are dropped without a reply. Every accepted answer
    /// broadcasts `SCORE_UPDATE`, even when the judge left the score
    /// untouched; clients reconcile on the full list.
    fn handle_submit_answer(
        &mut self,
        room_code: RoomCode,
        answer: String,
        token: SessionToken,
    ) -> Result<(), RegistryError> {
        let Some(room) = self.rooms.get(&room_code) else {
            debug!(%room_code, "answer for unknown room, ignoring");
            return Ok(());
        };
        if room.player(&token).is_none() {
            debug!(%room_code, %token, "answer from non-member, ignoring");
            return Ok(());
        }

        let verdict = self.judge.judge(room, &token, &answer);

        let Some(room) = self.rooms.get_mut(&room_code) else {
            return Ok(());
        };
        if verdict.score_delta != 0 {
            if let Some(player) = room.player_mut(&token) {
                player.score += verdict.score_delta;
            }
        }
        if verdict.game_over {
            room.status = RoomStatus::Finished;
        }
        let snapshot = room.clone();

        self.notifier.broadcast(
            &snapshot,
            ServerEvent::PlayerUpdate {
                players: snapshot.players.clone(),
                event: PlayerEvent::ScoreUpdate,
                affected_player_id: Some(token.clone()),
            },
        );
        if verdict.game_over {
            info!(%room_code, "game ended");
            self.notifier.broadcast(
                &snapshot,
                ServerEvent::GameEnded {
                    room: snapshot.clone(),
                },
            );
        }
        Ok(())
    }

    /// A lost connection starts the recovery window instead of
    /// removing the player. Duplicate or stale disconnects, including
    /// one for a connection a reconnect already replaced, are no-ops.
    fn handle_disconnect(&mut self, connection: ConnectionId) {
        self.notifier.detach(connection);

        let Some(token) = self.sessions.release_connection(connection)
        else {
            debug!(%connection, "disconnect with no active session");
            return;
        };
        let Some(room_code) = self.sessions.room_for(&token).cloned()
        else {
            return;
        };
        let Some(room) = self.rooms.get_mut(&room_code) else {
            return;
        };
        let Some(player) = room.player_mut(&token) else {
            return;
        };
        if player.connection_id != connection {
            // A newer connection already owns this session.
            return;
        }

        player.mark_offline();
        let username = player.username.clone();
        let snapshot = room.clone();

        self.cleanup.arm(token.clone());
        info!(
            %room_code,
            player = %username,
            window_secs = self.config.cleanup_window.as_secs(),
            "player disconnected, holding seat"
        );

        self.notifier.broadcast_except(
            &snapshot,
            &token,
            ServerEvent::PlayerUpdate {
                players: snapshot.players.clone(),
                event: PlayerEvent::Disconnected,
                affected_player_id: Some(token.clone()),
            },
        );
    }

    /// The recovery window for a disconnected session elapsed.
    fn handle_cleanup_expired(&mut self, token: SessionToken) {
        self.cleanup.acknowledge(&token);

        let Some(room_code) = self.sessions.room_for(&token).cloned()
        else {
            return;
        };
        let still_online = self
            .rooms
            .get(&room_code)
            .and_then(|r| r.player(&token))
            .is_some_and(|p| p.is_online);
        if still_online {
            // The expiry lost a race with a reconnect in the command
            // queue; the seat stays.
            debug!(%token, "ignoring stale cleanup expiry");
            return;
        }

        info!(%room_code, %token, "recovery window elapsed, evicting");
        self.remove_player(&token, PlayerEvent::Left);
    }

    /// Removes a player record and repairs the room around the hole:
    /// host reassignment, membership broadcast, and deletion of the
    /// room once the last player is gone.
    fn remove_player(&mut self, token: &SessionToken, event: PlayerEvent) {
        self.cleanup.cancel(token);

        let Some(room_code) = self.sessions.room_for(token).cloned()
        else {
            return;
        };
        self.sessions.remove(token);

        let Some(room) = self.rooms.get_mut(&room_code) else {
            return;
        };
        let Some(removed) = room.remove_player(token) else {
            warn!(%room_code, %token, "session indexed to a room without a seat");
            return;
        };

        if room.is_empty() {
            self.rooms.remove(&room_code);
            info!(%room_code, "last player gone, room deleted");
            return;
        }

        if removed.is_host {
            if let Some(new_host) = room.reassign_host() {
                info!(%room_code, %new_host, "host reassigned");
            }
        }
        let snapshot = room.clone();
        info!(
            %room_code,
            player = %removed.username,
            players = snapshot.players.len(),
            "player removed"
        );

        self.notifier.broadcast(
            &snapshot,
            ServerEvent::PlayerUpdate {
                players: snapshot.players.clone(),
                event,
                affected_player_id: Some(token.clone()),
            },
        );
    }
}
