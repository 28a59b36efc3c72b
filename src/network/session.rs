//! Session Management
//!
//! Owns the player registry and the match registry and applies one inbound
//! message at a time to them. Coordinates login, matchmaking, move
//! collection, round resolution and broadcasting.

use tracing::{debug, info, instrument, warn};

use crate::game::matchmaker::join_or_create;
use crate::game::moves::{Move, UnknownMove};
use crate::game::round::SubmitOutcome;
use crate::game::state::{MatchError, MatchId, MatchRegistry, PlayerId};
use crate::network::broadcast;
use crate::network::protocol::{ClientMessage, ServerMessage};
use crate::network::registry::{ConnectionHandle, ConnectionId, PlayerRegistry};
use crate::network::server::{env_flag, GameServerError};

/// Session behavior switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Keep win count and current match when an identifier logs in again.
    pub preserve_wins_on_relogin: bool,
    /// Drop matches once none of their participants is still in them.
    pub reap_abandoned_matches: bool,
}

impl SessionConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, GameServerError> {
        let defaults = Self::default();

        Ok(Self {
            preserve_wins_on_relogin: env_flag("RPS_PRESERVE_WINS_ON_RELOGIN")?
                .unwrap_or(defaults.preserve_wins_on_relogin),
            reap_abandoned_matches: env_flag("RPS_REAP_ABANDONED_MATCHES")?
                .unwrap_or(defaults.reap_abandoned_matches),
        })
    }
}

/// Where a player is in the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Not logged in (or logged out, or connection closed).
    Unauthenticated,
    /// Logged in, not in a match.
    LoggedIn,
    /// In a match with a free seat.
    Waiting,
    /// In a match with both seats taken.
    InMatch,
}

/// Session errors.
///
/// None of these are reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Player already holds a match.
    #[error("player {player_id} already joined {match_id}")]
    DuplicateJoin {
        /// Player identifier.
        player_id: PlayerId,
        /// Match the player already holds.
        match_id: MatchId,
    },

    /// Message names a player that is not logged in.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// Payload could not be parsed.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// Move outside the vocabulary.
    #[error(transparent)]
    InvalidMove(#[from] UnknownMove),

    /// Move from a player that never joined a match.
    #[error("player {0} has not joined a match")]
    NotInMatch(PlayerId),

    /// Player points at a match that no longer exists.
    #[error("match {0} not found")]
    MatchNotFound(MatchId),

    /// Match rejected the operation.
    #[error(transparent)]
    Match(#[from] MatchError),
}

impl SessionError {
    /// Unparseable input, as opposed to a well-formed message that cannot be
    /// applied.
    pub fn is_malformed(&self) -> bool {
        matches!(self, SessionError::MalformedMessage(_))
    }
}

/// All players and matches on this server.
#[derive(Debug)]
pub struct SessionManager {
    config: SessionConfig,
    players: PlayerRegistry,
    matches: MatchRegistry,
}

impl SessionManager {
    /// Create a new session manager.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            players: PlayerRegistry::new(config.preserve_wins_on_relogin),
            matches: MatchRegistry::new(),
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Logged-in players.
    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    /// All live matches.
    pub fn matches(&self) -> &MatchRegistry {
        &self.matches
    }

    /// Parse a text frame and apply it.
    #[instrument(level = "debug", skip(self, connection, text), fields(conn = %connection.id()))]
    pub fn handle_text(
        &mut self,
        connection: &ConnectionHandle,
        text: &str,
    ) -> Result<(), SessionError> {
        let message = ClientMessage::from_json(text)
            .map_err(|e| SessionError::MalformedMessage(e.to_string()))?;
        self.dispatch(connection, message)
    }

    /// Apply one parsed message received on `connection`.
    pub fn dispatch(
        &mut self,
        connection: &ConnectionHandle,
        message: ClientMessage,
    ) -> Result<(), SessionError> {
        match message {
            ClientMessage::Login(req) => {
                self.login(req.player_id, connection.clone());
                Ok(())
            }
            ClientMessage::JoinGame(req) => self.join_game(&req.player_id).map(|_| ()),
            ClientMessage::MakeMove(req) => self.make_move(&req.player_id, &req.choice).map(|_| ()),
            ClientMessage::Logout(req) => self.logout(&req.player_id),
            ClientMessage::Unknown => {
                debug!("Ignoring unrecognized message from {}", connection.id());
                Ok(())
            }
        }
    }

    /// Register a player on a connection and acknowledge.
    pub fn login(&mut self, player_id: PlayerId, connection: ConnectionHandle) {
        let conn_id = connection.id();

        if let Some(previous) = self.players.register(player_id.clone(), connection.clone()) {
            warn!(
                "Player {} moved from {} to {}",
                player_id, previous, conn_id
            );
        }

        connection.send(ServerMessage::login_ok());
        info!("Player {} logged in on {}", player_id, conn_id);
    }

    /// Place a logged-in player in a match and broadcast that match.
    pub fn join_game(&mut self, player_id: &PlayerId) -> Result<MatchId, SessionError> {
        let entry = self
            .players
            .lookup(player_id)
            .ok_or_else(|| SessionError::UnknownPlayer(player_id.clone()))?;

        if let Some(match_id) = entry.match_id {
            if self.matches.get(&match_id).is_some() {
                return Err(SessionError::DuplicateJoin {
                    player_id: player_id.clone(),
                    match_id,
                });
            }
        }

        let match_id = join_or_create(&mut self.matches, player_id.clone());
        if let Some(entry) = self.players.lookup_mut(player_id) {
            entry.match_id = Some(match_id);
        }

        info!("Player {} joined {}", player_id, match_id);
        self.broadcast(&match_id);

        Ok(match_id)
    }

    /// Record a move, resolve the round if complete, and broadcast.
    ///
    /// The broadcast happens whether or not the round resolved.
    pub fn make_move(
        &mut self,
        player_id: &PlayerId,
        choice: &str,
    ) -> Result<SubmitOutcome, SessionError> {
        let match_id = self
            .players
            .lookup(player_id)
            .ok_or_else(|| SessionError::UnknownPlayer(player_id.clone()))?
            .match_id
            .ok_or_else(|| SessionError::NotInMatch(player_id.clone()))?;

        let choice: Move = choice.parse()?;

        let game = self
            .matches
            .get_mut(&match_id)
            .ok_or(SessionError::MatchNotFound(match_id))?;
        let outcome = game.submit_move(player_id, choice)?;

        match &outcome {
            SubmitOutcome::Waiting => {
                debug!("{} waiting on second move in {}", player_id, match_id);
            }
            SubmitOutcome::Resolved(result) => {
                info!("Round in {} resolved: {}", match_id, result);
                if let Some(winner) = result.winner() {
                    if self.players.record_win(winner).is_none() {
                        debug!("Winner {} is no longer logged in", winner);
                    }
                }
            }
        }

        self.broadcast(&match_id);
        Ok(outcome)
    }

    /// Deregister a player. The opponent is not notified.
    pub fn logout(&mut self, player_id: &PlayerId) -> Result<(), SessionError> {
        let entry = self
            .players
            .remove(player_id)
            .ok_or_else(|| SessionError::UnknownPlayer(player_id.clone()))?;

        info!("Player {} logged out", player_id);
        self.after_departure(entry.match_id);
        Ok(())
    }

    /// Deregister every player bound to a closed connection.
    pub fn disconnect(&mut self, connection: ConnectionId) -> Vec<PlayerId> {
        let removed = self.players.remove_by_connection(connection);

        let mut departed = Vec::with_capacity(removed.len());
        for (player_id, entry) in removed {
            info!("Player {} dropped with {}", player_id, connection);
            self.after_departure(entry.match_id);
            departed.push(player_id);
        }
        departed
    }

    /// Send the current snapshot of a match to its connected participants.
    pub fn broadcast(&self, match_id: &MatchId) -> usize {
        match self.matches.get(match_id) {
            Some(game) => broadcast::broadcast(game, &self.players),
            None => {
                debug!("Broadcast for missing match {}", match_id);
                0
            }
        }
    }

    /// Lifecycle state of a player.
    pub fn player_state(&self, player_id: &PlayerId) -> PlayerState {
        let Some(entry) = self.players.lookup(player_id) else {
            return PlayerState::Unauthenticated;
        };

        match entry.match_id.and_then(|id| self.matches.get(&id)) {
            None => PlayerState::LoggedIn,
            Some(game) if game.is_full() => PlayerState::InMatch,
            Some(_) => PlayerState::Waiting,
        }
    }

    /// Check if no participant of a match still counts it as theirs.
    pub fn is_abandoned(&self, match_id: &MatchId) -> bool {
        let Some(game) = self.matches.get(match_id) else {
            return false;
        };

        !game.players().iter().any(|id| {
            self.players
                .lookup(id)
                .is_some_and(|entry| entry.match_id == Some(*match_id))
        })
    }

    /// Remove every abandoned match. Returns how many were removed.
    pub fn reap_abandoned_matches(&mut self) -> usize {
        let abandoned: Vec<MatchId> = self
            .matches
            .iter()
            .map(|game| game.id())
            .filter(|id| self.is_abandoned(id))
            .collect();

        for id in &abandoned {
            self.matches.remove(id);
            info!("Reaped abandoned match {}", id);
        }
        abandoned.len()
    }

    fn after_departure(&mut self, match_id: Option<MatchId>) {
        if !self.config.reap_abandoned_matches {
            return;
        }

        if let Some(id) = match_id {
            if self.is_abandoned(&id) {
                self.matches.remove(&id);
                info!("Reaped abandoned match {}", id);
            }
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::round::RoundResult;
    use crate::network::protocol::GameSnapshot;
    use tokio::sync::mpsc;

    struct TestClient {
        handle: ConnectionHandle,
        rx: mpsc::Receiver<ServerMessage>,
    }

    impl TestClient {
        fn new(id: u64) -> Self {
            let (tx, rx) = mpsc::channel(32);
            Self {
                handle: ConnectionHandle::new(ConnectionId(id), tx),
                rx,
            }
        }

        fn send(&self, manager: &mut SessionManager, json: &str) -> Result<(), SessionError> {
            manager.handle_text(&self.handle, json)
        }

        fn drain(&mut self) -> Vec<ServerMessage> {
            let mut out = Vec::new();
            while let Ok(msg) = self.rx.try_recv() {
                out.push(msg);
            }
            out
        }

        fn last_update(&mut self) -> GameSnapshot {
            self.drain()
                .into_iter()
                .rev()
                .find_map(|msg| match msg {
                    ServerMessage::GameUpdate(update) => Some(update.game),
                    _ => None,
                })
                .expect("no gameUpdate received")
        }
    }

    fn pid(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    fn login(manager: &mut SessionManager, client: &TestClient, name: &str) {
        client
            .send(manager, &format!(r#"{{"type":"login","playerId":"{name}"}}"#))
            .unwrap();
    }

    fn join(manager: &mut SessionManager, client: &TestClient, name: &str) -> Result<(), SessionError> {
        client.send(manager, &format!(r#"{{"type":"joinGame","playerId":"{name}"}}"#))
    }

    fn play(
        manager: &mut SessionManager,
        client: &TestClient,
        name: &str,
        choice: &str,
    ) -> Result<(), SessionError> {
        client.send(
            manager,
            &format!(r#"{{"type":"makeMove","playerId":"{name}","move":"{choice}"}}"#),
        )
    }

    /// Two logged-in players sharing one match.
    fn paired() -> (SessionManager, TestClient, TestClient) {
        let mut manager = SessionManager::default();
        let a = TestClient::new(1);
        let b = TestClient::new(2);
        login(&mut manager, &a, "A");
        login(&mut manager, &b, "B");
        join(&mut manager, &a, "A").unwrap();
        join(&mut manager, &b, "B").unwrap();
        (manager, a, b)
    }

    #[test]
    fn test_login_acknowledges() {
        let mut manager = SessionManager::default();
        let mut a = TestClient::new(1);
        login(&mut manager, &a, "A");

        assert_eq!(a.drain(), vec![ServerMessage::login_ok()]);
        assert_eq!(manager.player_state(&pid("A")), PlayerState::LoggedIn);
    }

    #[test]
    fn test_full_round_scenario() {
        let (mut manager, mut a, mut b) = paired();

        let match_id = manager.players().lookup(&pid("A")).unwrap().match_id.unwrap();
        assert_eq!(manager.players().lookup(&pid("B")).unwrap().match_id, Some(match_id));
        assert_eq!(manager.player_state(&pid("A")), PlayerState::InMatch);

        let snap = a.last_update();
        assert_eq!(snap.players, vec![pid("A"), pid("B")]);
        b.drain();

        play(&mut manager, &a, "A", "rock").unwrap();
        let snap = a.last_update();
        assert!(snap.result.is_none());
        assert!(b.last_update().result.is_none());

        play(&mut manager, &b, "B", "scissors").unwrap();
        let snap = b.last_update();
        assert_eq!(snap.result, Some(RoundResult::Winner(pid("A"))));
        assert_eq!(snap.player_wins[0].wins, 1);
        assert_eq!(snap.player_wins[1].wins, 0);
        assert_eq!(a.last_update(), snap);

        assert!(manager.matches().get(&match_id).unwrap().moves().is_empty());
    }

    #[test]
    fn test_draw_changes_no_wins() {
        let (mut manager, mut a, b) = paired();

        play(&mut manager, &a, "A", "paper").unwrap();
        play(&mut manager, &b, "B", "paper").unwrap();

        let snap = a.last_update();
        assert_eq!(snap.result, Some(RoundResult::Draw));
        assert!(snap.player_wins.iter().all(|w| w.wins == 0));
    }

    #[test]
    fn test_wins_accumulate_across_rounds() {
        let (mut manager, mut a, b) = paired();

        play(&mut manager, &a, "A", "rock").unwrap();
        play(&mut manager, &b, "B", "scissors").unwrap();
        play(&mut manager, &b, "B", "rock").unwrap();
        play(&mut manager, &a, "A", "scissors").unwrap();
        play(&mut manager, &a, "A", "paper").unwrap();
        play(&mut manager, &b, "B", "rock").unwrap();

        let snap = a.last_update();
        assert_eq!(snap.result, Some(RoundResult::Winner(pid("A"))));
        assert_eq!(snap.player_wins[0].wins, 2);
        assert_eq!(snap.player_wins[1].wins, 1);
    }

    #[test]
    fn test_solo_move_rebroadcasts() {
        let mut manager = SessionManager::default();
        let mut a = TestClient::new(1);
        login(&mut manager, &a, "A");
        join(&mut manager, &a, "A").unwrap();
        assert_eq!(manager.player_state(&pid("A")), PlayerState::Waiting);
        a.drain();

        play(&mut manager, &a, "A", "rock").unwrap();
        let snap = a.last_update();
        assert_eq!(snap.players, vec![pid("A")]);
        assert!(snap.result.is_none());
    }

    #[test]
    fn test_duplicate_join_rejected() {
        let (mut manager, mut a, _b) = paired();
        a.drain();

        let err = join(&mut manager, &a, "A").unwrap_err();
        assert!(matches!(err, SessionError::DuplicateJoin { .. }));
        assert_eq!(manager.matches().len(), 1);
        assert!(a.drain().is_empty());
    }

    #[test]
    fn test_duplicate_join_while_waiting() {
        let mut manager = SessionManager::default();
        let a = TestClient::new(1);
        login(&mut manager, &a, "A");
        join(&mut manager, &a, "A").unwrap();

        assert!(matches!(
            join(&mut manager, &a, "A"),
            Err(SessionError::DuplicateJoin { .. })
        ));
        let game = manager.matches().iter().next().unwrap();
        assert_eq!(game.players(), &[pid("A")]);
    }

    #[test]
    fn test_first_fit_across_sessions() {
        let mut manager = SessionManager::default();
        let clients: Vec<TestClient> = (0..3).map(TestClient::new).collect();
        for (i, c) in clients.iter().enumerate() {
            login(&mut manager, c, &format!("p{i}"));
        }

        join(&mut manager, &clients[0], "p0").unwrap();
        join(&mut manager, &clients[1], "p1").unwrap();
        join(&mut manager, &clients[2], "p2").unwrap();

        let ids: Vec<String> = (0..3)
            .map(|i| {
                manager
                    .players()
                    .lookup(&pid(&format!("p{i}")))
                    .unwrap()
                    .match_id
                    .unwrap()
                    .to_string()
            })
            .collect();
        assert_eq!(ids, vec!["game1", "game1", "game2"]);
    }

    #[test]
    fn test_unknown_player_is_recoverable() {
        let mut manager = SessionManager::default();
        let a = TestClient::new(1);

        assert_eq!(
            join(&mut manager, &a, "ghost"),
            Err(SessionError::UnknownPlayer(pid("ghost")))
        );
        assert_eq!(
            play(&mut manager, &a, "ghost", "rock"),
            Err(SessionError::UnknownPlayer(pid("ghost")))
        );
        assert!(matches!(
            a.send(&mut manager, r#"{"type":"logout","playerId":"ghost"}"#),
            Err(SessionError::UnknownPlayer(_))
        ));
    }

    #[test]
    fn test_move_before_join() {
        let mut manager = SessionManager::default();
        let a = TestClient::new(1);
        login(&mut manager, &a, "A");

        assert_eq!(
            play(&mut manager, &a, "A", "rock"),
            Err(SessionError::NotInMatch(pid("A")))
        );
    }

    #[test]
    fn test_invalid_move_ignored() {
        let (mut manager, mut a, mut b) = paired();
        a.drain();
        b.drain();

        let err = play(&mut manager, &a, "A", "lizard").unwrap_err();
        assert!(matches!(err, SessionError::InvalidMove(_)));

        let match_id = manager.players().lookup(&pid("A")).unwrap().match_id.unwrap();
        assert!(manager.matches().get(&match_id).unwrap().moves().is_empty());
        assert!(a.drain().is_empty());
        assert!(b.drain().is_empty());
    }

    #[test]
    fn test_malformed_and_unknown_messages() {
        let mut manager = SessionManager::default();
        let mut a = TestClient::new(1);

        let err = a.send(&mut manager, "{not json").unwrap_err();
        assert!(err.is_malformed());

        let err = a.send(&mut manager, r#"{"type":"login"}"#).unwrap_err();
        assert!(err.is_malformed());

        a.send(&mut manager, r#"{"type":"spectate","playerId":"A"}"#).unwrap();
        assert!(a.drain().is_empty());
        assert!(manager.players().is_empty());
    }

    #[test]
    fn test_logout_leaves_match_and_opponent_untouched() {
        let (mut manager, _a, mut b) = paired();
        b.drain();

        manager.logout(&pid("A")).unwrap();

        assert_eq!(manager.player_state(&pid("A")), PlayerState::Unauthenticated);
        assert_eq!(manager.matches().len(), 1);
        assert!(b.drain().is_empty());
        assert_eq!(manager.player_state(&pid("B")), PlayerState::InMatch);
    }

    #[test]
    fn test_disconnect_mid_match() {
        let (mut manager, mut a, mut b) = paired();

        let departed = manager.disconnect(a.handle.id());
        assert_eq!(departed, vec![pid("A")]);
        a.drain();
        b.drain();

        play(&mut manager, &b, "B", "rock").unwrap();

        let snap = b.last_update();
        assert_eq!(snap.players, vec![pid("A"), pid("B")]);
        assert!(a.drain().is_empty());
    }

    #[test]
    fn test_disconnected_player_is_seat_holder_only() {
        let (mut manager, _a, mut b) = paired();
        manager.disconnect(ConnectionId(1));
        b.drain();

        // A second move never arrives, so the round never resolves.
        play(&mut manager, &b, "B", "rock").unwrap();
        play(&mut manager, &b, "B", "paper").unwrap();
        assert!(b.last_update().result.is_none());
    }

    #[test]
    fn test_identifier_collision_keeps_cleanup_path() {
        let mut manager = SessionManager::default();
        let mut first = TestClient::new(1);
        let mut second = TestClient::new(2);

        login(&mut manager, &first, "A");
        login(&mut manager, &second, "A");
        assert_eq!(first.drain(), vec![ServerMessage::login_ok()]);
        assert_eq!(second.drain(), vec![ServerMessage::login_ok()]);

        // The stale connection closing must not log out the live one.
        assert!(manager.disconnect(ConnectionId(1)).is_empty());
        assert_eq!(manager.player_state(&pid("A")), PlayerState::LoggedIn);

        join(&mut manager, &second, "A").unwrap();
        assert_eq!(second.last_update().players, vec![pid("A")]);
        assert!(first.drain().is_empty());

        assert_eq!(manager.disconnect(ConnectionId(2)), vec![pid("A")]);
        assert!(manager.players().is_empty());
    }

    #[test]
    fn test_relogin_resets_wins() {
        let (mut manager, a, b) = paired();
        play(&mut manager, &a, "A", "rock").unwrap();
        play(&mut manager, &b, "B", "scissors").unwrap();
        assert_eq!(manager.players().wins(&pid("A")), Some(1));

        login(&mut manager, &a, "A");
        assert_eq!(manager.players().wins(&pid("A")), Some(0));
        assert_eq!(manager.player_state(&pid("A")), PlayerState::LoggedIn);
    }

    #[test]
    fn test_relogin_preserves_wins_when_configured() {
        let mut manager = SessionManager::new(SessionConfig {
            preserve_wins_on_relogin: true,
            ..Default::default()
        });
        let a = TestClient::new(1);
        let b = TestClient::new(2);
        login(&mut manager, &a, "A");
        login(&mut manager, &b, "B");
        join(&mut manager, &a, "A").unwrap();
        join(&mut manager, &b, "B").unwrap();
        play(&mut manager, &a, "A", "rock").unwrap();
        play(&mut manager, &b, "B", "scissors").unwrap();

        let mut a2 = TestClient::new(3);
        login(&mut manager, &a2, "A");
        assert_eq!(manager.players().wins(&pid("A")), Some(1));
        assert_eq!(manager.player_state(&pid("A")), PlayerState::InMatch);

        // Updates now flow to the new connection.
        play(&mut manager, &b, "B", "paper").unwrap();
        assert_eq!(a2.last_update().player_wins[0].wins, 1);
    }

    #[test]
    fn test_matches_kept_by_default() {
        let (mut manager, a, b) = paired();
        manager.disconnect(a.handle.id());
        manager.disconnect(b.handle.id());

        assert_eq!(manager.matches().len(), 1);
        assert!(manager.is_abandoned(&MatchId::new(1)));
    }

    #[test]
    fn test_reap_on_departure_when_enabled() {
        let mut manager = SessionManager::new(SessionConfig {
            reap_abandoned_matches: true,
            ..Default::default()
        });
        let a = TestClient::new(1);
        let b = TestClient::new(2);
        login(&mut manager, &a, "A");
        login(&mut manager, &b, "B");
        join(&mut manager, &a, "A").unwrap();
        join(&mut manager, &b, "B").unwrap();

        manager.disconnect(a.handle.id());
        assert_eq!(manager.matches().len(), 1);

        manager.logout(&pid("B")).unwrap();
        assert!(manager.matches().is_empty());
    }

    #[test]
    fn test_reaped_open_match_not_joined() {
        let mut manager = SessionManager::new(SessionConfig {
            reap_abandoned_matches: true,
            ..Default::default()
        });
        let a = TestClient::new(1);
        let b = TestClient::new(2);
        login(&mut manager, &a, "A");
        join(&mut manager, &a, "A").unwrap();
        manager.disconnect(a.handle.id());

        login(&mut manager, &b, "B");
        let id = manager.join_game(&pid("B")).unwrap();
        assert_eq!(id.to_string(), "game2");
        assert_eq!(manager.player_state(&pid("B")), PlayerState::Waiting);
    }

    #[test]
    fn test_sweep_reaps_only_abandoned() {
        let (mut manager, a, b) = paired();
        let c = TestClient::new(3);
        login(&mut manager, &c, "C");
        join(&mut manager, &c, "C").unwrap();

        manager.disconnect(a.handle.id());
        manager.disconnect(b.handle.id());

        assert_eq!(manager.reap_abandoned_matches(), 1);
        assert_eq!(manager.matches().len(), 1);
        assert_eq!(manager.player_state(&pid("C")), PlayerState::Waiting);
    }
}
