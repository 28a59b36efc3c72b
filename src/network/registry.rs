//! Connection Registry
//!
//! Maps logged-in players to their live connection, win count and current
//! match.

use std::collections::BTreeMap;
use std::fmt;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::game::state::{MatchId, PlayerId};
use crate::network::protocol::ServerMessage;

/// Server-assigned connection identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Outbound side of one client connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::Sender<ServerMessage>,
}

impl ConnectionHandle {
    /// Wrap a connection's outbound queue.
    pub fn new(id: ConnectionId, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self { id, sender }
    }

    /// Connection identifier.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a message without waiting.
    ///
    /// Returns false if the queue is full or the connection is gone.
    pub fn send(&self, message: ServerMessage) -> bool {
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Outbound queue full for {}, dropping message", self.id);
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Connection {} already closed", self.id);
                false
            }
        }
    }
}

/// A logged-in player.
#[derive(Debug, Clone)]
pub struct PlayerEntry {
    /// Live connection.
    pub connection: ConnectionHandle,
    /// Rounds won during this login.
    pub wins: u32,
    /// Match the player joined, if any.
    pub match_id: Option<MatchId>,
}

impl PlayerEntry {
    fn new(connection: ConnectionHandle) -> Self {
        Self {
            connection,
            wins: 0,
            match_id: None,
        }
    }
}

/// Logged-in players keyed by identifier.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: BTreeMap<PlayerId, PlayerEntry>,
    preserve_wins_on_relogin: bool,
}

impl PlayerRegistry {
    /// Create an empty registry.
    ///
    /// With `preserve_wins_on_relogin`, logging in again under a known
    /// identifier keeps its win count and current match and only swaps the
    /// connection. Otherwise the entry starts over.
    pub fn new(preserve_wins_on_relogin: bool) -> Self {
        Self {
            players: BTreeMap::new(),
            preserve_wins_on_relogin,
        }
    }

    /// Insert or overwrite a player's entry.
    ///
    /// Returns the connection that previously held this identifier, if it
    /// was a different one.
    pub fn register(
        &mut self,
        player_id: PlayerId,
        connection: ConnectionHandle,
    ) -> Option<ConnectionId> {
        let new_conn = connection.id();

        if self.preserve_wins_on_relogin {
            if let Some(entry) = self.players.get_mut(&player_id) {
                let displaced = std::mem::replace(&mut entry.connection, connection).id();
                return (displaced != new_conn).then_some(displaced);
            }
        }

        let displaced = self
            .players
            .insert(player_id, PlayerEntry::new(connection))?
            .connection
            .id();

        (displaced != new_conn).then_some(displaced)
    }

    /// Look up a player.
    pub fn lookup(&self, player_id: &PlayerId) -> Option<&PlayerEntry> {
        self.players.get(player_id)
    }

    /// Look up a player for mutation.
    pub fn lookup_mut(&mut self, player_id: &PlayerId) -> Option<&mut PlayerEntry> {
        self.players.get_mut(player_id)
    }

    /// Check if a player is logged in.
    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.players.contains_key(player_id)
    }

    /// Remove a player.
    pub fn remove(&mut self, player_id: &PlayerId) -> Option<PlayerEntry> {
        self.players.remove(player_id)
    }

    /// Remove every player currently bound to `connection`.
    ///
    /// Identifiers that were taken over by a newer connection are left alone.
    pub fn remove_by_connection(&mut self, connection: ConnectionId) -> Vec<(PlayerId, PlayerEntry)> {
        let owned: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|(_, entry)| entry.connection.id() == connection)
            .map(|(id, _)| id.clone())
            .collect();

        owned
            .into_iter()
            .filter_map(|id| self.players.remove(&id).map(|entry| (id, entry)))
            .collect()
    }

    /// Credit a round win. Returns the new total.
    pub fn record_win(&mut self, player_id: &PlayerId) -> Option<u32> {
        let entry = self.players.get_mut(player_id)?;
        entry.wins = entry.wins.saturating_add(1);
        Some(entry.wins)
    }

    /// Current win count, if logged in.
    pub fn wins(&self, player_id: &PlayerId) -> Option<u32> {
        self.players.get(player_id).map(|e| e.wins)
    }

    /// Logged-in player count.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// No players logged in.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
