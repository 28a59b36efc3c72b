//! Match State Definitions
//!
//! Identifiers, per-match state and the match registry.
//! Uses BTreeMap so iteration follows match creation order.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::game::moves::Move;
use crate::game::round::{resolve, RoundResult, SubmitOutcome};

/// Participants per match.
pub const MAX_PLAYERS: usize = 2;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Caller-supplied player identifier.
///
/// Not verified; uniqueness only holds among currently logged-in players.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Server-generated match identifier.
///
/// Derived from a monotonic counter and rendered as `game<N>`, starting at
/// `game1`. Ordering follows creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchId(u64);

impl MatchId {
    const PREFIX: &'static str = "game";

    /// Create from a sequence number.
    pub const fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// Creation sequence number.
    pub fn seq(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

/// Text that is not a `game<N>` identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid match id {0:?}")]
pub struct InvalidMatchId(pub String);

impl FromStr for MatchId {
    type Err = InvalidMatchId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(Self::PREFIX)
            .and_then(|n| n.parse::<u64>().ok())
            .map(MatchId)
            .ok_or_else(|| InvalidMatchId(s.to_string()))
    }
}

impl Serialize for MatchId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MatchId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// MATCH
// =============================================================================

/// Errors from mutating a single match.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// Both seats are taken.
    #[error("match {0} is full")]
    MatchFull(MatchId),

    /// Player already holds a seat.
    #[error("player {player_id} is already in match {match_id}")]
    AlreadyParticipant {
        /// Match identifier.
        match_id: MatchId,
        /// Player identifier.
        player_id: PlayerId,
    },

    /// Player holds no seat.
    #[error("player {player_id} is not a participant of match {match_id}")]
    NotParticipant {
        /// Match identifier.
        match_id: MatchId,
        /// Player identifier.
        player_id: PlayerId,
    },
}

/// State of one match.
#[derive(Clone, Debug)]
pub struct Match {
    id: MatchId,
    /// Participants in join order. Never more than `MAX_PLAYERS`.
    players: Vec<PlayerId>,
    /// Moves for the round in progress.
    moves: BTreeMap<PlayerId, Move>,
    /// Outcome of the most recent resolved round.
    result: Option<RoundResult>,
}

impl Match {
    /// Create a match seating its first participant.
    pub fn new(id: MatchId, first: PlayerId) -> Self {
        Self {
            id,
            players: vec![first],
            moves: BTreeMap::new(),
            result: None,
        }
    }

    /// Match identifier.
    pub fn id(&self) -> MatchId {
        self.id
    }

    /// Participants in join order.
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    /// Moves submitted for the current round.
    pub fn moves(&self) -> &BTreeMap<PlayerId, Move> {
        &self.moves
    }

    /// Last resolved round, if any.
    pub fn result(&self) -> Option<&RoundResult> {
        self.result.as_ref()
    }

    /// Check if a player holds a seat.
    pub fn is_participant(&self, player_id: &PlayerId) -> bool {
        self.players.contains(player_id)
    }

    /// Exactly one seat is taken.
    pub fn has_open_slot(&self) -> bool {
        self.players.len() == 1
    }

    /// Both seats are taken.
    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// Seat a second participant.
    pub fn add_player(&mut self, player_id: PlayerId) -> Result<(), MatchError> {
        if self.is_participant(&player_id) {
            return Err(MatchError::AlreadyParticipant {
                match_id: self.id,
                player_id,
            });
        }

        if self.is_full() {
            return Err(MatchError::MatchFull(self.id));
        }

        self.players.push(player_id);
        Ok(())
    }

    /// Record a move, resolving the round once both participants have moved.
    ///
    /// A repeated submission replaces the player's earlier move for the round.
    pub fn submit_move(
        &mut self,
        player_id: &PlayerId,
        choice: Move,
    ) -> Result<SubmitOutcome, MatchError> {
        if !self.is_participant(player_id) {
            return Err(MatchError::NotParticipant {
                match_id: self.id,
                player_id: player_id.clone(),
            });
        }

        self.moves.insert(player_id.clone(), choice);

        let (first, second) = match self.players.as_slice() {
            [first, second] => (first, second),
            _ => return Ok(SubmitOutcome::Waiting),
        };

        let (Some(&first_move), Some(&second_move)) =
            (self.moves.get(first), self.moves.get(second))
        else {
            return Ok(SubmitOutcome::Waiting);
        };

        let result = resolve((first, first_move), (second, second_move));
        self.moves.clear();
        self.result = Some(result.clone());

        Ok(SubmitOutcome::Resolved(result))
    }
}

// =============================================================================
// MATCH REGISTRY
// =============================================================================

/// All matches created during the server's lifetime, in creation order.
#[derive(Debug, Default)]
pub struct MatchRegistry {
    matches: BTreeMap<MatchId, Match>,
    created: u64,
}

impl MatchRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a match seating `first` and return its fresh identifier.
    pub fn create(&mut self, first: PlayerId) -> MatchId {
        self.created += 1;
        let id = MatchId::new(self.created);
        self.matches.insert(id, Match::new(id, first));
        id
    }

    /// Get a match by ID.
    pub fn get(&self, id: &MatchId) -> Option<&Match> {
        self.matches.get(id)
    }

    /// Get a match by ID for mutation.
    pub fn get_mut(&mut self, id: &MatchId) -> Option<&mut Match> {
        self.matches.get_mut(id)
    }

    /// Remove a match.
    pub fn remove(&mut self, id: &MatchId) -> Option<Match> {
        self.matches.remove(id)
    }

    /// Matches in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }

    /// Matches in creation order, mutable.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Match> {
        self.matches.values_mut()
    }

    /// Live match count.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// No live matches.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}
