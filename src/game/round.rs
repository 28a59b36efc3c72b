//! Round Resolution
//!
//! Compares two simultaneous moves and names the outcome.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::game::moves::Move;
use crate::game::state::PlayerId;

/// Outcome of a resolved round.
///
/// On the wire this is `"draw"` or `"<player> wins"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundResult {
    /// Both players chose the same move.
    Draw,
    /// The named player won the round.
    Winner(PlayerId),
}

impl RoundResult {
    /// Winning player, if the round was not a draw.
    pub fn winner(&self) -> Option<&PlayerId> {
        match self {
            RoundResult::Draw => None,
            RoundResult::Winner(id) => Some(id),
        }
    }
}

impl fmt::Display for RoundResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundResult::Draw => f.write_str("draw"),
            RoundResult::Winner(id) => write!(f, "{id} wins"),
        }
    }
}

impl Serialize for RoundResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RoundResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == "draw" {
            return Ok(RoundResult::Draw);
        }
        s.strip_suffix(" wins")
            .map(|id| RoundResult::Winner(PlayerId::new(id)))
            .ok_or_else(|| serde::de::Error::custom(format!("invalid round result {s:?}")))
    }
}

/// What happened to a submitted move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Recorded; the other participant has not moved yet.
    Waiting,
    /// Both moves were in and the round resolved.
    Resolved(RoundResult),
}

/// Resolve a round between the first and second participant.
pub fn resolve(first: (&PlayerId, Move), second: (&PlayerId, Move)) -> RoundResult {
    let (first_id, first_move) = first;
    let (second_id, second_move) = second;

    if first_move == second_move {
        RoundResult::Draw
    } else if first_move.beats(second_move) {
        RoundResult::Winner(first_id.clone())
    } else {
        RoundResult::Winner(second_id.clone())
    }
}
