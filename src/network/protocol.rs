//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! Each text frame carries one JSON object tagged by its `type` field.

use serde::{Deserialize, Serialize};

use crate::game::round::RoundResult;
use crate::game::state::PlayerId;

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Register the player on this connection.
    Login(PlayerRequest),

    /// Ask to be placed in a match.
    JoinGame(PlayerRequest),

    /// Submit a move for the current round.
    MakeMove(MoveRequest),

    /// Deregister the player.
    Logout(PlayerRequest),

    /// Any other `type`. Ignored by the server.
    #[serde(other)]
    Unknown,
}

/// Request that only names a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRequest {
    /// Caller-supplied player identifier.
    pub player_id: PlayerId,
}

/// Move submission.
///
/// The move is kept as raw text here; it is checked against the vocabulary
/// when the session handles it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Caller-supplied player identifier.
    pub player_id: PlayerId,
    /// Move name.
    #[serde(rename = "move")]
    pub choice: String,
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Login acknowledgment.
    Login(LoginAck),

    /// Full match snapshot.
    GameUpdate(GameUpdate),
}

/// Login acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAck {
    /// Always true; failures are not reported.
    pub success: bool,
}

/// Envelope for a match snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameUpdate {
    /// Snapshot of the match.
    pub game: GameSnapshot,
}

/// Match state as seen by participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Participants in join order.
    pub players: Vec<PlayerId>,
    /// Last round outcome, `null` before the first resolution.
    pub result: Option<RoundResult>,
    /// Win count per participant, in participant order.
    pub player_wins: Vec<PlayerWins>,
}

/// Win count of one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerWins {
    /// Player identifier.
    pub player: PlayerId,
    /// Rounds won during the current login.
    pub wins: u32,
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Successful login acknowledgment.
    pub fn login_ok() -> Self {
        ServerMessage::Login(LoginAck { success: true })
    }
}
