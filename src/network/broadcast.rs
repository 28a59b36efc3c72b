//! Match Broadcasting
//!
//! Pushes a full match snapshot to every participant that still has a live
//! entry in the player registry. Fire-and-forget: no acknowledgment, no retry.

use tracing::trace;

use crate::game::state::Match;
use crate::network::protocol::{GameSnapshot, GameUpdate, PlayerWins, ServerMessage};
use crate::network::registry::PlayerRegistry;

/// Build the snapshot participants see.
///
/// A participant who is no longer logged in is listed with 0 wins.
pub fn snapshot(game: &Match, players: &PlayerRegistry) -> GameSnapshot {
    GameSnapshot {
        players: game.players().to_vec(),
        result: game.result().cloned(),
        player_wins: game
            .players()
            .iter()
            .map(|id| PlayerWins {
                player: id.clone(),
                wins: players.wins(id).unwrap_or(0),
            })
            .collect(),
    }
}

/// Send the match snapshot to its connected participants.
///
/// Returns how many participants the update was queued for.
pub fn broadcast(game: &Match, players: &PlayerRegistry) -> usize {
    let message = ServerMessage::GameUpdate(GameUpdate {
        game: snapshot(game, players),
    });

    let mut delivered = 0;
    for player_id in game.players() {
        match players.lookup(player_id) {
            Some(entry) => {
                if entry.connection.send(message.clone()) {
                    delivered += 1;
                }
            }
            None => trace!("Skipping departed player {} in {}", player_id, game.id()),
        }
    }

    delivered
}
