//! Matchmaking
//!
//! First-fit placement: the oldest match with a free seat takes the next
//! player, otherwise a new match is opened.

use tracing::debug;

use crate::game::state::{MatchId, MatchRegistry, PlayerId};

/// Seat `player_id` in the first open match, or create one.
///
/// Matches already holding the player are skipped, so a player never fills
/// both seats of the same match. Callers are expected to reject players that
/// are already matched before calling this.
pub fn join_or_create(matches: &mut MatchRegistry, player_id: PlayerId) -> MatchId {
    let open = matches
        .iter_mut()
        .find(|m| m.has_open_slot() && !m.is_participant(&player_id));

    if let Some(game) = open {
        let id = game.id();
        // has_open_slot and the participant check above rule out both errors.
        if game.add_player(player_id.clone()).is_ok() {
            debug!("Player {} joined open match {}", player_id, id);
            return id;
        }
    }

    let id = matches.create(player_id.clone());
    debug!("Player {} opened match {}", player_id, id);
    id
}
