//! Game Logic Module
//!
//! Match state and rules, independent of any transport.
//!
//! ## Module Structure
//!
//! - `moves`: The rock/paper/scissors vocabulary
//! - `round`: Round resolution
//! - `state`: Identifiers, match state, match registry
//! - `matchmaker`: First-fit match placement

pub mod moves;
pub mod round;
pub mod state;
pub mod matchmaker;

// Re-export key types
pub use moves::{Move, UnknownMove};
pub use round::{resolve, RoundResult, SubmitOutcome};
pub use state::{Match, MatchError, MatchId, MatchRegistry, PlayerId, MAX_PLAYERS};
pub use matchmaker::join_or_create;
