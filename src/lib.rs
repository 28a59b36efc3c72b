//! # RPS Arena Server
//!
//! Realtime matchmaking and match state for two-player rock-paper-scissors.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RPS ARENA SERVER                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  game/            - Rules and match state (no I/O)           │
//! │  ├── moves.rs     - Rock/paper/scissors vocabulary           │
//! │  ├── round.rs     - Round resolution                         │
//! │  ├── state.rs     - Match state and match registry           │
//! │  └── matchmaker.rs- First-fit match placement                │
//! │                                                              │
//! │  network/         - Connections and sessions                 │
//! │  ├── protocol.rs  - Message types                            │
//! │  ├── registry.rs  - Logged-in players and their connections  │
//! │  ├── broadcast.rs - Match snapshots to participants          │
//! │  ├── session.rs   - Message dispatch over both registries    │
//! │  └── server.rs    - WebSocket server                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Processing Model
//!
//! Every inbound message, and every connection close, is applied to the
//! [`SessionManager`] as one critical section, including the broadcast it
//! triggers. Outbound messages go through a bounded queue per connection,
//! so a slow client never holds up other players.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod game;
pub mod network;

// Re-export commonly used types
pub use game::moves::Move;
pub use game::round::{RoundResult, SubmitOutcome};
pub use game::state::{Match, MatchId, MatchRegistry, PlayerId};
pub use network::session::{SessionConfig, SessionError, SessionManager};
pub use network::server::{GameServer, GameServerError, ServerConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
