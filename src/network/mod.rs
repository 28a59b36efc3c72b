//! Network Layer
//!
//! WebSocket server, wire protocol, and the session state every connection
//! feeds into.

pub mod protocol;
pub mod registry;
pub mod broadcast;
pub mod session;
pub mod server;

pub use protocol::{
    ClientMessage, ServerMessage, PlayerRequest, MoveRequest,
    LoginAck, GameUpdate, GameSnapshot, PlayerWins,
};
pub use registry::{ConnectionId, ConnectionHandle, PlayerEntry, PlayerRegistry};
pub use session::{SessionManager, SessionConfig, SessionError, PlayerState};
pub use server::{GameServer, ServerConfig, GameServerError};
