//! WebSocket Game Server
//!
//! Async WebSocket server for player connections.
//! Each connection gets a reader loop and a writer task; every inbound frame
//! is applied to the shared session manager under a single lock.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, Mutex, OwnedSemaphorePermit, RwLock, Semaphore};
use tokio::time::interval;
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};
use tracing::{debug, error, info, instrument, warn};

use crate::network::protocol::ServerMessage;
use crate::network::registry::{ConnectionHandle, ConnectionId};
use crate::network::session::{SessionConfig, SessionError, SessionManager};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Per-connection outbound message queue size.
    pub outbound_queue: usize,
    /// Period of the abandoned-match sweep.
    pub cleanup_interval: Duration,
    /// Session behavior.
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_connections: 1000,
            outbound_queue: 64,
            cleanup_interval: Duration::from_secs(60),
            session: SessionConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, GameServerError> {
        let defaults = Self::default();

        let config = Self {
            bind_addr: env_parse("RPS_BIND_ADDR")?.unwrap_or(defaults.bind_addr),
            max_connections: env_parse("RPS_MAX_CONNECTIONS")?
                .unwrap_or(defaults.max_connections),
            outbound_queue: env_parse("RPS_OUTBOUND_QUEUE")?.unwrap_or(defaults.outbound_queue),
            cleanup_interval: env_parse::<u64>("RPS_CLEANUP_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_interval),
            session: SessionConfig::from_env()?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<(), GameServerError> {
        if self.max_connections == 0 || self.max_connections > Semaphore::MAX_PERMITS {
            return Err(GameServerError::Config(format!(
                "max connections must be between 1 and {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.outbound_queue == 0 {
            return Err(GameServerError::Config("outbound queue must be non-zero".into()));
        }
        if self.cleanup_interval.is_zero() {
            return Err(GameServerError::Config("cleanup interval must be non-zero".into()));
        }
        Ok(())
    }
}

pub(crate) fn env_parse<T>(name: &str) -> Result<Option<T>, GameServerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| GameServerError::Config(format!("{name}={raw:?}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Read a boolean switch. Accepts `true`/`false` and `1`/`0`.
pub(crate) fn env_flag(name: &str) -> Result<Option<bool>, GameServerError> {
    match std::env::var(name) {
        Ok(raw) => parse_flag(raw.trim())
            .map(Some)
            .ok_or_else(|| GameServerError::Config(format!("{name}={raw:?}: expected true/false/1/0"))),
        Err(_) => Ok(None),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Connected client bookkeeping.
struct ConnectedClient {
    addr: SocketAddr,
    connected_at: Instant,
}

/// The game server.
pub struct GameServer {
    /// Server configuration.
    config: ServerConfig,
    /// Players and matches.
    sessions: Arc<Mutex<SessionManager>>,
    /// Open connections.
    clients: Arc<RwLock<BTreeMap<ConnectionId, ConnectedClient>>>,
    /// One permit per admitted connection, held from accept until cleanup.
    connection_slots: Arc<Semaphore>,
    /// Source of connection identifiers.
    next_connection: AtomicU64,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl GameServer {
    /// Create a new game server.
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let connection_slots = Arc::new(Semaphore::new(config.max_connections));

        Self {
            sessions: Arc::new(Mutex::new(SessionManager::new(config.session.clone()))),
            config,
            clients: Arc::new(RwLock::new(BTreeMap::new())),
            connection_slots,
            next_connection: AtomicU64::new(0),
            shutdown_tx,
        }
    }

    /// Bind the configured address and run until shutdown.
    pub async fn run(&self) -> Result<(), GameServerError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Accept connections on an already bound listener until shutdown.
    #[instrument(skip(self, listener))]
    pub async fn serve(&self, listener: TcpListener) -> Result<(), GameServerError> {
        info!("Game server listening on {}", listener.local_addr()?);

        let cleanup_handle = if self.config.session.reap_abandoned_matches {
            let sessions = self.sessions.clone();
            let period = self.config.cleanup_interval;
            Some(tokio::spawn(async move {
                Self::run_cleanup_loop(sessions, period).await;
            }))
        } else {
            None
        };

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            // Slot is taken before the handshake so pending sockets count.
                            let Ok(permit) = self.connection_slots.clone().try_acquire_owned() else {
                                warn!("Connection limit reached, rejecting {}", addr);
                                continue;
                            };

                            info!("New connection from {}", addr);
                            self.handle_connection(stream, addr, permit);
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        if let Some(handle) = cleanup_handle {
            handle.abort();
        }

        Ok(())
    }

    /// Complete the WebSocket handshake.
    async fn accept(stream: TcpStream) -> Result<WebSocketStream<TcpStream>, GameServerError> {
        Ok(accept_async(stream).await?)
    }

    /// Handle a new WebSocket connection.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr, permit: OwnedSemaphorePermit) {
        let conn_id = ConnectionId(self.next_connection.fetch_add(1, Ordering::Relaxed) + 1);
        let clients = self.clients.clone();
        let sessions = self.sessions.clone();
        let queue_size = self.config.outbound_queue;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let ws_stream = match Self::accept(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    error!("WebSocket handshake failed for {}: {}", addr, e);
                    return;
                }
            };

            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(queue_size);
            let handle = ConnectionHandle::new(conn_id, msg_tx);

            clients.write().await.insert(conn_id, ConnectedClient {
                addr,
                connected_at: Instant::now(),
            });

            // Spawn message sender task
            let sender_task = tokio::spawn(async move {
                while let Some(msg) = msg_rx.recv().await {
                    let text = match msg.to_json() {
                        Ok(t) => t,
                        Err(e) => {
                            error!("Failed to serialize message: {}", e);
                            continue;
                        }
                    };
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
            });

            // Handle incoming messages
            loop {
                tokio::select! {
                    msg = ws_receiver.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                let result = sessions.lock().await.handle_text(&handle, &text);
                                if let Err(e) = result {
                                    log_rejected(conn_id, &e);
                                }
                            }
                            Some(Ok(Message::Binary(_))) => {
                                debug!("Ignoring binary frame from {}", conn_id);
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                debug!("Client {} disconnected", conn_id);
                                break;
                            }
                            Some(Err(e)) => {
                                warn!("WebSocket error for {}: {}", conn_id, e);
                                break;
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }

            // Cleanup
            sender_task.abort();

            let departed = sessions.lock().await.disconnect(conn_id);
            let client = clients.write().await.remove(&conn_id);
            drop(permit);

            if let Some(client) = client {
                info!(
                    "Client {} ({}) cleaned up after {:?}, {} player(s) dropped",
                    conn_id,
                    client.addr,
                    client.connected_at.elapsed(),
                    departed.len()
                );
            }
        });
    }

    /// Periodically drop matches nobody is playing in anymore.
    async fn run_cleanup_loop(sessions: Arc<Mutex<SessionManager>>, period: Duration) {
        let mut interval = interval(period);

        loop {
            interval.tick().await;

            let reaped = sessions.lock().await.reap_abandoned_matches();
            if reaped > 0 {
                info!("Cleanup removed {} abandoned match(es)", reaped);
            }
        }
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Get active connection count.
    pub async fn connection_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Get logged-in player count.
    pub async fn player_count(&self) -> usize {
        self.sessions.lock().await.players().len()
    }

    /// Get live match count.
    pub async fn match_count(&self) -> usize {
        self.sessions.lock().await.matches().len()
    }
}

fn log_rejected(conn_id: ConnectionId, err: &SessionError) {
    if err.is_malformed() {
        debug!("Malformed message from {}: {}", conn_id, err);
    } else {
        warn!("Rejected message from {}: {}", conn_id, err);
    }
}
