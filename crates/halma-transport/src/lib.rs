//! Sockets for the Halma server.
//!
//! The server loop only sees three traits. A [`Transport`] accepts raw
//! sockets, a [`Handshake`] upgrades one of them, and a [`Connection`]
//! moves whole frames. Browsers reach the server through
//! [`WebSocketTransport`].
//!
//! Accepting and upgrading are separate steps so the upgrade can run in
//! the connection's own task: a peer that never finishes its handshake
//! holds up nobody else.
//!
//! Feature `websocket` (on by default) enables the `tokio-tungstenite`
//! implementation.

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{PendingWebSocket, WebSocketConnection, WebSocketTransport};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one accepted socket. Never reused within a process, so it
/// doubles as the player's identity for as long as the socket lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates a fresh id from the process-wide counter.
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A listener that yields not-yet-upgraded sockets.
pub trait Transport: Send + Sync + 'static {
    type Pending: Handshake<Connection = Self::Connection, Error = Self::Error>;
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next peer. Returns as soon as the socket is accepted;
    /// no bytes are read from it here.
    async fn accept(&mut self) -> Result<Self::Pending, Self::Error>;

    /// Where the listener is bound. With port `0` this is the port the OS
    /// picked.
    fn local_addr(&self) -> Result<SocketAddr, Self::Error>;
}

/// An accepted socket waiting for its protocol upgrade.
pub trait Handshake: Send + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    fn id(&self) -> ConnectionId;

    /// Runs the upgrade, giving up once `limit` has passed.
    async fn upgrade(self, limit: Duration) -> Result<Self::Connection, Self::Error>;
}

/// A bidirectional frame pipe to one client.
///
/// Implementations must allow a `send` while a `recv` is pending: the
/// handler waits on inbound frames and pushes broadcasts concurrently.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Next inbound frame, or `Ok(None)` once the peer has closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;
}
