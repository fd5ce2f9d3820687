//! `HalmaServer` builder and server loop.
//!
//! Ties the layers together: the transport accepts sockets, each socket
//! gets a handler task, and every handler talks to the one registry actor.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use halma_protocol::{Codec, JsonCodec};
use halma_room::{spawn_registry, RegistryConfig, RegistryHandle};
use halma_transport::{Handshake, Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{HalmaError, ServerConfig};

/// How long a freshly accepted socket may take to finish its upgrade.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: RegistryHandle,
    pub(crate) codec: C,
    /// Envelope timestamps count milliseconds from here.
    pub(crate) started: Instant,
    pub(crate) handshake_timeout: Duration,
}

/// Builder for configuring and starting a Halma server.
///
/// ```rust,ignore
/// let server = HalmaServer::builder()
///     .bind("127.0.0.1:0")
///     .registry_config(RegistryConfig { seed: Some(1), ..Default::default() })
///     .build()
///     .await?;
/// ```
pub struct HalmaServerBuilder {
    bind_addr: String,
    registry: RegistryConfig,
    handshake_timeout: Duration,
}

impl HalmaServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::from_config(ServerConfig::default())
    }

    /// Starts from a loaded [`ServerConfig`].
    pub fn from_config(config: ServerConfig) -> Self {
        Self {
            bind_addr: config.bind_addr,
            registry: config.registry,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets room code and match settings.
    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry = config;
        self
    }

    /// Caps the WebSocket upgrade of each new socket. Peers that take
    /// longer are dropped.
    pub fn handshake_timeout(mut self, limit: Duration) -> Self {
        self.handshake_timeout = limit;
        self
    }

    /// Binds the listener and spawns the registry actor.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn build(self) -> Result<HalmaServer<JsonCodec>, HalmaError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: spawn_registry(self.registry),
            codec: JsonCodec,
            started: Instant::now(),
            handshake_timeout: self.handshake_timeout,
        });

        Ok(HalmaServer { transport, state })
    }
}

impl Default for HalmaServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A Halma server, bound and ready to accept.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct HalmaServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl HalmaServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> HalmaServerBuilder {
        HalmaServerBuilder::new()
    }
}

impl<C: Codec> HalmaServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, HalmaError> {
        Ok(self.transport.local_addr()?)
    }

    /// A handle to the registry actor, for inspection.
    pub fn registry(&self) -> RegistryHandle {
        self.state.registry.clone()
    }

    /// Runs the accept loop, spawning a task per socket.
    ///
    /// The loop only accepts. The WebSocket upgrade and everything after
    /// it happen in the spawned task, so a peer that stalls mid-handshake
    /// costs one task and never blocks other clients. Runs until the
    /// process is terminated; a failed accept is logged and skipped.
    pub async fn run(mut self) -> Result<(), HalmaError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Halma server running");

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let (id, peer) = (pending.id(), pending.peer_addr());
                        let conn = match pending.upgrade(state.handshake_timeout).await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(%id, %peer, error = %e, "handshake failed");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
