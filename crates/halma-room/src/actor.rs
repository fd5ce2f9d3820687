//! Registry actor: a single Tokio task that owns the [`SessionRegistry`].
//!
//! Connection handlers never touch the registry directly. They send
//! commands through a [`RegistryHandle`]; the actor applies each one to
//! completion, including pushing the resulting messages into every
//! affected player's outbound channel, before taking the next.

use std::collections::HashMap;

use halma_protocol::{ClientMessage, PlayerId, ServerMessage};
use tokio::sync::{mpsc, oneshot};

use crate::{Delivery, RegistryConfig, RoomError, SessionRegistry};

/// Default command channel size for the registry actor.
const DEFAULT_CHANNEL_SIZE: usize = 256;

/// Channel sender for delivering outbound messages to a player.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to the registry actor.
enum RegistryCommand {
    /// Register a connection's outbound channel.
    Connect {
        player: PlayerId,
        sender: PlayerSender,
    },

    /// A decoded request from a connection.
    Message { player: PlayerId, msg: ClientMessage },

    /// The connection is gone.
    Disconnect { player: PlayerId },

    Info {
        reply: oneshot::Sender<RegistryInfo>,
    },

    Shutdown,
}

/// A snapshot of registry counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryInfo {
    /// Live rooms.
    pub rooms: usize,
    /// Players holding a seat.
    pub players: usize,
    /// Connections with a registered outbound channel.
    pub connections: usize,
}

/// Handle to the running registry actor. Cheap to clone.
#[derive(Clone)]
pub struct RegistryHandle {
    sender: mpsc::Sender<RegistryCommand>,
}

impl RegistryHandle {
    /// Registers `player`'s outbound channel. Must precede any message
    /// from that player, or replies to it are dropped.
    pub async fn connect(&self, player: PlayerId, sender: PlayerSender) -> Result<(), RoomError> {
        self.send(RegistryCommand::Connect { player, sender }).await
    }

    /// Forwards a request (fire-and-forget; replies arrive on the
    /// player's outbound channel).
    pub async fn send_message(&self, player: PlayerId, msg: ClientMessage) -> Result<(), RoomError> {
        self.send(RegistryCommand::Message { player, msg }).await
    }

    pub async fn disconnect(&self, player: PlayerId) -> Result<(), RoomError> {
        self.send(RegistryCommand::Disconnect { player }).await
    }

    pub async fn info(&self) -> Result<RegistryInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RegistryCommand::Info { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Tells the actor to stop after the commands already queued.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RegistryCommand::Shutdown).await
    }

    async fn send(&self, cmd: RegistryCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable)
    }
}

/// The actor state. Runs inside a Tokio task.
struct RegistryActor {
    registry: SessionRegistry,
    /// Per-connection outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RegistryCommand>,
}

impl RegistryActor {
    async fn run(mut self) {
        tracing::info!("registry actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RegistryCommand::Connect { player, sender } => {
                    tracing::debug!(player_id = %player, "connection registered");
                    self.senders.insert(player, sender);
                }
                RegistryCommand::Message { player, msg } => {
                    let deliveries = self.registry.handle(player, msg);
                    self.dispatch(deliveries);
                }
                RegistryCommand::Disconnect { player } => {
                    self.senders.remove(&player);
                    let deliveries = self.registry.remove_connection(player);
                    self.dispatch(deliveries);
                    tracing::debug!(player_id = %player, "connection removed");
                }
                RegistryCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                RegistryCommand::Shutdown => {
                    tracing::info!("registry shutting down");
                    break;
                }
            }
        }

        tracing::info!(rooms = self.registry.room_count(), "registry actor stopped");
    }

    /// Pushes each delivery into its player's channel. A player whose
    /// handler has already gone is skipped silently.
    fn dispatch(&self, deliveries: Vec<Delivery>) {
        for Delivery { to, message } in deliveries {
            if let Some(sender) = self.senders.get(&to) {
                let _ = sender.send(message);
            }
        }
    }

    fn info(&self) -> RegistryInfo {
        RegistryInfo {
            rooms: self.registry.room_count(),
            players: self.registry.player_count(),
            connections: self.senders.len(),
        }
    }
}

/// Spawns the registry actor and returns a handle to it.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_registry(config: RegistryConfig) -> RegistryHandle {
    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_SIZE);

    let actor = RegistryActor {
        registry: SessionRegistry::new(config),
        senders: HashMap::new(),
        receiver: rx,
    };
    tokio::spawn(actor.run());

    RegistryHandle { sender: tx }
}
