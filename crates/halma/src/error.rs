//! Unified error type for the Halma server.

use halma_protocol::ProtocolError;
use halma_room::RoomError;
use halma_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors, so `?` converts
/// them across layers.
#[derive(Debug, thiserror::Error)]
pub enum HalmaError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
