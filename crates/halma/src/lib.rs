//! # Halma
//!
//! Server for two-player Chinese Checkers (Halma) on the star board.
//!
//! The server is authoritative: clients send intents (`move piece 3 to
//! (12,12)`), the server recomputes legality from its own board and tells
//! both players what happened.
//!
//! ```text
//! WebSocket (halma-transport) → JSON envelopes (halma-protocol)
//!     → registry actor (halma-room) → Match → MoveSearch (halma-board)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use halma::prelude::*;
//!
//! # async fn run() -> Result<(), HalmaError> {
//! let server = HalmaServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;
pub mod telemetry;

pub use config::{ConfigError, ServerConfig};
pub use error::HalmaError;
pub use server::{DEFAULT_HANDSHAKE_TIMEOUT, HalmaServer, HalmaServerBuilder};

pub mod prelude {
    pub use crate::{ConfigError, HalmaError, HalmaServer, HalmaServerBuilder, ServerConfig};
    pub use halma_board::{Board, Color, Coord};
    pub use halma_protocol::{
        ClientMessage, Codec, Envelope, JsonCodec, MoveRecord, PlayerId, PlayerSnapshot,
        RejectReason, RoomCode, ServerMessage,
    };
    pub use halma_room::{MatchConfig, RegistryConfig, RegistryHandle, RegistryInfo, WinRule};
}
