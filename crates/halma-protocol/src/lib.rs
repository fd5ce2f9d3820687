//! Wire protocol for the Halma server.
//!
//! - **Types** ([`Envelope`], [`ClientMessage`], [`ServerMessage`], ...):
//!   the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer sits between transport (raw frames) and the room
//! layer (match state). It knows nothing about connections or rooms beyond
//! their identifiers.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope<ClientMessage>) → Room (Match)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, Envelope, MoveRecord, PlayerId, PlayerSnapshot, RejectReason, RoomCode,
    ServerMessage,
};

pub use halma_board::{Color, Coord};
