//! Core protocol types for the Halma wire format.
//!
//! Every type here is serialized to JSON and sent over the WebSocket.
//! Tags and field names are camelCase to match the browser client:
//!
//! ```text
//! {"seq":4,"timestamp":0,"payload":{"type":"move","pieceIndex":3,"target":{"x":12,"y":12}}}
//! ```

use std::fmt;

use halma_board::{Color, Coord};
use halma_transport::ConnectionId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// One connection holds at most one seat, so the player id is the
/// connection id. Serialized as a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl From<ConnectionId> for PlayerId {
    fn from(id: ConnectionId) -> Self {
        Self(id.into_inner())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A short, human-typeable room code such as `"K7QZ"`.
///
/// Serialized as a plain string. Codes issued by the server are uppercase
/// alphanumerics; codes typed by users are passed through
/// [`RoomCode::normalized`] before lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Trimmed and uppercased, so `" k7qz "` finds room `K7QZ`.
    pub fn normalized(&self) -> Self {
        Self(self.0.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// One player's public state: who they are, their color, and where every
/// one of their pieces stands. `pieces[i]` is piece index `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub color: Color,
    pub pieces: Vec<Coord>,
}

/// The move that produced a board update.
///
/// `path` lists every cell the piece touched, origin first and destination
/// last: two cells for a step, more for a chain jump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub color: Color,
    pub piece_index: usize,
    pub from: Coord,
    pub to: Coord,
    pub path: Vec<Coord>,
}

// ---------------------------------------------------------------------------
// RejectReason
// ---------------------------------------------------------------------------

/// Why a request was refused. Sent only to the requesting connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    RoomNotFound,
    RoomFull,
    AlreadyInRoom,
    NotInRoom,
    AlreadyStarted,
    NotEnoughPlayers,
    NotRunning,
    NotYourTurn,
    InvalidPieceIndex,
    IllegalMove,
    CodeSpaceExhausted,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// ClientMessage
// ---------------------------------------------------------------------------

/// Requests a client may send.
///
/// The room for `start`, `move`, `legalMoves`, `emote` and `leaveRoom` is
/// inferred from the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Create a room and take its first seat.
    CreateRoom {
        #[serde(default)]
        display_name: String,
    },

    /// Take a seat in an existing room.
    JoinRoom {
        #[serde(default)]
        display_name: String,
        room_id: RoomCode,
    },

    /// Give up the seat but keep the connection open.
    LeaveRoom,

    /// Begin the match. Any seated player may send it.
    Start,

    /// Move one of the sender's pieces.
    Move { piece_index: usize, target: Coord },

    /// Ask which cells a piece could move to right now.
    LegalMoves { piece_index: usize },

    /// A reaction relayed to everyone in the room.
    Emote { symbol: String },
}

// ---------------------------------------------------------------------------
// ServerMessage
// ---------------------------------------------------------------------------

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// The sender now holds a seat. Carries the initial state sync.
    JoinAccepted {
        player_id: PlayerId,
        room_id: RoomCode,
        color: Color,
        players: Vec<PlayerSnapshot>,
    },

    /// `createRoom` or `joinRoom` failed.
    JoinRejected { reason: RejectReason },

    /// Both seats are taken; any player may now send `start`.
    ReadyToStart,

    /// The match is running.
    Started,

    StartRejected { reason: RejectReason },

    /// Full occupancy snapshot, sent after every change to the seats or
    /// the pieces. `last_move` is set when a move caused it.
    BoardUpdate {
        players: Vec<PlayerSnapshot>,
        last_move: Option<MoveRecord>,
    },

    /// Whose turn it is now.
    TurnChanged { color: Color },

    /// Terminal: the match is over.
    MatchFinished { winner_color: Color },

    /// A `move` or `legalMoves` request was refused, or the frame could
    /// not be decoded.
    MoveRejected { reason: RejectReason },

    /// Answer to `legalMoves`, in ascending `(x, y)` order.
    LegalMoves {
        piece_index: usize,
        targets: Vec<Coord>,
    },

    EmoteReceived { from: PlayerId, symbol: String },

    /// A player left the room, by request or by disconnecting.
    PlayerLeft { player_id: PlayerId, color: Color },
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The top-level wrapper of every frame, in both directions.
///
/// The server numbers its frames per connection and stamps them with the
/// milliseconds since it started. Clients may omit both fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<M> {
    #[serde(default)]
    pub seq: u64,

    #[serde(default)]
    pub timestamp: u64,

    pub payload: M,
}

impl<M> Envelope<M> {
    pub fn new(seq: u64, timestamp: u64, payload: M) -> Self {
        Self {
            seq,
            timestamp,
            payload,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
