//! Error types for the room layer.

use halma_protocol::{PlayerId, RejectReason, RoomCode};

/// Errors that can occur during room operations.
///
/// Every variant except [`RoomError::Unavailable`] is a refused request:
/// nothing was mutated, and the requester is told why via
/// [`RoomError::reason`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    #[error("room {0} is full")]
    RoomFull(RoomCode),

    #[error("player {0} is already in room {1}")]
    AlreadyInRoom(PlayerId, RoomCode),

    #[error("player {0} is not in a room")]
    NotInRoom(PlayerId),

    #[error("match in room {0} has already started")]
    AlreadyStarted(RoomCode),

    #[error("room {0} needs two players to start")]
    NotEnoughPlayers(RoomCode),

    #[error("match in room {0} is not running")]
    NotRunning(RoomCode),

    #[error("it is not player {0}'s turn")]
    NotYourTurn(PlayerId),

    #[error("piece index {0} out of range")]
    InvalidPieceIndex(usize),

    #[error("illegal move")]
    IllegalMove,

    #[error("no free room code after {0} attempts")]
    CodeSpaceExhausted(usize),

    /// The registry actor has stopped.
    #[error("room registry is unavailable")]
    Unavailable,
}

impl RoomError {
    /// The wire reason reported to the client.
    pub fn reason(&self) -> RejectReason {
        match self {
            Self::RoomNotFound(_) => RejectReason::RoomNotFound,
            Self::RoomFull(_) => RejectReason::RoomFull,
            Self::AlreadyInRoom(..) => RejectReason::AlreadyInRoom,
            Self::NotInRoom(_) => RejectReason::NotInRoom,
            Self::AlreadyStarted(_) => RejectReason::AlreadyStarted,
            Self::NotEnoughPlayers(_) => RejectReason::NotEnoughPlayers,
            Self::NotRunning(_) => RejectReason::NotRunning,
            Self::NotYourTurn(_) => RejectReason::NotYourTurn,
            Self::InvalidPieceIndex(_) => RejectReason::InvalidPieceIndex,
            Self::IllegalMove | Self::Unavailable => RejectReason::IllegalMove,
            Self::CodeSpaceExhausted(_) => RejectReason::CodeSpaceExhausted,
        }
    }
}
