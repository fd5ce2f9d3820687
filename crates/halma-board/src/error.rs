//! Error types for board construction.

/// Errors raised while building a [`Board`](crate::Board) from a mask.
///
/// Only custom masks can fail. The standard board is validated by the
/// crate's own tests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The mask contains no playable cells at all.
    #[error("board mask has no playable cells")]
    Empty,

    /// A character other than `' '`, `'0'`, `'1'` or `'2'`.
    #[error("unknown marker {ch:?} at ({x}, {y})")]
    UnknownMarker { x: usize, y: usize, ch: char },

    /// A playable cell with odd `x + y`. Such a cell has no diagonal
    /// neighbors in the doubled-column encoding.
    #[error("cell ({x}, {y}) breaks doubled-column parity")]
    ParityViolation { x: usize, y: usize },

    /// The two starting arms differ in size (or one is missing).
    #[error("starting arms are unbalanced: red {red}, green {green}")]
    UnbalancedHomes { red: usize, green: usize },
}
