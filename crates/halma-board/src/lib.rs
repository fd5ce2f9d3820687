//! Board topology and move generation for two-player Halma.
//!
//! The board is the standard 121-cell star in doubled-column encoding:
//! horizontal neighbors are `(x ± 2, y)`, diagonal neighbors `(x ± 1, y ± 1)`.
//! Everything here is pure and deterministic. A [`Board`] is built once and
//! shared read-only; [`legal_moves`] takes the occupancy as an argument and
//! keeps no state between calls.
//!
//! ```text
//! Board (cells, neighbors, starting arms)
//!     ↓
//! MoveSearch (steps + chain jumps over the current occupancy)
//! ```

mod coord;
mod error;
mod movegen;
mod topology;

pub use coord::{Color, Coord};
pub use error::BoardError;
pub use movegen::{legal_moves, MoveSearch};
pub use topology::{Board, DIRECTIONS, STANDARD_MASK};
