//! Lattice coordinates and player colors.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Coord
// ---------------------------------------------------------------------------

/// A cell on the doubled-column lattice.
///
/// Columns are doubled: horizontal neighbors sit two columns apart and
/// diagonal neighbors one column apart on the adjacent row. Every playable
/// cell therefore has `x + y` even.
///
/// Signed components so reflection arithmetic can step off the board and
/// be rejected by [`Board::is_valid_cell`](crate::Board::is_valid_cell)
/// instead of wrapping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this coordinate shifted by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The landing cell when jumping from `self` over `blocker`:
    /// `blocker + (blocker - self)`.
    pub const fn jump_over(self, blocker: Coord) -> Self {
        Self::new(2 * blocker.x - self.x, 2 * blocker.y - self.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// One of the two seats at the board.
///
/// The color fixes turn order, the starting arm, and (through the
/// opponent's starting arm) the win zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Starts in the bottom arm and moves first.
    Red,
    /// Starts in the top arm.
    Green,
}

impl Color {
    /// Fixed turn order. `turn_index` in a match always indexes this array.
    pub const TURN_ORDER: [Color; 2] = [Color::Red, Color::Green];

    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Green,
            Self::Green => Self::Red,
        }
    }

    /// Position of this color in [`Self::TURN_ORDER`].
    pub const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
        }
    }

    /// The mask character marking this color's starting arm.
    pub const fn marker(self) -> char {
        match self {
            Self::Red => '1',
            Self::Green => '2',
        }
    }

    pub fn from_marker(ch: char) -> Option<Self> {
        Self::TURN_ORDER.into_iter().find(|c| c.marker() == ch)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Green => write!(f, "green"),
        }
    }
}
