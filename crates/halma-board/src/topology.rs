//! The star-shaped board: cell validity, adjacency and starting arms.

use std::cmp::Reverse;
use std::sync::LazyLock;

use crate::{BoardError, Color, Coord};

/// The standard two-player star, doubled-column encoding.
///
/// ```text
/// ' '  not part of the board
/// '0'  playable
/// '1'  playable, Red's starting arm (Green's win zone)
/// '2'  playable, Green's starting arm (Red's win zone)
/// ```
pub const STANDARD_MASK: [&str; 17] = [
    "            2            ",
    "           2 2           ",
    "          2 2 2          ",
    "         2 2 2 2         ",
    "0 0 0 0 0 0 0 0 0 0 0 0 0",
    " 0 0 0 0 0 0 0 0 0 0 0 0 ",
    "  0 0 0 0 0 0 0 0 0 0 0  ",
    "   0 0 0 0 0 0 0 0 0 0   ",
    "    0 0 0 0 0 0 0 0 0    ",
    "   0 0 0 0 0 0 0 0 0 0   ",
    "  0 0 0 0 0 0 0 0 0 0 0  ",
    " 0 0 0 0 0 0 0 0 0 0 0 0 ",
    "0 0 0 0 0 0 0 0 0 0 0 0 0",
    "         1 1 1 1         ",
    "          1 1 1          ",
    "           1 1           ",
    "            1            ",
];

/// The six neighbor offsets: two horizontal, four diagonal.
pub const DIRECTIONS: [(i32, i32); 6] = [(-2, 0), (2, 0), (-1, -1), (1, -1), (-1, 1), (1, 1)];

static STANDARD: LazyLock<Board> = LazyLock::new(|| {
    Board::from_mask(&STANDARD_MASK).expect("standard mask is well-formed")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Absent,
    Open,
    Home(Color),
}

/// Immutable board topology.
///
/// Built once from a character mask. Holds the set of valid cells and the
/// two starting arms; carries no piece state.
#[derive(Debug, Clone)]
pub struct Board {
    grid: Vec<Vec<Cell>>,
    cells: Vec<Coord>,
    /// Indexed by [`Color::index`]. Ordered tip-first.
    homes: [Vec<Coord>; 2],
}

impl Board {
    /// The process-wide standard board.
    pub fn standard() -> &'static Board {
        &STANDARD
    }

    /// Parses a mask into a board.
    ///
    /// Starting arms are ordered tip-first: rows farthest from the middle
    /// row come first, then ascending `x`. That order defines piece indices.
    pub fn from_mask<S: AsRef<str>>(rows: &[S]) -> Result<Self, BoardError> {
        let mut grid = Vec::with_capacity(rows.len());
        let mut cells = Vec::new();
        let mut homes: [Vec<Coord>; 2] = [Vec::new(), Vec::new()];

        for (y, row) in rows.iter().enumerate() {
            let mut line = Vec::new();
            for (x, ch) in row.as_ref().chars().enumerate() {
                let cell = match ch {
                    ' ' => Cell::Absent,
                    '0' => Cell::Open,
                    other => match Color::from_marker(other) {
                        Some(color) => Cell::Home(color),
                        None => return Err(BoardError::UnknownMarker { x, y, ch }),
                    },
                };

                if cell != Cell::Absent {
                    if (x + y) % 2 != 0 {
                        return Err(BoardError::ParityViolation { x, y });
                    }
                    let coord = Coord::new(x as i32, y as i32);
                    cells.push(coord);
                    if let Cell::Home(color) = cell {
                        homes[color.index()].push(coord);
                    }
                }
                line.push(cell);
            }
            grid.push(line);
        }

        if cells.is_empty() {
            return Err(BoardError::Empty);
        }
        let (red, green) = (homes[0].len(), homes[1].len());
        if red != green || red == 0 {
            return Err(BoardError::UnbalancedHomes { red, green });
        }

        let middle = (rows.len() as i32 - 1) / 2;
        for home in &mut homes {
            home.sort_by_key(|c| (Reverse((c.y - middle).abs()), c.x));
        }

        tracing::debug!(cells = cells.len(), pieces = red, "board built");

        Ok(Self { grid, cells, homes })
    }

    /// True iff `c` lies inside the mask on a playable cell.
    pub fn is_valid_cell(&self, c: Coord) -> bool {
        if c.x < 0 || c.y < 0 {
            return false;
        }
        self.grid
            .get(c.y as usize)
            .and_then(|row| row.get(c.x as usize))
            .is_some_and(|cell| *cell != Cell::Absent)
    }

    /// The valid cells adjacent to `c`. At most six; never an invalid cell.
    pub fn neighbors(&self, c: Coord) -> impl Iterator<Item = Coord> + '_ {
        DIRECTIONS
            .iter()
            .map(move |&(dx, dy)| c.offset(dx, dy))
            .filter(|n| self.is_valid_cell(*n))
    }

    /// Every valid cell, row-major.
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    /// Starting cells of `color`, tip-first.
    pub fn home(&self, color: Color) -> &[Coord] {
        &self.homes[color.index()]
    }

    /// Cells `color` has to fill to win: the opponent's starting arm.
    pub fn win_zone(&self, color: Color) -> &[Coord] {
        self.home(color.opponent())
    }

    pub fn in_win_zone(&self, color: Color, c: Coord) -> bool {
        self.win_zone(color).contains(&c)
    }

    /// Pieces each player starts with (the size of one arm).
    pub fn pieces_per_player(&self) -> usize {
        self.homes[0].len()
    }
}
