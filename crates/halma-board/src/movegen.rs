//! Legal destination search: single steps plus chain jumps.
//!
//! A step moves a piece to an empty neighbor. A jump hops over an occupied
//! neighbor into the empty cell directly beyond it, and a piece may keep
//! hopping from every landing cell within the same move. The search is an
//! explicit worklist with a visited set seeded with the origin, so it
//! terminates on any occupancy and never revisits a cell.
//!
//! The moving piece is lifted off the board for the duration of the search:
//! its origin is neither a blocker nor a destination.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::{Board, Coord};

/// Result of a move search from one origin.
///
/// Steps and jump landings are kept apart (they never coincide: a landing
/// is always an even number of lattice steps away). For each landing the
/// search remembers the cell it hopped from, so the chain can be replayed.
#[derive(Debug, Clone)]
pub struct MoveSearch {
    origin: Coord,
    steps: BTreeSet<Coord>,
    hops: BTreeMap<Coord, Coord>,
}

impl MoveSearch {
    /// Runs the search for a piece at `origin`.
    ///
    /// `occupancy` holds every piece on the board (both colors); it may or
    /// may not contain `origin` itself. All its members must be valid cells.
    pub fn run(board: &Board, origin: Coord, occupancy: &HashSet<Coord>) -> Self {
        let blocked = |c: Coord| c != origin && occupancy.contains(&c);

        let steps = board.neighbors(origin).filter(|n| !blocked(*n)).collect();

        let mut hops = BTreeMap::new();
        let mut visited = HashSet::from([origin]);
        let mut worklist = vec![origin];

        while let Some(current) = worklist.pop() {
            for over in board.neighbors(current) {
                if !blocked(over) {
                    continue;
                }
                let landing = current.jump_over(over);
                if !board.is_valid_cell(landing) || blocked(landing) {
                    continue;
                }
                if visited.insert(landing) {
                    hops.insert(landing, current);
                    worklist.push(landing);
                }
            }
        }

        Self {
            origin,
            steps,
            hops,
        }
    }

    pub fn origin(&self) -> Coord {
        self.origin
    }

    /// All legal destinations, ordered.
    pub fn destinations(&self) -> BTreeSet<Coord> {
        self.steps.iter().chain(self.hops.keys()).copied().collect()
    }

    pub fn contains(&self, target: Coord) -> bool {
        self.steps.contains(&target) || self.hops.contains_key(&target)
    }

    /// True if `target` is reached by a single step rather than a jump.
    pub fn is_step(&self, target: Coord) -> bool {
        self.steps.contains(&target)
    }

    pub fn len(&self) -> usize {
        self.steps.len() + self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.hops.is_empty()
    }

    /// The cells visited when moving to `target`, origin first and target
    /// last. `None` if `target` is not a legal destination.
    pub fn path_to(&self, target: Coord) -> Option<Vec<Coord>> {
        if self.is_step(target) {
            return Some(vec![self.origin, target]);
        }
        let mut path = vec![target];
        let mut cursor = *self.hops.get(&target)?;
        while cursor != self.origin {
            path.push(cursor);
            cursor = *self.hops.get(&cursor)?;
            if path.len() > self.hops.len() {
                return None;
            }
        }
        path.push(self.origin);
        path.reverse();
        Some(path)
    }
}

/// Legal destinations for a piece at `origin` given the current occupancy.
pub fn legal_moves(board: &Board, origin: Coord, occupancy: &HashSet<Coord>) -> BTreeSet<Coord> {
    MoveSearch::run(board, origin, occupancy).destinations()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    fn occ(cells: &[Coord]) -> HashSet<Coord> {
        cells.iter().copied().collect()
    }

    #[test]
    fn test_open_board_gives_only_steps() {
        let board = Board::standard();
        let moves = legal_moves(board, c(12, 8), &HashSet::new());
        assert_eq!(moves.len(), 6);
        assert!(moves.iter().all(|m| board.neighbors(c(12, 8)).any(|n| n == *m)));
    }

    #[test]
    fn test_one_step_and_one_jump_from_tip() {
        // Tip (12,16) has exactly two neighbors: one occupied, one empty.
        let board = Board::standard();
        let origin = c(12, 16);
        let moves = legal_moves(board, origin, &occ(&[origin, c(11, 15)]));
        assert_eq!(moves, BTreeSet::from([c(13, 15), c(10, 14)]));
    }

    #[test]
    fn test_surrounded_piece_with_blocked_landings_cannot_move() {
        let board = Board::standard();
        let origin = c(12, 8);
        let mut cells = vec![origin];
        for n in board.neighbors(origin).collect::<Vec<_>>() {
            cells.push(n);
            cells.push(origin.jump_over(n));
        }
        let search = MoveSearch::run(board, origin, &occ(&cells));
        assert!(search.is_empty());
    }

    #[test]
    fn test_chain_jump_reaches_every_landing() {
        let board = Board::standard();
        let origin = c(4, 8);
        let blockers = [c(6, 8), c(10, 8), c(14, 8)];
        let search = MoveSearch::run(board, origin, &occ(&blockers));

        for landing in [c(8, 8), c(12, 8), c(16, 8)] {
            assert!(search.contains(landing), "missing {landing}");
        }
        // Four empty diagonal steps; (2,8) is off the board.
        for step in [c(3, 7), c(5, 7), c(3, 9), c(5, 9)] {
            assert!(search.contains(step), "missing {step}");
        }
        assert_eq!(search.len(), 7);
        assert_eq!(
            search.path_to(c(16, 8)),
            Some(vec![c(4, 8), c(8, 8), c(12, 8), c(16, 8)])
        );
        assert_eq!(search.path_to(c(5, 7)), Some(vec![c(4, 8), c(5, 7)]));
        assert_eq!(search.path_to(c(20, 8)), None);
    }

    #[test]
    fn test_origin_in_occupancy_does_not_change_result() {
        let board = Board::standard();
        let origin = c(8, 8);
        let without = occ(&[c(10, 8), c(7, 9)]);
        let mut with = without.clone();
        with.insert(origin);
        let moves = legal_moves(board, origin, &with);
        assert_eq!(moves, legal_moves(board, origin, &without));
        assert!(moves.contains(&c(12, 8)));
        assert!(moves.contains(&c(6, 10)));
        assert!(!moves.contains(&origin));
    }

    #[test]
    fn test_jump_cannot_land_off_board() {
        let board = Board::standard();
        // (0,4) is the left corner: hopping over it from (2,4) would
        // land on (-2,4).
        let moves = legal_moves(board, c(2, 4), &occ(&[c(0, 4)]));
        assert!(!moves.contains(&c(-2, 4)));
        assert!(moves.iter().all(|m| board.is_valid_cell(*m)));
    }

    #[test]
    fn test_ring_of_blockers_terminates_without_duplicates() {
        // Six blockers around an empty (12,8): every landing can hop back
        // and forth through the centre.
        let board = Board::standard();
        let ring: Vec<Coord> = board.neighbors(c(12, 8)).collect();
        let origin = c(8, 8);
        let search = MoveSearch::run(board, origin, &occ(&ring));

        for landing in [c(12, 8), c(16, 8), c(10, 6), c(14, 6), c(10, 10), c(14, 10)] {
            assert!(search.contains(landing), "missing {landing}");
        }
        assert!(!search.contains(origin));
        // Five empty steps plus six landings.
        assert_eq!(search.len(), 11);
        assert_eq!(
            search.path_to(c(16, 8)),
            Some(vec![c(8, 8), c(12, 8), c(16, 8)])
        );
    }

    #[test]
    fn test_full_board_terminates_with_no_moves() {
        let board = Board::standard();
        let origin = c(12, 8);
        let everything: HashSet<Coord> = board.cells().iter().copied().collect();
        assert!(legal_moves(board, origin, &everything).is_empty());
    }

    #[test]
    fn test_starting_position_moves() {
        let board = Board::standard();
        let occupancy: HashSet<Coord> = board
            .home(crate::Color::Red)
            .iter()
            .chain(board.home(crate::Color::Green))
            .copied()
            .collect();
        // The tip piece is boxed in by its own arm.
        assert!(legal_moves(board, c(12, 16), &occupancy).is_empty());
        // A front-row piece can step forward or jump over a neighbor.
        let moves = legal_moves(board, c(11, 13), &occupancy);
        assert!(moves.contains(&c(10, 12)));
        assert!(moves.contains(&c(12, 12)));
    }
}
