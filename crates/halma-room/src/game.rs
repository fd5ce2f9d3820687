//! One room's match: two seats, twenty pieces, one turn pointer.
//!
//! `Match` validates every request against the current state and mutates
//! only on success. A refused request leaves the pieces, the turn and the
//! phase exactly as they were.

use std::collections::{BTreeSet, HashSet};

use halma_board::{Board, Color, Coord, MoveSearch};
use halma_protocol::{MoveRecord, PlayerId, PlayerSnapshot, RoomCode};

use crate::{MatchConfig, MatchPhase, RoomError, WinRule};

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A seated player. `pieces[i]` is the current cell of piece `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    name: String,
    color: Color,
    pieces: Vec<Coord>,
}

impl Player {
    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn pieces(&self) -> &[Coord] {
        &self.pieces
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            name: self.name.clone(),
            color: self.color,
            pieces: self.pieces.clone(),
        }
    }
}

/// Result of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub record: MoveRecord,
    /// Set when the move filled the mover's win zone.
    pub winner: Option<Color>,
    /// Whose turn it is now; `None` once the match is finished.
    pub next_turn: Option<Color>,
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Match {
    code: RoomCode,
    board: &'static Board,
    config: MatchConfig,
    /// Join order. At most one player per color.
    players: Vec<Player>,
    phase: MatchPhase,
    /// Index into [`Color::TURN_ORDER`].
    turn_index: usize,
    winner: Option<Color>,
}

impl Match {
    pub fn new(code: RoomCode, board: &'static Board, config: MatchConfig) -> Self {
        Self {
            code,
            board,
            config,
            players: Vec::with_capacity(Color::TURN_ORDER.len()),
            phase: MatchPhase::Waiting,
            turn_index: 0,
            winner: None,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= Color::TURN_ORDER.len()
    }

    /// The color to move. Only meaningful while running.
    pub fn current_color(&self) -> Color {
        Color::TURN_ORDER[self.turn_index]
    }

    /// Every player's state, in turn order.
    pub fn snapshot(&self) -> Vec<PlayerSnapshot> {
        let mut players: Vec<&Player> = self.players.iter().collect();
        players.sort_by_key(|p| p.color.index());
        players.into_iter().map(Player::snapshot).collect()
    }

    /// Every occupied cell, both colors.
    pub fn occupancy(&self) -> HashSet<Coord> {
        self.players
            .iter()
            .flat_map(|p| p.pieces.iter().copied())
            .collect()
    }

    // -- Transitions --

    /// Seats a player in the first free color with a fresh set of pieces
    /// on that color's starting arm.
    pub fn join(&mut self, id: PlayerId, display_name: &str) -> Result<&Player, RoomError> {
        if self.player(id).is_some() {
            return Err(RoomError::AlreadyInRoom(id, self.code.clone()));
        }
        if self.is_full() {
            return Err(RoomError::RoomFull(self.code.clone()));
        }
        if !self.phase.is_joinable() {
            return Err(RoomError::AlreadyStarted(self.code.clone()));
        }
        let color = Color::TURN_ORDER
            .into_iter()
            .find(|c| self.players.iter().all(|p| p.color != *c))
            .ok_or_else(|| RoomError::RoomFull(self.code.clone()))?;

        let name = self.sanitize_name(display_name, color);
        tracing::info!(room = %self.code, player_id = %id, %color, %name, "player joined");

        self.players.push(Player {
            id,
            name,
            color,
            pieces: self.board.home(color).to_vec(),
        });
        Ok(&self.players[self.players.len() - 1])
    }

    /// Moves the match to `Running` with the first turn-order color to
    /// move. A repeated start is refused and changes nothing.
    pub fn start(&mut self) -> Result<Color, RoomError> {
        if !self.phase.is_joinable() {
            return Err(RoomError::AlreadyStarted(self.code.clone()));
        }
        if !self.is_full() {
            return Err(RoomError::NotEnoughPlayers(self.code.clone()));
        }
        self.turn_index = 0;
        self.advance_phase();
        tracing::info!(room = %self.code, first = %self.current_color(), "match started");
        Ok(self.current_color())
    }

    /// Validates and applies a move for `id`.
    ///
    /// Legality is always recomputed here from the full occupancy; nothing
    /// the client computed is trusted.
    pub fn make_move(
        &mut self,
        id: PlayerId,
        piece_index: usize,
        target: Coord,
    ) -> Result<MoveOutcome, RoomError> {
        if !self.phase.is_running() {
            return Err(RoomError::NotRunning(self.code.clone()));
        }
        let seat = self.seat_of(id)?;
        let color = self.players[seat].color;
        if color != self.current_color() {
            return Err(RoomError::NotYourTurn(id));
        }
        let from = *self.players[seat]
            .pieces
            .get(piece_index)
            .ok_or(RoomError::InvalidPieceIndex(piece_index))?;

        let search = MoveSearch::run(self.board, from, &self.occupancy());
        let path = search.path_to(target).ok_or(RoomError::IllegalMove)?;

        self.players[seat].pieces[piece_index] = target;
        let record = MoveRecord {
            color,
            piece_index,
            from,
            to: target,
            path,
        };
        tracing::debug!(room = %self.code, %color, piece_index, %from, to = %target, "move applied");

        if self.has_won(color) {
            self.winner = Some(color);
            self.advance_phase();
            tracing::info!(room = %self.code, winner = %color, "match finished");
            return Ok(MoveOutcome {
                record,
                winner: Some(color),
                next_turn: None,
            });
        }

        self.turn_index = 1 - self.turn_index;
        Ok(MoveOutcome {
            record,
            winner: None,
            next_turn: Some(self.current_color()),
        })
    }

    /// Destinations for one of `id`'s pieces under the current occupancy.
    pub fn legal_moves_for(
        &self,
        id: PlayerId,
        piece_index: usize,
    ) -> Result<BTreeSet<Coord>, RoomError> {
        let seat = self.seat_of(id)?;
        let from = *self.players[seat]
            .pieces
            .get(piece_index)
            .ok_or(RoomError::InvalidPieceIndex(piece_index))?;
        Ok(MoveSearch::run(self.board, from, &self.occupancy()).destinations())
    }

    /// Frees `id`'s seat. The match keeps its phase: a running match with
    /// one player left simply stalls.
    pub fn leave(&mut self, id: PlayerId) -> Option<Player> {
        let seat = self.seat_of(id).ok()?;
        let player = self.players.remove(seat);
        tracing::info!(
            room = %self.code,
            player_id = %id,
            color = %player.color,
            remaining = self.players.len(),
            "player left"
        );
        Some(player)
    }

    /// True if `color` has filled its win zone under the configured rule.
    pub fn has_won(&self, color: Color) -> bool {
        let Some(player) = self.players.iter().find(|p| p.color == color) else {
            return false;
        };
        let zone = self.board.win_zone(color);
        let own = player.pieces.iter().filter(|c| zone.contains(c)).count();

        match self.config.win_rule {
            WinRule::Strict => own == zone.len(),
            WinRule::CountBlocked => {
                let others: HashSet<Coord> = self
                    .players
                    .iter()
                    .filter(|p| p.color != color)
                    .flat_map(|p| p.pieces.iter().copied())
                    .collect();
                let blocked = zone.iter().filter(|c| others.contains(c)).count();
                own > 0 && own + blocked == zone.len()
            }
        }
    }

    // -- Helpers --

    fn seat_of(&self, id: PlayerId) -> Result<usize, RoomError> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or(RoomError::NotInRoom(id))
    }

    fn advance_phase(&mut self) {
        if let Some(next) = self.phase.next() {
            debug_assert!(self.phase.can_transition_to(next));
            self.phase = next;
        }
    }

    /// Blank names fall back to the seat number, which follows the color
    /// rather than the join order.
    fn sanitize_name(&self, raw: &str, color: Color) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            format!("Player {}", color.index() + 1)
        } else {
            trimmed.chars().take(self.config.max_name_len).collect()
        }
    }
}

#[cfg(test)]
impl Match {
    /// Puts `color`'s pieces on `cells`, bypassing the move rules.
    pub(crate) fn place_pieces(&mut self, color: Color, cells: &[Coord]) {
        if let Some(player) = self.players.iter_mut().find(|p| p.color == color) {
            player.pieces = cells.to_vec();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: PlayerId = PlayerId(1);
    const GREEN: PlayerId = PlayerId(2);

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    fn new_match(config: MatchConfig) -> Match {
        Match::new(RoomCode::new("TEST"), Board::standard(), config)
    }

    fn running_match(config: MatchConfig) -> Match {
        let mut m = new_match(config);
        m.join(RED, "Ada").unwrap();
        m.join(GREEN, "Grace").unwrap();
        m.start().unwrap();
        m
    }

    fn place(m: &mut Match, color: Color, cells: &[Coord]) {
        m.place_pieces(color, cells);
    }

    /// Red holds nine cells of its win zone; (9,3) is left open and Red's
    /// last piece waits one step away on (8,4). Green sits on Red's arm.
    fn red_one_step_from_winning(m: &mut Match) {
        let board = Board::standard();
        let mut red: Vec<Coord> = board.win_zone(Color::Red).to_vec();
        let gap = red.iter().position(|cell| *cell == c(9, 3)).unwrap();
        red[gap] = c(8, 4);
        place(m, Color::Red, &red);
        place(m, Color::Green, board.home(Color::Red));
    }

    // =====================================================================
    // join
    // =====================================================================

    #[test]
    fn test_join_assigns_colors_in_turn_order_with_home_pieces() {
        let mut m = new_match(MatchConfig::default());
        assert_eq!(m.join(RED, "Ada").unwrap().color(), Color::Red);
        assert_eq!(m.join(GREEN, "Grace").unwrap().color(), Color::Green);

        let board = Board::standard();
        assert_eq!(m.player(RED).unwrap().pieces(), board.home(Color::Red));
        assert_eq!(m.player(GREEN).unwrap().pieces(), board.home(Color::Green));
        assert_eq!(m.phase(), MatchPhase::Waiting);
    }

    #[test]
    fn test_join_sanitizes_display_names() {
        let mut m = new_match(MatchConfig::default());
        assert_eq!(m.join(RED, "   ").unwrap().name(), "Player 1");
        let long = "x".repeat(40);
        assert_eq!(m.join(GREEN, &format!("  {long} ")).unwrap().name().len(), 24);
    }

    #[test]
    fn test_blank_name_follows_the_seat_not_the_join_order() {
        let mut m = new_match(MatchConfig::default());
        m.join(RED, "Ada").unwrap();
        m.join(GREEN, "").unwrap();
        assert_eq!(m.player(GREEN).unwrap().name(), "Player 2");

        m.leave(RED).unwrap();
        let newcomer = m.join(PlayerId(3), " ").unwrap();
        assert_eq!(newcomer.color(), Color::Red);
        assert_eq!(newcomer.name(), "Player 1");
    }

    #[test]
    fn test_third_join_is_room_full_and_changes_nothing() {
        let mut m = new_match(MatchConfig::default());
        m.join(RED, "Ada").unwrap();
        m.join(GREEN, "Grace").unwrap();
        let before = m.snapshot();

        let err = m.join(PlayerId(3), "Eve").unwrap_err();
        assert_eq!(err, RoomError::RoomFull(RoomCode::new("TEST")));
        assert_eq!(m.snapshot(), before);
    }

    #[test]
    fn test_same_player_cannot_join_twice() {
        let mut m = new_match(MatchConfig::default());
        m.join(RED, "Ada").unwrap();
        assert!(matches!(m.join(RED, "Ada"), Err(RoomError::AlreadyInRoom(..))));
        assert_eq!(m.players().len(), 1);
    }

    #[test]
    fn test_freed_seat_reuses_its_color() {
        let mut m = new_match(MatchConfig::default());
        m.join(RED, "Ada").unwrap();
        m.join(GREEN, "Grace").unwrap();
        m.leave(RED).unwrap();
        let newcomer = m.join(PlayerId(3), "Eve").unwrap();
        assert_eq!(newcomer.color(), Color::Red);
    }

    #[test]
    fn test_join_after_start_is_rejected() {
        let mut m = running_match(MatchConfig::default());
        assert!(matches!(m.join(PlayerId(3), "Eve"), Err(RoomError::RoomFull(_))));
        m.leave(GREEN).unwrap();
        assert!(matches!(
            m.join(PlayerId(3), "Eve"),
            Err(RoomError::AlreadyStarted(_))
        ));
    }

    // =====================================================================
    // start
    // =====================================================================

    #[test]
    fn test_start_needs_two_players() {
        let mut m = new_match(MatchConfig::default());
        m.join(RED, "Ada").unwrap();
        assert!(matches!(m.start(), Err(RoomError::NotEnoughPlayers(_))));
        assert_eq!(m.phase(), MatchPhase::Waiting);
    }

    #[test]
    fn test_start_gives_first_turn_to_red() {
        let m = running_match(MatchConfig::default());
        assert_eq!(m.phase(), MatchPhase::Running);
        assert_eq!(m.current_color(), Color::Red);
    }

    #[test]
    fn test_repeated_start_does_not_reset_turn() {
        let mut m = running_match(MatchConfig::default());
        m.make_move(RED, 7, c(10, 12)).unwrap();
        assert_eq!(m.current_color(), Color::Green);

        assert!(matches!(m.start(), Err(RoomError::AlreadyStarted(_))));
        assert_eq!(m.current_color(), Color::Green);
        assert_eq!(m.phase(), MatchPhase::Running);
    }

    // =====================================================================
    // make_move
    // =====================================================================

    #[test]
    fn test_move_before_start_is_not_running() {
        let mut m = new_match(MatchConfig::default());
        m.join(RED, "Ada").unwrap();
        m.join(GREEN, "Grace").unwrap();
        let err = m.make_move(RED, 7, c(10, 12)).unwrap_err();
        assert_eq!(err, RoomError::NotRunning(RoomCode::new("TEST")));
    }

    #[test]
    fn test_move_out_of_turn_is_rejected_without_mutation() {
        let mut m = running_match(MatchConfig::default());
        let before = m.snapshot();
        let err = m.make_move(GREEN, 7, c(10, 4)).unwrap_err();
        assert_eq!(err, RoomError::NotYourTurn(GREEN));
        assert_eq!(m.snapshot(), before);
        assert_eq!(m.current_color(), Color::Red);
    }

    #[test]
    fn test_piece_index_out_of_range() {
        let mut m = running_match(MatchConfig::default());
        let err = m.make_move(RED, 10, c(10, 12)).unwrap_err();
        assert_eq!(err, RoomError::InvalidPieceIndex(10));
    }

    #[test]
    fn test_unreachable_or_occupied_target_is_illegal() {
        let mut m = running_match(MatchConfig::default());
        let before = m.snapshot();
        assert_eq!(m.make_move(RED, 7, c(12, 8)), Err(RoomError::IllegalMove));
        // (13,13) holds another red piece.
        assert_eq!(m.make_move(RED, 7, c(13, 13)), Err(RoomError::IllegalMove));
        // Not a cell at all.
        assert_eq!(m.make_move(RED, 7, c(11, 12)), Err(RoomError::IllegalMove));
        assert_eq!(m.snapshot(), before);
    }

    #[test]
    fn test_step_moves_piece_and_flips_turn() {
        let mut m = running_match(MatchConfig::default());
        let outcome = m.make_move(RED, 7, c(10, 12)).unwrap();

        assert_eq!(outcome.record.from, c(11, 13));
        assert_eq!(outcome.record.to, c(10, 12));
        assert_eq!(outcome.record.path, vec![c(11, 13), c(10, 12)]);
        assert_eq!(outcome.winner, None);
        assert_eq!(outcome.next_turn, Some(Color::Green));
        assert_eq!(m.player(RED).unwrap().pieces()[7], c(10, 12));
    }

    #[test]
    fn test_turns_alternate() {
        let mut m = running_match(MatchConfig::default());
        m.make_move(RED, 7, c(10, 12)).unwrap();
        let outcome = m.make_move(GREEN, 7, c(10, 4)).unwrap();
        assert_eq!(outcome.next_turn, Some(Color::Red));
        assert_eq!(m.current_color(), Color::Red);
    }

    #[test]
    fn test_jump_from_second_row_records_path() {
        let mut m = running_match(MatchConfig::default());
        // Piece 3 sits on (10,14) and hops over (11,13).
        let outcome = m.make_move(RED, 3, c(12, 12)).unwrap();
        assert_eq!(outcome.record.path, vec![c(10, 14), c(12, 12)]);
    }

    #[test]
    fn test_legal_moves_for_matches_search() {
        let m = running_match(MatchConfig::default());
        let moves = m.legal_moves_for(RED, 3).unwrap();
        assert_eq!(moves, BTreeSet::from([c(8, 12), c(12, 12)]));
        assert!(m.legal_moves_for(RED, 0).unwrap().is_empty());
        assert_eq!(
            m.legal_moves_for(RED, 11),
            Err(RoomError::InvalidPieceIndex(11))
        );
        assert_eq!(
            m.legal_moves_for(PlayerId(9), 0),
            Err(RoomError::NotInRoom(PlayerId(9)))
        );
    }

    // =====================================================================
    // Win evaluation
    // =====================================================================

    #[test]
    fn test_nine_in_zone_is_not_a_win() {
        let mut m = running_match(MatchConfig::default());
        red_one_step_from_winning(&mut m);
        assert!(!m.has_won(Color::Red));
    }

    #[test]
    fn test_filling_the_zone_wins_and_finishes() {
        let mut m = running_match(MatchConfig::default());
        red_one_step_from_winning(&mut m);
        let gap = m.player(RED).unwrap().pieces().iter().position(|p| *p == c(8, 4)).unwrap();

        let outcome = m.make_move(RED, gap, c(9, 3)).unwrap();
        assert_eq!(outcome.winner, Some(Color::Red));
        assert_eq!(outcome.next_turn, None);
        assert_eq!(m.phase(), MatchPhase::Finished);
        assert_eq!(m.winner(), Some(Color::Red));
        // The turn pointer did not advance.
        assert_eq!(m.current_color(), Color::Red);

        let err = m.make_move(GREEN, 0, c(11, 15)).unwrap_err();
        assert!(matches!(err, RoomError::NotRunning(_)));
        assert!(matches!(m.start(), Err(RoomError::AlreadyStarted(_))));
    }

    #[test]
    fn test_strict_rule_ignores_opponent_in_zone() {
        let mut m = running_match(MatchConfig::default());
        red_one_step_from_winning(&mut m);
        let mut green = Board::standard().home(Color::Red).to_vec();
        green[0] = c(9, 3);
        place(&mut m, Color::Green, &green);
        assert!(!m.has_won(Color::Red));
    }

    #[test]
    fn test_count_blocked_rule_counts_opponent_in_zone() {
        let config = MatchConfig {
            win_rule: WinRule::CountBlocked,
            ..MatchConfig::default()
        };
        let mut m = running_match(config);
        red_one_step_from_winning(&mut m);
        assert!(!m.has_won(Color::Red));

        let mut green = Board::standard().home(Color::Red).to_vec();
        green[0] = c(9, 3);
        place(&mut m, Color::Green, &green);
        assert!(m.has_won(Color::Red));
    }

    #[test]
    fn test_count_blocked_rule_needs_an_own_piece() {
        let config = MatchConfig {
            win_rule: WinRule::CountBlocked,
            ..MatchConfig::default()
        };
        // Green never left its arm, which is Red's zone: nothing of Red's
        // is in there yet.
        let m = running_match(config);
        assert!(!m.has_won(Color::Red));
    }

    // =====================================================================
    // leave
    // =====================================================================

    #[test]
    fn test_leave_keeps_phase() {
        let mut m = running_match(MatchConfig::default());
        let left = m.leave(GREEN).unwrap();
        assert_eq!(left.color(), Color::Green);
        assert_eq!(m.phase(), MatchPhase::Running);
        assert!(m.leave(GREEN).is_none());
        m.leave(RED).unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn test_snapshot_is_in_turn_order() {
        let mut m = new_match(MatchConfig::default());
        m.join(RED, "Ada").unwrap();
        m.join(GREEN, "Grace").unwrap();
        m.leave(RED).unwrap();
        m.join(PlayerId(3), "Eve").unwrap();
        let colors: Vec<Color> = m.snapshot().iter().map(|p| p.color).collect();
        assert_eq!(colors, vec![Color::Red, Color::Green]);
    }
}
