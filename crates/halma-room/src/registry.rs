//! The room registry: every live match, keyed by room code.
//!
//! Each request goes through [`SessionRegistry::handle`], which applies it
//! and returns the complete list of messages it produced. Nothing is sent
//! from in here; the caller fans [`Delivery`]s out to connections after the
//! mutation is done, so no client can observe a half-applied request.

use std::collections::{BTreeSet, HashMap};

use halma_board::{Board, Color, Coord};
use halma_protocol::{
    ClientMessage, MoveRecord, PlayerId, PlayerSnapshot, RejectReason, RoomCode, ServerMessage,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Match, MoveOutcome, Player, RegistryConfig, RoomError};

/// Characters room codes are drawn from.
const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Collisions tolerated before giving up on generating a code.
const MAX_CODE_ATTEMPTS: usize = 1_000;

/// Longest emote relayed, in characters.
const MAX_EMOTE_LEN: usize = 32;

/// One outgoing message for one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub to: PlayerId,
    pub message: ServerMessage,
}

impl Delivery {
    pub fn new(to: PlayerId, message: ServerMessage) -> Self {
        Self { to, message }
    }
}

/// A player removed from a room, and who is still there.
struct Departure {
    code: RoomCode,
    player: Player,
    remaining: Vec<PlayerId>,
    snapshot: Vec<PlayerSnapshot>,
}

/// Owns every match and the player → room index.
///
/// A player is in at most one room. A room is destroyed as soon as its
/// last player leaves.
pub struct SessionRegistry {
    board: &'static Board,
    config: RegistryConfig,
    rng: StdRng,
    rooms: HashMap<RoomCode, Match>,
    player_rooms: HashMap<PlayerId, RoomCode>,
}

impl SessionRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            board: Board::standard(),
            config,
            rng,
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
        }
    }

    // -- Queries --

    pub fn room(&self, code: &RoomCode) -> Option<&Match> {
        self.rooms.get(&code.normalized())
    }

    /// The room `player` is seated in, if any.
    pub fn room_of(&self, player: PlayerId) -> Option<&RoomCode> {
        self.player_rooms.get(&player)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of seated players across all rooms.
    pub fn player_count(&self) -> usize {
        self.player_rooms.len()
    }

    // -- Operations --

    /// Creates an empty room under a fresh code.
    pub fn create_room(&mut self) -> Result<RoomCode, RoomError> {
        let code = self.generate_code()?;
        let game = Match::new(code.clone(), self.board, self.config.match_config.clone());
        self.rooms.insert(code.clone(), game);
        tracing::info!(room = %code, rooms = self.rooms.len(), "room created");
        Ok(code)
    }

    /// Seats `player` in room `code` (case and surrounding whitespace are
    /// ignored).
    pub fn join_room(
        &mut self,
        code: &RoomCode,
        player: PlayerId,
        display_name: &str,
    ) -> Result<PlayerSnapshot, RoomError> {
        if let Some(current) = self.player_rooms.get(&player) {
            return Err(RoomError::AlreadyInRoom(player, current.clone()));
        }
        let code = code.normalized();
        let game = self
            .rooms
            .get_mut(&code)
            .ok_or_else(|| RoomError::RoomNotFound(code.clone()))?;
        let snapshot = game.join(player, display_name)?.snapshot();
        self.player_rooms.insert(player, code);
        Ok(snapshot)
    }

    pub fn start(&mut self, player: PlayerId) -> Result<Color, RoomError> {
        self.match_of_mut(player)?.start()
    }

    pub fn make_move(
        &mut self,
        player: PlayerId,
        piece_index: usize,
        target: Coord,
    ) -> Result<MoveOutcome, RoomError> {
        self.match_of_mut(player)?.make_move(player, piece_index, target)
    }

    pub fn legal_moves(
        &self,
        player: PlayerId,
        piece_index: usize,
    ) -> Result<BTreeSet<Coord>, RoomError> {
        let code = self
            .player_rooms
            .get(&player)
            .ok_or(RoomError::NotInRoom(player))?;
        self.rooms
            .get(code)
            .ok_or_else(|| RoomError::RoomNotFound(code.clone()))?
            .legal_moves_for(player, piece_index)
    }

    /// Drops a closed connection: frees its seat, destroys the room if it
    /// is now empty, and returns what the remaining player must be told.
    pub fn remove_connection(&mut self, player: PlayerId) -> Vec<Delivery> {
        let Some(departure) = self.depart(player) else {
            return Vec::new();
        };
        Self::departure_notices(&departure)
    }

    /// Maps one client request to every message it produces. Rejections
    /// go to the sender only, and leave all state untouched.
    pub fn handle(&mut self, sender: PlayerId, msg: ClientMessage) -> Vec<Delivery> {
        match msg {
            ClientMessage::CreateRoom { display_name } => self.on_create(sender, &display_name),
            ClientMessage::JoinRoom {
                display_name,
                room_id,
            } => self.on_join(sender, &room_id, &display_name),
            ClientMessage::LeaveRoom => self.on_leave(sender),
            ClientMessage::Start => self.on_start(sender),
            ClientMessage::Move {
                piece_index,
                target,
            } => self.on_move(sender, piece_index, target),
            ClientMessage::LegalMoves { piece_index } => self.on_legal_moves(sender, piece_index),
            ClientMessage::Emote { symbol } => self.on_emote(sender, symbol),
        }
    }

    // -----------------------------------------------------------------------
    // Request handlers
    // -----------------------------------------------------------------------

    fn on_create(&mut self, sender: PlayerId, display_name: &str) -> Vec<Delivery> {
        if let Some(current) = self.player_rooms.get(&sender) {
            let err = RoomError::AlreadyInRoom(sender, current.clone());
            return reject(sender, &err, join_rejected);
        }
        let code = match self.create_room() {
            Ok(code) => code,
            Err(err) => {
                tracing::warn!(player_id = %sender, error = %err, "room creation failed");
                return reject(sender, &err, join_rejected);
            }
        };
        let deliveries = self.on_join(sender, &code, display_name);
        if self.rooms.get(&code).is_some_and(Match::is_empty) {
            self.rooms.remove(&code);
        }
        deliveries
    }

    fn on_join(&mut self, sender: PlayerId, code: &RoomCode, display_name: &str) -> Vec<Delivery> {
        let joined = match self.join_room(code, sender, display_name) {
            Ok(joined) => joined,
            Err(err) => return reject(sender, &err, join_rejected),
        };
        let Some(game) = self.player_rooms.get(&sender).and_then(|c| self.rooms.get(c)) else {
            return Vec::new();
        };

        let players = game.snapshot();
        let mut out = vec![Delivery::new(
            sender,
            ServerMessage::JoinAccepted {
                player_id: sender,
                room_id: game.code().clone(),
                color: joined.color,
                players: players.clone(),
            },
        )];
        out.extend(broadcast(game, board_update(players, None)));
        if game.is_full() {
            out.extend(broadcast(game, ServerMessage::ReadyToStart));
        }
        out
    }

    fn on_leave(&mut self, sender: PlayerId) -> Vec<Delivery> {
        let Some(departure) = self.depart(sender) else {
            tracing::debug!(player_id = %sender, "leave outside any room ignored");
            return Vec::new();
        };
        let mut out = vec![Delivery::new(
            sender,
            ServerMessage::PlayerLeft {
                player_id: sender,
                color: departure.player.color(),
            },
        )];
        out.extend(Self::departure_notices(&departure));
        out
    }

    fn on_start(&mut self, sender: PlayerId) -> Vec<Delivery> {
        let color = match self.start(sender) {
            Ok(color) => color,
            Err(err) => return reject(sender, &err, |reason| ServerMessage::StartRejected { reason }),
        };
        let Some(game) = self.match_of(sender) else {
            return Vec::new();
        };
        let mut out = broadcast(game, ServerMessage::Started);
        out.extend(broadcast(game, ServerMessage::TurnChanged { color }));
        out
    }

    fn on_move(&mut self, sender: PlayerId, piece_index: usize, target: Coord) -> Vec<Delivery> {
        let outcome = match self.make_move(sender, piece_index, target) {
            Ok(outcome) => outcome,
            Err(err) => return reject(sender, &err, move_rejected),
        };
        let Some(game) = self.match_of(sender) else {
            return Vec::new();
        };

        let mut out = broadcast(game, board_update(game.snapshot(), Some(outcome.record)));
        match (outcome.winner, outcome.next_turn) {
            (Some(winner_color), _) => {
                out.extend(broadcast(game, ServerMessage::MatchFinished { winner_color }));
            }
            (None, Some(color)) => {
                out.extend(broadcast(game, ServerMessage::TurnChanged { color }));
            }
            (None, None) => {}
        }
        out
    }

    fn on_legal_moves(&self, sender: PlayerId, piece_index: usize) -> Vec<Delivery> {
        match self.legal_moves(sender, piece_index) {
            Ok(targets) => vec![Delivery::new(
                sender,
                ServerMessage::LegalMoves {
                    piece_index,
                    targets: targets.into_iter().collect(),
                },
            )],
            Err(err) => reject(sender, &err, move_rejected),
        }
    }

    fn on_emote(&self, sender: PlayerId, symbol: String) -> Vec<Delivery> {
        let len = symbol.chars().count();
        if !(1..=MAX_EMOTE_LEN).contains(&len) {
            tracing::debug!(player_id = %sender, len, "emote dropped");
            return Vec::new();
        }
        match self.match_of(sender) {
            Some(game) => broadcast(game, ServerMessage::EmoteReceived { from: sender, symbol }),
            None => Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn match_of(&self, player: PlayerId) -> Option<&Match> {
        self.player_rooms.get(&player).and_then(|c| self.rooms.get(c))
    }

    fn match_of_mut(&mut self, player: PlayerId) -> Result<&mut Match, RoomError> {
        let code = self
            .player_rooms
            .get(&player)
            .ok_or(RoomError::NotInRoom(player))?;
        self.rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::RoomNotFound(code.clone()))
    }

    /// Removes `player` from its room and the index; destroys the room if
    /// it is left empty.
    fn depart(&mut self, player: PlayerId) -> Option<Departure> {
        let code = self.player_rooms.remove(&player)?;
        let game = self.rooms.get_mut(&code)?;
        let left = game.leave(player)?;

        let departure = Departure {
            remaining: game.players().iter().map(Player::id).collect(),
            snapshot: game.snapshot(),
            player: left,
            code,
        };
        if departure.remaining.is_empty() {
            self.rooms.remove(&departure.code);
            tracing::info!(room = %departure.code, rooms = self.rooms.len(), "room destroyed");
        }
        Some(departure)
    }

    fn departure_notices(departure: &Departure) -> Vec<Delivery> {
        let left = ServerMessage::PlayerLeft {
            player_id: departure.player.id(),
            color: departure.player.color(),
        };
        let update = board_update(departure.snapshot.clone(), None);
        departure
            .remaining
            .iter()
            .flat_map(|id| {
                [
                    Delivery::new(*id, left.clone()),
                    Delivery::new(*id, update.clone()),
                ]
            })
            .collect()
    }

    fn generate_code(&mut self) -> Result<RoomCode, RoomError> {
        let len = self.config.code_length.max(1);
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code: String = (0..len)
                .map(|_| CODE_ALPHABET[self.rng.random_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            let code = RoomCode::new(code);
            if !self.rooms.contains_key(&code) {
                return Ok(code);
            }
        }
        Err(RoomError::CodeSpaceExhausted(MAX_CODE_ATTEMPTS))
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

fn broadcast(game: &Match, message: ServerMessage) -> Vec<Delivery> {
    game.players()
        .iter()
        .map(|p| Delivery::new(p.id(), message.clone()))
        .collect()
}

fn board_update(players: Vec<PlayerSnapshot>, last_move: Option<MoveRecord>) -> ServerMessage {
    ServerMessage::BoardUpdate { players, last_move }
}

fn join_rejected(reason: RejectReason) -> ServerMessage {
    ServerMessage::JoinRejected { reason }
}

fn move_rejected(reason: RejectReason) -> ServerMessage {
    ServerMessage::MoveRejected { reason }
}

fn reject(
    sender: PlayerId,
    err: &RoomError,
    wrap: impl FnOnce(RejectReason) -> ServerMessage,
) -> Vec<Delivery> {
    tracing::debug!(player_id = %sender, error = %err, "request rejected");
    vec![Delivery::new(sender, wrap(err.reason()))]
}
