use super::board_movement::{self, BoardMovement, PromotionChooser, ValidationMode};
use super::history::MoveHistory;
use super::moves::Movement;
use super::piece::{Color, Piece, PieceId, PieceType};
use super::position::{Position, BOARD_FILES, BOARD_RANKS};
use super::status::StatusVerifier;
use super::ChessError;
use crate::config::RulesConfig;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::{debug, instrument, warn};

/// Represents a chess board: the arena owning every piece ever placed on it
/// and the history of the movements applied to it.
///
/// Captured pieces and ghosted pawns stay in the arena so that movements can
/// be reverted exactly; queries only ever see playable pieces.
#[derive(Debug, Clone)]
pub struct Board {
    pieces: Vec<Piece>,
    history: MoveHistory,
    rules: RulesConfig,
    simulation_depth: usize,
}

impl Board {
    /// Create a new board with the standard starting position
    pub fn new() -> Self {
        Self::standard()
    }

    /// The 32 pieces of the standard setup, queens on the d-file
    pub fn standard() -> Self {
        let mut board = Self::empty();
        board.setup_starting_position();
        board
    }

    /// Create a board without any piece
    pub fn empty() -> Self {
        Self {
            pieces: Vec::new(),
            history: MoveHistory::new(),
            rules: RulesConfig::default(),
            simulation_depth: 0,
        }
    }

    pub fn with_rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Place a new piece on an empty square
    pub fn place(
        &mut self,
        kind: PieceType,
        color: Color,
        position: Position,
    ) -> Result<PieceId, ChessError> {
        if let Some(occupant) = self.piece_at(position) {
            return Err(ChessError::InvalidSetup(format!(
                "There is already a piece at {position} ({occupant})"
            )));
        }

        let id = PieceId(self.pieces.len());
        self.pieces.push(Piece::new(id, kind, color, position));
        Ok(id)
    }

    /// Set up the standard chess starting position
    fn setup_starting_position(&mut self) {
        // Clear the arena first
        self.pieces.clear();

        let back_rank = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        for color in [Color::White, Color::Black] {
            let home = color.home_rank();
            let pawn_rank = (home as i8 + color.direction()) as u8;

            // Back rank (rank 0 for White, rank 7 for Black)
            for (file, &kind) in back_rank.iter().enumerate() {
                self.push_unchecked(kind, color, Position::new_unchecked(file as u8, home));
            }
            // Pawns one rank forward of the back rank
            for file in 0..BOARD_FILES {
                self.push_unchecked(
                    PieceType::Pawn,
                    color,
                    Position::new_unchecked(file, pawn_rank),
                );
            }
        }
    }

    fn push_unchecked(&mut self, kind: PieceType, color: Color, position: Position) -> PieceId {
        let id = PieceId(self.pieces.len());
        self.pieces.push(Piece::new(id, kind, color, position));
        id
    }

    /// Create a board from the piece-placement field of a FEN string
    /// Example: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
    pub fn from_placement(placement: &str) -> Result<Board, ChessError> {
        // Handle empty or whitespace-only input
        let placement = placement.trim();
        if placement.is_empty() {
            return Err(ChessError::InvalidSetup(
                "Piece placement cannot be empty".to_string(),
            ));
        }

        // Split into ranks and validate their count
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != BOARD_RANKS as usize {
            let found_ranks = ranks.len();
            return Err(ChessError::InvalidSetup(format!(
                "Piece placement must have exactly 8 ranks separated by '/', found {found_ranks}"
            )));
        }

        let mut board = Board::empty();

        // FEN lists rank 8 first
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            // FEN rank 8 = board_rank 7
            let board_rank = BOARD_RANKS - 1 - rank_idx as u8;
            let fen_rank_number = board_rank + 1;

            if rank_str.is_empty() {
                return Err(ChessError::InvalidSetup(format!(
                    "Rank {fen_rank_number} cannot be empty"
                )));
            }

            let mut file: u8 = 0;

            for c in rank_str.chars() {
                if file >= BOARD_FILES {
                    return Err(ChessError::InvalidSetup(format!(
                        "Rank {fen_rank_number} has more than 8 squares (found character '{c}')"
                    )));
                }

                // A digit skips that many empty squares
                if let Some(empty_squares) = c.to_digit(10) {
                    let empty_squares = empty_squares as u8;
                    if empty_squares == 0 || file + empty_squares > BOARD_FILES {
                        return Err(ChessError::InvalidSetup(format!(
                            "Empty square count '{c}' in rank {fen_rank_number} would exceed 8 squares"
                        )));
                    }
                    file += empty_squares;
                } else {
                    // A letter places a piece; uppercase is White
                    let kind = PieceType::from_letter(c).ok_or_else(|| {
                        ChessError::InvalidSetup(format!(
                            "Invalid piece character '{c}' in rank {fen_rank_number} (valid pieces: KQRBNPkqrbnp)"
                        ))
                    })?;
                    let color = if c.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    board.place(kind, color, Position::new_unchecked(file, board_rank))?;
                    file += 1;
                }
            }

            // Every rank must cover all 8 files
            if file != BOARD_FILES {
                return Err(ChessError::InvalidSetup(format!(
                    "Rank {fen_rank_number} must represent exactly 8 squares, found {file}"
                )));
            }
        }

        Ok(board)
    }

    /// Generate the piece-placement field of FEN for the playable pieces
    pub fn to_placement(&self) -> String {
        let mut ranks = Vec::with_capacity(BOARD_RANKS as usize);

        // Rank 8 first, as FEN lists them
        for rank in (0..BOARD_RANKS).rev() {
            let mut rank_string = String::new();
            let mut empty_count = 0;

            for file in 0..BOARD_FILES {
                match self.piece_at(Position::new_unchecked(file, rank)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            rank_string.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        rank_string.push(piece.fen_char());
                    }
                    None => empty_count += 1,
                }
            }

            // Flush trailing empty squares
            if empty_count > 0 {
                rank_string.push_str(&empty_count.to_string());
            }

            ranks.push(rank_string);
        }

        ranks.join("/")
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.0)
    }

    pub(crate) fn piece_mut(&mut self, id: PieceId) -> Result<&mut Piece, ChessError> {
        self.pieces
            .get_mut(id.0)
            .ok_or_else(|| ChessError::InvariantViolation(format!("Unknown piece handle {}", id.0)))
    }

    /// Every piece ever placed, including captured and ghost ones
    pub fn all_pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter()
    }

    /// The pieces currently in play
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter().filter(|piece| piece.is_playable())
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces().filter(move |piece| piece.color == color)
    }

    /// Get the playable piece at the specified position, if any
    pub fn piece_at(&self, position: Position) -> Option<&Piece> {
        self.pieces().find(|piece| piece.position == position)
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.piece_at(position).is_some()
    }

    pub fn king_of(&self, color: Color) -> Result<&Piece, ChessError> {
        self.pieces_of(color)
            .find(|piece| piece.kind == PieceType::King)
            .ok_or_else(|| ChessError::InvalidSetup(format!("{color} has no king")))
    }

    /// Order-independent identifier of the playable pieces: the sorted
    /// concatenation of `(color, kind, position)` triples
    pub fn state_identifier(&self) -> String {
        let mut representations: Vec<String> = self
            .pieces()
            .map(|piece| {
                let color = match piece.color {
                    Color::White => '1',
                    Color::Black => '0',
                };
                format!("{}{}{}", color, piece.kind.letter(), piece.position)
            })
            .collect();

        representations.sort();
        representations.concat()
    }

    /// Hash of the state identifier; used for repetition and undo checks
    pub fn hash_state(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.state_identifier().hash(&mut hasher);
        hasher.finish()
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn is_simulating(&self) -> bool {
        self.simulation_depth > 0
    }

    pub(crate) fn enter_simulation(&mut self) {
        self.simulation_depth += 1;
    }

    pub(crate) fn leave_simulation(&mut self) {
        self.simulation_depth = self.simulation_depth.saturating_sub(1);
    }

    /// Add a piece created by a promotion; its square is already held by the ghosted pawn
    pub(crate) fn spawn_promoted(
        &mut self,
        kind: PieceType,
        color: Color,
        position: Position,
    ) -> Result<PieceId, ChessError> {
        let id = self.place(kind, color, position)?;
        if let Some(tracker) = self.piece_mut(id)?.tracker.as_mut() {
            // A promoted rook never grants castling
            tracker.record();
        }
        Ok(id)
    }

    /// Drop the piece created by the most recent promotion
    pub(crate) fn remove_promoted(&mut self, id: PieceId) -> Result<(), ChessError> {
        if self.pieces.last().map(|piece| piece.id) != Some(id) {
            return Err(ChessError::InvariantViolation(format!(
                "Promoted piece {} is not the most recently created piece",
                id.0
            )));
        }
        self.pieces.pop();
        Ok(())
    }

    /// Legal movements of the given piece (simulates and reverts every candidate)
    pub fn legal_movements(&mut self, id: PieceId) -> Result<Vec<Movement>, ChessError> {
        board_movement::legal_movements(self, id)
    }

    /// Legal movements of the playable piece standing on `position`
    pub fn legal_movements_at(&mut self, position: Position) -> Result<Vec<Movement>, ChessError> {
        match self.piece_at(position).map(|piece| piece.id) {
            Some(id) => self.legal_movements(id),
            None => Ok(Vec::new()),
        }
    }

    /// Legal movements of every playable piece, grouped by piece
    pub fn legal_movements_by_piece(
        &mut self,
    ) -> Result<Vec<(PieceId, Vec<Movement>)>, ChessError> {
        let ids: Vec<PieceId> = self.pieces().map(|piece| piece.id).collect();
        ids.into_iter()
            .map(|id| Ok((id, self.legal_movements(id)?)))
            .collect()
    }

    /// Apply a movement for real: evaluate the opponent, compute the
    /// notation and record it in the history.
    ///
    /// The movement is not checked against the legal movements; callers
    /// resolve requests first (see `Game::exec_move`).
    #[instrument(skip(self, movement, chooser), fields(movement = %movement))]
    pub fn apply(
        &mut self,
        movement: Movement,
        chooser: &mut dyn PromotionChooser,
    ) -> Result<&BoardMovement, ChessError> {
        if self.is_simulating() {
            return Err(ChessError::InvariantViolation(
                "Cannot record a movement while a simulation is in progress".to_string(),
            ));
        }

        let mut board_movement = BoardMovement::new(movement);
        board_movement.validate(self, ValidationMode::Evaluate, chooser)?;
        debug!(notation = ?board_movement.notation(), "movement applied");

        Ok(self.history.register(board_movement))
    }

    /// Revert the most recent movement of the history
    #[instrument(skip(self))]
    pub fn undo_last(&mut self) -> Result<Option<BoardMovement>, ChessError> {
        let Some(mut last) = self.history.pop() else {
            return Ok(None);
        };

        if let Err(error) = last.unvalidate(self) {
            warn!(%error, "undo refused");
            self.history.restore(last);
            return Err(error);
        }

        debug!(movement = %last.movement(), "movement reverted");
        Ok(Some(last))
    }

    /// A fresh status verifier for `color` on the current position
    pub fn status(&mut self, color: Color) -> StatusVerifier<'_> {
        StatusVerifier::new(self, color)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
