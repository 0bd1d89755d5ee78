use super::board::Board;
use super::candidates;
use super::moves::{Movement, Promotion};
use super::notation;
use super::piece::{Color, PieceId, PieceType};
use super::status::{StatusReport, StatusVerifier};
use super::ChessError;
use tracing::{debug, trace};

/// Source of the piece kind a promoting pawn turns into
pub trait PromotionChooser {
    /// Pick exactly one of `options`
    fn choose(&mut self, options: &[PieceType]) -> PieceType;
}

impl<F> PromotionChooser for F
where
    F: FnMut(&[PieceType]) -> PieceType,
{
    fn choose(&mut self, options: &[PieceType]) -> PieceType {
        self(options)
    }
}

/// A chooser bound to one kind, used for non-interactive promotion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPromotion(pub PieceType);

impl PromotionChooser for FixedPromotion {
    fn choose(&mut self, _options: &[PieceType]) -> PieceType {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Apply only; used by the legality filter
    Simulate,
    /// Apply, then evaluate the opponent status and compute the notation
    Evaluate,
}

/// A movement bound to a board once it has been applied.
///
/// `hash_after` is the board hash taken right after application. Reverting
/// is refused unless the board still hashes to that value, which enforces
/// strict last-in first-out undo.
#[derive(Debug, Clone)]
pub struct BoardMovement {
    movement: Movement,
    mover: Option<PieceId>,
    mover_color: Option<Color>,
    cascade_piece: Option<PieceId>,
    hash_after: Option<u64>,
    notation: Option<String>,
    opponent_status: Option<StatusReport>,
    depends_on: Option<usize>,
}

impl BoardMovement {
    pub fn new(movement: Movement) -> Self {
        Self {
            movement,
            mover: None,
            mover_color: None,
            cascade_piece: None,
            hash_after: None,
            notation: None,
            opponent_status: None,
            depends_on: None,
        }
    }

    pub fn movement(&self) -> &Movement {
        &self.movement
    }

    pub fn into_movement(self) -> Movement {
        self.movement
    }

    pub fn mover(&self) -> Option<PieceId> {
        self.mover
    }

    pub fn mover_color(&self) -> Option<Color> {
        self.mover_color
    }

    pub fn hash_after(&self) -> Option<u64> {
        self.hash_after
    }

    pub fn is_validated(&self) -> bool {
        self.hash_after.is_some()
    }

    /// Algebraic notation, available once applied in [`ValidationMode::Evaluate`]
    pub fn notation(&self) -> Option<&str> {
        self.notation.as_deref()
    }

    pub fn opponent_status(&self) -> Option<StatusReport> {
        self.opponent_status
    }

    /// Index of the previous entry in the history this movement was recorded in
    pub fn depends_on(&self) -> Option<usize> {
        self.depends_on
    }

    pub(crate) fn set_depends_on(&mut self, previous: Option<usize>) {
        self.depends_on = previous;
    }

    /// Apply the movement to `board`.
    ///
    /// Every precondition is checked before the board is touched, so an
    /// error leaves the board unchanged.
    pub fn validate(
        &mut self,
        board: &mut Board,
        mode: ValidationMode,
        chooser: &mut dyn PromotionChooser,
    ) -> Result<(), ChessError> {
        if self.hash_after.is_some() {
            return Err(ChessError::InvariantViolation(format!(
                "Movement {} has already been validated",
                self.movement
            )));
        }

        let from = self.movement.from;
        let to = self.movement.to;

        let piece = board
            .piece_at(from)
            .ok_or_else(|| ChessError::InvalidMove(format!("No piece at source position {from}")))?;
        let (mover, kind, color) = (piece.id(), piece.kind(), piece.color());

        let captured = match board.piece_at(to) {
            Some(target) if target.color() == color => {
                return Err(ChessError::InvariantViolation(format!(
                    "Cannot capture own piece at {to}"
                )))
            }
            Some(target) if target.kind() == PieceType::King => {
                return Err(ChessError::InvariantViolation(format!(
                    "Cannot capture the king at {to}"
                )))
            }
            Some(target) => Some(target.id()),
            None => None,
        };

        let promotion_kind = self.resolve_promotion(kind, color, chooser)?;

        let castling = match kind {
            PieceType::King => self.movement.castling_shape(),
            _ => None,
        };

        let cascade_piece = match self.movement.cascade() {
            Some(cascade) => {
                let rook = board
                    .piece_at(cascade.from)
                    .filter(|rook| rook.color() == color && rook.id() != mover)
                    .ok_or_else(|| {
                        ChessError::InvariantViolation(format!(
                            "No piece of {color} at {} to cascade",
                            cascade.from
                        ))
                    })?;
                if cascade.to != from && board.is_occupied(cascade.to) {
                    return Err(ChessError::InvariantViolation(format!(
                        "Cascade destination {} is occupied",
                        cascade.to
                    )));
                }
                Some(rook.id())
            }
            None => None,
        };

        // Step 1: capture
        if let Some(target) = captured {
            board.piece_mut(target)?.captured_by = Some(mover);
            self.movement.captured = Some(target);
        }

        // Step 2: relocate the mover
        let moved = board.piece_mut(mover)?;
        moved.position = to;
        if let Some(tracker) = moved.tracker.as_mut() {
            tracker.record();
        }

        // Step 3: promotion ghosts the pawn
        if let Some(promoted_kind) = promotion_kind {
            board.piece_mut(mover)?.ghost = true;
            let promoted = board.spawn_promoted(promoted_kind, color, to)?;
            self.movement.promotion = Some(Promotion {
                pawn: mover,
                piece: promoted,
                kind: promoted_kind,
            });
        }

        // Step 4: castling shifts the rook
        self.movement.castling = castling;
        if let (Some(rook), Some(cascade)) = (cascade_piece, self.movement.cascade()) {
            let rook_to = cascade.to;
            let rook_piece = board.piece_mut(rook)?;
            rook_piece.position = rook_to;
            if let Some(tracker) = rook_piece.tracker.as_mut() {
                tracker.record();
            }
        }

        // Step 5: the post-move hash gates undo
        self.mover = Some(mover);
        self.mover_color = Some(color);
        self.cascade_piece = cascade_piece;
        self.hash_after = Some(board.hash_state());

        if board.is_simulating() {
            trace!(movement = %self.movement, "simulated");
        } else {
            debug!(movement = %self.movement, ?castling, capture = captured.is_some(), "validated");
        }

        if mode == ValidationMode::Evaluate {
            if let Err(error) = self.evaluate(board, color) {
                self.unvalidate(board)?;
                return Err(error);
            }
        }

        Ok(())
    }

    fn resolve_promotion(
        &self,
        kind: PieceType,
        color: Color,
        chooser: &mut dyn PromotionChooser,
    ) -> Result<Option<PieceType>, ChessError> {
        let requires_promotion =
            kind == PieceType::Pawn && self.movement.to.rank == color.promotion_rank();

        if !requires_promotion {
            return match self.movement.promote_to() {
                Some(_) => Err(ChessError::InvalidMove(
                    "Only a pawn reaching the last rank can be promoted".to_string(),
                )),
                None => Ok(None),
            };
        }

        let choice = match self.movement.promote_to() {
            Some(choice) => choice,
            None => chooser.choose(&PieceType::PROMOTABLE),
        };
        if !choice.is_promotable() {
            return Err(ChessError::InvalidMove(format!(
                "A pawn cannot be promoted to {choice}"
            )));
        }
        Ok(Some(choice))
    }

    /// Opponent status first, the notation depends on it
    fn evaluate(&mut self, board: &mut Board, color: Color) -> Result<(), ChessError> {
        let report = StatusVerifier::new(board, color.opposite()).report()?;
        self.opponent_status = Some(report);
        let notation = notation::describe(board, self)?;
        self.notation = Some(notation);
        Ok(())
    }

    /// Revert the movement. The board must be exactly in the state this
    /// movement left it in.
    pub fn unvalidate(&mut self, board: &mut Board) -> Result<(), ChessError> {
        let Some(expected) = self.hash_after else {
            return Err(ChessError::InvariantViolation(format!(
                "Movement {} has not been validated",
                self.movement
            )));
        };
        if board.hash_state() != expected {
            return Err(ChessError::InvariantViolation(format!(
                "Movement {} cannot be reverted: the board is not in the position it produced",
                self.movement
            )));
        }
        let mover = self.mover.ok_or_else(|| {
            ChessError::InvariantViolation("Validated movement without a mover".to_string())
        })?;

        // Undo in reverse order, cascade first
        if let (Some(rook), Some(cascade)) = (self.cascade_piece, self.movement.cascade()) {
            let rook_from = cascade.from;
            let rook_piece = board.piece_mut(rook)?;
            rook_piece.position = rook_from;
            if let Some(tracker) = rook_piece.tracker.as_mut() {
                tracker.forget();
            }
        }

        if let Some(target) = self.movement.captured {
            board.piece_mut(target)?.captured_by = None;
        }

        let moved = board.piece_mut(mover)?;
        moved.position = self.movement.from;
        if let Some(tracker) = moved.tracker.as_mut() {
            tracker.forget();
        }

        if let Some(promotion) = self.movement.promotion {
            board.remove_promoted(promotion.piece)?;
            board.piece_mut(promotion.pawn)?.ghost = false;
        }

        if board.is_simulating() {
            trace!(movement = %self.movement, "simulation reverted");
        } else {
            debug!(movement = %self.movement, "unvalidated");
        }

        self.movement.clear_outcome();
        if let Some(cascade) = self.movement.cascade_mut() {
            cascade.clear_outcome();
        }
        self.mover = None;
        self.mover_color = None;
        self.cascade_piece = None;
        self.hash_after = None;
        self.notation = None;
        self.opponent_status = None;

        Ok(())
    }
}

/// Legal movements of a piece: each candidate is applied, the mover's king
/// is tested for attack, and the candidate is reverted.
pub fn legal_movements(board: &mut Board, id: PieceId) -> Result<Vec<Movement>, ChessError> {
    let Some(piece) = board.piece(id).filter(|piece| piece.is_playable()) else {
        return Ok(Vec::new());
    };
    let color = piece.color();
    let candidates = candidates::candidate_movements(board, piece);

    let mut legal = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if is_movement_legal(board, &candidate, color)? {
            legal.push(candidate);
        }
    }
    Ok(legal)
}

/// Whether applying `movement` keeps `color`'s king out of attack.
///
/// For castling only the king's own step is simulated; the rook shift does
/// not influence the check test.
pub fn is_movement_legal(
    board: &mut Board,
    movement: &Movement,
    color: Color,
) -> Result<bool, ChessError> {
    let mut trial = BoardMovement::new(movement.without_cascade());
    let mut chooser = FixedPromotion(
        movement
            .promote_to()
            .unwrap_or(board.rules().simulation_promotion),
    );

    board.enter_simulation();
    let outcome = simulate(board, &mut trial, color, &mut chooser);
    board.leave_simulation();
    outcome
}

fn simulate(
    board: &mut Board,
    trial: &mut BoardMovement,
    color: Color,
    chooser: &mut FixedPromotion,
) -> Result<bool, ChessError> {
    trial.validate(board, ValidationMode::Simulate, chooser)?;
    let exposed = StatusVerifier::new(board, color).is_checked();
    trial.unvalidate(board)?;
    Ok(!exposed?)
}
