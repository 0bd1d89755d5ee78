use super::board::Board;
use super::candidates;
use super::moves::Movement;
use super::piece::{Color, PieceId, PieceType};
use super::position::Position;
use super::ChessError;
use crate::config::BishopRule;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a game ended in a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawReason {
    InsufficientMaterial,
    Stalemate,
    FiftyMove,
    Repetition,
    MutualAgreement,
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DrawReason::InsufficientMaterial => "insufficient material",
            DrawReason::Stalemate => "stalemate",
            DrawReason::FiftyMove => "fifty-move rule",
            DrawReason::Repetition => "repetition",
            DrawReason::MutualAgreement => "mutual agreement",
        };
        f.write_str(text)
    }
}

/// The part of a player's status stored with each applied movement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub checked: bool,
    pub checkmate: bool,
}

/// Lazily evaluated status of one player on the current position.
///
/// Every answer is computed at most once; the verifier borrows the board
/// mutably because move legality is probed by simulation.
pub struct StatusVerifier<'b> {
    board: &'b mut Board,
    color: Color,
    checked: Option<bool>,
    has_legal_move: Option<bool>,
    draw: Option<Option<DrawReason>>,
}

impl<'b> StatusVerifier<'b> {
    pub fn new(board: &'b mut Board, color: Color) -> Self {
        Self {
            board,
            color,
            checked: None,
            has_legal_move: None,
            draw: None,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Whether some opponent piece contests the king's square
    pub fn is_checked(&mut self) -> Result<bool, ChessError> {
        if let Some(checked) = self.checked {
            return Ok(checked);
        }

        let king_square = self.board.king_of(self.color)?.position();
        let board = &*self.board;
        let checked = board
            .pieces_of(self.color.opposite())
            .any(|piece| candidates::contesting_squares(board, piece).contains(&king_square));

        self.checked = Some(checked);
        Ok(checked)
    }

    /// Whether any own piece has at least one legal movement
    pub fn has_legal_move(&mut self) -> Result<bool, ChessError> {
        if let Some(found) = self.has_legal_move {
            return Ok(found);
        }

        let ids: Vec<PieceId> = self.board.pieces_of(self.color).map(|piece| piece.id()).collect();
        let mut found = false;
        for id in ids {
            if !self.board.legal_movements(id)?.is_empty() {
                found = true;
                break;
            }
        }

        self.has_legal_move = Some(found);
        Ok(found)
    }

    pub fn is_checkmate(&mut self) -> Result<bool, ChessError> {
        Ok(self.is_checked()? && !self.has_legal_move()?)
    }

    pub fn is_stalemate(&mut self) -> Result<bool, ChessError> {
        Ok(!self.is_checked()? && !self.has_legal_move()?)
    }

    /// The first draw condition that holds, checked in the order:
    /// insufficient material, stalemate, fifty-move rule, repetition
    pub fn draw_reason(&mut self) -> Result<Option<DrawReason>, ChessError> {
        if let Some(draw) = self.draw {
            return Ok(draw);
        }

        let draw = if self.insufficient_material() {
            Some(DrawReason::InsufficientMaterial)
        } else if self.is_stalemate()? {
            Some(DrawReason::Stalemate)
        } else if self.fifty_move_rule() {
            Some(DrawReason::FiftyMove)
        } else if self.repetition_rule() {
            Some(DrawReason::Repetition)
        } else {
            None
        };

        self.draw = Some(draw);
        Ok(draw)
    }

    pub fn is_draw(&mut self) -> Result<bool, ChessError> {
        Ok(self.draw_reason()?.is_some())
    }

    pub fn report(&mut self) -> Result<StatusReport, ChessError> {
        Ok(StatusReport {
            checked: self.is_checked()?,
            checkmate: self.is_checkmate()?,
        })
    }

    /// Neither side can ever deliver mate: a lone king against a lone king
    /// or a single minor piece, or (depending on the bishop rule) a single
    /// bishop against a single bishop
    fn insufficient_material(&self) -> bool {
        let material = |color: Color| -> Vec<(PieceType, Position)> {
            self.board
                .pieces_of(color)
                .filter(|piece| piece.kind() != PieceType::King)
                .map(|piece| (piece.kind(), piece.position()))
                .collect()
        };
        let own = material(self.color);
        let other = material(self.color.opposite());
        let (fewer, more) = if own.len() <= other.len() {
            (own, other)
        } else {
            (other, own)
        };

        match (fewer.as_slice(), more.as_slice()) {
            ([], []) => true,
            ([], [(kind, _)]) => kind.is_minor(),
            ([(PieceType::Bishop, first)], [(PieceType::Bishop, second)]) => {
                match self.board.rules().bishop_rule {
                    BishopRule::AnyBishops => true,
                    BishopRule::SameSquareColor => {
                        first.is_light_square() == second.is_light_square()
                    }
                }
            }
            _ => false,
        }
    }

    /// Walking back from the newest movement, stops at the first capture.
    /// Holds once either color made `fifty_move_limit` movements in that run.
    fn fifty_move_rule(&self) -> bool {
        let limit = self.board.rules().fifty_move_limit;
        let mut counts = [0usize; 2];

        for entry in self.board.history().iter_newest_first() {
            if entry.movement().is_capture() {
                break;
            }
            let Some(color) = entry.mover_color() else {
                continue;
            };
            let count = &mut counts[color_index(color)];
            *count += 1;
            if *count >= limit {
                return true;
            }
        }

        false
    }

    /// Per color, the newest movement is the anchor. Walking back through
    /// that color's movements, the anchor's reverse is skipped, another
    /// occurrence of the anchor counts, and anything else ends the run.
    fn repetition_rule(&self) -> bool {
        let limit = self.board.rules().repetition_limit;
        let mut runs: [RepetitionRun; 2] = Default::default();

        for entry in self.board.history().iter_newest_first() {
            let Some(color) = entry.mover_color() else {
                continue;
            };
            let index = color_index(color);
            if runs[index].closed {
                if runs.iter().all(|run| run.closed) {
                    break;
                }
                continue;
            }
            let run = &mut runs[index];

            let movement = entry.movement();
            match &run.anchor {
                None => {
                    run.anchor = Some(movement.without_cascade());
                    run.count = 1;
                }
                Some(anchor) if anchor == movement => run.count += 1,
                Some(anchor) if anchor.reversed() == *movement => {}
                Some(_) => run.closed = true,
            }

            if run.count >= limit {
                return true;
            }
        }

        false
    }
}

#[derive(Debug, Default)]
struct RepetitionRun {
    anchor: Option<Movement>,
    count: usize,
    closed: bool,
}

fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}
