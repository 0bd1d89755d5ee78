//! Chess rules engine: board, movement application and reversal, legality,
//! game status and algebraic notation.

pub use self::board::Board;
pub use self::board_movement::{
    BoardMovement, FixedPromotion, PromotionChooser, ValidationMode,
};
pub use self::error::{ChessError, ChessResult};
pub use self::game::{
    Game, GameOutcome, GameState, MoveReport, MoveRequest, MoveSource, ScriptedMoves, TurnOutcome,
};
pub use self::history::MoveHistory;
pub use self::moves::{CastlingSide, Movement, Promotion};
pub use self::notation::{decode, DecodedMove, DRAW_OFFER_MARKER};
pub use self::piece::{Color, MoveTracker, Piece, PieceId, PieceType, Player, Players};
pub use self::position::{Position, BOARD_FILES, BOARD_RANKS};
pub use self::status::{DrawReason, StatusReport, StatusVerifier};

mod board;
pub mod board_movement;
pub mod candidates;
mod error;
mod game;
mod history;
mod moves;
pub mod notation;
mod piece;
mod position;
mod status;
