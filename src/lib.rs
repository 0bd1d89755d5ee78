pub mod chess;
pub mod config;

// Re-export key types for easy testing
pub use chess::{Board, ChessError, Color, Game, Movement, PieceType, Position};
pub use config::{BishopRule, RulesConfig};
