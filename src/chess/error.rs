use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid piece type: {0}")]
    InvalidPieceType(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Invalid setup: {0}")]
    InvalidSetup(String),

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Invalid notation: {0}")]
    InvalidNotation(String),

    #[error("Ambiguous notation: {0}")]
    AmbiguousNotation(String),

    #[error("Game is not in progress: {0}")]
    GameNotActive(String),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

impl ChessError {
    /// Whether the caller may recover by asking for another move.
    ///
    /// Construction errors and invariant violations are never rejections.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ChessError::InvalidMove(_)
                | ChessError::IllegalMove(_)
                | ChessError::InvalidNotation(_)
                | ChessError::AmbiguousNotation(_)
                | ChessError::GameNotActive(_)
        )
    }

    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, ChessError::InvariantViolation(_))
    }
}

/// Result type for rules engine operations
pub type ChessResult<T> = Result<T, ChessError>;
