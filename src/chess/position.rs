use super::error::ChessError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Files a-h
pub const BOARD_FILES: u8 = 8;
/// Ranks 1-8
pub const BOARD_RANKS: u8 = 8;

/// A square, zero-based: `a1` is `(0, 0)`, `h8` is `(7, 7)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub file: u8,
    pub rank: u8,
}

impl Position {
    pub fn new(file: u8, rank: u8) -> Result<Self, ChessError> {
        if file >= BOARD_FILES || rank >= BOARD_RANKS {
            return Err(ChessError::InvalidPosition(format!(
                "({}, {}) is outside the {}x{} board",
                file, rank, BOARD_FILES, BOARD_RANKS
            )));
        }
        Ok(Self::new_unchecked(file, rank))
    }

    /// Caller guarantees both coordinates are on the board
    pub const fn new_unchecked(file: u8, rank: u8) -> Self {
        Self { file, rank }
    }

    /// Parse a file letter (either case) and a rank digit
    pub fn from_chars(file: char, rank: char) -> Result<Self, ChessError> {
        let file_index = match file.to_ascii_lowercase() {
            letter @ 'a'..='h' => letter as u8 - b'a',
            _ => {
                return Err(ChessError::InvalidPosition(format!(
                    "'{}' is not a file, expected a-h",
                    file
                )))
            }
        };
        let rank_index = match rank {
            digit @ '1'..='8' => digit as u8 - b'1',
            _ => {
                return Err(ChessError::InvalidPosition(format!(
                    "'{}' is not a rank, expected 1-8",
                    rank
                )))
            }
        };
        Ok(Self::new_unchecked(file_index, rank_index))
    }

    pub fn file_char(&self) -> char {
        char::from(b'a' + self.file)
    }

    pub fn rank_char(&self) -> char {
        char::from(b'1' + self.rank)
    }

    /// The square shifted by the given file and rank deltas, if it stays on the board
    pub fn offset(&self, file_delta: i8, rank_delta: i8) -> Option<Position> {
        let file = self.file as i8 + file_delta;
        let rank = self.rank as i8 + rank_delta;
        if (0..BOARD_FILES as i8).contains(&file) && (0..BOARD_RANKS as i8).contains(&rank) {
            Some(Position::new_unchecked(file as u8, rank as u8))
        } else {
            None
        }
    }

    /// Signed (file, rank) displacement from `self` to `other`
    pub fn difference(&self, other: &Position) -> (i8, i8) {
        (
            other.file as i8 - self.file as i8,
            other.rank as i8 - self.rank as i8,
        )
    }

    pub fn same_rank(&self, other: &Position) -> bool {
        self.rank == other.rank
    }

    pub fn same_file(&self, other: &Position) -> bool {
        self.file == other.file
    }

    /// a1 is dark, h1 is light
    pub fn is_light_square(&self) -> bool {
        (self.file + self.rank) % 2 == 1
    }

    /// Every square, rank by rank from a1
    pub fn all_positions() -> impl Iterator<Item = Position> {
        (0..BOARD_RANKS)
            .flat_map(|rank| (0..BOARD_FILES).map(move |file| Position::new_unchecked(file, rank)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Position {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.chars().collect::<Vec<_>>().as_slice() {
            [file, rank] => Self::from_chars(*file, *rank),
            _ => Err(ChessError::InvalidPosition(format!(
                "Expected a square such as 'e4', got '{}'",
                s
            ))),
        }
    }
}
