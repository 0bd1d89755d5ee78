use super::error::ChessError;
use super::position::{Position, BOARD_RANKS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank delta of a step "forward" for this color
    pub fn direction(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn from_direction(direction: i8) -> Result<Color, ChessError> {
        match direction {
            1 => Ok(Color::White),
            -1 => Ok(Color::Black),
            _ => Err(ChessError::InvalidColor(format!(
                "Player direction must be 1 or -1, got {}",
                direction
            ))),
        }
    }

    /// Rank index of this color's back rank
    pub fn home_rank(&self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => BOARD_RANKS - 1,
        }
    }

    /// Rank index where this color's pawns promote
    pub fn promotion_rank(&self) -> u8 {
        self.opposite().home_rank()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::White => "White",
            Color::Black => "Black",
        })
    }
}

impl FromStr for Color {
    type Err = ChessError;

    /// Accepts "white"/"black" or their initials, in any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        if lowered == "w" || lowered == "white" {
            Ok(Color::White)
        } else if lowered == "b" || lowered == "black" {
            Ok(Color::Black)
        } else {
            Err(ChessError::InvalidColor(format!("'{}' names no color", s)))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceType {
    /// Kinds a pawn may promote into, in the order they are offered
    pub const PROMOTABLE: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Knight,
        PieceType::Bishop,
    ];

    /// Material value in pawns; the king has none
    pub fn value(&self) -> u32 {
        match self {
            PieceType::Pawn => 1,
            PieceType::Knight | PieceType::Bishop => 3,
            PieceType::Rook => 5,
            PieceType::Queen => 9,
            PieceType::King => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PieceType::Pawn => "Pawn",
            PieceType::Rook => "Rook",
            PieceType::Knight => "Knight",
            PieceType::Bishop => "Bishop",
            PieceType::Queen => "Queen",
            PieceType::King => "King",
        }
    }

    /// Uppercase letter used in algebraic notation
    pub fn letter(&self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Rook => 'R',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }

    pub fn from_letter(letter: char) -> Option<PieceType> {
        match letter.to_ascii_uppercase() {
            'P' => Some(PieceType::Pawn),
            'R' => Some(PieceType::Rook),
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }

    pub fn is_promotable(&self) -> bool {
        Self::PROMOTABLE.contains(self)
    }

    pub fn is_minor(&self) -> bool {
        matches!(self, PieceType::Bishop | PieceType::Knight)
    }

    /// Kinds whose rules depend on whether the piece has ever moved
    /// (castling for kings and rooks, the double step for pawns)
    pub fn tracks_movement(&self) -> bool {
        matches!(self, PieceType::Pawn | PieceType::Rook | PieceType::King)
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for PieceType {
    type Err = ChessError;

    /// A single letter (as in notation) or the full English name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let parsed = match (chars.next(), chars.next()) {
            (Some(letter), None) => PieceType::from_letter(letter),
            _ => [
                PieceType::Pawn,
                PieceType::Rook,
                PieceType::Knight,
                PieceType::Bishop,
                PieceType::Queen,
                PieceType::King,
            ]
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s)),
        };
        parsed.ok_or_else(|| ChessError::InvalidPieceType(format!("'{}' names no piece", s)))
    }
}

/// Stable handle of a piece inside its board's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub(crate) usize);

impl PieceId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Counts applied movements of a piece so that reverting them restores
/// the "never moved" state exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveTracker {
    moves: u32,
}

impl MoveTracker {
    pub fn has_moved(&self) -> bool {
        self.moves > 0
    }

    pub(crate) fn record(&mut self) {
        self.moves += 1;
    }

    pub(crate) fn forget(&mut self) {
        self.moves = self.moves.saturating_sub(1);
    }
}

/// A piece as stored in the board's arena.
///
/// Captured and ghost pieces stay in the arena; they are simply not
/// playable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub(crate) id: PieceId,
    pub(crate) kind: PieceType,
    pub(crate) color: Color,
    pub(crate) position: Position,
    pub(crate) captured_by: Option<PieceId>,
    pub(crate) ghost: bool,
    pub(crate) tracker: Option<MoveTracker>,
}

impl Piece {
    pub(crate) fn new(id: PieceId, kind: PieceType, color: Color, position: Position) -> Self {
        Self {
            id,
            kind,
            color,
            position,
            captured_by: None,
            ghost: false,
            tracker: kind.tracks_movement().then(MoveTracker::default),
        }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn kind(&self) -> PieceType {
        self.kind
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn value(&self) -> u32 {
        self.kind.value()
    }

    pub fn captured_by(&self) -> Option<PieceId> {
        self.captured_by
    }

    pub fn is_ghost(&self) -> bool {
        self.ghost
    }

    pub fn is_playable(&self) -> bool {
        self.captured_by.is_none() && !self.ghost
    }

    /// `None` for kinds that do not track their movement
    pub fn has_moved(&self) -> Option<bool> {
        self.tracker.map(|tracker| tracker.has_moved())
    }

    /// True only for tracked pieces that have never moved
    pub fn is_unmoved(&self) -> bool {
        self.has_moved() == Some(false)
    }

    /// Letter as used in FEN piece placement (uppercase for White)
    pub fn fen_char(&self) -> char {
        match self.color {
            Color::White => self.kind.letter(),
            Color::Black => self.kind.letter().to_ascii_lowercase(),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.fen_char(), self.position)
    }
}

/// A participant of a game: a name and the rank direction its pawns advance in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    name: String,
    direction: i8,
}

impl Player {
    pub const WHITES_DIRECTION: i8 = 1;
    pub const BLACKS_DIRECTION: i8 = -1;

    /// Create a player; the name defaults to "Whites" or "Blacks"
    pub fn new(direction: i8, name: Option<&str>) -> Result<Self, ChessError> {
        let color = Color::from_direction(direction)?;
        let name = match name {
            Some(name) => name.to_string(),
            None => match color {
                Color::White => "Whites".to_string(),
                Color::Black => "Blacks".to_string(),
            },
        };
        Ok(Self { name, direction })
    }

    pub fn white() -> Self {
        Self {
            name: "Whites".to_string(),
            direction: Self::WHITES_DIRECTION,
        }
    }

    pub fn black() -> Self {
        Self {
            name: "Blacks".to_string(),
            direction: Self::BLACKS_DIRECTION,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> i8 {
        self.direction
    }

    pub fn color(&self) -> Color {
        if self.direction > 0 {
            Color::White
        } else {
            Color::Black
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The two players of a game, guaranteed to move in opposite directions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Players {
    white: Player,
    black: Player,
}

impl Players {
    pub fn new(first: Player, second: Player) -> Result<Self, ChessError> {
        if first.direction == second.direction {
            return Err(ChessError::InvalidSetup(format!(
                "Players '{}' and '{}' have the same direction",
                first.name, second.name
            )));
        }
        let (white, black) = if first.color() == Color::White {
            (first, second)
        } else {
            (second, first)
        };
        Ok(Self { white, black })
    }

    pub fn get(&self, color: Color) -> &Player {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    pub fn white(&self) -> &Player {
        &self.white
    }

    pub fn black(&self) -> &Player {
        &self.black
    }
}

impl Default for Players {
    fn default() -> Self {
        Self {
            white: Player::white(),
            black: Player::black(),
        }
    }
}
