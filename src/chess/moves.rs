use super::error::ChessError;
use super::piece::{PieceId, PieceType};
use super::position::Position;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastlingSide {
    King,
    Queen,
}

impl CastlingSide {
    pub const ALL: [CastlingSide; 2] = [CastlingSide::King, CastlingSide::Queen];

    /// File delta of the king's two-square step
    pub fn file_direction(&self) -> i8 {
        match self {
            CastlingSide::King => 1,
            CastlingSide::Queen => -1,
        }
    }

    /// Classify a king displacement; only a pure two-file step qualifies
    pub fn from_displacement(file_delta: i8, rank_delta: i8) -> Option<CastlingSide> {
        match (file_delta, rank_delta) {
            (2, 0) => Some(CastlingSide::King),
            (-2, 0) => Some(CastlingSide::Queen),
            _ => None,
        }
    }

    pub fn notation(&self) -> &'static str {
        match self {
            CastlingSide::King => "O-O",
            CastlingSide::Queen => "O-O-O",
        }
    }
}

impl fmt::Display for CastlingSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.notation())
    }
}

/// The pieces involved in an applied promotion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    pub pawn: PieceId,
    pub piece: PieceId,
    pub kind: PieceType,
}

/// A square-to-square transition.
///
/// A movement is a plan: it holds no board reference and compares equal to
/// any other movement with the same `from`/`to` pair. The capture, promotion
/// and castling fields are filled while the movement is applied and cleared
/// again when it is reverted.
#[derive(Debug, Clone)]
pub struct Movement {
    pub from: Position,
    pub to: Position,
    cascade: Option<Box<Movement>>,
    promote_to: Option<PieceType>,
    pub(crate) promotion: Option<Promotion>,
    pub(crate) captured: Option<PieceId>,
    pub(crate) castling: Option<CastlingSide>,
}

impl Movement {
    /// Rejects a movement that stays on its own square
    pub fn new(from: Position, to: Position) -> Result<Self, ChessError> {
        if from == to {
            return Err(ChessError::InvalidMove(format!("{} to itself is no movement", from)));
        }
        Ok(Self::new_unchecked(from, to))
    }

    /// `from` and `to` must differ
    pub const fn new_unchecked(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            cascade: None,
            promote_to: None,
            promotion: None,
            captured: None,
            castling: None,
        }
    }

    /// Pre-select the piece a pawn turns into, skipping the promotion chooser
    pub fn with_promotion(mut self, kind: PieceType) -> Result<Self, ChessError> {
        if !kind.is_promotable() {
            return Err(ChessError::InvalidMove(format!("A pawn cannot become a {}", kind.name())));
        }
        self.promote_to = Some(kind);
        Ok(self)
    }

    /// Attach a secondary movement applied right after this one
    pub fn cascading(mut self, with: Movement) -> Self {
        self.cascade = Some(Box::new(with));
        self
    }

    pub fn without_cascade(&self) -> Self {
        let mut plain = self.clone();
        plain.cascade = None;
        plain
    }

    pub fn cascade(&self) -> Option<&Movement> {
        self.cascade.as_deref()
    }

    pub(crate) fn cascade_mut(&mut self) -> Option<&mut Movement> {
        self.cascade.as_deref_mut()
    }

    pub fn promote_to(&self) -> Option<PieceType> {
        self.promote_to
    }

    pub fn promotion(&self) -> Option<Promotion> {
        self.promotion
    }

    pub fn captured(&self) -> Option<PieceId> {
        self.captured
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub fn castling_side(&self) -> Option<CastlingSide> {
        self.castling
    }

    /// Signed (file, rank) displacement
    pub fn difference(&self) -> (i8, i8) {
        self.from.difference(&self.to)
    }

    /// The castling side a king making this displacement would castle to
    pub fn castling_shape(&self) -> Option<CastlingSide> {
        let (file_delta, rank_delta) = self.difference();
        CastlingSide::from_displacement(file_delta, rank_delta)
    }

    /// The plain movement going back from `to` to `from`
    pub fn reversed(&self) -> Movement {
        Movement::new_unchecked(self.to, self.from)
    }

    pub(crate) fn clear_outcome(&mut self) {
        self.promotion = None;
        self.captured = None;
        self.castling = None;
    }

    /// `{"from": "e7", "to": "e8", "promotion": "Q"}`, the last key only when preselected
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = serde_json::Map::new();
        value.insert("from".into(), self.from.to_string().into());
        value.insert("to".into(), self.to.to_string().into());
        if let Some(kind) = self.promote_to {
            value.insert("promotion".into(), kind.letter().to_string().into());
        }
        serde_json::Value::Object(value)
    }

    pub fn from_json(value: &serde_json::Value) -> Result<Self, ChessError> {
        let square = |key: &str| -> Result<Position, ChessError> {
            value
                .get(key)
                .and_then(serde_json::Value::as_str)
                .ok_or_else(|| ChessError::InvalidMove(format!("'{}' must be a square string", key)))?
                .parse()
        };
        let movement = Self::new(square("from")?, square("to")?)?;

        match value.get("promotion").map(serde_json::Value::as_str) {
            None => Ok(movement),
            Some(Some(kind)) => movement.with_promotion(kind.parse()?),
            Some(None) => Err(ChessError::InvalidMove(
                "'promotion' must be a piece letter".to_string(),
            )),
        }
    }
}

impl PartialEq for Movement {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl Eq for Movement {}

impl Hash for Movement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
    }
}

// Coordinate form, e.g. "e2e4" or "e7e8Q"; parses back with `FromStr`.
// A castling cascade only shows in `Debug`.
impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promote_to {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

impl FromStr for Movement {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if !text.is_ascii() || !matches!(text.len(), 4 | 5) {
            return Err(ChessError::InvalidMove(format!(
                "'{text}' is not in coordinate form such as e2e4 or e7e8q"
            )));
        }

        let (squares, promotion) = text.split_at(4);
        let movement = Self::new(squares[..2].parse()?, squares[2..].parse()?)?;
        match promotion {
            "" => Ok(movement),
            letter => movement.with_promotion(letter.parse()?),
        }
    }
}
