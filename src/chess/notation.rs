//! Algebraic notation.
//!
//! [`describe`] builds the notation of a movement that was just applied.
//! [`decode`] resolves a player's token into exactly one legal movement.

use super::board::Board;
use super::board_movement::BoardMovement;
use super::moves::{CastlingSide, Movement};
use super::piece::{Color, PieceId, PieceType};
use super::position::Position;
use super::ChessError;
use regex::{Captures, Regex};
use std::sync::OnceLock;
use tracing::{debug, instrument};

/// Marker appended to a move to offer a draw, e.g. "e4 (=)"
pub const DRAW_OFFER_MARKER: &str = "(=)";

const MOVE_REGEX: &str = r"(?ix)
    ^\s*
    (?:
        (?P<queen_castling>[0o]\s*-\s*[0o]\s*-\s*[0o])
        |
        (?P<king_castling>[0o]\s*-\s*[0o])
        |
        (?P<piece>[pnbrqk])?
        (?P<from_file>[a-h])?
        (?P<from_rank>[1-8])?
        \s*(?P<capture>[x:])?\s*
        (?P<to>[a-h][1-8])
        (?:\s*[=/]?\s*(?P<promotion>[nbrq]))?
    )
    \s*[+\#]?
    \s*(?P<draw_offer>\(=\))?
    \s*$";

fn move_pattern() -> Result<&'static Regex, ChessError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(MOVE_REGEX))
        .as_ref()
        .map_err(|error| ChessError::InvariantViolation(format!("Move pattern: {error}")))
}

/// A decoded token: the movement to play and whether a draw was offered with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMove {
    pub movement: Movement,
    pub draw_offer: bool,
}

/// One way of reading the piece part of a token
#[derive(Debug, Clone, Copy)]
struct Reading {
    /// `None` when the token names the full source square and no piece
    kind: Option<PieceType>,
    from_file: Option<u8>,
    from_rank: Option<u8>,
}

impl Reading {
    fn accepts(&self, kind: PieceType, position: Position) -> bool {
        self.kind.map_or(true, |wanted| wanted == kind)
            && self.from_file.map_or(true, |file| file == position.file)
            && self.from_rank.map_or(true, |rank| rank == position.rank)
    }
}

/// Resolve `token` into the unique legal movement of `color` it designates.
///
/// A lowercase `b` is read both as a bishop and as the b-file; when both
/// readings name a legal movement the token is ambiguous.
#[instrument(skip(board), level = "debug")]
pub fn decode(token: &str, board: &mut Board, color: Color) -> Result<DecodedMove, ChessError> {
    let captures = move_pattern()?
        .captures(token)
        .ok_or_else(|| ChessError::InvalidNotation(format!("'{token}' is not a move")))?;
    let draw_offer = captures.name("draw_offer").is_some();

    let movement = if captures.name("queen_castling").is_some() {
        decode_castling(board, color, CastlingSide::Queen)?
    } else if captures.name("king_castling").is_some() {
        decode_castling(board, color, CastlingSide::King)?
    } else {
        decode_movement(token, &captures, board, color)?
    };

    debug!(%movement, draw_offer, "token decoded");
    Ok(DecodedMove {
        movement,
        draw_offer,
    })
}

fn decode_castling(
    board: &mut Board,
    color: Color,
    side: CastlingSide,
) -> Result<Movement, ChessError> {
    let king = board.king_of(color)?;
    let (id, origin) = (king.id(), king.position());

    let destination = origin.offset(2 * side.file_direction(), 0);
    board
        .legal_movements(id)?
        .into_iter()
        .find(|movement| Some(movement.to) == destination && movement.cascade().is_some())
        .ok_or_else(|| ChessError::IllegalMove(format!("{color} cannot play {side} now")))
}

fn decode_movement(
    token: &str,
    captures: &Captures<'_>,
    board: &mut Board,
    color: Color,
) -> Result<Movement, ChessError> {
    let to: Position = captures
        .name("to")
        .ok_or_else(|| ChessError::InvalidNotation(format!("'{token}' has no destination")))?
        .as_str()
        .to_ascii_lowercase()
        .parse()?;
    let from_file = captures.name("from_file").map(|m| letter_index(m.as_str(), b'a'));
    let from_rank = captures.name("from_rank").map(|m| letter_index(m.as_str(), b'1'));
    let promotion = captures
        .name("promotion")
        .map(|m| m.as_str().parse::<PieceType>())
        .transpose()?;

    let mut readings = Vec::with_capacity(2);
    match captures.name("piece").map(|m| m.as_str()) {
        Some("b") if from_file.is_none() => {
            readings.push(Reading {
                kind: Some(PieceType::Bishop),
                from_file,
                from_rank,
            });
            readings.push(Reading {
                kind: Some(PieceType::Pawn),
                from_file: Some(1),
                from_rank,
            });
        }
        Some(letter) => readings.push(Reading {
            kind: Some(letter.parse()?),
            from_file,
            from_rank,
        }),
        None => readings.push(Reading {
            kind: match (from_file, from_rank) {
                (Some(_), Some(_)) => None,
                _ => Some(PieceType::Pawn),
            },
            from_file,
            from_rank,
        }),
    }

    let pieces: Vec<(PieceId, PieceType, Position)> = board
        .pieces_of(color)
        .map(|piece| (piece.id(), piece.kind(), piece.position()))
        .collect();

    let mut matches: Vec<Movement> = Vec::new();
    for reading in &readings {
        for &(id, kind, position) in &pieces {
            if !reading.accepts(kind, position) {
                continue;
            }
            let found = board
                .legal_movements(id)?
                .into_iter()
                .find(|movement| movement.to == to);
            if let Some(movement) = found {
                if !matches.contains(&movement) {
                    matches.push(movement);
                }
            }
        }
    }

    let movement = match matches.len() {
        0 => {
            return Err(ChessError::IllegalMove(format!(
                "No legal move of {color} matches '{token}'"
            )))
        }
        1 => matches.remove(0),
        count => {
            return Err(ChessError::AmbiguousNotation(format!(
                "'{token}' matches {count} legal moves"
            )))
        }
    };

    if captures.name("capture").is_some() && !board.is_occupied(to) {
        return Err(ChessError::InvalidNotation(format!(
            "'{token}' marks a capture but {to} is empty"
        )));
    }

    match promotion {
        None => Ok(movement),
        Some(kind) => {
            let promotes = board.piece_at(movement.from).is_some_and(|piece| {
                piece.kind() == PieceType::Pawn && to.rank == color.promotion_rank()
            });
            if !promotes {
                return Err(ChessError::InvalidNotation(format!(
                    "'{token}' promotes a piece that cannot be promoted"
                )));
            }
            movement.with_promotion(kind)
        }
    }
}

fn letter_index(text: &str, base: u8) -> u8 {
    text.as_bytes()
        .first()
        .map_or(0, |byte| byte.to_ascii_lowercase() - base)
}

/// Notation of a movement applied an instant ago.
///
/// Rivals are the other pieces of the same kind and owner that could
/// legally reach the destination, found with the moved piece hidden and
/// any captured piece standing on the destination again.
pub(crate) fn describe(board: &mut Board, applied: &BoardMovement) -> Result<String, ChessError> {
    let movement = applied.movement();
    if let (Some(side), Some(_)) = (movement.castling_side(), movement.cascade()) {
        return Ok(side.notation().to_string());
    }

    let mover = applied.mover().ok_or_else(|| {
        ChessError::InvariantViolation(format!("Movement {movement} has not been applied"))
    })?;
    let piece = board.piece(mover).ok_or_else(|| {
        ChessError::InvariantViolation(format!("Unknown piece handle {}", mover.index()))
    })?;
    let (kind, color) = (piece.kind(), piece.color());
    let (from, to) = (movement.from, movement.to);
    let standing = movement.promotion().map_or(mover, |promotion| promotion.piece);

    // Rivals are probed on the square as it stood: mover hidden, victim back on `to`
    let was_ghost = board.piece_mut(standing)?.ghost;
    board.piece_mut(standing)?.ghost = true;
    let victim = match movement.captured() {
        Some(captured) => Some((captured, board.piece_mut(captured)?.captured_by.take())),
        None => None,
    };
    let rivals = rivals_reaching(board, kind, color, to);
    if let Some((captured, captured_by)) = victim {
        board.piece_mut(captured)?.captured_by = captured_by;
    }
    board.piece_mut(standing)?.ghost = was_ghost;
    let rivals = rivals?;

    let (show_file, show_rank) = if rivals.is_empty() {
        (false, false)
    } else if !rivals.iter().any(|rival| rival.same_file(&from)) {
        (true, false)
    } else if !rivals.iter().any(|rival| rival.same_rank(&from)) {
        (false, true)
    } else {
        (true, true)
    };

    let mut notation = String::with_capacity(8);
    if kind != PieceType::Pawn {
        notation.push(kind.letter());
    }
    if show_file {
        notation.push(from.file_char());
    }
    if show_rank {
        notation.push(from.rank_char());
    }
    if movement.is_capture() {
        notation.push('x');
    }
    notation.push_str(&to.to_string());
    if let Some(promotion) = movement.promotion() {
        notation.push(promotion.kind.letter());
    }
    match applied.opponent_status() {
        Some(status) if status.checkmate => notation.push('#'),
        Some(status) if status.checked => notation.push('+'),
        _ => {}
    }

    Ok(notation)
}

fn rivals_reaching(
    board: &mut Board,
    kind: PieceType,
    color: Color,
    to: Position,
) -> Result<Vec<Position>, ChessError> {
    let peers: Vec<(PieceId, Position)> = board
        .pieces_of(color)
        .filter(|piece| piece.kind() == kind)
        .map(|piece| (piece.id(), piece.position()))
        .collect();

    let mut rivals = Vec::new();
    for (id, position) in peers {
        if board
            .legal_movements(id)?
            .iter()
            .any(|movement| movement.to == to)
        {
            rivals.push(position);
        }
    }
    Ok(rivals)
}
