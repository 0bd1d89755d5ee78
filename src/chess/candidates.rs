//! Candidate squares per piece kind.
//!
//! Candidates are pseudo-legal: they ignore whether the move would leave the
//! mover's own king attacked. The legality filter lives in
//! [`board_movement`](super::board_movement).

use super::board::Board;
use super::moves::{CastlingSide, Movement};
use super::piece::{Color, Piece, PieceType};
use super::position::{Position, BOARD_FILES};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 1),
    (1, 0),
    (1, -1),
    (0, 1),
    (0, -1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Squares the piece could move to or capture on, ignoring self-check.
///
/// Squares held by the opponent king are included, which is what check
/// detection relies on. Castling is not part of this set.
pub fn contesting_squares(board: &Board, piece: &Piece) -> Vec<Position> {
    match piece.kind() {
        PieceType::Pawn => pawn_squares(board, piece),
        PieceType::Knight => step_squares(board, piece, &KNIGHT_OFFSETS),
        PieceType::King => step_squares(board, piece, &KING_OFFSETS),
        PieceType::Bishop => ray_squares(board, piece, &DIAGONAL),
        PieceType::Rook => ray_squares(board, piece, &ORTHOGONAL),
        PieceType::Queen => {
            let mut squares = ray_squares(board, piece, &ORTHOGONAL);
            squares.extend(ray_squares(board, piece, &DIAGONAL));
            squares
        }
    }
}

/// Squares the piece controls. Same as [`contesting_squares`] except that a
/// pawn controls both forward diagonals whether or not they are occupied.
pub fn attacked_squares(board: &Board, piece: &Piece) -> Vec<Position> {
    match piece.kind() {
        PieceType::Pawn => [-1, 1]
            .into_iter()
            .filter_map(|file_delta| {
                piece
                    .position()
                    .offset(file_delta, piece.color().direction())
            })
            .collect(),
        _ => contesting_squares(board, piece),
    }
}

/// Whether any playable piece of `by` controls `square`
pub fn is_square_attacked(board: &Board, square: Position, by: Color) -> bool {
    board
        .pieces_of(by)
        .any(|piece| attacked_squares(board, piece).contains(&square))
}

/// Candidate movements of a piece: its contesting squares (never a king
/// capture) plus, for a king, its castling movements.
pub fn candidate_movements(board: &Board, piece: &Piece) -> Vec<Movement> {
    let origin = piece.position();
    let mut movements: Vec<Movement> = contesting_squares(board, piece)
        .into_iter()
        .filter(|square| {
            board
                .piece_at(*square)
                .map_or(true, |target| target.kind() != PieceType::King)
        })
        .map(|square| Movement::new_unchecked(origin, square))
        .collect();

    if piece.kind() == PieceType::King {
        movements.extend(
            CastlingSide::ALL
                .into_iter()
                .filter_map(|side| castle_movement(board, piece, side)),
        );
    }

    movements
}

/// The castling movement of `king` toward `side`, if every condition holds:
/// the king and the corner rook never moved, the squares between them are
/// empty, and no square from the king to its destination is attacked.
///
/// The returned movement cascades into the rook's shift to the square next
/// to the king's destination.
pub fn castle_movement(board: &Board, king: &Piece, side: CastlingSide) -> Option<Movement> {
    if king.kind() != PieceType::King || !king.is_unmoved() {
        return None;
    }

    let origin = king.position();
    let direction = side.file_direction();
    let destination = origin.offset(2 * direction, 0)?;

    let rook_file = match side {
        CastlingSide::King => BOARD_FILES - 1,
        CastlingSide::Queen => 0,
    };
    let rook_square = Position::new_unchecked(rook_file, origin.rank);
    let rook = board.piece_at(rook_square)?;
    if rook.kind() != PieceType::Rook || rook.color() != king.color() || !rook.is_unmoved() {
        return None;
    }

    let mut file = origin.file as i8 + direction;
    while file != rook_file as i8 {
        if board.is_occupied(Position::new_unchecked(file as u8, origin.rank)) {
            return None;
        }
        file += direction;
    }
    if board.is_occupied(destination) {
        return None;
    }

    let opponent = king.color().opposite();
    for step in 0..=2 {
        let square = origin.offset(step * direction, 0)?;
        if is_square_attacked(board, square, opponent) {
            return None;
        }
    }

    let rook_destination = destination.offset(-direction, 0)?;
    Some(
        Movement::new_unchecked(origin, destination)
            .cascading(Movement::new_unchecked(rook_square, rook_destination)),
    )
}

fn pawn_squares(board: &Board, pawn: &Piece) -> Vec<Position> {
    let origin = pawn.position();
    let direction = pawn.color().direction();
    let mut squares = Vec::with_capacity(4);

    if let Some(one) = origin.offset(0, direction) {
        if !board.is_occupied(one) {
            squares.push(one);

            if pawn.is_unmoved() {
                if let Some(two) = origin.offset(0, 2 * direction) {
                    if !board.is_occupied(two) {
                        squares.push(two);
                    }
                }
            }
        }
    }

    for file_delta in [-1, 1] {
        if let Some(diagonal) = origin.offset(file_delta, direction) {
            if board
                .piece_at(diagonal)
                .is_some_and(|target| target.color() != pawn.color())
            {
                squares.push(diagonal);
            }
        }
    }

    squares
}

fn step_squares(board: &Board, piece: &Piece, offsets: &[(i8, i8)]) -> Vec<Position> {
    offsets
        .iter()
        .filter_map(|&(file_delta, rank_delta)| piece.position().offset(file_delta, rank_delta))
        .filter(|square| {
            board
                .piece_at(*square)
                .map_or(true, |occupant| occupant.color() != piece.color())
        })
        .collect()
}

fn ray_squares(board: &Board, piece: &Piece, directions: &[(i8, i8)]) -> Vec<Position> {
    let mut squares = Vec::new();

    for &(file_delta, rank_delta) in directions {
        let mut current = piece.position();
        while let Some(next) = current.offset(file_delta, rank_delta) {
            match board.piece_at(next) {
                Some(occupant) => {
                    if occupant.color() != piece.color() {
                        squares.push(next);
                    }
                    break;
                }
                None => {
                    squares.push(next);
                    current = next;
                }
            }
        }
    }

    squares
}
