use crate::common::{board_from, play, sq};
use rookery::chess::{Board, ChessError, Color, PieceType};

const STANDARD: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

#[cfg(test)]
mod board_creation_tests {
    use super::*;

    #[test]
    fn test_standard_setup() {
        let board = Board::standard();
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.pieces_of(Color::White).count(), 16);
        assert_eq!(board.piece_at(sq("d1")).unwrap().kind(), PieceType::Queen);
        assert_eq!(board.piece_at(sq("e8")).unwrap().kind(), PieceType::King);
        assert_eq!(board.piece_at(sq("e8")).unwrap().color(), Color::Black);
        assert!(board.piece_at(sq("e4")).is_none());
        assert_eq!(board.to_placement(), STANDARD);
    }

    #[test]
    fn test_placement_round_trip() {
        let placement = "r3k2r/8/8/8/4P3/8/8/R3K2R";
        assert_eq!(board_from(placement).to_placement(), placement);
        assert_eq!(board_from(STANDARD).hash_state(), Board::new().hash_state());
    }

    #[test]
    fn test_invalid_placements_rejected() {
        for placement in [
            "",
            "8/8/8",
            "9/8/8/8/8/8/8/8",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNRR",
            "xnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
        ] {
            assert!(
                matches!(Board::from_placement(placement), Err(ChessError::InvalidSetup(_))),
                "'{}' should be rejected",
                placement
            );
        }
    }

    #[test]
    fn test_place_on_occupied_square_rejected() {
        let mut board = Board::empty();
        board.place(PieceType::King, Color::White, sq("e1")).unwrap();
        let result = board.place(PieceType::Queen, Color::White, sq("e1"));
        assert!(matches!(result, Err(ChessError::InvalidSetup(_))));
    }

    #[test]
    fn test_missing_king_reported() {
        let board = board_from("8/8/8/8/8/8/8/4K3");
        assert!(board.king_of(Color::White).is_ok());
        assert!(matches!(
            board.king_of(Color::Black),
            Err(ChessError::InvalidSetup(_))
        ));
    }
}

#[cfg(test)]
mod board_hashing_tests {
    use super::*;

    #[test]
    fn test_hash_ignores_placement_order() {
        let mut first = Board::empty();
        first.place(PieceType::King, Color::White, sq("e1")).unwrap();
        first.place(PieceType::Rook, Color::Black, sq("a8")).unwrap();

        let mut second = Board::empty();
        second.place(PieceType::Rook, Color::Black, sq("a8")).unwrap();
        second.place(PieceType::King, Color::White, sq("e1")).unwrap();

        assert_eq!(first.state_identifier(), second.state_identifier());
        assert_eq!(first.hash_state(), second.hash_state());
    }

    #[test]
    fn test_hash_distinguishes_color_and_square() {
        let white = board_from("8/8/8/8/8/8/8/4K3");
        let black = board_from("8/8/8/8/8/8/8/4k3");
        let moved = board_from("8/8/8/8/8/8/8/3K4");
        assert_ne!(white.hash_state(), black.hash_state());
        assert_ne!(white.hash_state(), moved.hash_state());
    }

    #[test]
    fn test_captured_pieces_leave_the_identifier() {
        let mut board = board_from("4k3/8/8/3p4/4P3/8/8/4K3");
        play(&mut board, &["e4d5"]);
        assert_eq!(board.pieces().count(), 3);
        assert_eq!(board.all_pieces().count(), 4);
        assert_eq!(
            board.hash_state(),
            board_from("4k3/8/8/3P4/8/8/8/4K3").hash_state()
        );
    }
}

#[cfg(test)]
mod board_query_tests {
    use super::*;

    #[test]
    fn test_standard_position_has_twenty_legal_moves() {
        let mut board = Board::new();
        let by_piece = board.legal_movements_by_piece().unwrap();
        let white: usize = by_piece
            .iter()
            .filter(|(id, _)| board.piece(*id).unwrap().color() == Color::White)
            .map(|(_, movements)| movements.len())
            .sum();
        assert_eq!(white, 20);
    }

    #[test]
    fn test_legal_movements_leave_board_untouched() {
        let mut board = Board::new();
        let before = board.hash_state();
        let pieces_before = board.all_pieces().count();

        board.legal_movements_by_piece().unwrap();

        assert_eq!(board.hash_state(), before);
        assert_eq!(board.all_pieces().count(), pieces_before);
        assert!(board.history().is_empty());
        assert!(!board.is_simulating());
    }

    #[test]
    fn test_empty_square_has_no_movements() {
        let mut board = Board::new();
        assert!(board.legal_movements_at(sq("e4")).unwrap().is_empty());
    }
}
