use crate::common::{board_from, init_tracing, mv, play, sq, squares, targets};
use rookery::chess::{
    Board, BoardMovement, ChessError, FixedPromotion, PieceType, ValidationMode,
};

fn queen() -> FixedPromotion {
    FixedPromotion(PieceType::Queen)
}

#[cfg(test)]
mod validate_tests {
    use super::*;

    #[test]
    fn test_simple_move_and_revert() {
        init_tracing();
        let mut board = Board::new();
        let before = board.hash_state();

        let mut movement = BoardMovement::new(mv("e2e4"));
        movement
            .validate(&mut board, ValidationMode::Evaluate, &mut queen())
            .unwrap();

        assert!(movement.is_validated());
        assert_eq!(movement.notation(), Some("e4"));
        assert_eq!(movement.hash_after(), Some(board.hash_state()));
        assert!(board.piece_at(sq("e2")).is_none());
        let pawn = board.piece_at(sq("e4")).unwrap();
        assert_eq!(pawn.has_moved(), Some(true));

        movement.unvalidate(&mut board).unwrap();
        assert_eq!(board.hash_state(), before);
        assert!(!movement.is_validated());
        assert_eq!(movement.notation(), None);
        assert!(board.piece_at(sq("e2")).unwrap().is_unmoved());
    }

    #[test]
    fn test_simulation_skips_notation() {
        let mut board = Board::new();
        let mut movement = BoardMovement::new(mv("g1f3"));
        movement
            .validate(&mut board, ValidationMode::Simulate, &mut queen())
            .unwrap();
        assert_eq!(movement.notation(), None);
        assert_eq!(movement.opponent_status(), None);
        movement.unvalidate(&mut board).unwrap();
    }

    #[test]
    fn test_missing_piece_rejected_without_change() {
        let mut board = Board::new();
        let before = board.hash_state();
        let mut movement = BoardMovement::new(mv("e4e5"));
        let result = movement.validate(&mut board, ValidationMode::Evaluate, &mut queen());
        assert!(matches!(result, Err(ChessError::InvalidMove(_))));
        assert_eq!(board.hash_state(), before);
        assert!(!movement.is_validated());
    }

    #[test]
    fn test_own_piece_capture_is_fatal() {
        let mut board = Board::new();
        let before = board.hash_state();
        let mut movement = BoardMovement::new(mv("a1a2"));
        let result = movement.validate(&mut board, ValidationMode::Evaluate, &mut queen());
        assert!(matches!(result, Err(ChessError::InvariantViolation(_))));
        assert!(result.unwrap_err().is_invariant_violation());
        assert_eq!(board.hash_state(), before);
    }

    #[test]
    fn test_double_validation_refused() {
        let mut board = Board::new();
        let mut movement = BoardMovement::new(mv("e2e4"));
        movement
            .validate(&mut board, ValidationMode::Simulate, &mut queen())
            .unwrap();
        let again = movement.validate(&mut board, ValidationMode::Simulate, &mut queen());
        assert!(matches!(again, Err(ChessError::InvariantViolation(_))));
    }

    #[test]
    fn test_capture_and_revert() {
        let mut board = board_from("4k3/8/8/3p4/4P3/8/8/4K3");
        let before = board.hash_state();
        let mut movement = BoardMovement::new(mv("e4d5"));
        movement
            .validate(&mut board, ValidationMode::Evaluate, &mut queen())
            .unwrap();

        assert!(movement.movement().is_capture());
        assert_eq!(movement.notation(), Some("xd5"));
        let captured = movement.movement().captured().unwrap();
        assert!(!board.piece(captured).unwrap().is_playable());

        movement.unvalidate(&mut board).unwrap();
        assert!(board.piece(captured).unwrap().is_playable());
        assert_eq!(board.hash_state(), before);
        assert!(!movement.movement().is_capture());
    }
}

#[cfg(test)]
mod unvalidate_tests {
    use super::*;

    #[test]
    fn test_revert_requires_lifo_order() {
        let mut board = Board::new();
        let start = board.hash_state();

        let mut first = BoardMovement::new(mv("e2e4"));
        first
            .validate(&mut board, ValidationMode::Simulate, &mut queen())
            .unwrap();
        let mut second = BoardMovement::new(mv("e7e5"));
        second
            .validate(&mut board, ValidationMode::Simulate, &mut queen())
            .unwrap();

        let refused = first.unvalidate(&mut board);
        assert!(matches!(refused, Err(ChessError::InvariantViolation(_))));

        second.unvalidate(&mut board).unwrap();
        first.unvalidate(&mut board).unwrap();
        assert_eq!(board.hash_state(), start);
    }

    #[test]
    fn test_unapplied_movement_cannot_be_reverted() {
        let mut board = Board::new();
        let mut movement = BoardMovement::new(mv("e2e4"));
        assert!(matches!(
            movement.unvalidate(&mut board),
            Err(ChessError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_board_undo_restores_every_legal_move() {
        let mut board = Board::new();
        play(&mut board, &["e2e4", "d7d5"]);
        let before = board.hash_state();

        let movements: Vec<_> = board
            .legal_movements_by_piece()
            .unwrap()
            .into_iter()
            .flat_map(|(_, movements)| movements)
            .collect();
        assert!(!movements.is_empty());

        for movement in movements {
            board.apply(movement, &mut queen()).unwrap();
            assert!(board.undo_last().unwrap().is_some());
            assert_eq!(board.hash_state(), before);
            assert_eq!(board.history().len(), 2);
        }
    }

    #[test]
    fn test_undo_on_empty_history() {
        let mut board = Board::new();
        assert!(board.undo_last().unwrap().is_none());
    }
}

#[cfg(test)]
mod promotion_tests {
    use super::*;

    const PROMOTION: &str = "8/4P3/8/8/8/8/8/k3K3";

    #[test]
    fn test_promotion_spawns_chosen_piece() {
        let mut board = board_from(PROMOTION);
        let applied = board.apply(mv("e7e8"), &mut queen()).unwrap();
        assert_eq!(applied.notation(), Some("e8Q"));
        let promotion = applied.movement().promotion().unwrap();

        assert_eq!(board.piece_at(sq("e8")).unwrap().kind(), PieceType::Queen);
        assert!(board.piece(promotion.pawn).unwrap().is_ghost());
        assert_eq!(board.pieces().count(), 3);
        assert_eq!(board.all_pieces().count(), 4);
    }

    #[test]
    fn test_chooser_closure_receives_options() {
        let mut board = board_from(PROMOTION);
        let mut offered = Vec::new();
        let mut chooser = |options: &[PieceType]| {
            offered.extend_from_slice(options);
            PieceType::Knight
        };
        let notation = board
            .apply(mv("e7e8"), &mut chooser)
            .unwrap()
            .notation()
            .map(str::to_string);
        assert_eq!(notation.as_deref(), Some("e8N"));
        assert_eq!(offered, PieceType::PROMOTABLE.to_vec());
    }

    #[test]
    fn test_preselected_promotion_skips_chooser() {
        let mut board = board_from(PROMOTION);
        let movement = mv("e7e8").with_promotion(PieceType::Rook).unwrap();
        let mut chooser = |_: &[PieceType]| -> PieceType { panic!("chooser must not be asked") };
        board.apply(movement, &mut chooser).unwrap();
        assert_eq!(board.piece_at(sq("e8")).unwrap().kind(), PieceType::Rook);
        // A promoted rook does not count as unmoved
        assert_eq!(board.piece_at(sq("e8")).unwrap().has_moved(), Some(true));
    }

    #[test]
    fn test_invalid_choice_rejected_without_change() {
        let mut board = board_from(PROMOTION);
        let before = board.hash_state();
        let result = board.apply(mv("e7e8"), &mut FixedPromotion(PieceType::King));
        assert!(matches!(result, Err(ChessError::InvalidMove(_))));
        assert_eq!(board.hash_state(), before);
        assert_eq!(board.all_pieces().count(), 3);
    }

    #[test]
    fn test_promotion_undo_restores_pawn() {
        let mut board = board_from(PROMOTION);
        let before = board.hash_state();
        board.apply(mv("e7e8"), &mut queen()).unwrap();
        board.undo_last().unwrap();

        assert_eq!(board.hash_state(), before);
        assert_eq!(board.all_pieces().count(), 3);
        let pawn = board.piece_at(sq("e7")).unwrap();
        assert_eq!(pawn.kind(), PieceType::Pawn);
        assert!(pawn.is_playable());
        assert!(board.piece_at(sq("e8")).is_none());
    }

    #[test]
    fn test_promotion_only_on_last_rank() {
        let mut board = Board::new();
        let movement = mv("e2e4").with_promotion(PieceType::Queen).unwrap();
        let result = board.apply(movement, &mut queen());
        assert!(matches!(result, Err(ChessError::InvalidMove(_))));
    }
}

#[cfg(test)]
mod legality_tests {
    use super::*;

    #[test]
    fn test_pinned_piece_cannot_move() {
        // The white bishop on e2 shields its king from the rook on e8
        let mut board = board_from("k3r3/8/8/8/8/8/4B3/4K3");
        assert!(targets(&mut board, "e2").is_empty());
        assert!(!targets(&mut board, "e1").is_empty());
    }

    #[test]
    fn test_king_cannot_step_into_attack() {
        let mut board = board_from("k7/8/8/8/8/8/3r4/4K3");
        // The rook covers d1, e2 and f2
        assert_eq!(targets(&mut board, "e1"), squares(&["d2", "f1"]));
    }

    #[test]
    fn test_simulation_depth_returns_to_zero() {
        let mut board = Board::new();
        board.legal_movements_by_piece().unwrap();
        assert!(!board.is_simulating());
        assert!(board.apply(mv("e2e4"), &mut queen()).is_ok());
    }
}
