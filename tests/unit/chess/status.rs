use crate::common::{board_from, play};
use rookery::chess::{Board, Color, DrawReason, StatusReport};
use rookery::config::{BishopRule, RulesConfig};

fn draw_reason(board: &mut Board, color: Color) -> Option<DrawReason> {
    board.status(color).draw_reason().unwrap()
}

#[cfg(test)]
mod check_tests {
    use super::*;

    #[test]
    fn test_rook_checks_king_without_mate() {
        let mut board = board_from("8/8/8/8/7R/8/8/K6k");
        let mut black = board.status(Color::Black);
        assert!(black.is_checked().unwrap());
        assert!(!black.is_checkmate().unwrap());
        assert_eq!(
            black.report().unwrap(),
            StatusReport {
                checked: true,
                checkmate: false
            }
        );
        assert!(!board.status(Color::White).is_checked().unwrap());
    }

    #[test]
    fn test_back_rank_mate() {
        let mut board = board_from("6k1/5ppp/8/8/8/8/8/R5K1");
        play(&mut board, &["a1a8"]);
        let mut black = board.status(Color::Black);
        assert!(black.is_checked().unwrap());
        assert!(black.is_checkmate().unwrap());
        assert!(!black.is_stalemate().unwrap());
        assert_eq!(
            board.history().last().unwrap().notation(),
            Some("Ra8#")
        );
    }
}

#[cfg(test)]
mod draw_tests {
    use super::*;

    #[test]
    fn test_king_and_bishop_against_king() {
        let mut board = board_from("8/5KBk/8/8/8/8/8/8");
        assert_eq!(
            draw_reason(&mut board, Color::Black),
            Some(DrawReason::InsufficientMaterial)
        );
    }

    #[test]
    fn test_blocked_pawns_give_stalemate() {
        let mut board = board_from("8/5KBk/8/8/p7/P7/8/8");
        let mut black = board.status(Color::Black);
        assert!(!black.is_checked().unwrap());
        assert!(black.is_stalemate().unwrap());
        assert_eq!(black.draw_reason().unwrap(), Some(DrawReason::Stalemate));
    }

    #[test]
    fn test_lone_kings() {
        let mut board = board_from("4k3/8/8/8/8/8/8/4K3");
        assert_eq!(
            draw_reason(&mut board, Color::White),
            Some(DrawReason::InsufficientMaterial)
        );
    }

    #[test]
    fn test_sufficient_material() {
        let mut rook = board_from("4k3/8/8/8/8/8/8/R3K3");
        assert_eq!(draw_reason(&mut rook, Color::White), None);

        let mut knights = board_from("4k3/8/8/8/8/8/8/1N2K1N1");
        assert_eq!(draw_reason(&mut knights, Color::White), None);

        let mut standard = Board::new();
        assert_eq!(draw_reason(&mut standard, Color::White), None);
    }

    #[test]
    fn test_bishop_rule() {
        // c1 and c8 are of opposite colors, c1 and f8 are both dark
        let opposite = "2b1k3/8/8/8/8/8/8/2B1K3";
        let same = "4kb2/8/8/8/8/8/8/2B1K3";

        let mut board = board_from(opposite);
        assert_eq!(
            draw_reason(&mut board, Color::White),
            Some(DrawReason::InsufficientMaterial)
        );

        let strict = RulesConfig {
            bishop_rule: BishopRule::SameSquareColor,
            ..RulesConfig::default()
        };
        let mut board = board_from(opposite).with_rules(strict.clone());
        assert_eq!(draw_reason(&mut board, Color::White), None);

        let mut board = board_from(same).with_rules(strict);
        assert_eq!(
            draw_reason(&mut board, Color::White),
            Some(DrawReason::InsufficientMaterial)
        );
    }
}

#[cfg(test)]
mod history_rule_tests {
    use super::*;

    const SHUFFLE: [&str; 8] = [
        "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8",
    ];

    #[test]
    fn test_repetition_needs_a_third_occurrence() {
        let mut board = Board::new();
        play(&mut board, &SHUFFLE);
        assert_eq!(draw_reason(&mut board, Color::White), None);

        play(&mut board, &["g1f3"]);
        assert_eq!(
            draw_reason(&mut board, Color::Black),
            Some(DrawReason::Repetition)
        );
    }

    #[test]
    fn test_distinct_move_ends_the_run() {
        let mut board = Board::new();
        play(
            &mut board,
            &["g1f3", "g8f6", "f3g1", "f6g8", "b1c3", "b8c6", "g1f3", "g8f6", "f3g1", "f6g8"],
        );
        // The knight development interrupts both runs
        assert_eq!(draw_reason(&mut board, Color::White), None);
    }

    fn fifty_rules(limit: usize) -> RulesConfig {
        RulesConfig {
            fifty_move_limit: limit,
            repetition_limit: 100,
            ..RulesConfig::default()
        }
    }

    #[test]
    fn test_fifty_move_rule_counts_own_moves() {
        let mut board = board_from("1n2k3/8/8/8/8/8/8/1N2K3").with_rules(fifty_rules(3));
        play(&mut board, &["b1c3", "b8c6", "c3b1", "c6b8"]);
        assert_eq!(draw_reason(&mut board, Color::White), None);

        play(&mut board, &["b1c3"]);
        assert_eq!(
            draw_reason(&mut board, Color::Black),
            Some(DrawReason::FiftyMove)
        );
    }

    #[test]
    fn test_capture_resets_fifty_move_count() {
        let mut board = board_from("1n2k3/8/8/8/8/p7/8/1N2K3").with_rules(fifty_rules(3));
        play(
            &mut board,
            &["b1c3", "b8c6", "c3b1", "c6b8", "b1a3", "b8c6", "a3b1", "c6b8"],
        );
        assert_eq!(draw_reason(&mut board, Color::White), None);

        play(&mut board, &["b1c3", "b8c6"]);
        assert_eq!(
            draw_reason(&mut board, Color::White),
            Some(DrawReason::FiftyMove)
        );
    }
}
