use crate::common::{board_from, init_tracing, play, sq};
use rookery::chess::{Board, Color, DrawReason, PieceType};

#[test]
fn test_fools_mate() {
    init_tracing();
    let mut board = Board::new();
    play(&mut board, &["f2f3", "e7e6", "g2g4", "d8h4"]);

    let mut white = board.status(Color::White);
    assert!(white.is_checked().unwrap());
    assert!(white.is_checkmate().unwrap());

    let last = board.history().last().unwrap();
    assert_eq!(last.notation(), Some("Qh4#"));
    assert!(last.opponent_status().unwrap().checkmate);
}

#[test]
fn test_scholars_mate() {
    let mut board = Board::new();
    play(
        &mut board,
        &["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"],
    );
    assert_eq!(
        board.history().to_string(),
        "e4 - e5 - Bc4 - Nc6 - Qh5 - Nf6 - Qxf7#"
    );
    assert!(board.status(Color::Black).is_checkmate().unwrap());
}

#[test]
fn test_full_game_unwinds_to_the_start() {
    let mut board = Board::new();
    let start = board.hash_state();
    play(
        &mut board,
        &[
            "e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "e1g1", "f8c5", "d2d4", "e5d4",
        ],
    );
    assert_eq!(board.history().len(), 10);

    while board.undo_last().unwrap().is_some() {}

    assert_eq!(board.hash_state(), start);
    assert!(board.history().is_empty());
    assert_eq!(board.pieces().count(), 32);
    assert!(board.pieces().all(|piece| piece.has_moved() != Some(true)));
}

#[test]
fn test_promotion_race() {
    let mut board = board_from("7k/P7/8/8/8/8/p7/K7");
    play(&mut board, &["a7a8n"]);
    assert_eq!(board.piece_at(sq("a8")).unwrap().kind(), PieceType::Knight);
    assert_eq!(board.history().last().unwrap().notation(), Some("a8N"));

    board.undo_last().unwrap();
    play(&mut board, &["a7a8q"]);
    assert_eq!(board.history().last().unwrap().notation(), Some("a8Q+"));
}

#[test]
fn test_insufficient_material_then_stalemate() {
    let mut bare = board_from("8/5KBk/8/8/8/8/8/8");
    assert_eq!(
        bare.status(Color::Black).draw_reason().unwrap(),
        Some(DrawReason::InsufficientMaterial)
    );

    let mut blocked = board_from("8/5KBk/8/8/p7/P7/8/8");
    assert_eq!(
        blocked.status(Color::Black).draw_reason().unwrap(),
        Some(DrawReason::Stalemate)
    );
}
