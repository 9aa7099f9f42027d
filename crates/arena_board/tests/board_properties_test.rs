//! Property-style tests over full move sequences.

use arena_board::{Board, Mark, Move};

/// Plays the sequence with alternating marks starting at X, checking the
/// winner after every placement. Returns the index of the move that
/// completed a line.
fn play(moves: &[(i32, i32)]) -> (Board, Option<usize>) {
    let mut board = Board::new();
    let mut mark = Mark::X;
    for (idx, &(row, col)) in moves.iter().enumerate() {
        assert!(board.place(Move::new(row, col), mark), "move {idx} rejected");
        if board.winner().is_some() {
            return (board, Some(idx));
        }
        mark = mark.opponent();
    }
    (board, None)
}

#[test]
fn test_winner_appears_exactly_on_completing_move() {
    let (board, completed) = play(&[(0, 0), (1, 1), (0, 1), (2, 2), (0, 2)]);
    assert_eq!(completed, Some(4));
    assert_eq!(board.winner(), Some(Mark::X));
}

#[test]
fn test_no_winner_through_full_draw() {
    let moves = [
        (0, 0),
        (0, 1),
        (0, 2),
        (1, 1),
        (1, 0),
        (1, 2),
        (2, 1),
        (2, 0),
        (2, 2),
    ];
    let (board, completed) = play(&moves);
    assert_eq!(completed, None);
    assert!(board.is_full());
    assert!(board.available_moves().is_empty());
}

#[test]
fn test_available_plus_placed_is_nine() {
    let mut board = Board::new();
    let mut mark = Mark::X;
    for (placed, mv) in [Move::new(1, 1), Move::new(0, 0), Move::new(2, 1)]
        .into_iter()
        .enumerate()
    {
        assert!(board.place(mv, mark));
        assert_eq!(board.available_moves().len() + placed + 1, 9);
        mark = mark.opponent();
    }
}

#[test]
fn test_repeated_place_on_occupied_cell_is_rejected() {
    let mut board = Board::new();
    assert!(board.place(Move::new(0, 0), Mark::X));
    let before = board.clone();
    assert!(!board.place(Move::new(0, 0), Mark::O));
    assert!(!board.place(Move::new(0, 0), Mark::X));
    assert_eq!(board, before);
}

#[test]
fn test_snapshot_serializes_as_nested_grid() {
    let mut board = Board::new();
    board.place(Move::new(0, 1), Mark::O);
    let json = serde_json::to_value(board.snapshot()).expect("serialize snapshot");
    assert_eq!(
        json,
        serde_json::json!([[null, "O", null], [null, null, null], [null, null, null]])
    );
}
