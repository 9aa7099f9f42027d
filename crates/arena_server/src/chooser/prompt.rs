//! Prompt text for the language-model chooser.

use super::LegalMoves;
use arena_board::{BoardSnapshot, Mark};

/// System instruction sent with every move request.
pub const SYSTEM_PROMPT: &str = "You are an expert tic-tac-toe player. Your goal is to win.

Rules:
- The board is a 3x3 grid with coordinates (0,0) to (2,2).
- Row 0 is the top row and column 0 is the left column.
- Three of your marks in a row, column or diagonal wins.
- Block your opponent when they threaten three in a row.
- Prefer the center, then corners.

Respond with ONLY a JSON object in exactly this format:
{\"row\": 0, \"col\": 1, \"reasoning\": \"brief explanation\"}

row and col must be integers between 0 and 2. Do not write anything outside the JSON object.";

/// Builds the user message describing the board and the legal moves.
pub fn move_prompt(board: &BoardSnapshot, mark: Mark, legal: &LegalMoves) -> String {
    let mut lines = vec![
        "Current board:".to_string(),
        "     0   1   2".to_string(),
        "   +---+---+---+".to_string(),
    ];
    for (idx, row) in board.rows().iter().enumerate() {
        let cells: String = row
            .iter()
            .map(|cell| format!(" {} |", cell.map_or_else(|| " ".to_string(), |m| m.to_string())))
            .collect();
        lines.push(format!(" {idx} |{cells}"));
        lines.push("   +---+---+---+".to_string());
    }

    let moves = legal
        .as_slice()
        .iter()
        .map(|mv| format!("({},{})", mv.row, mv.col))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{board}

You are playing as: {mark}
Available moves (row, col): {moves}

Choose your best move. Consider, in order:
1. Can you win with this move?
2. Must you block your opponent from winning?
3. Position: center, corners, then sides.

Respond with JSON only: {{\"row\": <int>, \"col\": <int>, \"reasoning\": \"<brief explanation>\"}}",
        board = lines.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_board::{Board, Move};

    #[test]
    fn test_prompt_lists_board_mark_and_moves() {
        let mut board = Board::new();
        board.place(Move::new(1, 1), Mark::X);
        let legal = LegalMoves::new(board.available_moves()).expect("moves left");
        let prompt = move_prompt(&board.snapshot(), Mark::O, &legal);

        assert!(prompt.contains(" 1 |   | X |   |"));
        assert!(prompt.contains("You are playing as: O"));
        assert!(prompt.contains("(0,0), (0,1)"));
        assert!(!prompt.contains("(1,1)"));
    }
}
