//! 3x3 tic-tac-toe board.

use crate::rules;
use crate::{Cell, Mark, Move};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// 3x3 tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    /// Cells in row-major order (0-8).
    cells: [Cell; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; 9],
        }
    }

    /// Gets the cell at the given coordinates, `None` if off the board.
    pub fn get(&self, mv: Move) -> Option<Cell> {
        mv.to_index().and_then(|idx| self.cells.get(idx).copied())
    }

    /// Checks if the cell at the given coordinates is on the board and empty.
    pub fn is_empty(&self, mv: Move) -> bool {
        matches!(self.get(mv), Some(Cell::Empty))
    }

    /// Returns all cells in row-major order.
    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    /// Places a mark.
    ///
    /// Returns `false` without touching the board when the coordinates are
    /// off the board or the cell is already occupied.
    #[instrument(skip(self), fields(row = mv.row, col = mv.col, mark = %mark))]
    pub fn place(&mut self, mv: Move, mark: Mark) -> bool {
        let Some(idx) = mv.to_index() else {
            debug!("Rejected off-board placement");
            return false;
        };
        if self.cells[idx] != Cell::Empty {
            debug!("Rejected placement on occupied cell");
            return false;
        }
        self.cells[idx] = Cell::Occupied(mark);
        true
    }

    /// Returns the winning mark, if any line is complete.
    pub fn winner(&self) -> Option<Mark> {
        rules::check_winner(self)
    }

    /// Checks if no empty cells remain.
    pub fn is_full(&self) -> bool {
        rules::is_full(self)
    }

    /// Returns all empty cells in row-major order.
    pub fn available_moves(&self) -> Vec<Move> {
        Move::ALL
            .iter()
            .copied()
            .filter(|mv| self.is_empty(*mv))
            .collect()
    }

    /// Returns an independent copy of the grid.
    pub fn snapshot(&self) -> BoardSnapshot {
        let mut grid = [[None; 3]; 3];
        for mv in Move::ALL {
            if let (Some(cell), Ok(row), Ok(col)) = (
                self.get(mv),
                usize::try_from(mv.row),
                usize::try_from(mv.col),
            ) {
                grid[row][col] = cell.mark();
            }
        }
        BoardSnapshot { grid }
    }

    /// Clears every cell.
    pub fn reset(&mut self) {
        self.cells = [Cell::Empty; 9];
    }
}

/// Point-in-time copy of the board as a 3x3 grid.
///
/// Serializes as nested arrays of `"X"`, `"O"` or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct BoardSnapshot {
    grid: [[Option<Mark>; 3]; 3],
}

impl BoardSnapshot {
    /// Returns the rows of the grid, top to bottom.
    pub fn rows(&self) -> &[[Option<Mark>; 3]; 3] {
        &self.grid
    }

    /// Gets the mark at the given coordinates.
    pub fn get(&self, mv: Move) -> Option<Mark> {
        let row = usize::try_from(mv.row).ok()?;
        let col = usize::try_from(mv.col).ok()?;
        self.grid.get(row)?.get(col).copied().flatten()
    }

    /// Counts the occupied cells.
    pub fn occupied(&self) -> usize {
        self.grid.iter().flatten().filter(|m| m.is_some()).count()
    }

    /// Renders the grid for a terminal, one row per line.
    pub fn render(&self) -> String {
        let separator = "-".repeat(11);
        self.grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or(" ".to_string(), |m| m.to_string()))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .map(|line| format!(" {line} "))
            .collect::<Vec<_>>()
            .join(&format!("\n{separator}\n"))
    }
}

impl std::fmt::Display for BoardSnapshot {
    /// Compact single-line form, e.g. `X.O/.X./..O`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: Vec<String> = self
            .grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or_else(|| ".".to_string(), |m| m.to_string()))
                    .collect()
            })
            .collect();
        write!(f, "{}", rows.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_rejects_occupied_and_out_of_range() {
        let mut board = Board::new();
        assert!(board.place(Move::new(1, 1), Mark::X));
        assert!(!board.place(Move::new(1, 1), Mark::O));
        assert!(!board.place(Move::new(3, 0), Mark::O));
        assert!(!board.place(Move::new(0, -1), Mark::O));
        assert_eq!(board.get(Move::new(1, 1)), Some(Cell::Occupied(Mark::X)));
        assert_eq!(board.available_moves().len(), 8);
    }

    #[test]
    fn test_available_moves_row_major() {
        let mut board = Board::new();
        board.place(Move::new(0, 0), Mark::X);
        board.place(Move::new(1, 1), Mark::O);
        let moves = board.available_moves();
        assert_eq!(moves.first(), Some(&Move::new(0, 1)));
        assert_eq!(moves.last(), Some(&Move::new(2, 2)));
        assert!(!moves.contains(&Move::new(1, 1)));
    }

    #[test]
    fn test_snapshot_does_not_alias() {
        let mut board = Board::new();
        board.place(Move::new(0, 2), Mark::O);
        let snapshot = board.snapshot();
        board.place(Move::new(2, 0), Mark::X);
        assert_eq!(snapshot.get(Move::new(0, 2)), Some(Mark::O));
        assert_eq!(snapshot.get(Move::new(2, 0)), None);
        assert_eq!(snapshot.occupied(), 1);
    }

    #[test]
    fn test_snapshot_display_and_render() {
        let mut board = Board::new();
        board.place(Move::new(0, 0), Mark::X);
        board.place(Move::new(2, 2), Mark::O);
        let snapshot = board.snapshot();
        assert_eq!(snapshot.to_string(), "X../.../..O");
        let rendered = snapshot.render();
        assert_eq!(rendered.lines().count(), 5);
        assert!(rendered.starts_with(" X |   |   "));
    }

    #[test]
    fn test_reset_clears_board() {
        let mut board = Board::new();
        board.place(Move::new(0, 0), Mark::X);
        board.reset();
        assert_eq!(board, Board::new());
        assert_eq!(board.available_moves().len(), 9);
    }
}
