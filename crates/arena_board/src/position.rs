//! Board coordinates for tic-tac-toe moves.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Side length of the board.
pub const BOARD_SIZE: i32 = 3;

/// A (row, col) coordinate on the board.
///
/// Row 0 is the top row and column 0 the left column. Coordinates
/// outside `0..3` are representable because they arrive from callers;
/// the board rejects them on placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Move {
    /// Row index (0-2).
    pub row: i32,
    /// Column index (0-2).
    pub col: i32,
}

impl Move {
    /// All nine on-board coordinates in row-major order.
    pub const ALL: [Move; 9] = [
        Move::new(0, 0),
        Move::new(0, 1),
        Move::new(0, 2),
        Move::new(1, 0),
        Move::new(1, 1),
        Move::new(1, 2),
        Move::new(2, 0),
        Move::new(2, 1),
        Move::new(2, 2),
    ];

    /// Creates a move at the given coordinates.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Checks if both coordinates are on the board.
    pub fn in_bounds(self) -> bool {
        (0..BOARD_SIZE).contains(&self.row) && (0..BOARD_SIZE).contains(&self.col)
    }

    /// Converts the move to a row-major cell index (0-8).
    ///
    /// Returns `None` for off-board coordinates.
    pub fn to_index(self) -> Option<usize> {
        if !self.in_bounds() {
            return None;
        }
        usize::try_from(self.row * BOARD_SIZE + self.col).ok()
    }

    /// Creates a move from a row-major cell index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(i32, i32)> for Move {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip_is_row_major() {
        assert_eq!(Move::new(0, 0).to_index(), Some(0));
        assert_eq!(Move::new(1, 1).to_index(), Some(4));
        assert_eq!(Move::new(2, 2).to_index(), Some(8));
        assert_eq!(Move::from_index(5), Some(Move::new(1, 2)));
        assert_eq!(Move::from_index(9), None);
    }

    #[test]
    fn test_out_of_bounds_has_no_index() {
        assert_eq!(Move::new(3, 0).to_index(), None);
        assert_eq!(Move::new(0, -1).to_index(), None);
        assert!(!Move::new(-1, -1).in_bounds());
    }

    #[test]
    fn test_display() {
        assert_eq!(Move::new(2, 0).to_string(), "(2, 0)");
    }
}
