//! Pure tic-tac-toe board logic.
//!
//! The board, its coordinates, and the win/draw rules. Everything here is
//! synchronous and side-effect free; the game service builds its state
//! machine on top of these types.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod position;
pub mod rules;
mod types;

pub use board::{Board, BoardSnapshot};
pub use position::{BOARD_SIZE, Move};
pub use types::{Cell, Mark};
