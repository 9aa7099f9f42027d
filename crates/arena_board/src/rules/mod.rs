//! Game rules for tic-tac-toe.
//!
//! Pure functions for evaluating a board. Rules are kept apart from
//! board storage so the game state machine can compose them.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::check_winner;
