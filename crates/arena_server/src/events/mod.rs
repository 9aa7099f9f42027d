//! Move and game-completion events for durable logging.

mod csv_log;
mod error;

pub use csv_log::{CsvEventLog, GAME_HEADERS, MOVE_HEADERS};
pub use error::EventLogError;

use crate::chooser::ChooserKind;
use arena_board::{BoardSnapshot, Mark, Move};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// One move attempt, valid or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveEvent {
    /// When the attempt was made.
    pub timestamp: DateTime<Utc>,
    /// Game identifier.
    pub game_id: String,
    /// 1-based sequence number of the attempt within the game.
    pub move_number: usize,
    /// Side that moved.
    pub player: Mark,
    /// How the move was selected.
    pub chooser: ChooserKind,
    /// Board after the attempt.
    pub board: BoardSnapshot,
    /// Legal moves before the attempt.
    pub available_moves: Vec<Move>,
    /// Prompt sent to the model.
    pub prompt: Option<String>,
    /// Raw model response.
    pub response: Option<String>,
    /// Model rationale.
    pub reasoning: Option<String>,
    /// Coordinates attempted.
    pub chosen_move: Option<Move>,
    /// Whether the board accepted the move.
    pub move_valid: bool,
    /// Failure description.
    pub error: Option<String>,
    /// Model latency.
    pub response_time_ms: Option<f64>,
}

/// A finished game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameCompletedEvent {
    /// When the game ended.
    pub timestamp: DateTime<Utc>,
    /// Game identifier.
    pub game_id: String,
    /// Chooser kind for X.
    pub player_x_kind: ChooserKind,
    /// Model for X, if external.
    pub player_x_model: Option<String>,
    /// Chooser kind for O.
    pub player_o_kind: ChooserKind,
    /// Model for O, if external.
    pub player_o_model: Option<String>,
    /// Number of applied moves.
    pub total_moves: usize,
    /// Winning side.
    pub winner: Option<Mark>,
    /// Whether the game was drawn.
    pub is_draw: bool,
    /// Time since the game started or was last reset.
    pub duration: Duration,
    /// Final board.
    pub final_board: BoardSnapshot,
}

/// Locations of the log files behind a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogPaths {
    /// Move log.
    pub moves: PathBuf,
    /// Game log.
    pub games: PathBuf,
}

/// Receiver of game events.
///
/// Implementations handle their own storage failures; recording never
/// fails from the game's point of view. Calls are synchronous and run on
/// the move path with the game's lock held, so they must return quickly.
pub trait EventSink: Send + Sync + std::fmt::Debug {
    /// Records a move attempt.
    fn record_move(&self, event: &MoveEvent);

    /// Records a completed game.
    fn record_game(&self, event: &GameCompletedEvent);

    /// Files written by this sink, if any.
    fn log_paths(&self) -> Option<LogPaths> {
        None
    }
}

/// Sink that keeps events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    moves: Mutex<Vec<MoveEvent>>,
    games: Mutex<Vec<GameCompletedEvent>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns recorded move events.
    pub fn moves(&self) -> Vec<MoveEvent> {
        self.moves
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns recorded game events.
    pub fn games(&self) -> Vec<GameCompletedEvent> {
        self.games
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for MemorySink {
    fn record_move(&self, event: &MoveEvent) {
        self.moves
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }

    fn record_game(&self, event: &GameCompletedEvent) {
        self.games
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
