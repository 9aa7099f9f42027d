//! Append-only CSV event log.

use super::{EventLogError, EventSink, GameCompletedEvent, LogPaths, MoveEvent};
use arena_board::Move;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info, instrument};

/// Column names of the move log.
pub const MOVE_HEADERS: [&str; 14] = [
    "timestamp",
    "game_id",
    "move_number",
    "player",
    "player_type",
    "board_state",
    "available_moves",
    "prompt_sent",
    "llm_response",
    "llm_reasoning",
    "chosen_move",
    "move_valid",
    "error_message",
    "response_time_ms",
];

/// Column names of the game log.
pub const GAME_HEADERS: [&str; 11] = [
    "timestamp",
    "game_id",
    "player_x_type",
    "player_x_model",
    "player_o_type",
    "player_o_model",
    "total_moves",
    "winner",
    "is_draw",
    "duration_seconds",
    "final_board_state",
];

/// Longest prompt or response kept in the move log, in characters.
const MAX_TEXT_CHARS: usize = 500;

#[derive(Debug, Serialize)]
struct MoveRow {
    timestamp: String,
    game_id: String,
    move_number: usize,
    player: String,
    player_type: String,
    board_state: String,
    available_moves: String,
    prompt_sent: String,
    llm_response: String,
    llm_reasoning: String,
    chosen_move: String,
    move_valid: bool,
    error_message: String,
    response_time_ms: String,
}

#[derive(Debug, Serialize)]
struct GameRow {
    timestamp: String,
    game_id: String,
    player_x_type: String,
    player_x_model: String,
    player_o_type: String,
    player_o_model: String,
    total_moves: usize,
    winner: String,
    is_draw: bool,
    duration_seconds: String,
    final_board_state: String,
}

/// Caps text at [`MAX_TEXT_CHARS`] characters, marking the cut with `...`.
fn truncate(text: Option<&str>) -> String {
    match text {
        Some(text) if text.chars().count() > MAX_TEXT_CHARS => {
            let mut cut: String = text.chars().take(MAX_TEXT_CHARS).collect();
            cut.push_str("...");
            cut
        }
        Some(text) => text.to_string(),
        None => String::new(),
    }
}

fn format_moves(moves: &[Move]) -> String {
    let inner = moves
        .iter()
        .map(Move::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", inner)
}

impl From<&MoveEvent> for MoveRow {
    fn from(event: &MoveEvent) -> Self {
        Self {
            timestamp: event.timestamp.to_rfc3339(),
            game_id: event.game_id.clone(),
            move_number: event.move_number,
            player: event.player.to_string(),
            player_type: event.chooser.to_string(),
            board_state: event.board.to_string(),
            available_moves: format_moves(&event.available_moves),
            prompt_sent: truncate(event.prompt.as_deref()),
            llm_response: truncate(event.response.as_deref()),
            llm_reasoning: event.reasoning.clone().unwrap_or_default(),
            chosen_move: event.chosen_move.map(|m| m.to_string()).unwrap_or_default(),
            move_valid: event.move_valid,
            error_message: event.error.clone().unwrap_or_default(),
            response_time_ms: event
                .response_time_ms
                .map(|ms| format!("{:.1}", ms))
                .unwrap_or_default(),
        }
    }
}

impl From<&GameCompletedEvent> for GameRow {
    fn from(event: &GameCompletedEvent) -> Self {
        Self {
            timestamp: event.timestamp.to_rfc3339(),
            game_id: event.game_id.clone(),
            player_x_type: event.player_x_kind.to_string(),
            player_x_model: event.player_x_model.clone().unwrap_or_default(),
            player_o_type: event.player_o_kind.to_string(),
            player_o_model: event.player_o_model.clone().unwrap_or_default(),
            total_moves: event.total_moves,
            winner: event.winner.map(|m| m.to_string()).unwrap_or_default(),
            is_draw: event.is_draw,
            duration_seconds: format!("{:.2}", event.duration.as_secs_f64()),
            final_board_state: event.final_board.to_string(),
        }
    }
}

/// Writes move and game events to two CSV files.
///
/// File names carry the creation time (`moves_YYYYmmdd_HHMMSS.csv`,
/// `games_YYYYmmdd_HHMMSS.csv`). Rows are appended and flushed one at a
/// time; headers are written only when a file starts empty.
///
/// Each row is one blocking write and flush under a std mutex, made on the
/// caller's task.
#[derive(Debug)]
pub struct CsvEventLog {
    paths: LogPaths,
    moves: Mutex<csv::Writer<File>>,
    games: Mutex<csv::Writer<File>>,
}

impl CsvEventLog {
    /// Creates the log directory and both log files.
    ///
    /// # Errors
    ///
    /// Returns [`EventLogError`] if the directory or files cannot be
    /// created or the headers cannot be written.
    #[instrument(skip(log_dir), fields(log_dir = %log_dir.as_ref().display()))]
    pub fn new(log_dir: impl AsRef<Path>) -> Result<Self, EventLogError> {
        let log_dir = log_dir.as_ref();
        std::fs::create_dir_all(log_dir)?;

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let paths = LogPaths {
            moves: log_dir.join(format!("moves_{}.csv", stamp)),
            games: log_dir.join(format!("games_{}.csv", stamp)),
        };

        let moves = Self::open(&paths.moves, &MOVE_HEADERS)?;
        let games = Self::open(&paths.games, &GAME_HEADERS)?;

        info!(moves = %paths.moves.display(), games = %paths.games.display(), "Event log ready");
        Ok(Self {
            paths,
            moves: Mutex::new(moves),
            games: Mutex::new(games),
        })
    }

    /// Opens a file for appending, writing headers if it is empty.
    fn open(path: &PathBuf, headers: &[&str]) -> Result<csv::Writer<File>, EventLogError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_empty = file.metadata()?.len() == 0;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_empty {
            writer.write_record(headers)?;
            writer.flush()?;
        }
        Ok(writer)
    }

    /// Appends a move row.
    ///
    /// # Errors
    ///
    /// Returns [`EventLogError`] if the row cannot be written.
    pub fn append_move(&self, event: &MoveEvent) -> Result<(), EventLogError> {
        let mut writer = self.moves.lock().unwrap_or_else(PoisonError::into_inner);
        writer.serialize(MoveRow::from(event))?;
        writer.flush()?;
        Ok(())
    }

    /// Appends a game row.
    ///
    /// # Errors
    ///
    /// Returns [`EventLogError`] if the row cannot be written.
    pub fn append_game(&self, event: &GameCompletedEvent) -> Result<(), EventLogError> {
        let mut writer = self.games.lock().unwrap_or_else(PoisonError::into_inner);
        writer.serialize(GameRow::from(event))?;
        writer.flush()?;
        Ok(())
    }

    /// Returns the file locations.
    pub fn paths(&self) -> &LogPaths {
        &self.paths
    }
}

impl EventSink for CsvEventLog {
    #[instrument(
        skip(self, event),
        fields(game_id = %event.game_id, move_number = event.move_number)
    )]
    fn record_move(&self, event: &MoveEvent) {
        match self.append_move(event) {
            Ok(()) => debug!("Move logged"),
            Err(e) => error!(error = %e, "Failed to log move"),
        }
    }

    #[instrument(skip(self, event), fields(game_id = %event.game_id))]
    fn record_game(&self, event: &GameCompletedEvent) {
        match self.append_game(event) {
            Ok(()) => debug!("Game logged"),
            Err(e) => error!(error = %e, "Failed to log game"),
        }
    }

    fn log_paths(&self) -> Option<LogPaths> {
        Some(self.paths.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_caps_long_text() {
        let long = "x".repeat(MAX_TEXT_CHARS + 20);
        let cut = truncate(Some(&long));
        assert_eq!(cut.chars().count(), MAX_TEXT_CHARS + 3);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate(Some("short")), "short");
        assert_eq!(truncate(None), "");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let long = "é".repeat(MAX_TEXT_CHARS + 1);
        assert_eq!(truncate(Some(&long)).chars().count(), MAX_TEXT_CHARS + 3);
    }

    #[test]
    fn test_format_moves() {
        assert_eq!(format_moves(&[Move::new(0, 1), Move::new(2, 2)]), "[(0, 1), (2, 2)]");
        assert_eq!(format_moves(&[]), "[]");
    }
}
