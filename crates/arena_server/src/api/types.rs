//! Request and response bodies.

use crate::chooser::ChooserKind;
use crate::game::{GameId, GameState, GameSummary, MoveResult, PlaySummary};
use crate::player::{Player, PlayerConfig};
use arena_board::Move;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_true() -> bool {
    true
}

/// Body of `POST /games`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CreateGameRequest {
    /// Configuration of X; random when absent.
    #[serde(default)]
    pub player_x: Option<PlayerConfig>,
    /// Configuration of O; random when absent.
    #[serde(default)]
    pub player_o: Option<PlayerConfig>,
    /// Whether moves and results are written to the event log.
    #[serde(default = "default_true")]
    pub enable_logging: bool,
}

impl Default for CreateGameRequest {
    fn default() -> Self {
        Self {
            player_x: None,
            player_o: None,
            enable_logging: true,
        }
    }
}

/// Body of `POST /games/{id}/move`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MoveRequest {
    /// Row to play.
    #[serde(default)]
    pub row: Option<i64>,
    /// Column to play.
    #[serde(default)]
    pub col: Option<i64>,
}

/// Narrows a requested coordinate; values past `i32` stay off the board.
fn coordinate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

impl MoveRequest {
    /// Explicit move, when both coordinates are given.
    pub fn explicit(&self) -> Option<Move> {
        match (self.row, self.col) {
            (Some(row), Some(col)) => Some(Move::new(coordinate(row), coordinate(col))),
            _ => None,
        }
    }
}

/// Chooser reported for one side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlayerInfo {
    /// Chooser kind in use.
    #[serde(rename = "type")]
    pub kind: ChooserKind,
    /// Model name, for external choosers.
    pub model: Option<String>,
}

impl From<&Player> for PlayerInfo {
    fn from(player: &Player) -> Self {
        Self {
            kind: player.kind(),
            model: player.model().map(str::to_string),
        }
    }
}

/// Response of `POST /games`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CreateGameResponse {
    /// New game identifier.
    pub game_id: GameId,
    /// Status message.
    pub message: String,
    /// Initial state.
    pub state: GameState,
    /// Player X.
    pub player_x: PlayerInfo,
    /// Player O.
    pub player_o: PlayerInfo,
}

/// Game identifier with its state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GameResponse {
    /// Identifier.
    pub game_id: GameId,
    /// Current state.
    pub state: GameState,
}

/// Response of `POST /games/{id}/reset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResetResponse {
    /// Identifier.
    pub game_id: GameId,
    /// Status message.
    pub message: String,
    /// State after the reset.
    pub state: GameState,
}

/// Response of `POST /games/{id}/move`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MoveResponse {
    /// Identifier.
    pub game_id: GameId,
    /// Move outcome.
    #[serde(flatten)]
    pub result: MoveResult,
}

/// Response of `POST /games/{id}/auto`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlayResponse {
    /// Identifier.
    pub game_id: GameId,
    /// Game outcome.
    #[serde(flatten)]
    pub summary: PlaySummary,
}

/// Response of `DELETE /games/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeleteResponse {
    /// Identifier.
    pub game_id: GameId,
    /// Status message.
    pub message: String,
}

/// Response of `GET /games`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GameListResponse {
    /// Number of registered games.
    pub total_games: usize,
    /// One row per game.
    pub games: Vec<GameSummary>,
}

/// Response of `GET /logs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LogsResponse {
    /// Move log path.
    pub moves_log: Option<String>,
    /// Game log path.
    pub games_log: Option<String>,
    /// Where the files live.
    pub note: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok`.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// Response of `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct IndexResponse {
    /// Service name.
    pub message: &'static str,
    /// Route to description.
    pub endpoints: BTreeMap<&'static str, &'static str>,
}
