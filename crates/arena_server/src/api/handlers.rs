//! Route handlers.
//!
//! Game operations run on a spawned task so a move already in progress
//! completes even if the client disconnects.

use super::error::ApiError;
use super::types::{
    CreateGameRequest, CreateGameResponse, DeleteResponse, GameListResponse, GameResponse,
    HealthResponse, IndexResponse, LogsResponse, MoveRequest, MoveResponse, PlayResponse,
    PlayerInfo, ResetResponse,
};
use super::AppState;
use crate::game::{GameState, MoveResult, PlaySummary};
use crate::player::PlayerConfig;
use crate::registry::GameHandle;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Decodes an optional JSON body, using the default when it is empty.
fn optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))
}

async fn lookup(state: &AppState, id: &str) -> Result<GameHandle, ApiError> {
    state
        .registry
        .get(id)
        .await
        .ok_or_else(ApiError::game_not_found)
}

/// Service name and route index.
pub async fn index() -> Json<IndexResponse> {
    let endpoints = BTreeMap::from([
        ("GET /health", "Liveness check"),
        ("POST /games", "Create a new game"),
        ("GET /games", "List games"),
        ("GET /games/{game_id}", "Get game state"),
        ("POST /games/{game_id}/move", "Make a move (chooser picks if no row/col provided)"),
        ("POST /games/{game_id}/auto", "Play the game to completion"),
        ("POST /games/{game_id}/reset", "Reset a game"),
        ("DELETE /games/{game_id}", "Delete a game"),
        ("GET /logs", "Event log file locations"),
        ("GET /schema", "JSON Schemas of request and response bodies"),
    ]);
    Json(IndexResponse {
        message: "Tic-Tac-Toe Arena API",
        endpoints,
    })
}

/// Health check handler.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Creates a game.
#[instrument(skip_all)]
pub async fn create_game(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreateGameResponse>, ApiError> {
    let request: CreateGameRequest = optional_body(&body)?;
    let (game_id, handle) = state
        .registry
        .create(
            request.player_x.unwrap_or_else(PlayerConfig::random),
            request.player_o.unwrap_or_else(PlayerConfig::random),
            request.enable_logging,
        )
        .await;

    let game = handle.lock().await;
    info!(%game_id, "Game created");
    Ok(Json(CreateGameResponse {
        game_id,
        message: "Game created successfully".to_string(),
        state: game.state(),
        player_x: PlayerInfo::from(game.player_x()),
        player_o: PlayerInfo::from(game.player_o()),
    }))
}

/// Lists games.
pub async fn list_games(State(state): State<AppState>) -> Json<GameListResponse> {
    let games = state.registry.list().await;
    Json(GameListResponse {
        total_games: games.len(),
        games,
    })
}

/// Returns one game's state.
#[instrument(skip(state))]
pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let handle = lookup(&state, &game_id).await?;
    let game_state = handle.lock().await.state();
    Ok(Json(GameResponse {
        game_id,
        state: game_state,
    }))
}

/// Resolves one move.
#[instrument(skip(state, body))]
pub async fn make_move(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    body: Bytes,
) -> Result<Json<MoveResponse>, ApiError> {
    let request: MoveRequest = optional_body(&body)?;
    let handle = lookup(&state, &game_id).await?;

    let result: MoveResult = tokio::spawn(async move {
        let mut game = handle.lock().await;
        game.apply_next_move(request.explicit()).await
    })
    .await?;

    Ok(Json(MoveResponse { game_id, result }))
}

/// Plays a game to the end.
#[instrument(skip(state))]
pub async fn play_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<PlayResponse>, ApiError> {
    let handle = lookup(&state, &game_id).await?;

    let summary: PlaySummary = tokio::spawn(async move {
        let mut game = handle.lock().await;
        game.play_to_completion().await
    })
    .await?;

    Ok(Json(PlayResponse { game_id, summary }))
}

/// Resets a game in place.
#[instrument(skip(state))]
pub async fn reset_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<ResetResponse>, ApiError> {
    let handle = lookup(&state, &game_id).await?;
    let game_state: GameState = {
        let mut game = handle.lock().await;
        game.reset();
        game.state()
    };
    Ok(Json(ResetResponse {
        game_id,
        message: "Game reset successfully".to_string(),
        state: game_state,
    }))
}

/// Removes a game.
#[instrument(skip(state))]
pub async fn delete_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    if !state.registry.remove(&game_id).await {
        return Err(ApiError::game_not_found());
    }
    Ok(Json(DeleteResponse {
        game_id,
        message: "Game deleted successfully".to_string(),
    }))
}

/// Event log locations.
pub async fn logs(State(state): State<AppState>) -> Json<LogsResponse> {
    let paths = state.registry.sink().and_then(|sink| sink.log_paths());
    Json(LogsResponse {
        moves_log: paths.as_ref().map(|p| p.moves.display().to_string()),
        games_log: paths.as_ref().map(|p| p.games.display().to_string()),
        note: "Log files are stored on the server filesystem".to_string(),
    })
}

/// JSON Schemas of the request and response bodies.
pub async fn schema() -> Json<Value> {
    Json(json!({
        "CreateGameRequest": schemars::schema_for!(CreateGameRequest),
        "CreateGameResponse": schemars::schema_for!(CreateGameResponse),
        "MoveRequest": schemars::schema_for!(MoveRequest),
        "MoveResponse": schemars::schema_for!(MoveResponse),
        "PlayResponse": schemars::schema_for!(PlayResponse),
        "GameResponse": schemars::schema_for!(GameResponse),
        "GameListResponse": schemars::schema_for!(GameListResponse),
        "LogsResponse": schemars::schema_for!(LogsResponse),
    }))
}
