//! HTTP surface.

mod error;
mod handlers;
mod types;

pub use error::ApiError;
pub use types::{
    CreateGameRequest, CreateGameResponse, DeleteResponse, GameListResponse, GameResponse,
    HealthResponse, LogsResponse, MoveRequest, MoveResponse, PlayResponse, PlayerInfo,
    ResetResponse,
};

use crate::registry::GameRegistry;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live games.
    pub registry: GameRegistry,
}

impl AppState {
    /// Wraps a registry.
    pub fn new(registry: GameRegistry) -> Self {
        Self { registry }
    }
}

fn log_request(req: Request<Body>) -> Request<Body> {
    info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
    req
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/games", post(handlers::create_game).get(handlers::list_games))
        .route(
            "/games/{id}",
            get(handlers::get_game).delete(handlers::delete_game),
        )
        .route("/games/{id}/move", post(handlers::make_move))
        .route("/games/{id}/auto", post(handlers::play_game))
        .route("/games/{id}/reset", post(handlers::reset_game))
        .route("/logs", get(handlers::logs))
        .route("/schema", get(handlers::schema))
        .layer(ServiceBuilder::new().map_request(log_request).layer(cors))
        .with_state(state)
}
