//! Tic-tac-toe arena service.
//!
//! Hosts tic-tac-toe games over HTTP. Each side picks moves either at
//! random or by asking a language model, and every move and finished game
//! is appended to CSV logs.
//!
//! # Architecture
//!
//! - **Chooser**: move strategies (random, or LLM with random fallback)
//! - **Game**: turn sequencing and terminal detection over an [`arena_board::Board`]
//! - **Registry**: live games keyed by identifier
//! - **Events**: move and game records, written to CSV
//! - **Api**: axum routes over the registry
//!
//! # Example
//!
//! ```no_run
//! use arena_server::{Game, PlayerConfig, PlayerFactory};
//! use arena_board::Mark;
//!
//! # async fn example() {
//! let factory = PlayerFactory::default().with_seed(7);
//! let x = factory.build(Mark::X, PlayerConfig::random());
//! let o = factory.build(Mark::O, PlayerConfig::random());
//! let mut game = Game::new(x, o, None);
//! let summary = game.play_to_completion().await;
//! println!("winner: {:?}", summary.winner);
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod api;
pub mod battle;
pub mod chooser;
pub mod cli;
mod config;
pub mod events;
mod game;
mod llm_client;
mod player;
mod registry;

pub use config::{ConfigError, DEFAULT_CONFIG_FILE, LlmSettings, ServerConfig};
pub use game::{
    AppliedMove, Game, GameId, GameState, GameSummary, MoveRecord, MoveResult, PlaySummary,
};
pub use llm_client::{CompletionClient, LlmClient, LlmConfig, LlmError, LlmProvider};
pub use player::{Player, PlayerConfig, PlayerFactory};
pub use registry::{GameHandle, GameRegistry};
