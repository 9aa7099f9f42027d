//! Move choosers: strategies that pick a move from the legal options.
//!
//! - [`RandomChooser`] picks uniformly with an injectable RNG.
//! - [`ExternalChooser`] asks a language model and falls back to a random
//!   pick on any failure, so it always returns a legal move.

mod external;
mod parse;
mod prompt;
mod random;

pub use external::ExternalChooser;
pub use parse::{MalformedResponse, ParsedMove, parse_move_response};
pub use prompt::{SYSTEM_PROMPT, move_prompt};
pub use random::RandomChooser;

use arena_board::{BoardSnapshot, Mark, Move};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How a move was selected.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChooserKind {
    /// Uniform random pick.
    Random,
    /// Language-model pick with random fallback.
    External,
    /// Coordinates supplied by the caller.
    Manual,
}

/// Diagnostics attached to one move attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MoveMetadata {
    /// Strategy that produced the move.
    pub chooser: ChooserKind,
    /// Prompt sent to the model.
    pub prompt: Option<String>,
    /// Raw model response.
    pub response: Option<String>,
    /// Rationale extracted from the response.
    pub reasoning: Option<String>,
    /// Wall-clock latency of the model call.
    pub response_time_ms: Option<f64>,
    /// Failure description when the move came from the fallback.
    pub error: Option<String>,
}

impl MoveMetadata {
    /// Metadata with only the chooser kind set.
    pub fn new(chooser: ChooserKind) -> Self {
        Self {
            chooser,
            prompt: None,
            response: None,
            reasoning: None,
            response_time_ms: None,
            error: None,
        }
    }
}

/// Non-empty, ordered set of legal moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalMoves {
    moves: Vec<Move>,
}

impl LegalMoves {
    /// Wraps the moves, returning `None` if there are none.
    pub fn new(moves: Vec<Move>) -> Option<Self> {
        if moves.is_empty() {
            None
        } else {
            Some(Self { moves })
        }
    }

    /// Returns the moves in the order given.
    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    /// Checks if the move is legal.
    pub fn contains(&self, mv: Move) -> bool {
        self.moves.contains(&mv)
    }

    /// First legal move.
    pub fn first(&self) -> Move {
        self.moves[0]
    }

    /// Number of legal moves (never zero).
    pub fn count(&self) -> usize {
        self.moves.len()
    }
}

/// Strategy that selects a move for one side.
///
/// Implementations must return a move contained in `legal` and must not
/// block indefinitely. Failures are reported through
/// [`MoveMetadata::error`], never as errors.
#[async_trait]
pub trait MoveChooser: Send + Sync + std::fmt::Debug {
    /// Chooses a move for `mark` on `board`.
    async fn choose(
        &self,
        legal: &LegalMoves,
        board: &BoardSnapshot,
        mark: Mark,
    ) -> (Move, MoveMetadata);

    /// Kind reported in metadata and game summaries.
    fn kind(&self) -> ChooserKind;

    /// Model behind this chooser, if any.
    fn model_name(&self) -> Option<&str> {
        None
    }
}
