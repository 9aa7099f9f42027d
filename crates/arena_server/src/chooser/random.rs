//! Uniform random move chooser.

use super::{ChooserKind, LegalMoves, MoveChooser, MoveMetadata};
use arena_board::{BoardSnapshot, Mark, Move};
use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, instrument};

/// Picks uniformly among the legal moves.
#[derive(Debug)]
pub struct RandomChooser {
    rng: Mutex<StdRng>,
}

impl RandomChooser {
    /// Creates a chooser seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates a chooser with a fixed seed for reproducible games.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Picks a legal move.
    pub fn pick(&self, legal: &LegalMoves) -> Move {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        legal
            .as_slice()
            .choose(&mut *rng)
            .copied()
            .unwrap_or_else(|| legal.first())
    }
}

impl Default for RandomChooser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MoveChooser for RandomChooser {
    #[instrument(skip(self, legal, _board), fields(options = legal.count()))]
    async fn choose(
        &self,
        legal: &LegalMoves,
        _board: &BoardSnapshot,
        _mark: Mark,
    ) -> (Move, MoveMetadata) {
        let mv = self.pick(legal);
        debug!(row = mv.row, col = mv.col, "Random move chosen");
        (mv, MoveMetadata::new(ChooserKind::Random))
    }

    fn kind(&self) -> ChooserKind {
        ChooserKind::Random
    }
}
