//! Language-model move chooser with random fallback.

use super::parse::parse_move_response;
use super::prompt::{SYSTEM_PROMPT, move_prompt};
use super::{ChooserKind, LegalMoves, MoveChooser, MoveMetadata, RandomChooser};
use crate::llm_client::CompletionClient;
use arena_board::{BoardSnapshot, Mark, Move};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Asks a language model for a move.
///
/// Makes exactly one completion call bounded by `timeout`. A failed call,
/// a timeout, an unparseable response, or an illegal move all fall back to
/// a random legal move, with the failure recorded in the metadata.
#[derive(Debug)]
pub struct ExternalChooser {
    client: Arc<dyn CompletionClient>,
    fallback: RandomChooser,
    timeout: Duration,
}

impl ExternalChooser {
    /// Creates a chooser with an entropy-seeded fallback.
    pub fn new(client: Arc<dyn CompletionClient>, timeout: Duration) -> Self {
        Self::with_fallback(client, timeout, RandomChooser::new())
    }

    /// Creates a chooser with the given fallback.
    pub fn with_fallback(
        client: Arc<dyn CompletionClient>,
        timeout: Duration,
        fallback: RandomChooser,
    ) -> Self {
        Self {
            client,
            fallback,
            timeout,
        }
    }

    /// Runs the model call and validates its answer.
    ///
    /// Fills prompt, response, reasoning, and latency in `meta` as they
    /// become known, so a failure still carries what was observed.
    async fn ask(
        &self,
        legal: &LegalMoves,
        board: &BoardSnapshot,
        mark: Mark,
        meta: &mut MoveMetadata,
    ) -> Result<Move, String> {
        let prompt = move_prompt(board, mark, legal);
        meta.prompt = Some(prompt.clone());

        let started = Instant::now();
        let outcome =
            tokio::time::timeout(self.timeout, self.client.complete(SYSTEM_PROMPT, &prompt)).await;
        meta.response_time_ms = Some(started.elapsed().as_secs_f64() * 1000.0);

        let response = match outcome {
            Err(_) => {
                return Err(format!(
                    "LLM request timed out after {}ms",
                    self.timeout.as_millis()
                ));
            }
            Ok(Err(e)) => return Err(e.message),
            Ok(Ok(response)) => response,
        };
        meta.response = Some(response.clone());

        let parsed =
            parse_move_response(&response).map_err(|e| format!("Malformed response: {}", e))?;
        meta.reasoning = Some(parsed.reasoning);

        if legal.contains(parsed.mv) {
            Ok(parsed.mv)
        } else {
            Err(format!("Invalid move {} not in available moves", parsed.mv))
        }
    }
}

#[async_trait]
impl MoveChooser for ExternalChooser {
    #[instrument(skip(self, legal, board), fields(mark = %mark, model = %self.client.model()))]
    async fn choose(
        &self,
        legal: &LegalMoves,
        board: &BoardSnapshot,
        mark: Mark,
    ) -> (Move, MoveMetadata) {
        let mut meta = MoveMetadata::new(ChooserKind::External);

        match self.ask(legal, board, mark, &mut meta).await {
            Ok(mv) => {
                info!(
                    row = mv.row,
                    col = mv.col,
                    latency_ms = meta.response_time_ms,
                    "Model move accepted"
                );
                (mv, meta)
            }
            Err(failure) => {
                let mv = self.fallback.pick(legal);
                warn!(
                    error = %failure,
                    row = mv.row,
                    col = mv.col,
                    "Model move failed, using random fallback"
                );
                meta.error = Some(format!("{}; used random fallback", failure));
                (mv, meta)
            }
        }
    }

    fn kind(&self) -> ChooserKind {
        ChooserKind::External
    }

    fn model_name(&self) -> Option<&str> {
        Some(self.client.model())
    }
}
