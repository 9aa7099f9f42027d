//! Local game runner that narrates every move.

use crate::game::{Game, PlaySummary};
use arena_board::Mark;
use std::io::Write;
use tracing::instrument;

/// Plays `game` to the end, writing a transcript to `out`.
///
/// # Errors
///
/// Returns any error from writing the transcript.
#[instrument(skip_all, fields(game_id = %game.id()))]
pub async fn run(game: &mut Game, out: &mut dyn Write) -> std::io::Result<PlaySummary> {
    writeln!(out, "{} vs {}", game.player(Mark::X).name(), game.player(Mark::O).name())?;
    writeln!(out, "Game {}", game.id())?;

    let mut moves = Vec::new();
    while !*game.game_over() {
        let turn = *game.turn();
        let result = game.apply_next_move(None).await;

        writeln!(out)?;
        match &result.applied {
            Some(applied) => writeln!(
                out,
                "{} plays ({}, {})",
                applied.player, applied.row, applied.col
            )?,
            None => writeln!(out, "{}: {}", turn, result.message)?,
        }
        if let Some(meta) = &result.metadata {
            if let Some(reasoning) = &meta.reasoning {
                writeln!(out, "  reasoning: {}", reasoning)?;
            }
            if let Some(ms) = meta.response_time_ms {
                writeln!(out, "  response time: {:.0} ms", ms)?;
            }
            if let Some(error) = &meta.error {
                writeln!(out, "  error: {}", error)?;
            }
        }
        writeln!(out, "{}", result.board.render())?;
        moves.push(result);
    }

    let state = game.state();
    writeln!(out)?;
    match state.winner {
        Some(mark) => writeln!(out, "{} wins!", game.player(mark).name())?,
        None => writeln!(out, "It's a draw!")?,
    }
    writeln!(out, "Total moves: {}", state.move_history.len())?;

    Ok(PlaySummary {
        winner: state.winner,
        is_draw: state.is_draw,
        board: state.board,
        moves,
        total_moves: state.move_history.len(),
    })
}
