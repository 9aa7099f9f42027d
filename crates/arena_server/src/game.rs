//! Game state machine.
//!
//! A [`Game`] owns a board and two players. Each call to
//! [`Game::apply_next_move`] resolves exactly one move attempt, either
//! from caller-supplied coordinates or from the current player's chooser,
//! and reports the outcome as a [`MoveResult`].

use crate::chooser::{ChooserKind, LegalMoves, MoveMetadata};
use crate::events::{EventSink, GameCompletedEvent, MoveEvent};
use crate::player::Player;
use arena_board::{Board, BoardSnapshot, Mark, Move};
use chrono::Utc;
use derive_getters::Getters;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Opaque game identifier (UUID v4 string).
pub type GameId = String;

/// One applied move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MoveRecord {
    /// Side that moved.
    pub player: Mark,
    /// Row of the placed mark.
    pub row: i32,
    /// Column of the placed mark.
    pub col: i32,
    /// Model rationale, if any.
    pub reasoning: Option<String>,
}

/// The move a result refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AppliedMove {
    /// Row.
    pub row: i32,
    /// Column.
    pub col: i32,
    /// Side that moved.
    pub player: Mark,
}

/// Snapshot of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GameState {
    /// Board grid.
    pub board: BoardSnapshot,
    /// Side to move; `None` once the game is over.
    pub current_player: Option<Mark>,
    /// Winning side.
    pub winner: Option<Mark>,
    /// Whether the game ended in a draw.
    pub is_draw: bool,
    /// Whether the game has ended.
    pub game_over: bool,
    /// Applied moves in order.
    pub move_history: Vec<MoveRecord>,
    /// Legal moves; empty once the game is over.
    pub available_moves: Vec<Move>,
}

/// Outcome of one move attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MoveResult {
    /// Whether a mark was placed.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Board after the attempt.
    pub board: BoardSnapshot,
    /// Whether the game has ended.
    pub game_over: bool,
    /// Side to move next; `None` once the game is over.
    pub current_player: Option<Mark>,
    /// Winning side.
    pub winner: Option<Mark>,
    /// Whether the game ended in a draw.
    pub is_draw: bool,
    /// The placed move, when one was applied.
    #[serde(rename = "move")]
    pub applied: Option<AppliedMove>,
    /// Chooser diagnostics, when a move was attempted.
    pub metadata: Option<MoveMetadata>,
}

/// Result of playing a game to the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlaySummary {
    /// Winning side.
    pub winner: Option<Mark>,
    /// Whether the game ended in a draw.
    pub is_draw: bool,
    /// Final board.
    pub board: BoardSnapshot,
    /// Result of every attempt made.
    pub moves: Vec<MoveResult>,
    /// Number of applied moves in the game.
    pub total_moves: usize,
}

/// Listing row for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GameSummary {
    /// Identifier.
    pub game_id: GameId,
    /// Chooser kind of X.
    pub player_x_type: ChooserKind,
    /// Chooser kind of O.
    pub player_o_type: ChooserKind,
    /// Whether the game has ended.
    pub game_over: bool,
    /// Winning side.
    pub winner: Option<Mark>,
}

/// One tic-tac-toe match between two players.
#[derive(Debug, Getters)]
pub struct Game {
    /// Unique identifier.
    id: GameId,
    /// Playing surface.
    board: Board,
    /// First player.
    player_x: Player,
    /// Second player.
    player_o: Player,
    /// Side to move.
    turn: Mark,
    /// Winning side.
    winner: Option<Mark>,
    /// Draw flag.
    is_draw: bool,
    /// Terminal flag.
    game_over: bool,
    /// Applied moves.
    history: Vec<MoveRecord>,
    #[getter(skip)]
    started: Instant,
    #[getter(skip)]
    sink: Option<Arc<dyn EventSink>>,
    #[getter(skip)]
    summary: watch::Sender<GameSummary>,
}

impl Game {
    /// Creates a game with a fresh identifier.
    ///
    /// Events go to `sink` when one is given.
    pub fn new(player_x: Player, player_o: Player, sink: Option<Arc<dyn EventSink>>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), player_x, player_o, sink)
    }

    /// Creates a game with the given identifier.
    #[instrument(skip(player_x, player_o, sink), fields(logging = sink.is_some()))]
    pub fn with_id(
        id: GameId,
        player_x: Player,
        player_o: Player,
        sink: Option<Arc<dyn EventSink>>,
    ) -> Self {
        info!(
            x = %player_x.name(),
            o = %player_o.name(),
            "Creating game"
        );
        let (summary, _) = watch::channel(GameSummary {
            game_id: id.clone(),
            player_x_type: player_x.kind(),
            player_o_type: player_o.kind(),
            game_over: false,
            winner: None,
        });
        Self {
            id,
            board: Board::new(),
            player_x,
            player_o,
            turn: Mark::X,
            winner: None,
            is_draw: false,
            game_over: false,
            history: Vec::new(),
            started: Instant::now(),
            sink,
            summary,
        }
    }

    /// Returns the player for a side.
    pub fn player(&self, mark: Mark) -> &Player {
        match mark {
            Mark::X => &self.player_x,
            Mark::O => &self.player_o,
        }
    }

    /// Whether events are recorded for this game.
    pub fn logging_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Subscribes to this game's listing row.
    ///
    /// The row is republished after every move attempt and reset.
    pub fn subscribe(&self) -> watch::Receiver<GameSummary> {
        self.summary.subscribe()
    }

    fn publish(&self) {
        let (game_over, winner) = (self.game_over, self.winner);
        self.summary.send_if_modified(|row| {
            let changed = row.game_over != game_over || row.winner != winner;
            row.game_over = game_over;
            row.winner = winner;
            changed
        });
    }

    fn current_player(&self) -> Option<Mark> {
        if self.game_over { None } else { Some(self.turn) }
    }

    /// Resolves one move attempt.
    ///
    /// With `explicit` set, those coordinates are tried; otherwise the
    /// current player's chooser picks. Invalid moves are reported through
    /// the result and leave the game unchanged.
    #[instrument(skip(self), fields(game_id = %self.id, turn = %self.turn))]
    pub async fn apply_next_move(&mut self, explicit: Option<Move>) -> MoveResult {
        let result = self.resolve_move(explicit).await;
        self.publish();
        result
    }

    async fn resolve_move(&mut self, explicit: Option<Move>) -> MoveResult {
        if self.game_over {
            debug!("Move attempted on finished game");
            return self.result(false, "Game is already over", None, None);
        }

        let available = self.board.available_moves();
        let Some(legal) = LegalMoves::new(available.clone()) else {
            warn!("No available moves on unfinished game");
            self.is_draw = true;
            self.game_over = true;
            self.emit_completed();
            return self.result(false, "No available moves", None, None);
        };

        let mark = self.turn;
        let (mv, metadata) = match explicit {
            Some(mv) => (mv, MoveMetadata::new(ChooserKind::Manual)),
            None => {
                let chooser = Arc::clone(self.player(mark).chooser());
                chooser.choose(&legal, &self.board.snapshot(), mark).await
            }
        };

        let valid = self.board.place(mv, mark);
        self.emit_move(mark, mv, valid, &available, &metadata);

        if !valid {
            info!(row = mv.row, col = mv.col, "Invalid move rejected");
            let message = format!("Invalid move at {}", mv);
            return self.result(false, &message, None, Some(metadata));
        }

        self.history.push(MoveRecord {
            player: mark,
            row: mv.row,
            col: mv.col,
            reasoning: metadata.reasoning.clone(),
        });
        let applied = Some(AppliedMove {
            row: mv.row,
            col: mv.col,
            player: mark,
        });

        if let Some(winner) = self.board.winner() {
            self.winner = Some(winner);
            self.game_over = true;
            info!(%winner, moves = self.history.len(), "Game won");
            self.emit_completed();
            let message = format!("{} wins!", self.player(mark).name());
            return self.result(true, &message, applied, Some(metadata));
        }

        if self.board.is_full() {
            self.is_draw = true;
            self.game_over = true;
            info!(moves = self.history.len(), "Game drawn");
            self.emit_completed();
            return self.result(true, "It's a draw!", applied, Some(metadata));
        }

        self.turn = mark.opponent();
        debug!(row = mv.row, col = mv.col, next = %self.turn, "Move applied");
        self.result(true, "Move successful", applied, Some(metadata))
    }

    /// Lets the choosers play until the game ends.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub async fn play_to_completion(&mut self) -> PlaySummary {
        let mut moves = Vec::new();
        while !self.game_over {
            moves.push(self.apply_next_move(None).await);
        }
        PlaySummary {
            winner: self.winner,
            is_draw: self.is_draw,
            board: self.board.snapshot(),
            moves,
            total_moves: self.history.len(),
        }
    }

    /// Returns the game to its starting position.
    ///
    /// Identity, players and event sink are kept.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn reset(&mut self) {
        self.board.reset();
        self.turn = Mark::X;
        self.winner = None;
        self.is_draw = false;
        self.game_over = false;
        self.history.clear();
        self.started = Instant::now();
        self.publish();
        info!("Game reset");
    }

    /// Returns a snapshot of the game.
    pub fn state(&self) -> GameState {
        GameState {
            board: self.board.snapshot(),
            current_player: self.current_player(),
            winner: self.winner,
            is_draw: self.is_draw,
            game_over: self.game_over,
            move_history: self.history.clone(),
            available_moves: if self.game_over {
                Vec::new()
            } else {
                self.board.available_moves()
            },
        }
    }

    fn result(
        &self,
        success: bool,
        message: &str,
        applied: Option<AppliedMove>,
        metadata: Option<MoveMetadata>,
    ) -> MoveResult {
        MoveResult {
            success,
            message: message.to_string(),
            board: self.board.snapshot(),
            game_over: self.game_over,
            current_player: self.current_player(),
            winner: self.winner,
            is_draw: self.is_draw,
            applied,
            metadata,
        }
    }

    fn emit_move(
        &self,
        mark: Mark,
        mv: Move,
        valid: bool,
        available: &[Move],
        metadata: &MoveMetadata,
    ) {
        let Some(sink) = &self.sink else { return };
        sink.record_move(&MoveEvent {
            timestamp: Utc::now(),
            game_id: self.id.clone(),
            move_number: self.history.len() + 1,
            player: mark,
            chooser: metadata.chooser,
            board: self.board.snapshot(),
            available_moves: available.to_vec(),
            prompt: metadata.prompt.clone(),
            response: metadata.response.clone(),
            reasoning: metadata.reasoning.clone(),
            chosen_move: Some(mv),
            move_valid: valid,
            error: metadata.error.clone(),
            response_time_ms: metadata.response_time_ms,
        });
    }

    fn emit_completed(&self) {
        let Some(sink) = &self.sink else { return };
        sink.record_game(&GameCompletedEvent {
            timestamp: Utc::now(),
            game_id: self.id.clone(),
            player_x_kind: self.player_x.kind(),
            player_x_model: self.player_x.model().map(str::to_string),
            player_o_kind: self.player_o.kind(),
            player_o_model: self.player_o.model().map(str::to_string),
            total_moves: self.history.len(),
            winner: self.winner,
            is_draw: self.is_draw,
            duration: self.started.elapsed(),
            final_board: self.board.snapshot(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chooser::RandomChooser;
    use crate::events::MemorySink;
    use crate::player::PlayerConfig;

    fn random_game(sink: Option<Arc<dyn EventSink>>) -> Game {
        let x = Player::new(Mark::X, Arc::new(RandomChooser::seeded(1)), PlayerConfig::random());
        let o = Player::new(Mark::O, Arc::new(RandomChooser::seeded(2)), PlayerConfig::random());
        Game::new(x, o, sink)
    }

    async fn play(game: &mut Game, moves: &[(i32, i32)]) -> MoveResult {
        let mut last = None;
        for &(row, col) in moves {
            last = Some(game.apply_next_move(Some(Move::new(row, col))).await);
        }
        last.expect("at least one move")
    }

    #[tokio::test]
    async fn test_top_row_win() {
        let mut game = random_game(None);
        let result = play(&mut game, &[(0, 0), (1, 1), (0, 1), (2, 2), (0, 2)]).await;

        assert!(result.success);
        assert_eq!(result.message, "Player X wins!");
        assert_eq!(result.winner, Some(Mark::X));
        assert!(result.game_over);
        assert!(!result.is_draw);
        assert!(result.current_player.is_none());
        assert_eq!(game.history().len(), 5);
    }

    #[tokio::test]
    async fn test_full_board_draw() {
        let mut game = random_game(None);
        let result = play(
            &mut game,
            &[(0, 0), (0, 1), (0, 2), (1, 1), (1, 0), (1, 2), (2, 1), (2, 0), (2, 2)],
        )
        .await;

        assert!(result.success);
        assert_eq!(result.message, "It's a draw!");
        assert!(result.is_draw);
        assert!(result.winner.is_none());
        assert_eq!(game.history().len(), 9);
    }

    #[tokio::test]
    async fn test_occupied_cell_leaves_state_unchanged() {
        let mut game = random_game(None);
        play(&mut game, &[(1, 1)]).await;
        let before = game.state();

        let result = game.apply_next_move(Some(Move::new(1, 1))).await;

        assert!(!result.success);
        assert_eq!(result.message, "Invalid move at (1, 1)");
        assert_eq!(result.current_player, Some(Mark::O));
        assert_eq!(game.state(), before);
    }

    #[tokio::test]
    async fn test_out_of_range_move_rejected() {
        let mut game = random_game(None);
        let result = game.apply_next_move(Some(Move::new(3, -1))).await;
        assert!(!result.success);
        assert_eq!(result.message, "Invalid move at (3, -1)");
        assert!(game.history().is_empty());
    }

    #[tokio::test]
    async fn test_finished_game_rejects_moves_without_events() {
        let sink = Arc::new(MemorySink::new());
        let mut game = random_game(Some(sink.clone()));
        play(&mut game, &[(0, 0), (1, 1), (0, 1), (2, 2), (0, 2)]).await;
        let logged = sink.moves().len();

        let result = game.apply_next_move(None).await;

        assert!(!result.success);
        assert_eq!(result.message, "Game is already over");
        assert!(result.metadata.is_none());
        assert_eq!(sink.moves().len(), logged);
        assert_eq!(sink.games().len(), 1);
    }

    #[tokio::test]
    async fn test_events_recorded_for_valid_and_invalid_moves() {
        let sink = Arc::new(MemorySink::new());
        let mut game = random_game(Some(sink.clone()));

        game.apply_next_move(Some(Move::new(0, 0))).await;
        game.apply_next_move(Some(Move::new(0, 0))).await;

        let moves = sink.moves();
        assert_eq!(moves.len(), 2);
        assert!(moves[0].move_valid);
        assert_eq!(moves[0].move_number, 1);
        assert_eq!(moves[0].available_moves.len(), 9);
        assert_eq!(moves[0].chooser, ChooserKind::Manual);
        assert!(!moves[1].move_valid);
        assert_eq!(moves[1].move_number, 2);
        assert_eq!(moves[1].player, Mark::O);
        assert_eq!(moves[1].board.occupied(), 1);
    }

    #[tokio::test]
    async fn test_play_to_completion_invariants() {
        let sink = Arc::new(MemorySink::new());
        let mut game = random_game(Some(sink.clone()));

        let summary = game.play_to_completion().await;

        assert!(summary.winner.is_some() ^ summary.is_draw);
        assert_eq!(summary.total_moves, game.history().len());
        assert!(summary.moves.iter().all(|m| m.success));
        assert_eq!(summary.moves.len(), summary.total_moves);
        assert_eq!(summary.board.occupied(), summary.total_moves);

        let games = sink.games();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].total_moves, summary.total_moves);
        assert_eq!(games[0].player_x_kind, ChooserKind::Random);
    }

    #[tokio::test]
    async fn test_available_plus_history_is_nine() {
        let mut game = random_game(None);
        while !game.game_over() {
            let state = game.state();
            assert_eq!(state.available_moves.len() + state.move_history.len(), 9);
            game.apply_next_move(None).await;
        }
        assert!(game.state().available_moves.is_empty());
    }

    #[tokio::test]
    async fn test_reset_restores_initial_state() {
        let mut game = random_game(None);
        let initial = game.state();
        let id = game.id().clone();

        game.play_to_completion().await;
        game.reset();

        assert_eq!(game.state(), initial);
        assert_eq!(game.id(), &id);
        assert_eq!(game.player(Mark::X).name(), "Player X");
    }

    #[tokio::test]
    async fn test_summary_follows_game() {
        let mut game = random_game(None);
        let feed = game.subscribe();
        assert_eq!(feed.borrow().game_id, *game.id());
        assert!(!feed.borrow().game_over);

        let summary = game.play_to_completion().await;
        assert!(feed.borrow().game_over);
        assert_eq!(feed.borrow().winner, summary.winner);

        game.reset();
        assert!(!feed.borrow().game_over);
        assert!(feed.borrow().winner.is_none());
    }
}
