//! Game state machine through the public API.

use arena_board::{Mark, Move};
use arena_server::chooser::{ChooserKind, ExternalChooser, RandomChooser};
use arena_server::events::MemorySink;
use arena_server::{CompletionClient, Game, LlmError, Player, PlayerConfig, PlayerFactory};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Completion client that always fails.
#[derive(Debug)]
struct AlwaysFails;

#[async_trait]
impl CompletionClient for AlwaysFails {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
        Err(LlmError::new("provider unavailable".to_string()))
    }

    fn model(&self) -> &str {
        "broken-model"
    }
}

/// Completion client that never answers in time.
#[derive(Debug)]
struct NeverAnswers;

#[async_trait]
impl CompletionClient for NeverAnswers {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(String::new())
    }

    fn model(&self) -> &str {
        "slow-model"
    }
}

fn random_players(seed: u64) -> (Player, Player) {
    let factory = PlayerFactory::default().with_seed(seed);
    (
        factory.build(Mark::X, PlayerConfig::random()),
        factory.build(Mark::O, PlayerConfig::random()),
    )
}

fn external_player(mark: Mark, client: Arc<dyn CompletionClient>, timeout: Duration) -> Player {
    let chooser = ExternalChooser::with_fallback(client, timeout, RandomChooser::seeded(5));
    Player::new(
        mark,
        Arc::new(chooser),
        PlayerConfig::external(Default::default(), "broken-model", 0.7),
    )
}

async fn apply_all(game: &mut Game, moves: &[(i32, i32)]) {
    for &(row, col) in moves {
        game.apply_next_move(Some(Move::new(row, col))).await;
    }
}

#[tokio::test]
async fn test_scenario_x_wins_top_row() {
    let (x, o) = random_players(1);
    let mut game = Game::new(x, o, None);

    apply_all(&mut game, &[(0, 0), (1, 1), (0, 1), (2, 2), (0, 2)]).await;

    let state = game.state();
    assert_eq!(state.winner, Some(Mark::X));
    assert!(state.game_over);
    assert!(!state.is_draw);
    assert_eq!(state.move_history.len(), 5);
    assert!(state.available_moves.is_empty());
    assert!(state.current_player.is_none());
}

#[tokio::test]
async fn test_scenario_draw() {
    let (x, o) = random_players(2);
    let mut game = Game::new(x, o, None);

    apply_all(
        &mut game,
        &[(0, 0), (0, 1), (0, 2), (1, 1), (1, 0), (1, 2), (2, 1), (2, 0), (2, 2)],
    )
    .await;

    let state = game.state();
    assert!(state.is_draw);
    assert!(state.winner.is_none());
    assert_eq!(state.move_history.len(), 9);
}

#[tokio::test]
async fn test_scenario_occupied_cell() {
    let (x, o) = random_players(3);
    let mut game = Game::new(x, o, None);
    apply_all(&mut game, &[(0, 0), (1, 1)]).await;
    let before = game.state();

    let result = game.apply_next_move(Some(Move::new(1, 1))).await;

    assert!(!result.success);
    assert_eq!(result.message, "Invalid move at (1, 1)");
    assert_eq!(game.state(), before);
    assert_eq!(before.current_player, Some(Mark::X));
}

#[tokio::test]
async fn test_external_failure_falls_back_to_legal_move() {
    let sink = Arc::new(MemorySink::new());
    let x = external_player(Mark::X, Arc::new(AlwaysFails), Duration::from_secs(2));
    let (_, o) = random_players(4);
    let mut game = Game::new(x, o, Some(sink.clone()));
    assert_eq!(game.player(Mark::X).name(), "X (broken-model)");

    let result = game.apply_next_move(None).await;

    assert!(result.success);
    let applied = result.applied.expect("move applied");
    assert!((0..3).contains(&applied.row) && (0..3).contains(&applied.col));
    let metadata = result.metadata.expect("metadata attached");
    assert_eq!(metadata.chooser, ChooserKind::External);
    assert!(metadata.error.as_deref().is_some_and(|e| e.contains("provider unavailable")));

    let events = sink.moves();
    assert_eq!(events.len(), 1);
    assert!(events[0].move_valid);
    assert!(events[0].prompt.is_some());
    assert!(events[0].error.is_some());
}

#[tokio::test]
async fn test_external_timeout_returns_within_budget() {
    let x = external_player(Mark::X, Arc::new(NeverAnswers), Duration::from_millis(100));
    let (_, o) = random_players(5);
    let mut game = Game::new(x, o, None);

    let started = Instant::now();
    let result = game.apply_next_move(None).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(result.success);
    assert!(
        result
            .metadata
            .and_then(|m| m.error)
            .is_some_and(|e| e.contains("timed out"))
    );
}

#[tokio::test]
async fn test_external_vs_random_completes_and_logs() {
    let sink = Arc::new(MemorySink::new());
    let x = external_player(Mark::X, Arc::new(AlwaysFails), Duration::from_secs(1));
    let (_, o) = random_players(6);
    let mut game = Game::new(x, o, Some(sink.clone()));

    let summary = game.play_to_completion().await;

    let games = sink.games();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].player_x_kind, ChooserKind::External);
    assert_eq!(games[0].player_x_model.as_deref(), Some("broken-model"));
    assert_eq!(games[0].player_o_kind, ChooserKind::Random);
    assert!(games[0].player_o_model.is_none());
    assert_eq!(games[0].winner, summary.winner);
    assert_eq!(sink.moves().len(), summary.total_moves);
}

#[tokio::test]
async fn test_reset_round_trip() {
    let (x, o) = random_players(7);
    let mut game = Game::new(x, o, None);
    let initial = game.state();
    let id = game.id().clone();
    let x_config = game.player(Mark::X).config().clone();

    game.play_to_completion().await;
    assert!(*game.game_over());
    game.reset();

    assert_eq!(game.state(), initial);
    assert_eq!(game.id(), &id);
    assert_eq!(game.player(Mark::X).config(), &x_config);

    let result = game.apply_next_move(Some(Move::new(2, 2))).await;
    assert!(result.success);
    assert_eq!(result.applied.map(|m| m.player), Some(Mark::X));
}

#[tokio::test]
async fn test_seeded_games_are_reproducible() {
    let (x1, o1) = random_players(42);
    let (x2, o2) = random_players(42);
    let mut first = Game::new(x1, o1, None);
    let mut second = Game::new(x2, o2, None);

    let a = first.play_to_completion().await;
    let b = second.play_to_completion().await;

    assert_eq!(a.board, b.board);
    assert_eq!(first.history(), second.history());
}
