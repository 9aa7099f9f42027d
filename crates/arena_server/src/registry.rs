//! In-memory registry of live games.

use crate::events::EventSink;
use crate::game::{Game, GameId, GameSummary};
use crate::player::{PlayerConfig, PlayerFactory};
use arena_board::Mark;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, info, instrument};

/// Shared handle to one game.
pub type GameHandle = Arc<Mutex<Game>>;

/// A registered game and its listing feed.
#[derive(Debug, Clone)]
struct Entry {
    handle: GameHandle,
    summary: watch::Receiver<GameSummary>,
}

/// Cloneable registry of games keyed by identifier.
///
/// The map lock is held only for lookups and inserts; each game has its
/// own async mutex that serializes moves on it. Listings read each game's
/// published summary and never take the game mutex.
#[derive(Debug, Clone)]
pub struct GameRegistry {
    games: Arc<RwLock<HashMap<GameId, Entry>>>,
    players: PlayerFactory,
    sink: Option<Arc<dyn EventSink>>,
}

impl GameRegistry {
    /// Creates an empty registry.
    ///
    /// Games created with logging enabled report to `sink`.
    #[instrument(skip_all, fields(logging = sink.is_some()))]
    pub fn new(players: PlayerFactory, sink: Option<Arc<dyn EventSink>>) -> Self {
        info!("Creating game registry");
        Self {
            games: Arc::new(RwLock::new(HashMap::new())),
            players,
            sink,
        }
    }

    /// Event sink shared by logged games.
    pub fn sink(&self) -> Option<&Arc<dyn EventSink>> {
        self.sink.as_ref()
    }

    /// Builds and registers a game.
    #[instrument(skip(self, player_x, player_o))]
    pub async fn create(
        &self,
        player_x: PlayerConfig,
        player_o: PlayerConfig,
        enable_logging: bool,
    ) -> (GameId, GameHandle) {
        let x = self.players.build(Mark::X, player_x);
        let o = self.players.build(Mark::O, player_o);
        let sink = if enable_logging { self.sink.clone() } else { None };
        let game = Game::new(x, o, sink);
        let id = game.id().clone();
        let handle = self.register(game).await;
        (id, handle)
    }

    /// Registers an existing game under its own identifier.
    pub async fn register(&self, game: Game) -> GameHandle {
        let id = game.id().clone();
        let summary = game.subscribe();
        let handle = Arc::new(Mutex::new(game));

        let mut games = self.games.write().await;
        games.insert(
            id.clone(),
            Entry {
                handle: Arc::clone(&handle),
                summary,
            },
        );
        info!(game_id = %id, total = games.len(), "Game registered");
        handle
    }

    /// Looks up a game.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Option<GameHandle> {
        let found = self
            .games
            .read()
            .await
            .get(id)
            .map(|entry| Arc::clone(&entry.handle));
        debug!(found = found.is_some(), "Game lookup");
        found
    }

    /// Removes a game, returning whether it existed.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.games.write().await.remove(id).is_some();
        if removed {
            info!("Game removed");
        }
        removed
    }

    /// Number of registered games.
    pub async fn len(&self) -> usize {
        self.games.read().await.len()
    }

    /// Checks if no games are registered.
    pub async fn is_empty(&self) -> bool {
        self.games.read().await.is_empty()
    }

    /// Summaries of every game, ordered by identifier.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Vec<GameSummary> {
        let mut summaries: Vec<GameSummary> = self
            .games
            .read()
            .await
            .values()
            .map(|entry| entry.summary.borrow().clone())
            .collect();
        summaries.sort_by(|a, b| a.game_id.cmp(&b.game_id));
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chooser::{ChooserKind, LegalMoves, MoveChooser, MoveMetadata, RandomChooser};
    use crate::events::MemorySink;
    use crate::player::Player;
    use arena_board::{BoardSnapshot, Move};
    use async_trait::async_trait;
    use std::time::{Duration, Instant};

    /// Chooser that thinks for a while before picking.
    #[derive(Debug)]
    struct Slow {
        delay: Duration,
        inner: RandomChooser,
    }

    #[async_trait]
    impl MoveChooser for Slow {
        async fn choose(
            &self,
            legal: &LegalMoves,
            _board: &BoardSnapshot,
            _mark: Mark,
        ) -> (Move, MoveMetadata) {
            tokio::time::sleep(self.delay).await;
            (self.inner.pick(legal), MoveMetadata::new(ChooserKind::Random))
        }

        fn kind(&self) -> ChooserKind {
            ChooserKind::Random
        }
    }

    fn slow_game(delay: Duration) -> Game {
        let slow = |mark, seed| {
            let chooser = Slow {
                delay,
                inner: RandomChooser::seeded(seed),
            };
            Player::new(mark, Arc::new(chooser), PlayerConfig::random())
        };
        Game::new(slow(Mark::X, 1), slow(Mark::O, 2), None)
    }

    #[tokio::test]
    async fn test_create_get_remove() {
        let registry = GameRegistry::new(PlayerFactory::default(), None);
        let (id, _) = registry
            .create(PlayerConfig::random(), PlayerConfig::random(), true)
            .await;

        assert!(registry.get(&id).await.is_some());
        assert_eq!(registry.len().await, 1);
        assert!(registry.remove(&id).await);
        assert!(!registry.remove(&id).await);
        assert!(registry.get(&id).await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_logging_flag_controls_sink() {
        let sink = Arc::new(MemorySink::new());
        let registry = GameRegistry::new(PlayerFactory::default(), Some(sink.clone()));

        let (_, logged) = registry
            .create(PlayerConfig::random(), PlayerConfig::random(), true)
            .await;
        let (_, silent) = registry
            .create(PlayerConfig::random(), PlayerConfig::random(), false)
            .await;

        silent.lock().await.play_to_completion().await;
        assert!(sink.games().is_empty());

        logged.lock().await.play_to_completion().await;
        assert_eq!(sink.games().len(), 1);
    }

    #[tokio::test]
    async fn test_list_reports_outcomes() {
        let registry = GameRegistry::new(PlayerFactory::default().with_seed(9), None);
        let (id, handle) = registry
            .create(PlayerConfig::random(), PlayerConfig::random(), false)
            .await;
        let summary = handle.lock().await.play_to_completion().await;

        let list = registry.list().await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].game_id, id);
        assert!(list[0].game_over);
        assert_eq!(list[0].winner, summary.winner);
    }

    #[tokio::test]
    async fn test_list_does_not_wait_for_moves_in_flight() {
        let registry = GameRegistry::new(PlayerFactory::default(), None);
        let handle = registry.register(slow_game(Duration::from_secs(3))).await;
        registry
            .create(PlayerConfig::random(), PlayerConfig::random(), false)
            .await;

        let busy = Arc::clone(&handle);
        let pending = tokio::spawn(async move { busy.lock().await.apply_next_move(None).await });
        while handle.try_lock().is_ok() {
            tokio::task::yield_now().await;
        }

        let started = Instant::now();
        let list = registry.list().await;
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|row| !row.game_over));

        assert!(pending.await.expect("move task").success);
    }

    #[tokio::test]
    async fn test_concurrent_moves_keep_game_consistent() {
        let registry = GameRegistry::new(PlayerFactory::default().with_seed(3), None);
        let handle = registry.register(slow_game(Duration::from_millis(5))).await;

        let tasks: Vec<_> = (0..6)
            .map(|_| {
                let handle = Arc::clone(&handle);
                tokio::spawn(async move { handle.lock().await.apply_next_move(None).await })
            })
            .collect();
        let mut successes = 0;
        for task in tasks {
            if task.await.expect("move task").success {
                successes += 1;
            }
        }

        let state = handle.lock().await.state();
        assert_eq!(state.move_history.len(), successes);
        for pair in state.move_history.windows(2) {
            assert_eq!(pair[1].player, pair[0].player.opponent());
        }
        assert_eq!(state.move_history[0].player, Mark::X);
        if !state.game_over {
            assert_eq!(state.available_moves.len() + state.move_history.len(), 9);
        }
        assert_eq!(state.board.occupied(), state.move_history.len());
    }
}
