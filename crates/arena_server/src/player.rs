//! Players and the chooser factory.

use crate::chooser::{ChooserKind, ExternalChooser, MoveChooser, RandomChooser};
use crate::config::LlmSettings;
use crate::llm_client::{LlmClient, LlmProvider};
use arena_board::Mark;
use derive_getters::Getters;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

/// How one side picks its moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlayerConfig {
    /// Ask a language model instead of picking at random.
    #[serde(default, alias = "use_llm")]
    pub use_external_chooser: bool,
    /// Model provider.
    #[serde(default)]
    pub provider: LlmProvider,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            use_external_chooser: false,
            provider: LlmProvider::default(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

impl PlayerConfig {
    /// Random player.
    pub fn random() -> Self {
        Self::default()
    }

    /// Language-model player.
    pub fn external(provider: LlmProvider, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            use_external_chooser: true,
            provider,
            model: model.into(),
            temperature,
        }
    }
}

/// One side of a game.
#[derive(Debug, Clone, Getters)]
pub struct Player {
    /// Symbol played.
    mark: Mark,
    /// Display name.
    name: String,
    /// Move strategy.
    chooser: Arc<dyn MoveChooser>,
    /// Configuration the chooser was built from.
    config: PlayerConfig,
}

impl Player {
    /// Creates a player, deriving the display name from the chooser.
    pub fn new(mark: Mark, chooser: Arc<dyn MoveChooser>, config: PlayerConfig) -> Self {
        let name = match chooser.model_name() {
            Some(model) => format!("{} ({})", mark, model),
            None => format!("Player {}", mark),
        };
        Self {
            mark,
            name,
            chooser,
            config,
        }
    }

    /// Chooser kind actually in use.
    pub fn kind(&self) -> ChooserKind {
        self.chooser.kind()
    }

    /// Model name, if the chooser is external.
    pub fn model(&self) -> Option<&str> {
        self.chooser.model_name()
    }
}

/// Builds players from their configuration.
#[derive(Debug, Clone, Default)]
pub struct PlayerFactory {
    settings: LlmSettings,
    seed: Option<u64>,
}

impl PlayerFactory {
    /// Creates a factory using the given model settings.
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            settings,
            seed: None,
        }
    }

    /// Seeds every random chooser this factory builds.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn random_for(&self, mark: Mark) -> RandomChooser {
        match (self.seed, mark) {
            (Some(seed), Mark::X) => RandomChooser::seeded(seed),
            (Some(seed), Mark::O) => RandomChooser::seeded(seed.wrapping_add(1)),
            (None, _) => RandomChooser::new(),
        }
    }

    /// Builds a player.
    ///
    /// An external player whose provider has no API key, or whose client
    /// cannot be built, is downgraded to a random player.
    #[instrument(skip(self, config), fields(external = config.use_external_chooser))]
    pub fn build(&self, mark: Mark, config: PlayerConfig) -> Player {
        if !config.use_external_chooser {
            return Player::new(mark, Arc::new(self.random_for(mark)), config);
        }

        let client = self
            .settings
            .client_config(config.provider, &config.model, config.temperature)
            .map_err(|e| e.message)
            .and_then(|llm| LlmClient::new(llm).map_err(|e| e.message));

        match client {
            Ok(client) => {
                info!(provider = %config.provider, model = %config.model, "External player ready");
                let chooser = ExternalChooser::with_fallback(
                    Arc::new(client),
                    self.settings.timeout(),
                    self.random_for(mark),
                );
                Player::new(mark, Arc::new(chooser), config)
            }
            Err(reason) => {
                warn!(%reason, "External chooser unavailable, using random player");
                Player::new(mark, Arc::new(self.random_for(mark)), config)
            }
        }
    }
}
