//! Tic-tac-toe arena - unified CLI.

use anyhow::Result;
use arena_board::Mark;
use arena_server::api::{self, AppState};
use arena_server::cli::{Cli, Command};
use arena_server::events::{CsvEventLog, EventSink};
use arena_server::{Game, GameRegistry, PlayerConfig, PlayerFactory, ServerConfig};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,arena_server=debug")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::load_or_default(&cli.config)?;
    if let Some(secs) = cli.llm_timeout {
        config.llm_mut().set_timeout_secs(secs);
    }

    match cli.command {
        Command::Serve {
            host,
            port,
            log_dir,
            no_logging,
        } => {
            if let Some(host) = host {
                config.set_host(host);
            }
            if let Some(port) = port {
                config.set_port(port);
            }
            apply_log_overrides(&mut config, log_dir, no_logging);
            run_server(config).await
        }
        Command::Play {
            x_external,
            o_external,
            provider,
            model,
            x_temperature,
            o_temperature,
            seed,
            log_dir,
            no_logging,
        } => {
            apply_log_overrides(&mut config, log_dir, no_logging);
            let side = |external: bool, temperature: f32| {
                if external {
                    PlayerConfig::external(provider, model.clone(), temperature)
                } else {
                    PlayerConfig::random()
                }
            };
            let player_x = side(x_external, x_temperature);
            let player_o = side(o_external, o_temperature);
            run_battle(config, player_x, player_o, seed).await
        }
    }
}

fn apply_log_overrides(config: &mut ServerConfig, log_dir: Option<PathBuf>, no_logging: bool) {
    if let Some(dir) = log_dir {
        config.set_log_dir(dir);
    }
    if no_logging {
        config.set_enable_logging(false);
    }
}

/// Opens the CSV event log when logging is enabled.
fn open_sink(config: &ServerConfig) -> Result<Option<Arc<dyn EventSink>>> {
    if !*config.enable_logging() {
        info!("Event logging disabled");
        return Ok(None);
    }
    let log = CsvEventLog::new(config.log_dir())?;
    Ok(Some(Arc::new(log)))
}

/// Run the HTTP game service
#[instrument(skip_all, fields(addr = %config.bind_addr()))]
async fn run_server(config: ServerConfig) -> Result<()> {
    let sink = open_sink(&config)?;
    let registry = GameRegistry::new(PlayerFactory::new(config.llm().clone()), sink);
    let app = api::router(AppState::new(registry));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("Server ready at http://{}/", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Completes when Ctrl+C is received.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, stopping server"),
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
    }
}

/// Play one local game and print the transcript
#[instrument(skip_all)]
async fn run_battle(
    config: ServerConfig,
    player_x: PlayerConfig,
    player_o: PlayerConfig,
    seed: Option<u64>,
) -> Result<()> {
    let mut factory = PlayerFactory::new(config.llm().clone());
    if let Some(seed) = seed {
        factory = factory.with_seed(seed);
    }
    let x = factory.build(Mark::X, player_x);
    let o = factory.build(Mark::O, player_o);
    let sink = open_sink(&config)?;
    let paths = sink.as_ref().and_then(|s| s.log_paths());
    let mut game = Game::new(x, o, sink);

    let mut stdout = std::io::stdout();
    arena_server::battle::run(&mut game, &mut stdout).await?;

    if let Some(paths) = paths {
        println!();
        println!("Move log: {}", paths.moves.display());
        println!("Game log: {}", paths.games.display());
    }
    Ok(())
}
