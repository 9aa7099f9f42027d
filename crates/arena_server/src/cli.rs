//! Command-line interface for the arena.

use crate::llm_client::LlmProvider;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tic-tac-toe arena - game service with random and LLM players
#[derive(Parser, Debug)]
#[command(name = "arena")]
#[command(about = "Tic-tac-toe game service with LLM move choosers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Seconds allowed for one model move request (overrides config)
    #[arg(long, global = true)]
    pub llm_timeout: Option<u64>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game service
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory for CSV event logs (overrides config)
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Disable event logging
        #[arg(long)]
        no_logging: bool,
    },

    /// Play one game locally and print every move
    Play {
        /// Let a language model play X
        #[arg(long)]
        x_external: bool,

        /// Let a language model play O
        #[arg(long)]
        o_external: bool,

        /// Model provider for external players
        #[arg(long, default_value = "openai")]
        provider: LlmProvider,

        /// Model name for external players
        #[arg(long, default_value = "gpt-4o-mini")]
        model: String,

        /// Sampling temperature for X
        #[arg(long, default_value_t = 0.7)]
        x_temperature: f32,

        /// Sampling temperature for O
        #[arg(long, default_value_t = 0.7)]
        o_temperature: f32,

        /// Seed for the random choosers
        #[arg(long)]
        seed: Option<u64>,

        /// Directory for CSV event logs (overrides config)
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Disable event logging
        #[arg(long)]
        no_logging: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_arguments() {
        let cli = Cli::parse_from([
            "arena",
            "play",
            "--o-external",
            "--provider",
            "Mistral",
            "--seed",
            "4",
        ]);
        match cli.command {
            Command::Play {
                x_external,
                o_external,
                provider,
                seed,
                ..
            } => {
                assert!(!x_external);
                assert!(o_external);
                assert_eq!(provider, LlmProvider::Mistral);
                assert_eq!(seed, Some(4));
                assert_eq!(cli.llm_timeout, None);
            }
            Command::Serve { .. } => panic!("expected play"),
        }
    }

    #[test]
    fn test_llm_timeout_after_subcommand() {
        let cli = Cli::parse_from(["arena", "serve", "--llm-timeout", "12"]);
        assert_eq!(cli.llm_timeout, Some(12));
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::parse_from(["arena", "serve"]);
        assert_eq!(cli.config, PathBuf::from("arena.toml"));
        assert!(matches!(
            cli.command,
            Command::Serve {
                port: None,
                no_logging: false,
                ..
            }
        ));
    }
}
