//! Command-line interface for tictactoe_arena.

use crate::completion::LlmProvider;
use clap::{Parser, Subcommand};

/// Tic-tac-toe matches played by LLM agents
#[derive(Parser, Debug)]
#[command(name = "tictactoe_arena")]
#[command(about = "Tic-tac-toe matches played by LLM agents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the move-resolution HTTP service
    Serve {
        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Completion provider backing the service
        #[arg(long, value_enum, default_value = "open-ai")]
        provider: LlmProvider,
    },

    /// Play matches between two agents, printing the board each turn
    Play {
        /// Move service URL. If not provided, a service is spawned
        /// in-process on an ephemeral port.
        #[arg(long)]
        server_url: Option<String>,

        /// Path to a TOML match config (player models)
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Model for player X (overrides config)
        #[arg(long)]
        x_model: Option<String>,

        /// Model for player O (overrides config)
        #[arg(long)]
        o_model: Option<String>,

        /// Completion provider for the in-process service
        #[arg(long, value_enum, default_value = "open-ai")]
        provider: LlmProvider,

        /// Number of games to play (the session resets between games)
        #[arg(long, default_value = "1")]
        games: u32,

        /// Play with random agents only, no network or API key needed
        #[arg(long)]
        offline: bool,
    },
}
