//! Tic-Tac-Toe Arena - LLM agents playing tic-tac-toe.

#![warn(missing_docs)]

mod cli;
mod completion;
mod config;
mod game;
mod resolver;
mod service;
mod session;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use completion::{LlmClient, LlmConfig, LlmProvider};
use config::{AgentSpec, MatchConfig};
use game::GameStatus;
use resolver::{HttpResolver, MoveResolver, RandomResolver};
use session::{AdvanceOutcome, GameSession};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            host,
            provider,
        } => run_serve(host, port, provider).await,
        Command::Play {
            server_url,
            config,
            x_model,
            o_model,
            provider,
            games,
            offline,
        } => run_play(server_url, config, x_model, o_model, provider, games, offline).await,
    }
}

/// Runs the move-resolution HTTP service.
async fn run_serve(host: String, port: u16, provider: LlmProvider) -> Result<()> {
    let llm_config = LlmConfig::from_env(provider)?;
    let client = LlmClient::new(llm_config);
    let app = service::router(Arc::new(client));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %listener.local_addr()?, "Move service listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Plays one or more matches, printing the board after every move.
async fn run_play(
    server_url: Option<String>,
    config: Option<std::path::PathBuf>,
    x_model: Option<String>,
    o_model: Option<String>,
    provider: LlmProvider,
    games: u32,
    offline: bool,
) -> Result<()> {
    let match_config = match config {
        Some(path) => MatchConfig::from_file(path)?,
        None => MatchConfig::default(),
    };
    let spec_x = match x_model {
        Some(model) => AgentSpec::for_model(model),
        None => match_config.player_x().clone(),
    };
    let spec_o = match o_model {
        Some(model) => AgentSpec::for_model(model),
        None => match_config.player_o().clone(),
    };

    let (resolver_x, resolver_o): (Arc<dyn MoveResolver>, Arc<dyn MoveResolver>) = if offline {
        info!("Playing offline with random agents");
        (
            Arc::new(RandomResolver::new("random (X)")),
            Arc::new(RandomResolver::new("random (O)")),
        )
    } else {
        let base_url = match server_url {
            Some(url) => url,
            None => spawn_local_service(provider).await?,
        };
        info!(base_url = %base_url, "Using move service");
        (
            Arc::new(HttpResolver::new(base_url.clone(), spec_x.model().clone())),
            Arc::new(HttpResolver::new(base_url, spec_o.model().clone())),
        )
    };

    let session = GameSession::new(resolver_x, resolver_o);

    for game_number in 1..=games {
        if game_number > 1 {
            session.reset();
        }
        println!("=== Game {game_number} ===");
        play_one_game(&session).await?;
    }

    Ok(())
}

/// Drives a single game to a terminal state.
async fn play_one_game(session: &GameSession) -> Result<()> {
    loop {
        let snapshot = session.snapshot();
        match snapshot.status {
            GameStatus::Won(winner) => {
                println!("{}", snapshot.board.display());
                println!("{} ({winner}) wins!", session.player_name(winner));
                return Ok(());
            }
            GameStatus::Draw => {
                println!("{}", snapshot.board.display());
                println!("Draw.");
                return Ok(());
            }
            GameStatus::InProgress => {}
        }

        if let AdvanceOutcome::Applied { mark, cell } = session.advance().await? {
            println!(
                "{} ({mark}) plays {cell}",
                session.player_name(mark)
            );
            println!("{}\n", session.snapshot().board.display());
        }
    }
}

/// Spawns the move service in-process on an ephemeral port, returning its
/// base URL (standalone mode: play without a separately-started server).
async fn spawn_local_service(provider: LlmProvider) -> Result<String> {
    let llm_config = LlmConfig::from_env(provider)?;
    let client = LlmClient::new(llm_config);
    let app = service::router(Arc::new(client));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    info!(addr = %addr, "Spawning in-process move service");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "In-process move service failed");
        }
    });

    Ok(format!("http://{}", addr))
}
