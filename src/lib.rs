//! Tic-Tac-Toe Arena - tic-tac-toe played by LLM agents.
//!
//! Two configurable language-model agents play tic-tac-toe against each
//! other, mediated by a thin request/response loop against a completion
//! API.
//!
//! # Architecture
//!
//! - **Game**: pure rules (winner/draw detection) and the single
//!   apply-one-move state transition
//! - **Service**: axum HTTP endpoint that asks a completion model for the
//!   next move, with a server-side random fallback
//! - **Resolver**: per-player move source; the HTTP resolver calls the
//!   service and falls back to a random legal move on any failure
//! - **Session**: the game loop - single-flight move resolution,
//!   discard-on-reset, read-only snapshots for presentation
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tictactoe_arena::{GameSession, RandomResolver};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let session = GameSession::new(
//!     Arc::new(RandomResolver::new("X")),
//!     Arc::new(RandomResolver::new("O")),
//! );
//! while let tictactoe_arena::AdvanceOutcome::Applied { .. } = session.advance().await? {}
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod completion;
mod config;
mod game;
mod resolver;
mod service;
mod session;

// Crate-level exports - completion client
pub use completion::{Completion, CompletionError, LlmClient, LlmConfig, LlmProvider};

// Crate-level exports - configuration
pub use config::{AgentSpec, ConfigError, MatchConfig};

// Crate-level exports - game types and rules
pub use game::{
    check_winner, is_draw, Board, Cell, GameState, GameStatus, HistoryEntry, Mark, MoveError,
};

// Crate-level exports - move resolution
pub use resolver::{fallback_move, HttpResolver, MoveResolver, RandomResolver, ResolveError};

// Crate-level exports - move service
pub use service::{router, ErrorResponse, MoveRequest, MoveResponse, DEFAULT_MODEL, MOVE_ENDPOINT_PATH};

// Crate-level exports - game session
pub use session::{AdvanceOutcome, GameSession, GameSnapshot, SessionError};
