//! Game session: the loop that drives resolvers against the game state.

use crate::game::{Board, GameState, GameStatus, HistoryEntry, Mark, MoveError};
use crate::resolver::{MoveResolver, ResolveError};
use derive_more::{Display, Error, From};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

/// Errors surfaced by [`GameSession::advance`].
///
/// Both variants are precondition violations that legal play cannot
/// reach: the loop never asks a resolver for a move on a full board, and
/// a well-behaved resolver never returns an occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From)]
pub enum SessionError {
    /// The resolver had no legal move to pick.
    #[display("resolver failed: {_0}")]
    Resolve(ResolveError),
    /// The resolved move could not be applied.
    #[display("resolved move rejected: {_0}")]
    Move(MoveError),
}

/// Outcome of a single [`GameSession::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// A move was resolved and applied.
    Applied {
        /// The mark that moved.
        mark: Mark,
        /// The cell it played.
        cell: usize,
    },
    /// Nothing happened: the game is over or a move is already in flight.
    Skipped,
    /// The session was reset while the move was in flight; the resolver's
    /// answer was dropped without touching the new state.
    Discarded,
}

/// Read-only view of the session for the presentation side.
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    /// The board.
    pub board: Board,
    /// The mark whose turn it is.
    pub current_player: Mark,
    /// Current status.
    pub status: GameStatus,
    /// Moves applied so far, in order.
    pub history: Vec<HistoryEntry>,
    /// True while a move resolution is in flight.
    pub awaiting_move: bool,
}

struct Inner {
    state: GameState,
    awaiting_move: bool,
    generation: u64,
}

/// A running game between two resolvers.
///
/// The session owns the game state; callers interact only through
/// [`advance`](GameSession::advance), [`reset`](GameSession::reset), and
/// [`snapshot`](GameSession::snapshot). At most one move resolution is in
/// flight at a time, and a reset while one is outstanding discards the
/// eventual answer instead of applying it to the fresh state.
#[derive(Clone)]
pub struct GameSession {
    inner: Arc<Mutex<Inner>>,
    resolver_x: Arc<dyn MoveResolver>,
    resolver_o: Arc<dyn MoveResolver>,
}

impl GameSession {
    /// Creates a session with one resolver per mark.
    #[instrument(skip_all)]
    pub fn new(resolver_x: Arc<dyn MoveResolver>, resolver_o: Arc<dyn MoveResolver>) -> Self {
        info!(
            player_x = resolver_x.name(),
            player_o = resolver_o.name(),
            "Creating game session"
        );
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: GameState::new(),
                awaiting_move: false,
                generation: 0,
            })),
            resolver_x,
            resolver_o,
        }
    }

    /// Returns a snapshot of the current session state.
    pub fn snapshot(&self) -> GameSnapshot {
        let inner = self.inner.lock().unwrap();
        GameSnapshot {
            board: inner.state.board().clone(),
            current_player: inner.state.current_player(),
            status: inner.state.status().clone(),
            history: inner.state.history().to_vec(),
            awaiting_move: inner.awaiting_move,
        }
    }

    /// Returns the display name of the resolver playing the given mark.
    pub fn player_name(&self, mark: Mark) -> &str {
        match mark {
            Mark::X => self.resolver_x.name(),
            Mark::O => self.resolver_o.name(),
        }
    }

    /// Plays one turn: resolves a move for the current player and applies it.
    ///
    /// A no-op (`Skipped`) when the game is over or another resolution is
    /// already in flight. If [`reset`](GameSession::reset) lands while the
    /// resolver call is outstanding, the answer is discarded (`Discarded`)
    /// and the fresh state is left untouched.
    ///
    /// The internal lock is never held across the resolver await.
    #[instrument(skip(self))]
    pub async fn advance(&self) -> Result<AdvanceOutcome, SessionError> {
        let (board, mark, generation) = {
            let mut inner = self.inner.lock().unwrap();
            if inner.state.is_over() {
                debug!("Game already over, ignoring advance");
                return Ok(AdvanceOutcome::Skipped);
            }
            if inner.awaiting_move {
                debug!("Move already in flight, ignoring advance");
                return Ok(AdvanceOutcome::Skipped);
            }
            inner.awaiting_move = true;
            (
                inner.state.board().clone(),
                inner.state.current_player(),
                inner.generation,
            )
        };

        let resolver = match mark {
            Mark::X => &self.resolver_x,
            Mark::O => &self.resolver_o,
        };

        debug!(player = resolver.name(), mark = %mark, "Resolving move");
        let resolved = resolver.resolve(&board, mark).await;

        let mut inner = self.inner.lock().unwrap();
        if inner.generation != generation {
            warn!("Session was reset mid-resolution, discarding resolver answer");
            return Ok(AdvanceOutcome::Discarded);
        }
        inner.awaiting_move = false;

        let cell = resolved?;
        inner.state.apply(cell)?;

        info!(
            player = resolver.name(),
            mark = %mark,
            cell,
            status = ?inner.state.status(),
            "Move applied"
        );
        Ok(AdvanceOutcome::Applied { mark, cell })
    }

    /// Replaces the session with a fresh initial state.
    ///
    /// Allowed from any state, including while a resolution is in flight;
    /// bumping the generation makes the in-flight answer land harmlessly.
    #[instrument(skip(self))]
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.generation += 1;
        inner.state = GameState::new();
        inner.awaiting_move = false;
        info!(generation = inner.generation, "Session reset");
    }
}
