//! Move resolution: asking the move service for a cell, with a local
//! random fallback when anything about the exchange goes wrong.

use crate::game::{Board, Mark};
use crate::service::{MoveRequest, MoveResponse, MOVE_ENDPOINT_PATH};
use derive_more::{Display, Error};
use rand::Rng;
use tracing::{debug, instrument, warn};

/// Errors a resolver can surface to its caller.
///
/// Transport and parse failures never appear here; they are absorbed by
/// the fallback. Only the no-legal-move precondition violation escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum ResolveError {
    /// The board has no empty cell to play.
    #[display("no empty cell available for a move")]
    NoEmptyCell,
}

/// A source of moves for one player.
#[async_trait::async_trait]
pub trait MoveResolver: Send + Sync {
    /// Resolves the next move for `mark` on `board`.
    ///
    /// On success the returned index references a currently-empty cell.
    ///
    /// # Errors
    ///
    /// [`ResolveError::NoEmptyCell`] if the board is full; callers must
    /// not request a move in that situation.
    async fn resolve(&self, board: &Board, mark: Mark) -> Result<usize, ResolveError>;

    /// Returns the resolver's display name.
    fn name(&self) -> &str;
}

/// Selects a uniform-random empty cell.
///
/// This is the shared fallback for every resolver failure path.
#[instrument]
pub fn fallback_move(board: &Board) -> Result<usize, ResolveError> {
    let empty = board.empty_cells();
    if empty.is_empty() {
        return Err(ResolveError::NoEmptyCell);
    }
    let cell = empty[rand::rng().random_range(0..empty.len())];
    debug!(cell, "Selected fallback move");
    Ok(cell)
}

/// Resolver that asks the move service over HTTP.
///
/// One request per move, no retries, no caching. Any transport failure,
/// non-2xx status, malformed body, or illegal suggested index falls back
/// to a random empty cell.
#[derive(Debug, Clone)]
pub struct HttpResolver {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl HttpResolver {
    /// Creates a resolver against a move service base URL, playing with
    /// the given model identifier.
    ///
    /// The model string is free-form; the completion provider decides
    /// whether it recognizes it.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Requests a move suggestion from the service.
    async fn request_move(&self, board: &Board, mark: Mark) -> anyhow::Result<usize> {
        let request = MoveRequest {
            board: board.clone(),
            player: mark,
            model: self.model.clone(),
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, MOVE_ENDPOINT_PATH))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("move service returned {}: {}", status, body);
        }

        let reply: MoveResponse = response.json().await?;
        Ok(reply.cell)
    }
}

#[async_trait::async_trait]
impl MoveResolver for HttpResolver {
    #[instrument(skip(self, board), fields(model = %self.model, mark = %mark))]
    async fn resolve(&self, board: &Board, mark: Mark) -> Result<usize, ResolveError> {
        match self.request_move(board, mark).await {
            Ok(cell) if cell < 9 && board.is_empty(cell) => {
                debug!(cell, "Move service suggested a valid cell");
                Ok(cell)
            }
            Ok(cell) => {
                warn!(cell, "Move service suggested an illegal cell, falling back");
                fallback_move(board)
            }
            Err(e) => {
                warn!(error = %e, "Move request failed, falling back");
                fallback_move(board)
            }
        }
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Resolver that always plays a uniform-random empty cell.
///
/// Used for offline play and as a test opponent; it is exactly the
/// fallback policy promoted to a player.
#[derive(Debug, Clone)]
pub struct RandomResolver {
    name: String,
}

impl RandomResolver {
    /// Creates a new random resolver.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait::async_trait]
impl MoveResolver for RandomResolver {
    async fn resolve(&self, board: &Board, _mark: Mark) -> Result<usize, ResolveError> {
        fallback_move(board)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
