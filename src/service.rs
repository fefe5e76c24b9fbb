//! HTTP move-resolution service.
//!
//! Exposes a single endpoint that asks a completion model for the next
//! tic-tac-toe move. Invalid model output degrades to a uniform-random
//! legal move; only a full board is a client error.

use crate::completion::Completion;
use crate::game::{Board, Mark};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Fixed path of the move-resolution endpoint.
pub const MOVE_ENDPOINT_PATH: &str = "/api/move";

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Request body for move resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Current board: 9 cells of `"X"`, `"O"`, or `null`.
    pub board: Board,
    /// The mark requesting a move.
    pub player: Mark,
    /// Model identifier, passed through to the completion provider.
    #[serde(default = "default_model")]
    pub model: String,
}

/// Successful move-resolution response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MoveResponse {
    /// Chosen cell index (0-8), guaranteed empty on the request board.
    #[serde(rename = "move")]
    pub cell: usize,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable failure description.
    pub error: String,
}

#[derive(Clone)]
struct AppState {
    completion: Arc<dyn Completion>,
}

/// Builds the move-resolution router around a completion backend.
pub fn router(completion: Arc<dyn Completion>) -> Router {
    Router::new()
        .route(MOVE_ENDPOINT_PATH, post(resolve_move))
        .with_state(AppState { completion })
}

/// System prompt sent with every move request.
///
/// The board legend is identical for every request so the prompt shape
/// stays deterministic across a game.
fn system_prompt(player: Mark) -> String {
    format!(
        "You are playing tic-tac-toe as player \"{player}\". \
         The board is represented as an array of 9 elements (0-8), where null means empty, \
         \"X\" means X has played there, and \"O\" means O has played there.\n\
         The indices are arranged as follows:\n\
         0 | 1 | 2\n\
         ---------\n\
         3 | 4 | 5\n\
         ---------\n\
         6 | 7 | 8\n\n\
         Analyze the current board and return ONLY the index (0-8) of your next move. \
         Choose the best strategic move."
    )
}

/// User message describing the current position.
fn user_message(board: &Board) -> String {
    let cells = serde_json::to_string(board).expect("board serializes");
    format!("Current board state: {}. What's your next move?", cells)
}

/// Resolves one move request.
///
/// The model reply must parse as an in-range index of an empty cell;
/// anything else falls back to a uniform-random empty cell. A full board
/// with nothing to choose from is a 400, a completion failure a 500.
#[instrument(skip(state, req), fields(player = %req.player, model = %req.model))]
async fn resolve_move(State(state): State<AppState>, Json(req): Json<MoveRequest>) -> Response {
    info!("Resolving move");

    let reply = match state
        .completion
        .complete(&system_prompt(req.player), &user_message(&req.board), &req.model)
        .await
    {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Completion request failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to process AI move".to_string(),
                }),
            )
                .into_response();
        }
    };

    debug!(reply = %reply, "Parsing model reply");

    match parse_move(&reply, &req.board) {
        Some(cell) => {
            info!(cell, "Model chose a valid move");
            (StatusCode::OK, Json(MoveResponse { cell })).into_response()
        }
        None => {
            let empty = req.board.empty_cells();
            if empty.is_empty() {
                warn!("No valid moves available");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "No valid moves available".to_string(),
                    }),
                )
                    .into_response();
            }

            let cell = empty[rand::rng().random_range(0..empty.len())];
            warn!(reply = %reply, cell, "Invalid model reply, falling back to random empty cell");
            (StatusCode::OK, Json(MoveResponse { cell })).into_response()
        }
    }
}

/// Parses a model reply as a legal move for the given board.
fn parse_move(reply: &str, board: &Board) -> Option<usize> {
    let cell: usize = reply.trim().parse().ok()?;
    if cell < 9 && board.is_empty(cell) {
        Some(cell)
    } else {
        None
    }
}
