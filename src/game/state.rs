//! Game state and the single apply-one-move transition.

use super::rules::{check_winner, is_draw};
use super::types::{Board, Cell, GameStatus, HistoryEntry, Mark};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Errors from applying a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// Cell index is outside 0-8.
    #[display("cell index out of range")]
    OutOfRange,
    /// Cell is already occupied.
    #[display("cell is already occupied")]
    CellOccupied,
    /// The game has already ended.
    #[display("game is already over")]
    GameOver,
}

/// Complete game state.
///
/// Mutated only through [`GameState::apply`]; the status is recomputed from
/// the board after every move and the history is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    board: Board,
    current_player: Mark,
    status: GameStatus,
    history: Vec<HistoryEntry>,
}

impl GameState {
    /// Creates a fresh game: empty board, X to move, in progress.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_player: Mark::X,
            status: GameStatus::InProgress,
            history: Vec::new(),
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the mark whose turn it is.
    pub fn current_player(&self) -> Mark {
        self.current_player
    }

    /// Returns the game status.
    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    /// Returns the move history.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Returns true once the game has reached a terminal status.
    pub fn is_over(&self) -> bool {
        self.status != GameStatus::InProgress
    }

    /// Applies one move for the current player at the given cell.
    ///
    /// Validates the cell, places the mark, appends to the history, and
    /// recomputes the status from the board (winner before draw). The
    /// current player flips only while the game continues.
    ///
    /// # Errors
    ///
    /// [`MoveError::GameOver`] in a terminal state, [`MoveError::OutOfRange`]
    /// for a cell above 8, [`MoveError::CellOccupied`] for a taken cell.
    #[instrument(skip(self), fields(player = %self.current_player))]
    pub fn apply(&mut self, cell: usize) -> Result<(), MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if cell >= 9 {
            return Err(MoveError::OutOfRange);
        }
        if !self.board.is_empty(cell) {
            return Err(MoveError::CellOccupied);
        }

        let mark = self.current_player;
        self.board.set(cell, Cell::Occupied(mark));
        self.history.push(HistoryEntry { mark, cell });

        if let Some(winner) = check_winner(&self.board) {
            debug!(winner = %winner, "Game won");
            self.status = GameStatus::Won(winner);
        } else if is_draw(&self.board) {
            debug!("Game drawn");
            self.status = GameStatus::Draw;
        } else {
            self.current_player = mark.opponent();
        }

        Ok(())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
