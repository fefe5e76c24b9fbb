//! Win detection for tic-tac-toe.

use crate::game::types::{Board, Cell, Mark};
use tracing::instrument;

/// The 8 winning lines: rows, then columns, then diagonals.
///
/// Line order is observable: on a malformed board with multiple complete
/// lines the first match in this order wins.
const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Checks if there is a winner on the board.
///
/// Returns `Some(mark)` if that mark occupies all three cells of any
/// line, `None` otherwise. Total over every well-formed board, legal
/// or not.
#[instrument]
pub fn check_winner(board: &Board) -> Option<Mark> {
    for [a, b, c] in LINES {
        let cell = board.get(a);
        if cell != Some(Cell::Empty) && cell == board.get(b) && cell == board.get(c) {
            if let Some(Cell::Occupied(mark)) = cell {
                return Some(mark);
            }
        }
    }

    None
}
