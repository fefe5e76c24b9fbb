//! Draw detection for tic-tac-toe.

use crate::game::types::Board;
use tracing::instrument;

/// Checks if the game is a draw: every cell occupied.
///
/// Callers must check [`check_winner`](super::check_winner) first; a full
/// board containing a winning line is a win, not a draw.
#[instrument]
pub fn is_draw(board: &Board) -> bool {
    board.is_full()
}

#[cfg(test)]
mod tests {
    use super::super::win::check_winner;
    use super::*;
    use crate::game::types::{Cell, Mark};

    #[test]
    fn test_empty_board_not_draw() {
        let board = Board::new();
        assert!(!is_draw(&board));
    }

    #[test]
    fn test_partial_board_not_draw() {
        let mut board = Board::new();
        board.set(4, Cell::Occupied(Mark::X));
        assert!(!is_draw(&board));
    }

    #[test]
    fn test_full_board_is_draw() {
        // X O X / O X X / O X O - full, no line
        let mut board = Board::new();
        let marks = [
            Mark::X,
            Mark::O,
            Mark::X,
            Mark::O,
            Mark::X,
            Mark::X,
            Mark::O,
            Mark::X,
            Mark::O,
        ];
        for (i, mark) in marks.into_iter().enumerate() {
            board.set(i, Cell::Occupied(mark));
        }
        assert!(is_draw(&board));
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_winning_line_takes_priority_over_draw() {
        // [X,X,X,O,O,_,_,_,_]: winner is X even though the winner check
        // and the draw check could both be asked about this board.
        let mut board = Board::new();
        board.set(0, Cell::Occupied(Mark::X));
        board.set(1, Cell::Occupied(Mark::X));
        board.set(2, Cell::Occupied(Mark::X));
        board.set(3, Cell::Occupied(Mark::O));
        board.set(4, Cell::Occupied(Mark::O));

        assert_eq!(check_winner(&board), Some(Mark::X));
        assert!(!is_draw(&board));
    }
}
