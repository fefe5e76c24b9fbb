//! Tic-tac-toe domain: types, pure rules, and the game-state transition.

mod rules;
mod state;
mod types;

pub use rules::{check_winner, is_draw};
pub use state::{GameState, MoveError};
pub use types::{Board, Cell, GameStatus, HistoryEntry, Mark};
