//! Game rules for tic-tac-toe.
//!
//! Pure functions over the board, separated from state management so the
//! status can always be recomputed from the cells alone.

pub mod draw;
pub mod win;

pub use draw::is_draw;
pub use win::check_winner;
