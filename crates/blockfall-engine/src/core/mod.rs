pub use self::{board::*, display_board::*, piece::*};

pub(crate) mod board;
pub(crate) mod display_board;
pub(crate) mod piece;

/// Number of columns on the board.
pub const BOARD_WIDTH: usize = 10;
/// Number of rows on the board.
pub const BOARD_HEIGHT: usize = 20;
