use std::{fmt, str::FromStr};

use super::{
    BOARD_HEIGHT, BOARD_WIDTH,
    display_board::{DisplayBoard, DisplayCell},
    piece::{Piece, PieceKind, PieceShape, Position},
};

/// A single cell of the persistent board.
///
/// Only locked material lives here. Ghost projections exist solely in
/// [`DisplayCell`], so they cannot be written to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Block {
    /// Empty cell.
    #[default]
    Empty,
    /// Locked material of a piece family.
    Piece(PieceKind),
}

impl Block {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Block::Empty
    }

    /// Integer cell value: `0` for empty, the family id otherwise.
    #[must_use]
    pub fn value(self) -> i8 {
        match self {
            Block::Empty => 0,
            Block::Piece(kind) => kind.value(),
        }
    }

    fn as_char(self) -> char {
        match self {
            Block::Empty => '.',
            Block::Piece(kind) => kind.as_char(),
        }
    }
}

/// One row of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardRow {
    cells: [Block; BOARD_WIDTH],
}

impl BoardRow {
    pub const EMPTY: Self = Self {
        cells: [Block::Empty; BOARD_WIDTH],
    };

    #[must_use]
    pub fn cells(&self) -> &[Block; BOARD_WIDTH] {
        &self.cells
    }

    /// Whether every cell of the row is occupied.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.cells.iter().all(|b| !b.is_empty())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|b| b.is_empty())
    }
}

/// The 10×20 playfield. Row 0 is the top row.
///
/// `Board` is a small value type: operations that change the layout
/// ([`merge`](Self::merge), [`clear_full_lines`](Self::clear_full_lines))
/// return a new board and leave `self` untouched.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, PieceKind, PieceRotation, Position};
///
/// let board = Board::EMPTY;
/// let shape = PieceKind::O.shape(PieceRotation::SPAWN);
///
/// assert!(board.can_place(shape, Position::new(0, 18)));
/// assert!(!board.can_place(shape, Position::new(9, 0)));
///
/// let landed = board.ghost_position(shape, Position::new(4, 0));
/// assert_eq!(landed, Position::new(4, 18));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: [BoardRow; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Board {
    pub const EMPTY: Self = Self {
        rows: [BoardRow::EMPTY; BOARD_HEIGHT],
    };

    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &BoardRow> {
        self.rows.iter()
    }

    /// Returns the cell at `(x, y)`, or `None` outside the board.
    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<Block> {
        let (x, y) = cell_index(x, y)?;
        Some(self.rows[y].cells[x])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(BoardRow::is_empty)
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .filter(|b| !b.is_empty())
            .count()
    }

    /// The board as integer cell values (see [`Block::value`]).
    #[must_use]
    pub fn values(&self) -> [[i8; BOARD_WIDTH]; BOARD_HEIGHT] {
        self.rows.map(|row| row.cells.map(Block::value))
    }

    /// Checks whether `shape` fits with its top-left corner at `position`.
    ///
    /// Every filled cell of the shape must land inside the board on an empty
    /// cell. Empty cells of the shape's bounding box are not checked.
    #[must_use]
    pub fn can_place(&self, shape: &PieceShape, position: Position) -> bool {
        shape_cells(shape, position)
            .all(|(x, y)| self.cell(x, y).is_some_and(Block::is_empty))
    }

    /// Returns a copy of the board with `shape` written at `position`.
    ///
    /// Cells falling outside the board are dropped. Callers check
    /// [`can_place`](Self::can_place) first, so this does not happen in play.
    #[must_use]
    pub fn merge(&self, shape: &PieceShape, position: Position) -> Self {
        let mut merged = self.clone();
        for (x, y) in shape_cells(shape, position) {
            if let Some((x, y)) = cell_index(x, y) {
                merged.rows[y].cells[x] = Block::Piece(shape.kind());
            }
        }
        merged
    }

    /// Removes every filled row and returns the compacted board together with
    /// the number of rows removed.
    ///
    /// Remaining rows keep their relative order and sink to the bottom; the
    /// freed rows at the top are empty.
    #[must_use]
    pub fn clear_full_lines(&self) -> (Self, usize) {
        let mut cleared = self.clone();
        let mut count = 0;
        for y in (0..BOARD_HEIGHT).rev() {
            if self.rows[y].is_filled() {
                count += 1;
                continue;
            }
            cleared.rows[y + count] = self.rows[y];
        }
        cleared.rows[..count].fill(BoardRow::EMPTY);
        (cleared, count)
    }

    /// Places a fresh piece of `kind` at its spawn position.
    ///
    /// Returns `None` when the spawn cells are blocked, which is what ends a
    /// game.
    #[must_use]
    pub fn spawn(&self, kind: PieceKind) -> Option<Piece> {
        let piece = Piece::spawned(kind);
        self.can_place(piece.shape(), piece.position())
            .then_some(piece)
    }

    /// Projects `shape` straight down from `position` and returns the lowest
    /// row it still fits in.
    #[must_use]
    pub fn ghost_position(&self, shape: &PieceShape, position: Position) -> Position {
        let mut landed = position;
        while self.can_place(shape, landed.offset(0, 1)) {
            landed = landed.offset(0, 1);
        }
        landed
    }

    /// Flattens the board, the ghost projection and the active piece into one
    /// grid for rendering.
    ///
    /// The ghost is stamped first (only when it sits below the piece), then
    /// the piece on top. The board itself is not modified.
    #[must_use]
    pub fn compose_display(
        &self,
        shape: &PieceShape,
        position: Position,
        show_ghost: bool,
    ) -> DisplayBoard {
        let mut display = DisplayBoard::from(self);
        if show_ghost {
            let ghost = self.ghost_position(shape, position);
            if ghost.y != position.y {
                display.stamp(shape, ghost, DisplayCell::Ghost(shape.kind()));
            }
        }
        display.stamp(shape, position, DisplayCell::Piece(shape.kind()));
        display
    }
}

/// Absolute (possibly out-of-bounds) coordinates of the filled cells of
/// `shape` placed at `position`.
pub(crate) fn shape_cells(
    shape: &PieceShape,
    position: Position,
) -> impl Iterator<Item = (i32, i32)> + '_ {
    shape.occupied_offsets().map(move |(dx, dy)| {
        let dx = i32::try_from(dx).unwrap_or(i32::MAX);
        let dy = i32::try_from(dy).unwrap_or(i32::MAX);
        (position.x.saturating_add(dx), position.y.saturating_add(dy))
    })
}

/// Converts signed coordinates to array indices, or `None` when outside the
/// board.
pub(crate) fn cell_index(x: i32, y: i32) -> Option<(usize, usize)> {
    let x = usize::try_from(x).ok().filter(|&x| x < BOARD_WIDTH)?;
    let y = usize::try_from(y).ok().filter(|&y| y < BOARD_HEIGHT)?;
    Some((x, y))
}

/// Prints one line per row, `.` for empty cells and the family letter for
/// filled ones.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for cell in row.cells {
                write!(f, "{}", cell.as_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseBoardError {
    #[display("board has {rows} rows, at most {BOARD_HEIGHT} allowed")]
    TooManyRows { rows: usize },
    #[display("row {row} has {width} cells, expected {BOARD_WIDTH}")]
    RowWidth { row: usize, width: usize },
    #[display("invalid cell {ch:?} at row {row}, column {column}")]
    InvalidCell { row: usize, column: usize, ch: char },
}

/// Parses the [`Display`](fmt::Display) format.
///
/// Blank lines and whitespace inside lines are ignored. Boards with fewer than
/// 20 rows are aligned to the bottom, so tests and puzzle files only need to
/// spell out the interesting part.
///
/// ```
/// use blockfall_engine::{Block, Board, PieceKind};
///
/// let board: Board = "
///     ..........
///     IIII.OO...
/// "
/// .parse()
/// .unwrap();
///
/// assert_eq!(board.cell(0, 19), Some(Block::Piece(PieceKind::I)));
/// assert_eq!(board.cell(5, 19), Some(Block::Piece(PieceKind::O)));
/// assert_eq!(board.occupied_count(), 6);
/// ```
impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<Vec<char>> = s
            .lines()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
            .filter(|line| !line.is_empty())
            .collect();
        if lines.len() > BOARD_HEIGHT {
            return Err(ParseBoardError::TooManyRows { rows: lines.len() });
        }

        let mut board = Self::EMPTY;
        let top = BOARD_HEIGHT - lines.len();
        for (row, line) in lines.iter().enumerate() {
            if line.len() != BOARD_WIDTH {
                return Err(ParseBoardError::RowWidth {
                    row,
                    width: line.len(),
                });
            }
            for (column, &ch) in line.iter().enumerate() {
                board.rows[top + row].cells[column] = match ch {
                    '.' => Block::Empty,
                    _ => Block::Piece(PieceKind::from_char(ch).ok_or(
                        ParseBoardError::InvalidCell { row, column, ch },
                    )?),
                };
            }
        }
        Ok(board)
    }
}
