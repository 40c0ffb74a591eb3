use std::fmt;

use super::{
    BOARD_HEIGHT, BOARD_WIDTH,
    board::{Block, Board, cell_index, shape_cells},
    piece::{PieceKind, PieceShape, Position},
};

/// A cell of the flattened grid handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayCell {
    #[default]
    Empty,
    /// Landing preview of the active piece.
    Ghost(PieceKind),
    /// Locked material or the active piece.
    Piece(PieceKind),
}

impl DisplayCell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == DisplayCell::Empty
    }

    /// Integer cell value: `0` empty, family id for material, negated family
    /// id for ghost cells.
    #[must_use]
    pub fn value(self) -> i8 {
        match self {
            DisplayCell::Empty => 0,
            DisplayCell::Ghost(kind) => -kind.value(),
            DisplayCell::Piece(kind) => kind.value(),
        }
    }
}

impl From<Block> for DisplayCell {
    fn from(block: Block) -> Self {
        match block {
            Block::Empty => DisplayCell::Empty,
            Block::Piece(kind) => DisplayCell::Piece(kind),
        }
    }
}

/// Render-only view: board, ghost and active piece in one grid.
///
/// Built by [`Board::compose_display`] or, when nothing is falling, from the
/// board alone via `From<&Board>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBoard {
    rows: [[DisplayCell; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl From<&Board> for DisplayBoard {
    fn from(board: &Board) -> Self {
        let mut rows = [[DisplayCell::Empty; BOARD_WIDTH]; BOARD_HEIGHT];
        for (dst, src) in rows.iter_mut().zip(board.rows()) {
            *dst = src.cells().map(DisplayCell::from);
        }
        Self { rows }
    }
}

impl DisplayBoard {
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[DisplayCell; BOARD_WIDTH]> {
        self.rows.iter()
    }

    #[must_use]
    pub fn cell(&self, x: i32, y: i32) -> Option<DisplayCell> {
        let (x, y) = cell_index(x, y)?;
        Some(self.rows[y][x])
    }

    /// The grid as integer cell values (see [`DisplayCell::value`]).
    #[must_use]
    pub fn values(&self) -> [[i8; BOARD_WIDTH]; BOARD_HEIGHT] {
        self.rows.map(|row| row.map(DisplayCell::value))
    }

    pub(crate) fn stamp(&mut self, shape: &PieceShape, position: Position, cell: DisplayCell) {
        for (x, y) in shape_cells(shape, position) {
            if let Some((x, y)) = cell_index(x, y) {
                self.rows[y][x] = cell;
            }
        }
    }
}

/// Same layout as the [`Board`] text format; ghost cells use lowercase
/// letters.
impl fmt::Display for DisplayBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for cell in row {
                let ch = match cell {
                    DisplayCell::Empty => '.',
                    DisplayCell::Ghost(kind) => kind.as_char().to_ascii_lowercase(),
                    DisplayCell::Piece(kind) => kind.as_char(),
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::piece::PieceRotation;

    use super::*;

    #[test]
    fn test_from_board_copies_material() {
        let board: Board = "
            T.........
            TT.......I
        "
        .parse()
        .unwrap();
        let display = DisplayBoard::from(&board);
        assert_eq!(display.cell(0, 18), Some(DisplayCell::Piece(PieceKind::T)));
        assert_eq!(display.cell(9, 19), Some(DisplayCell::Piece(PieceKind::I)));
        assert_eq!(display.cell(1, 18), Some(DisplayCell::Empty));
        assert_eq!(display.values(), board.values());
    }

    #[test]
    fn test_cell_values() {
        assert_eq!(DisplayCell::Empty.value(), 0);
        assert_eq!(DisplayCell::Piece(PieceKind::L).value(), 7);
        assert_eq!(DisplayCell::Ghost(PieceKind::L).value(), -7);
        assert_eq!(DisplayCell::Ghost(PieceKind::I).value(), -1);
    }

    #[test]
    fn test_display_marks_ghost_lowercase() {
        let shape = PieceKind::J.shape(PieceRotation::SPAWN);
        let display = Board::EMPTY.compose_display(shape, Position::new(0, 0), true);
        let text = display.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "J.........");
        assert_eq!(lines[1], "JJJ.......");
        assert_eq!(lines[18], "j.........");
        assert_eq!(lines[19], "jjj.......");
    }
}
