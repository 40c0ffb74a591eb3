use std::{fmt, str::FromStr};

use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::BOARD_WIDTH;

/// A falling piece: family, rotation state and anchor position.
///
/// Pieces are values. Movement and rotation return new `Piece` instances and
/// never consult the board; validity is the board's concern
/// (see [`Board::can_place`](super::board::Board::can_place)).
///
/// # Example
///
/// ```
/// use blockfall_engine::{Piece, PieceKind, Position};
///
/// let piece = Piece::spawned(PieceKind::T);
/// assert_eq!(piece.position(), Position::new(4, 0));
///
/// let moved = piece.moved(1, 2).rotated_right();
/// assert_eq!(moved.position(), Position::new(5, 2));
/// assert_eq!(moved.rotation().index(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    rotation: PieceRotation,
    position: Position,
}

impl Piece {
    #[must_use]
    pub const fn new(kind: PieceKind, rotation: PieceRotation, position: Position) -> Self {
        Self {
            kind,
            rotation,
            position,
        }
    }

    /// Creates a piece in spawn orientation, horizontally centered on the top row.
    #[must_use]
    pub fn spawned(kind: PieceKind) -> Self {
        Self::new(kind, PieceRotation::SPAWN, Self::spawn_position(kind))
    }

    /// Returns the anchor a freshly spawned piece of `kind` starts at.
    ///
    /// The bounding box is centered: `x = width/2 - shape_width/2` (integer
    /// division on both terms), `y = 0`.
    #[must_use]
    pub fn spawn_position(kind: PieceKind) -> Position {
        let shape = kind.shape(PieceRotation::SPAWN);
        let x = BOARD_WIDTH / 2 - shape.width() / 2;
        Position::new(to_coord(x), 0)
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn shape(&self) -> &'static PieceShape {
        self.kind.shape(self.rotation)
    }

    #[must_use]
    pub const fn moved(self, dx: i32, dy: i32) -> Self {
        Self {
            position: self.position.offset(dx, dy),
            ..self
        }
    }

    #[must_use]
    pub const fn with_position(self, position: Position) -> Self {
        Self { position, ..self }
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self {
            rotation: self.rotation.rotated_right(),
            ..self
        }
    }

    /// Absolute board coordinates of the filled cells.
    #[must_use]
    pub fn cells(&self) -> ArrayVec<Position, { PieceShape::CELL_COUNT }> {
        self.shape()
            .occupied_offsets()
            .map(|(dx, dy)| self.position.offset(to_coord(dx), to_coord(dy)))
            .collect()
    }
}

/// Column/row coordinate on the board. `(0, 0)` is the top-left cell.
///
/// Coordinates are signed so that candidate positions produced by moves past
/// the left or top edge can be represented and rejected by the collision test.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translates the position. Saturates at the `i32` range, which is far
    /// outside the board.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn to_coord(v: usize) -> i32 {
    // Only called with values bounded by the board and piece dimensions.
    v as i32
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: one clockwise step
/// - `2`: two steps
/// - `3`: three steps
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRotation(u8);

impl PieceRotation {
    pub const SPAWN: Self = Self(0);

    /// Builds a rotation from any integer, wrapping modulo 4.
    ///
    /// ```
    /// use blockfall_engine::PieceRotation;
    ///
    /// assert_eq!(PieceRotation::from_index(5).index(), 1);
    /// assert_eq!(PieceRotation::from_index(-1).index(), 3);
    /// ```
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn from_index(index: i64) -> Self {
        Self(index.rem_euclid(4) as u8)
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Piece family.
///
/// The discriminant is the family id, which is also the cell value the piece
/// leaves on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 1,
    /// O-piece.
    O = 2,
    /// T-piece.
    T = 3,
    /// S-piece.
    S = 4,
    /// Z-piece.
    Z = 5,
    /// J-piece.
    J = 6,
    /// L-piece.
    L = 7,
}

/// Uniform over the 7 families.
impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        match rng.random_range(1..=7) {
            1 => PieceKind::I,
            2 => PieceKind::O,
            3 => PieceKind::T,
            4 => PieceKind::S,
            5 => PieceKind::Z,
            6 => PieceKind::J,
            _ => PieceKind::L,
        }
    }
}

impl PieceKind {
    /// Number of piece families (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        Self::I,
        Self::O,
        Self::T,
        Self::S,
        Self::Z,
        Self::J,
        Self::L,
    ];

    /// Family id in `1..=7`.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Family id as a signed cell value.
    #[must_use]
    #[expect(clippy::cast_possible_wrap)]
    pub const fn value(self) -> i8 {
        self as i8
    }

    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::I),
            2 => Some(Self::O),
            3 => Some(Self::T),
            4 => Some(Self::S),
            5 => Some(Self::Z),
            6 => Some(Self::J),
            7 => Some(Self::L),
            _ => None,
        }
    }

    /// Returns the predefined shape for this family at `rotation`.
    #[must_use]
    pub fn shape(self, rotation: PieceRotation) -> &'static PieceShape {
        &PIECE_SHAPES[self as usize - 1][rotation.as_usize()]
    }

    /// Shape shown in the "next piece" preview.
    #[must_use]
    pub fn preview_shape(self) -> &'static PieceShape {
        self.shape(PieceRotation::SPAWN)
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::I => 'I',
            Self::O => 'O',
            Self::T => 'T',
            Self::S => 'S',
            Self::Z => 'Z',
            Self::J => 'J',
            Self::L => 'L',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(Self::I),
            'O' => Some(Self::O),
            'T' => Some(Self::T),
            'S' => Some(Self::S),
            'Z' => Some(Self::Z),
            'J' => Some(Self::J),
            'L' => Some(Self::L),
            _ => None,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid piece kind {input:?}, expected one of I, O, T, S, Z, J, L or 1-7")]
pub struct ParsePieceKindError {
    #[error(not(source))]
    input: String,
}

/// Accepts a family letter or a family id.
impl FromStr for PieceKind {
    type Err = ParsePieceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePieceKindError {
            input: s.to_owned(),
        };
        let mut chars = s.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return Err(err());
        };
        Self::from_char(c.to_ascii_uppercase())
            .or_else(|| c.to_digit(10).and_then(|d| Self::from_id(u8::try_from(d).ok()?)))
            .ok_or_else(err)
    }
}

/// Cell layout of one family in one rotation state.
///
/// The layout is the tight bounding box of the piece (at most 4×4); bit `x` of
/// `rows[y]` marks a filled cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceShape {
    kind: PieceKind,
    width: u8,
    height: u8,
    rows: [u8; 4],
}

impl PieceShape {
    /// Every family is a tetromino.
    pub const CELL_COUNT: usize = 4;

    #[expect(clippy::cast_possible_truncation)]
    const fn new<const W: usize, const H: usize>(kind: PieceKind, cells: [[bool; W]; H]) -> Self {
        assert!(W <= 4 && H <= 4);
        let mut rows = [0; 4];
        let mut y = 0;
        while y < H {
            let mut x = 0;
            while x < W {
                if cells[y][x] {
                    rows[y] |= 1 << x;
                }
                x += 1;
            }
            y += 1;
        }
        Self {
            kind,
            width: W as u8,
            height: H as u8,
            rows,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width as usize
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height as usize
    }

    /// Whether the local cell `(x, y)` is filled. Cells outside the bounding
    /// box are empty.
    #[must_use]
    pub const fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.width() && y < self.height() && (self.rows[y] >> x) & 1 != 0
    }

    /// Local `(dx, dy)` offsets of the filled cells, row by row.
    pub fn occupied_offsets(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height())
            .flat_map(move |dy| (0..self.width()).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| self.is_filled(dx, dy))
    }

    /// The shape as a matrix of cell values: `0` for empty, the family id for
    /// filled.
    #[must_use]
    pub fn to_matrix(&self) -> Vec<Vec<u8>> {
        (0..self.height())
            .map(|y| {
                (0..self.width())
                    .map(|x| if self.is_filled(x, y) { self.kind.id() } else { 0 })
                    .collect()
            })
            .collect()
    }
}

/// Rotation tables, indexed by `family id - 1` then rotation.
///
/// Entries are authored per rotation rather than generated, so families whose
/// states repeat (I, S, Z every two steps, O always) list the repeats
/// explicitly.
const PIECE_SHAPES: [[PieceShape; 4]; PieceKind::LEN] = {
    use PieceKind::{I, J, L, O, S, T, Z};
    const C: bool = true;
    const E: bool = false;
    const fn s<const W: usize, const H: usize>(
        kind: PieceKind,
        cells: [[bool; W]; H],
    ) -> PieceShape {
        PieceShape::new(kind, cells)
    }
    [
        [
            s(I, [[C, C, C, C]]),
            s(I, [[C], [C], [C], [C]]),
            s(I, [[C, C, C, C]]),
            s(I, [[C], [C], [C], [C]]),
        ],
        [
            s(O, [[C, C], [C, C]]),
            s(O, [[C, C], [C, C]]),
            s(O, [[C, C], [C, C]]),
            s(O, [[C, C], [C, C]]),
        ],
        [
            s(T, [[C, C, C], [E, C, E]]),
            s(T, [[E, C], [C, C], [E, C]]),
            s(T, [[E, C, E], [C, C, C]]),
            s(T, [[C, E], [C, C], [C, E]]),
        ],
        [
            s(S, [[E, C, C], [C, C, E]]),
            s(S, [[C, E], [C, C], [E, C]]),
            s(S, [[E, C, C], [C, C, E]]),
            s(S, [[C, E], [C, C], [E, C]]),
        ],
        [
            s(Z, [[C, C, E], [E, C, C]]),
            s(Z, [[E, C], [C, C], [C, E]]),
            s(Z, [[C, C, E], [E, C, C]]),
            s(Z, [[E, C], [C, C], [C, E]]),
        ],
        [
            s(J, [[C, E, E], [C, C, C]]),
            s(J, [[E, C], [E, C], [C, C]]),
            s(J, [[C, C, C], [E, E, C]]),
            s(J, [[C, C], [C, E], [C, E]]),
        ],
        [
            s(L, [[E, E, C], [C, C, C]]),
            s(L, [[C, E], [C, E], [C, C]]),
            s(L, [[C, C, C], [C, E, E]]),
            s(L, [[C, C], [E, C], [E, C]]),
        ],
    ]
};
