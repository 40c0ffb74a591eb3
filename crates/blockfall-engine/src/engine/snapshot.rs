use serde::Serialize;

use crate::core::{BOARD_HEIGHT, BOARD_WIDTH, Piece, PieceKind, Position};

use super::{GameSession, SessionState};

/// A piece as seen by a renderer: family, shape matrix and anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceView {
    pub kind: PieceKind,
    pub rotation: u8,
    /// Rows of `0` (empty) and the family id (filled).
    pub matrix: Vec<Vec<u8>>,
    pub position: Position,
}

impl From<&Piece> for PieceView {
    fn from(piece: &Piece) -> Self {
        Self {
            kind: piece.kind(),
            rotation: piece.rotation().index(),
            matrix: piece.shape().to_matrix(),
            position: piece.position(),
        }
    }
}

/// Everything a frame needs, captured from a [`GameSession`] at one point in
/// time.
///
/// `board` holds locked material only (`0` empty, family id otherwise); the
/// active and ghost pieces are reported separately. `ghost` is omitted when
/// the session hides it.
///
/// ```
/// use blockfall_engine::GameSession;
///
/// let session = GameSession::with_seed(11);
/// let snapshot = session.snapshot();
/// assert!(snapshot.active.is_some());
/// assert_eq!(snapshot.level, 1);
///
/// let json = serde_json::to_value(&snapshot).unwrap();
/// assert_eq!(json["state"], "playing");
/// assert_eq!(json["board"].as_array().unwrap().len(), 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub board: [[i8; BOARD_WIDTH]; BOARD_HEIGHT],
    pub active: Option<PieceView>,
    pub ghost: Option<PieceView>,
    pub next: PieceKind,
    /// Matrix of the next family in spawn orientation.
    pub next_preview: Vec<Vec<u8>>,
    pub score: usize,
    pub level: usize,
    pub lines: usize,
    pub completed_pieces: usize,
    pub state: SessionState,
    pub paused: bool,
    pub game_over: bool,
}

impl GameSnapshot {
    #[must_use]
    pub fn new(session: &GameSession) -> Self {
        let stats = session.stats();
        Self {
            board: session.board().values(),
            active: session.active_piece().map(PieceView::from),
            ghost: session
                .ghost_piece()
                .filter(|_| session.config().show_ghost)
                .as_ref()
                .map(PieceView::from),
            next: session.next_piece(),
            next_preview: session.next_piece().preview_shape().to_matrix(),
            score: stats.score(),
            level: stats.level(),
            lines: stats.total_cleared_lines(),
            completed_pieces: stats.completed_pieces(),
            state: session.session_state(),
            paused: session.is_paused(),
            game_over: session.is_game_over(),
        }
    }

    /// Whether the session accepts movement input.
    #[must_use]
    pub fn playable(&self) -> bool {
        !self.game_over && !self.paused
    }
}
