use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::{
    ActionError,
    core::{Board, DisplayBoard, Piece, PieceKind},
};

use super::{
    GameStats,
    command::GameCommand,
    piece_generator::{PieceGenerator, Randomizer},
    snapshot::GameSnapshot,
};

/// Settings applied when a session starts or restarts.
///
/// ```
/// use blockfall_engine::{Randomizer, SessionConfig};
///
/// let config: SessionConfig = serde_json::from_str(r#"{ "seed": 7 }"#).unwrap();
/// assert_eq!(config.seed, Some(7));
/// assert_eq!(config.randomizer, Randomizer::Uniform);
/// assert!(config.show_ghost);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed for the piece generator. `None` draws one from the thread RNG.
    pub seed: Option<u64>,
    pub randomizer: Randomizer,
    /// Whether the landing preview is composed into the display board.
    pub show_ghost: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            randomizer: Randomizer::default(),
            show_ghost: true,
        }
    }
}

impl SessionConfig {
    fn generator(&self) -> PieceGenerator {
        match self.seed {
            Some(seed) => PieceGenerator::new(self.randomizer.clone(), seed),
            None => PieceGenerator::from_entropy(self.randomizer.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
}

/// What a single lock did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockReport {
    /// Family of the piece that locked.
    pub kind: PieceKind,
    pub cleared_lines: usize,
    pub score_gained: usize,
    /// The following piece could not spawn.
    pub game_over: bool,
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum MoveOutcome {
    /// The piece was translated.
    Moved,
    /// A blocked downward move locked the piece in place.
    Locked(LockReport),
}

/// A single game: board, falling piece, next piece and statistics.
///
/// Every operation either applies completely or is rejected with an
/// [`ActionError`] and leaves the session untouched. Nothing here reads a
/// clock; automatic falling is driven from outside, typically through
/// [`GravityTimer`](super::GravityTimer).
///
/// Invariants kept after every operation:
///
/// - the board holds no full row;
/// - the active piece, if any, fits on the board;
/// - `level == lines / 3 + 1`;
/// - there is no active piece exactly when the game is over.
///
/// # Example
///
/// ```
/// use blockfall_engine::{GameSession, SessionConfig};
///
/// let mut session = GameSession::with_config(SessionConfig {
///     seed: Some(1),
///     ..SessionConfig::default()
/// });
/// assert!(session.session_state().is_playing());
///
/// session.move_left().ok();
/// session.try_rotate().ok();
/// let report = session.hard_drop().unwrap();
///
/// assert_eq!(report.cleared_lines, 0);
/// assert_eq!(session.stats().completed_pieces(), 1);
/// assert_eq!(session.board().occupied_count(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    config: SessionConfig,
    board: Board,
    active: Option<Piece>,
    next: PieceKind,
    stats: GameStats,
    paused: bool,
    generator: PieceGenerator,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Starts an unseeded game with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_config(SessionConfig {
            seed: Some(seed),
            ..SessionConfig::default()
        })
    }

    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        Self::with_board(config, Board::EMPTY)
    }

    /// Starts a game on a prepared board.
    ///
    /// Full rows in `board` are cleared first, without scoring. If the first
    /// piece cannot spawn the session starts in the game-over state.
    #[must_use]
    pub fn with_board(config: SessionConfig, board: Board) -> Self {
        let generator = config.generator();
        let (board, _) = board.clear_full_lines();
        Self::start(config, board, generator)
    }

    fn start(config: SessionConfig, board: Board, mut generator: PieceGenerator) -> Self {
        let first = generator.next_kind();
        let next = generator.next_kind();
        let active = board.spawn(first);
        if active.is_none() {
            info!("game over: {first} cannot spawn on the initial board");
        }
        Self {
            config,
            board,
            active,
            next,
            stats: GameStats::new(),
            paused: false,
            generator,
        }
    }

    /// Discards the whole game and starts a fresh one on an empty board.
    ///
    /// The piece generator keeps its position, so a seeded session does not
    /// replay the previous game.
    pub fn restart(&mut self) {
        info!(
            "restarting game (score {}, lines {})",
            self.stats.score(),
            self.stats.total_cleared_lines()
        );
        *self = Self::start(self.config.clone(), Board::EMPTY, self.generator.clone());
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn active_piece(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    /// The active piece projected straight down to where it would land.
    #[must_use]
    pub fn ghost_piece(&self) -> Option<Piece> {
        let piece = self.active?;
        let landed = self.board.ghost_position(piece.shape(), piece.position());
        Some(piece.with_position(landed))
    }

    /// Board, ghost and active piece flattened for rendering. The ghost is
    /// included only when [`SessionConfig::show_ghost`] is set.
    #[must_use]
    pub fn display_board(&self) -> DisplayBoard {
        match &self.active {
            Some(piece) => self.board.compose_display(
                piece.shape(),
                piece.position(),
                self.config.show_ghost,
            ),
            None => DisplayBoard::from(&self.board),
        }
    }

    #[must_use]
    pub fn next_piece(&self) -> PieceKind {
        self.next
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.stats.score()
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.stats.level()
    }

    #[must_use]
    pub fn lines(&self) -> usize {
        self.stats.total_cleared_lines()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.active.is_none()
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        if self.is_game_over() {
            SessionState::GameOver
        } else if self.paused {
            SessionState::Paused
        } else {
            SessionState::Playing
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::new(self)
    }

    /// Flips the paused flag. Has no visible effect once the game is over.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn move_left(&mut self) -> Result<MoveOutcome, ActionError> {
        self.try_move(-1, 0)
    }

    pub fn move_right(&mut self) -> Result<MoveOutcome, ActionError> {
        self.try_move(1, 0)
    }

    /// Moves the piece one row down, locking it if it cannot fall further.
    pub fn move_down(&mut self) -> Result<MoveOutcome, ActionError> {
        self.try_move(0, 1)
    }

    /// Translates the active piece by `(dx, dy)`.
    ///
    /// A successful move never locks. A blocked move with `dy > 0` locks the
    /// piece at its current position; any other blocked move is rejected.
    pub fn try_move(&mut self, dx: i32, dy: i32) -> Result<MoveOutcome, ActionError> {
        let piece = self.playable_piece()?;
        let moved = piece.moved(dx, dy);
        if self.board.can_place(moved.shape(), moved.position()) {
            self.active = Some(moved);
            return Ok(MoveOutcome::Moved);
        }
        if dy > 0 {
            return Ok(MoveOutcome::Locked(self.lock(piece)));
        }
        trace!("move ({dx}, {dy}) rejected: {} at {}", piece.kind(), piece.position());
        Err(ActionError::PieceCollision)
    }

    /// Rotates the active piece one step clockwise in place. No wall kicks.
    pub fn try_rotate(&mut self) -> Result<(), ActionError> {
        let piece = self.playable_piece()?;
        let rotated = piece.rotated_right();
        if !self.board.can_place(rotated.shape(), rotated.position()) {
            trace!("rotation rejected: {} at {}", piece.kind(), piece.position());
            return Err(ActionError::PieceCollision);
        }
        self.active = Some(rotated);
        Ok(())
    }

    /// Drops the active piece to its landing row and locks it there.
    pub fn hard_drop(&mut self) -> Result<LockReport, ActionError> {
        let piece = self.playable_piece()?;
        let landed = self.board.ghost_position(piece.shape(), piece.position());
        Ok(self.lock(piece.with_position(landed)))
    }

    /// Applies one command. Accepted moves that did not lock report no lock.
    pub fn apply(&mut self, command: GameCommand) -> Result<Option<LockReport>, ActionError> {
        let locked = |outcome: MoveOutcome| match outcome {
            MoveOutcome::Moved => None,
            MoveOutcome::Locked(report) => Some(report),
        };
        match command {
            GameCommand::MoveLeft => self.move_left().map(locked),
            GameCommand::MoveRight => self.move_right().map(locked),
            GameCommand::MoveDown => self.move_down().map(locked),
            GameCommand::Rotate => self.try_rotate().map(|()| None),
            GameCommand::HardDrop => self.hard_drop().map(Some),
            GameCommand::TogglePause => {
                self.toggle_pause();
                Ok(None)
            }
            GameCommand::Restart => {
                self.restart();
                Ok(None)
            }
        }
    }

    fn playable_piece(&self) -> Result<Piece, ActionError> {
        let Some(piece) = self.active else {
            trace!("action rejected: game over");
            return Err(ActionError::GameOver);
        };
        if self.paused {
            trace!("action rejected: paused");
            return Err(ActionError::Paused);
        }
        Ok(piece)
    }

    fn lock(&mut self, piece: Piece) -> LockReport {
        let merged = self.board.merge(piece.shape(), piece.position());
        let (board, cleared_lines) = merged.clear_full_lines();
        let score_gained = self.stats.complete_piece_drop(cleared_lines);

        let spawned = board.spawn(self.next);
        self.board = board;
        self.active = spawned;
        self.next = self.generator.next_kind();

        let game_over = spawned.is_none();
        debug!(
            "locked {} at {}: cleared {cleared_lines}, +{score_gained} (score {}, level {})",
            piece.kind(),
            piece.position(),
            self.stats.score(),
            self.stats.level(),
        );
        if game_over {
            info!(
                "game over after {} pieces: score {}, lines {}",
                self.stats.completed_pieces(),
                self.stats.score(),
                self.stats.total_cleared_lines()
            );
        }
        LockReport {
            kind: piece.kind(),
            cleared_lines,
            score_gained,
            game_over,
        }
    }
}
