//! Game rules on top of the core data structures.
//!
//! - [`GameSession`] - A single game: board, falling piece, next piece and
//!   statistics, mutated only through its operations
//! - [`GameStats`] - Score, level, cleared lines and piece counters
//! - [`PieceGenerator`] - Seeded piece family source ([`Randomizer`])
//! - [`GravityTimer`] - Caller-owned ticker driving automatic falling
//! - [`GameCommand`] - Serializable input accepted by [`GameSession::apply`]
//! - [`GameSnapshot`] - Serializable read view of a session
//!
//! # Game Flow
//!
//! 1. Start a [`GameSession`], optionally from a [`SessionConfig`] or a
//!    prepared board
//! 2. Move, rotate or hard-drop the falling piece
//! 3. A blocked downward move (or a hard drop) locks the piece, clears full
//!    lines, scores them and spawns the announced next piece
//! 4. Repeat until a spawn is blocked, then [`GameSession::restart`]
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use blockfall_engine::{GameCommand, GameSession, GravityTimer};
//!
//! let mut session = GameSession::with_seed(2024);
//! let mut timer = GravityTimer::new();
//!
//! session.apply(GameCommand::MoveLeft).ok();
//! timer.drive(&mut session, Duration::from_millis(600));
//! session.apply(GameCommand::HardDrop).unwrap();
//!
//! assert_eq!(session.stats().completed_pieces(), 1);
//! ```

pub use self::{
    command::*, game_session::*, game_stats::*, gravity::*, piece_generator::*, scoring::*,
    snapshot::*,
};

mod command;
mod game_session;
mod game_stats;
mod gravity;
mod piece_generator;
mod scoring;
mod snapshot;
