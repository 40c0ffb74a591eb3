pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Why a session rejected an action. A rejected action leaves the session
/// unchanged.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::Error,
    derive_more::IsVariant,
)]
pub enum ActionError {
    #[display("session is paused")]
    Paused,
    #[display("game is over")]
    GameOver,
    #[display("piece colliding")]
    PieceCollision,
}
