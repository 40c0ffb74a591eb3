use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A single player (or timer) input, as accepted by
/// [`GameSession::apply`](super::GameSession::apply).
///
/// Commands serialize as kebab-case strings so input logs can be stored and
/// replayed as plain JSON arrays.
///
/// ```
/// use blockfall_engine::GameCommand;
///
/// let commands: Vec<GameCommand> =
///     serde_json::from_str(r#"["move-left", "rotate", "hard-drop"]"#).unwrap();
/// assert_eq!(
///     commands,
///     [GameCommand::MoveLeft, GameCommand::Rotate, GameCommand::HardDrop]
/// );
/// assert_eq!("toggle-pause".parse::<GameCommand>().unwrap(), GameCommand::TogglePause);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameCommand {
    MoveLeft,
    MoveRight,
    MoveDown,
    Rotate,
    HardDrop,
    TogglePause,
    Restart,
}

impl GameCommand {
    pub const ALL: [Self; 7] = [
        Self::MoveLeft,
        Self::MoveRight,
        Self::MoveDown,
        Self::Rotate,
        Self::HardDrop,
        Self::TogglePause,
        Self::Restart,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MoveLeft => "move-left",
            Self::MoveRight => "move-right",
            Self::MoveDown => "move-down",
            Self::Rotate => "rotate",
            Self::HardDrop => "hard-drop",
            Self::TogglePause => "toggle-pause",
            Self::Restart => "restart",
        }
    }
}

impl fmt::Display for GameCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown command: {input:?}")]
pub struct ParseGameCommandError {
    #[error(not(source))]
    input: String,
}

impl FromStr for GameCommand {
    type Err = ParseGameCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|command| command.as_str() == s.trim())
            .ok_or_else(|| ParseGameCommandError {
                input: s.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde_name() {
        for command in GameCommand::ALL {
            let json = serde_json::to_string(&command).unwrap();
            assert_eq!(json, format!("\"{command}\""));
            assert_eq!(command.to_string().parse::<GameCommand>().unwrap(), command);
        }
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let err = "hold".parse::<GameCommand>().unwrap_err();
        assert_eq!(err.to_string(), "unknown command: \"hold\"");
        assert!(serde_json::from_str::<GameCommand>("\"soft-drop\"").is_err());
    }
}
