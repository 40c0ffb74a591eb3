use std::path::PathBuf;

use blockfall_engine::{Board, GameCommand, GameSession};
use clap::ValueEnum;

use crate::util::{self, Output};

use super::SessionArg;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReplayFormat {
    /// Final snapshot as JSON
    Json,
    /// Final display board as text
    Board,
    /// Display board followed by the snapshot
    #[default]
    Both,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Path to the command list (JSON array, e.g. ["move-left", "hard-drop"])
    commands_file: PathBuf,
    /// Starting board in the ASCII board format
    #[arg(long)]
    board: Option<PathBuf>,
    /// What to print
    #[arg(long, value_enum, default_value_t)]
    format: ReplayFormat,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
    #[clap(flatten)]
    session: SessionArg,
}

pub(crate) fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg {
        commands_file,
        board,
        format,
        output,
        session,
    } = arg;

    let config = session.to_config()?;
    let board = match board {
        Some(path) => util::read_board_file(path)?,
        None => Board::EMPTY,
    };

    eprintln!("Loading commands from {}", commands_file.display());
    let commands: Vec<GameCommand> = util::read_json_file("commands", commands_file)?;
    eprintln!("Loaded {} commands", commands.len());

    let mut session = GameSession::with_board(config, board);
    let mut rejected = 0;
    let mut locks = 0;
    for (i, command) in commands.into_iter().enumerate() {
        match session.apply(command) {
            Ok(Some(report)) => {
                locks += 1;
                log::debug!("command {i} ({command}) locked: {report:?}");
            }
            Ok(None) => {}
            Err(err) => {
                rejected += 1;
                log::debug!("command {i} ({command}) rejected: {err}");
            }
        }
    }
    eprintln!(
        "Replayed: {locks} locks, {rejected} rejected commands, score {}, lines {}{}",
        session.score(),
        session.lines(),
        if session.is_game_over() { " (game over)" } else { "" }
    );

    let mut output = Output::create(output.as_deref())?;
    if matches!(format, ReplayFormat::Board | ReplayFormat::Both) {
        output.write_text(&session.display_board().to_string())?;
    }
    if matches!(format, ReplayFormat::Json | ReplayFormat::Both) {
        output.write_json(&session.snapshot())?;
    }
    Ok(())
}
