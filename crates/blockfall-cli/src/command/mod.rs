use std::path::PathBuf;

use anyhow::Context as _;
use blockfall_engine::{PieceKind, Randomizer, SessionConfig};
use clap::{Parser, Subcommand, ValueEnum};

use crate::util;

use self::{replay::ReplayArg, simulate::SimulateArg};

mod replay;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play headless games with a random input policy
    Simulate(#[clap(flatten)] SimulateArg),
    /// Apply a recorded list of commands and print the final state
    Replay(#[clap(flatten)] ReplayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Replay(arg) => replay::run(&arg)?,
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RandomizerArg {
    Uniform,
    SevenBag,
}

/// Session settings shared by all subcommands.
///
/// Flags override the values read from `--config`.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SessionArg {
    /// Session configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the piece generator
    #[arg(long)]
    seed: Option<u64>,
    /// Piece randomizer
    #[arg(long, value_enum, conflicts_with = "sequence")]
    randomizer: Option<RandomizerArg>,
    /// Fixed piece sequence cycled in order, e.g. "IOTL"
    #[arg(long)]
    sequence: Option<String>,
    /// Hide the landing preview in rendered boards
    #[arg(long)]
    no_ghost: bool,
}

impl SessionArg {
    pub(crate) fn to_config(&self) -> anyhow::Result<SessionConfig> {
        let mut config: SessionConfig = match &self.config {
            Some(path) => util::read_json_file("session config", path)?,
            None => SessionConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        match self.randomizer {
            Some(RandomizerArg::Uniform) => config.randomizer = Randomizer::Uniform,
            Some(RandomizerArg::SevenBag) => config.randomizer = Randomizer::SevenBag,
            None => {}
        }
        if let Some(sequence) = &self.sequence {
            config.randomizer = Randomizer::Sequence(parse_sequence(sequence)?);
        }
        if self.no_ghost {
            config.show_ghost = false;
        }
        Ok(config)
    }
}

fn parse_sequence(s: &str) -> anyhow::Result<Vec<PieceKind>> {
    let kinds = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| {
            c.to_string()
                .parse::<PieceKind>()
                .with_context(|| format!("Invalid piece in sequence {s:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    anyhow::ensure!(!kinds.is_empty(), "Piece sequence is empty");
    Ok(kinds)
}
