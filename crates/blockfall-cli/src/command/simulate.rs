use std::{path::PathBuf, time::Duration};

use blockfall_engine::{GameCommand, GameSession, GravityTimer, SessionConfig};
use rand::{Rng, SeedableRng as _, rngs::StdRng};
use serde::Serialize;

use crate::util::Output;

use super::SessionArg;

/// Virtual time between two policy decisions, in milliseconds.
const MIN_FRAME_MILLIS: u64 = 16;
const MAX_FRAME_MILLIS: u64 = 120;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    num_games: usize,
    /// Stop a game after this many locked pieces
    #[arg(long, default_value_t = 1000)]
    max_pieces: usize,
    /// Seed for the input policy
    #[arg(long)]
    policy_seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
    #[clap(flatten)]
    session: SessionArg,
}

#[derive(Debug, Clone, Serialize)]
struct GameSummary {
    game: usize,
    seed: u64,
    score: usize,
    level: usize,
    lines: usize,
    pieces: usize,
    line_cleared_counter: [usize; 5],
    rejected_commands: usize,
    virtual_millis: u128,
    game_over: bool,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        num_games,
        max_pieces,
        policy_seed,
        output,
        session,
    } = arg;

    let config = session.to_config()?;
    let mut rng = StdRng::seed_from_u64(policy_seed.unwrap_or_else(|| rand::rng().random()));

    eprintln!("Simulating {num_games} games (max {max_pieces} pieces each)...");
    let mut summaries = Vec::with_capacity(*num_games);
    for (game, offset) in (0..*num_games).zip(0_u64..) {
        let seed = match config.seed {
            Some(base) => base.wrapping_add(offset),
            None => rng.random(),
        };
        let config = SessionConfig {
            seed: Some(seed),
            ..config.clone()
        };
        let summary = play_game(game, config, *max_pieces, &mut rng);
        log::info!(
            "game {game}: score {}, lines {}, pieces {}",
            summary.score,
            summary.lines,
            summary.pieces
        );
        summaries.push(summary);
    }
    print_totals(&summaries);

    let mut output = Output::create(output.as_deref())?;
    output.write_json(&summaries)?;
    Ok(())
}

fn play_game<R>(game: usize, config: SessionConfig, max_pieces: usize, rng: &mut R) -> GameSummary
where
    R: Rng,
{
    let seed = config.seed.unwrap_or_default();
    let mut session = GameSession::with_config(config);
    let mut timer = GravityTimer::new();
    let mut clock = Duration::ZERO;
    let mut rejected_commands = 0;

    while !session.is_game_over() && session.stats().completed_pieces() < max_pieces {
        let dt = Duration::from_millis(rng.random_range(MIN_FRAME_MILLIS..=MAX_FRAME_MILLIS));
        clock += dt;
        timer.drive(&mut session, dt);
        let Some(command) = random_command(rng) else {
            continue;
        };
        if session.apply(command).is_err() {
            rejected_commands += 1;
        }
    }

    let stats = session.stats();
    GameSummary {
        game,
        seed,
        score: stats.score(),
        level: stats.level(),
        lines: stats.total_cleared_lines(),
        pieces: stats.completed_pieces(),
        line_cleared_counter: *stats.line_cleared_counter(),
        rejected_commands,
        virtual_millis: clock.as_millis(),
        game_over: session.is_game_over(),
    }
}

/// Picks the next input. Most frames do nothing so gravity gets a say.
fn random_command<R>(rng: &mut R) -> Option<GameCommand>
where
    R: Rng,
{
    let command = match rng.random_range(0..100) {
        0..40 => return None,
        40..55 => GameCommand::MoveLeft,
        55..70 => GameCommand::MoveRight,
        70..85 => GameCommand::Rotate,
        85..95 => GameCommand::MoveDown,
        _ => GameCommand::HardDrop,
    };
    Some(command)
}

#[expect(clippy::cast_precision_loss)]
fn print_totals(summaries: &[GameSummary]) {
    if summaries.is_empty() {
        return;
    }
    let count = summaries.len() as f64;
    let mean = |f: fn(&GameSummary) -> usize| {
        summaries.iter().map(|s| f(s) as f64).sum::<f64>() / count
    };
    let best = summaries.iter().map(|s| s.score).max().unwrap_or(0);
    eprintln!("Played {} games", summaries.len());
    eprintln!("  mean score:  {:.1}", mean(|s| s.score));
    eprintln!("  best score:  {best}");
    eprintln!("  mean lines:  {:.1}", mean(|s| s.lines));
    eprintln!("  mean pieces: {:.1}", mean(|s| s.pieces));
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;

    use super::*;

    #[test]
    fn test_play_game_is_reproducible() {
        let config = SessionConfig {
            seed: Some(3),
            ..SessionConfig::default()
        };
        let a = play_game(0, config.clone(), 50, &mut StdRng::seed_from_u64(1));
        let b = play_game(0, config, 50, &mut StdRng::seed_from_u64(1));
        assert_eq!(a.score, b.score);
        assert_eq!(a.pieces, b.pieces);
        assert_eq!(a.virtual_millis, b.virtual_millis);
        assert!(a.pieces <= 50);
        assert!(a.game_over || a.pieces == 50);
        assert_eq!(a.level, a.lines / 3 + 1);
    }
}
