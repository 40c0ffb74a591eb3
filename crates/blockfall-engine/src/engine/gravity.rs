use std::time::Duration;

use super::{GameSession, LockReport, MoveOutcome, scoring::drop_interval};

/// Caller-owned ticker for automatic falling.
///
/// The session never reads a clock. A host feeds elapsed time into
/// [`drive`](Self::drive), which turns it into `move_down` calls at the
/// interval for the current level. The timer runs only while the session is
/// playing, and starts a fresh interval whenever it (re)starts or the level
/// changes; time accumulated before a pause or level change is discarded.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use blockfall_engine::{GameSession, GravityTimer};
///
/// let mut session = GameSession::with_seed(9);
/// let mut timer = GravityTimer::new();
///
/// let y0 = session.active_piece().unwrap().position().y;
/// timer.drive(&mut session, Duration::from_millis(299));
/// assert_eq!(session.active_piece().unwrap().position().y, y0);
/// timer.drive(&mut session, Duration::from_millis(1));
/// assert_eq!(session.active_piece().unwrap().position().y, y0 + 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GravityTimer {
    running_level: Option<usize>,
    interval: Duration,
    elapsed: Duration,
}

impl GravityTimer {
    /// Creates a stopped timer. It starts on the first [`sync`](Self::sync).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running_level.is_some()
    }

    /// Current tick period, or `None` while stopped.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        self.running_level.map(|_| self.interval)
    }

    /// Time left before the next tick, or `None` while stopped.
    #[must_use]
    pub fn time_until_tick(&self) -> Option<Duration> {
        self.running_level
            .map(|_| self.interval.saturating_sub(self.elapsed))
    }

    /// Starts, stops or restarts the timer to match `session`.
    pub fn sync(&mut self, session: &GameSession) {
        if !session.session_state().is_playing() {
            self.running_level = None;
            return;
        }
        let level = session.level();
        if self.running_level != Some(level) {
            self.running_level = Some(level);
            self.interval = drop_interval(level);
            self.elapsed = Duration::ZERO;
        }
    }

    /// Advances the clock by `dt` and applies every tick that came due.
    ///
    /// Returns the locks caused by those ticks.
    pub fn drive(&mut self, session: &mut GameSession, dt: Duration) -> Vec<LockReport> {
        let mut locks = vec![];
        self.sync(session);
        if !self.is_running() {
            return locks;
        }
        self.elapsed += dt;
        while self.is_running() && self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            if let Ok(MoveOutcome::Locked(report)) = session.move_down() {
                locks.push(report);
            }
            self.sync(session);
        }
        locks
    }
}

#[cfg(test)]
mod tests {
    use crate::{Board, PieceKind, Randomizer, SessionConfig};

    use super::*;

    fn millis(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    fn active_y(session: &GameSession) -> i32 {
        session.active_piece().unwrap().position().y
    }

    #[test]
    fn test_new_timer_is_stopped() {
        let timer = GravityTimer::new();
        assert!(!timer.is_running());
        assert_eq!(timer.interval(), None);
        assert_eq!(timer.time_until_tick(), None);
    }

    #[test]
    fn test_drive_applies_due_ticks() {
        let mut session = GameSession::with_seed(4);
        let mut timer = GravityTimer::new();
        let locks = timer.drive(&mut session, millis(900));
        assert!(locks.is_empty());
        assert_eq!(active_y(&session), 3);
        assert_eq!(timer.interval(), Some(millis(300)));

        timer.drive(&mut session, millis(250));
        assert_eq!(active_y(&session), 3);
        assert_eq!(timer.time_until_tick(), Some(millis(50)));
        timer.drive(&mut session, millis(50));
        assert_eq!(active_y(&session), 4);
    }

    #[test]
    fn test_pause_stops_and_resume_restarts_interval() {
        let mut session = GameSession::with_seed(4);
        let mut timer = GravityTimer::new();
        timer.drive(&mut session, millis(200));
        session.toggle_pause();
        timer.drive(&mut session, millis(10_000));
        assert!(!timer.is_running());
        assert_eq!(active_y(&session), 0);

        session.toggle_pause();
        // The 200ms from before the pause are gone.
        timer.drive(&mut session, millis(299));
        assert_eq!(active_y(&session), 0);
        timer.drive(&mut session, millis(1));
        assert_eq!(active_y(&session), 1);
    }

    #[test]
    fn test_level_change_restarts_with_faster_interval() {
        let board: Board = "
            IIIIIIIII.
            IIIIIIIII.
            IIIIIIIII.
        "
        .parse()
        .unwrap();
        let config = SessionConfig {
            seed: Some(0),
            randomizer: Randomizer::Sequence(vec![PieceKind::I]),
            show_ghost: true,
        };
        let mut session = GameSession::with_board(config, board);
        session.try_rotate().unwrap();
        for _ in 0..6 {
            session.move_right().unwrap();
        }

        let mut timer = GravityTimer::new();
        // 16 falls to the bottom, then one blocked tick locks.
        let locks = timer.drive(&mut session, millis(17 * 300));
        assert_eq!(locks.len(), 1);
        assert_eq!(locks[0].cleared_lines, 3);
        assert_eq!(locks[0].score_gained, 500);
        assert_eq!(session.level(), 2);
        assert_eq!(timer.interval(), Some(millis(220)));
        assert_eq!(timer.time_until_tick(), Some(millis(220)));

        timer.drive(&mut session, millis(219));
        assert_eq!(active_y(&session), 0);
        timer.drive(&mut session, millis(1));
        assert_eq!(active_y(&session), 1);
    }

    #[test]
    fn test_game_over_stops_timer() {
        let mut text = String::new();
        for _ in 0..18 {
            text.push_str("TTT.TTTTTT\n");
        }
        let board: Board = text.parse().unwrap();
        let config = SessionConfig {
            seed: Some(0),
            randomizer: Randomizer::Sequence(vec![PieceKind::O]),
            show_ghost: true,
        };
        let mut session = GameSession::with_board(config, board);
        assert_eq!(session.active_piece().unwrap().position().x, 4);

        let mut timer = GravityTimer::new();
        let locks = timer.drive(&mut session, millis(3_000));
        assert_eq!(locks.len(), 1);
        assert!(locks[0].game_over);
        assert!(session.is_game_over());
        assert!(!timer.is_running());
    }
}
