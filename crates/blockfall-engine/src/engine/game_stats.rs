use serde::Serialize;

use super::scoring::{level_for_lines, score_for};

/// Game statistics tracking score, lines cleared, and piece count.
///
/// - **Score**: points earned from line clears
/// - **Level**: derived from total lines cleared (1 level per 3 lines,
///   starting at 1)
/// - **Completed pieces**: total number of pieces locked
/// - **Line clear distribution**: count of locks by lines cleared
///
/// # Example
///
/// ```
/// use blockfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// let gained = stats.complete_piece_drop(4);
///
/// assert_eq!(gained, 800);
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.level(), 2);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    score: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    /// Creates a new game statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Returns the current level: `total_cleared_lines / 3 + 1`.
    #[must_use]
    pub const fn level(&self) -> usize {
        level_for_lines(self.total_cleared_lines)
    }

    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of locks by lines cleared.
    ///
    /// - `[0]`: locks that cleared nothing
    /// - `[1]`..`[4]`: singles, doubles, triples, quadruples
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Records one lock and returns the points it earned.
    ///
    /// Points are computed at the level in effect before the cleared lines
    /// are counted.
    pub fn complete_piece_drop(&mut self, cleared_lines: usize) -> usize {
        let gained = score_for(cleared_lines, self.level());
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if let Some(count) = self.line_cleared_counter.get_mut(cleared_lines) {
            *count += 1;
        }
        self.score += gained;
        gained
    }
}
