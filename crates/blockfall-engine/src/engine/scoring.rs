use std::time::Duration;

/// Base points per lock, indexed by the number of lines cleared at once.
///
/// - 0 lines: 0 points
/// - 1 line: 100 points
/// - 2 lines: 300 points
/// - 3 lines: 500 points
/// - 4 lines: 800 points
const SCORE_TABLE: [usize; 5] = [0, 100, 300, 500, 800];

/// Cleared lines needed to advance one level.
pub const LINES_PER_LEVEL: usize = 3;

/// Gravity period at level 1, in milliseconds.
const BASE_DROP_MILLIS: u64 = 300;
/// How much faster gravity gets per level, in milliseconds.
const DROP_MILLIS_PER_LEVEL: u64 = 80;
/// Fastest gravity period, in milliseconds.
const MIN_DROP_MILLIS: u64 = 50;

/// Points for one lock that cleared `cleared_lines` lines at `level`.
///
/// No combo, back-to-back or partial credit. A single lock clears at most 4
/// lines; larger counts score nothing.
///
/// ```
/// use blockfall_engine::score_for;
///
/// assert_eq!(score_for(0, 7), 0);
/// assert_eq!(score_for(4, 1), 800);
/// assert_eq!(score_for(2, 3), 900);
/// ```
#[must_use]
pub fn score_for(cleared_lines: usize, level: usize) -> usize {
    SCORE_TABLE.get(cleared_lines).map_or(0, |base| base * level)
}

/// Level reached after clearing `total_lines` lines. Starts at 1.
#[must_use]
pub const fn level_for_lines(total_lines: usize) -> usize {
    total_lines / LINES_PER_LEVEL + 1
}

/// Interval between automatic downward moves at `level`.
///
/// `max(50, 300 - (level - 1) * 80)` milliseconds.
///
/// ```
/// use std::time::Duration;
/// use blockfall_engine::drop_interval;
///
/// assert_eq!(drop_interval(1), Duration::from_millis(300));
/// assert_eq!(drop_interval(3), Duration::from_millis(140));
/// assert_eq!(drop_interval(10), Duration::from_millis(50));
/// ```
#[must_use]
pub fn drop_interval(level: usize) -> Duration {
    let steps = u64::try_from(level.saturating_sub(1)).unwrap_or(u64::MAX);
    let millis = BASE_DROP_MILLIS
        .saturating_sub(steps.saturating_mul(DROP_MILLIS_PER_LEVEL))
        .max(MIN_DROP_MILLIS);
    Duration::from_millis(millis)
}
