//! Start and end time choices for the entry editor.

use super::layout::GridConfig;
use chrono::NaiveTime;

/// Every selectable time from the first to the last visible hour, both
/// inclusive, spaced by the grid step.
pub fn time_options(grid: &GridConfig) -> Vec<NaiveTime> {
    let step = grid.step_minutes.max(1);
    let first = grid.start_hour * 60;
    let last = grid.end_hour.min(24) * 60;

    (first..=last)
        .step_by(step as usize)
        .filter_map(|m| NaiveTime::from_hms_opt(m / 60, m % 60, 0))
        .collect()
}

/// End times offered for a chosen start: only those strictly after it.
///
/// A previously chosen end time that is no longer in this set is left for
/// the caller to reset; it is not corrected here.
pub fn end_time_options(grid: &GridConfig, start: NaiveTime) -> Vec<NaiveTime> {
    time_options(grid)
        .into_iter()
        .filter(|t| *t > start)
        .collect()
}

/// Returns true if `end` may be submitted together with `start`.
pub fn is_valid_end(grid: &GridConfig, start: NaiveTime, end: NaiveTime) -> bool {
    end_time_options(grid, start).contains(&end)
}
