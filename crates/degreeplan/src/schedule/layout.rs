//! Vertical geometry of the weekly class grid.
//!
//! Blocks are placed by start time and sized by duration. Overlapping
//! blocks on the same day are not split into lanes: each renders at full
//! column width, and the active block is raised above the others.

use super::types::{ScheduleEntry, Weekday};
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Visible hour range and sizing of the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// First visible hour (inclusive)
    pub start_hour: u32,
    /// Last visible hour (inclusive, as the bottom edge)
    pub end_hour: u32,
    /// Height of one hour row, in display units
    pub row_height: f64,
    /// Smallest height a block is drawn with, so short blocks stay tappable
    pub min_block_height: f64,
    /// Spacing of selectable start/end times, in minutes
    pub step_minutes: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            start_hour: 7,
            end_hour: 22,
            row_height: 52.0,
            min_block_height: 28.0,
            step_minutes: 30,
        }
    }
}

impl GridConfig {
    /// Checks the range and sizing values, returning a description of the
    /// first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.start_hour >= self.end_hour || self.end_hour > 24 {
            return Err(format!(
                "invalid hour range {}..{}",
                self.start_hour, self.end_hour
            ));
        }
        if !(self.row_height > 0.0) {
            return Err(format!("row_height must be positive, got {}", self.row_height));
        }
        if !(self.min_block_height >= 0.0) {
            return Err(format!(
                "min_block_height must not be negative, got {}",
                self.min_block_height
            ));
        }
        if self.step_minutes == 0 || self.step_minutes > 60 || 60 % self.step_minutes != 0 {
            return Err(format!(
                "step_minutes must divide an hour, got {}",
                self.step_minutes
            ));
        }
        Ok(())
    }

    /// Distance from the top of the grid to the start of a block.
    ///
    /// Times before the first visible hour give a negative offset; the
    /// grid does not clamp them.
    pub fn offset(&self, start: NaiveTime) -> f64 {
        let minutes = minutes_of(start) - (self.start_hour * 60) as f64;
        minutes / 60.0 * self.row_height
    }

    /// Block height for a time range, never below `min_block_height`.
    pub fn height(&self, start: NaiveTime, end: NaiveTime) -> f64 {
        let minutes = minutes_of(end) - minutes_of(start);
        (minutes / 60.0 * self.row_height).max(self.min_block_height)
    }

    /// Full height of the visible range.
    pub fn total_height(&self) -> f64 {
        (self.end_hour - self.start_hour) as f64 * self.row_height
    }

    /// Hour marks drawn down the side of the grid. A grid running to
    /// midnight ends with "24:00".
    pub fn hour_labels(&self) -> Vec<String> {
        (self.start_hour..=self.end_hour)
            .map(|h| format!("{h:02}:00"))
            .collect()
    }
}

fn minutes_of(time: NaiveTime) -> f64 {
    (time.hour() * 60 + time.minute()) as f64
}

/// Placement of one entry in its day column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub entry_id: i64,
    pub offset: f64,
    pub height: f64,
    /// Stacking order within the column; higher draws on top
    pub z_index: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayColumn {
    pub day: Weekday,
    /// Blocks in draw order (bottom first)
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekLayout {
    pub total_height: f64,
    pub hour_labels: Vec<String>,
    pub days: Vec<DayColumn>,
}

impl WeekLayout {
    pub fn block(&self, entry_id: i64) -> Option<&Block> {
        self.days
            .iter()
            .flat_map(|d| &d.blocks)
            .find(|b| b.entry_id == entry_id)
    }

    pub fn column(&self, day: Weekday) -> &DayColumn {
        &self.days[day.column()]
    }
}

/// Lays out every entry in its declared day column.
///
/// Within a column, blocks are ordered by start time, then end time, then
/// id, which fixes the stacking of overlapping blocks. The `active` entry,
/// if present, is moved to the top of its column.
pub fn layout_week(entries: &[ScheduleEntry], grid: &GridConfig, active: Option<i64>) -> WeekLayout {
    let days = Weekday::ALL
        .into_iter()
        .map(|day| {
            let mut entries: Vec<&ScheduleEntry> =
                entries.iter().filter(|e| e.day_of_week == day).collect();
            entries.sort_by(|a, b| {
                a.start_time
                    .cmp(&b.start_time)
                    .then(a.end_time.cmp(&b.end_time))
                    .then(a.id.cmp(&b.id))
            });

            if let Some(pos) = entries.iter().position(|e| Some(e.id) == active) {
                let raised = entries.remove(pos);
                entries.push(raised);
            }

            let blocks = entries
                .into_iter()
                .enumerate()
                .map(|(z_index, e)| Block {
                    entry_id: e.id,
                    offset: grid.offset(e.start_time),
                    height: grid.height(e.start_time, e.end_time),
                    z_index,
                    active: Some(e.id) == active,
                })
                .collect();

            DayColumn { day, blocks }
        })
        .collect();

    WeekLayout {
        total_height: grid.total_height(),
        hour_labels: grid.hour_labels(),
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn entry(id: i64, day: Weekday, start: NaiveTime, end: NaiveTime) -> ScheduleEntry {
        ScheduleEntry {
            id,
            subject_code: None,
            subject_name: format!("Class {id}"),
            day_of_week: day,
            start_time: start,
            end_time: end,
            color: "blue".to_string(),
            room: None,
        }
    }

    #[test]
    fn test_offset_and_height() {
        let grid = GridConfig::default();
        assert_eq!(grid.offset(t(9, 0)), 104.0);
        assert_eq!(grid.height(t(9, 0), t(10, 30)), 78.0);
        assert_eq!(grid.offset(t(7, 0)), 0.0);
        assert_eq!(grid.total_height(), 15.0 * 52.0);
    }

    #[test]
    fn test_short_block_uses_minimum_height() {
        let grid = GridConfig::default();
        assert_eq!(grid.height(t(9, 0), t(9, 10)), 28.0);
        assert_eq!(grid.height(t(9, 0), t(9, 40)), 40.0 / 60.0 * 52.0);
    }

    #[test]
    fn test_entries_stay_in_their_day() {
        let grid = GridConfig::default();
        let entries = vec![
            entry(1, Weekday::Monday, t(9, 0), t(11, 0)),
            entry(2, Weekday::Saturday, t(8, 0), t(9, 0)),
            entry(3, Weekday::Monday, t(8, 0), t(9, 0)),
        ];
        let layout = layout_week(&entries, &grid, None);

        assert_eq!(layout.days.len(), 6);
        let monday: Vec<_> = layout
            .column(Weekday::Monday)
            .blocks
            .iter()
            .map(|b| b.entry_id)
            .collect();
        assert_eq!(monday, vec![3, 1]);
        assert_eq!(layout.column(Weekday::Saturday).blocks.len(), 1);
        assert!(layout.column(Weekday::Tuesday).blocks.is_empty());
    }

    #[test]
    fn test_overlaps_render_full_width_and_active_on_top() {
        let grid = GridConfig::default();
        let entries = vec![
            entry(1, Weekday::Wednesday, t(9, 0), t(11, 0)),
            entry(2, Weekday::Wednesday, t(10, 0), t(12, 0)),
            entry(3, Weekday::Wednesday, t(10, 30), t(11, 30)),
        ];
        assert!(entries[0].overlaps(&entries[1]));

        let plain = layout_week(&entries, &grid, None);
        let order: Vec<_> = plain.days[2].blocks.iter().map(|b| b.entry_id).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert!(plain.days[2].blocks.iter().all(|b| !b.active));

        let selected = layout_week(&entries, &grid, Some(1));
        let top = selected.days[2].blocks.last().unwrap();
        assert_eq!(top.entry_id, 1);
        assert!(top.active);
        assert_eq!(top.z_index, 2);
        // Geometry does not change with selection.
        assert_eq!(
            selected.block(1).unwrap().offset,
            plain.block(1).unwrap().offset
        );
    }

    #[test]
    fn test_layout_is_deterministic_for_any_input_order() {
        let grid = GridConfig::default();
        let mut entries = vec![
            entry(5, Weekday::Friday, t(9, 0), t(10, 0)),
            entry(4, Weekday::Friday, t(9, 0), t(10, 0)),
            entry(6, Weekday::Friday, t(9, 0), t(9, 30)),
        ];
        let a = layout_week(&entries, &grid, None);
        entries.reverse();
        let b = layout_week(&entries, &grid, None);
        assert_eq!(a, b);
        let order: Vec<_> = a.days[4].blocks.iter().map(|b| b.entry_id).collect();
        assert_eq!(order, vec![6, 4, 5]);
    }

    #[test]
    fn test_unknown_active_id_changes_nothing() {
        let grid = GridConfig::default();
        let entries = vec![entry(1, Weekday::Monday, t(9, 0), t(10, 0))];
        assert_eq!(
            layout_week(&entries, &grid, Some(99)),
            layout_week(&entries, &grid, None)
        );
    }

    #[test]
    fn test_grid_validation() {
        assert!(GridConfig::default().validate().is_ok());

        let mut grid = GridConfig::default();
        grid.start_hour = 22;
        assert!(grid.validate().is_err());

        let mut grid = GridConfig::default();
        grid.step_minutes = 25;
        assert!(grid.validate().is_err());

        let mut grid = GridConfig::default();
        grid.row_height = 0.0;
        assert!(grid.validate().is_err());

        let mut grid = GridConfig::default();
        grid.min_block_height = f64::NAN;
        assert!(grid.validate().is_err());
    }

    #[test]
    fn test_hour_labels() {
        let labels = layout_week(&[], &GridConfig::default(), None).hour_labels;
        assert_eq!(labels.len(), 16);
        assert_eq!(labels.first().unwrap(), "07:00");
        assert_eq!(labels.last().unwrap(), "22:00");

        let grid = GridConfig {
            start_hour: 20,
            end_hour: 24,
            ..GridConfig::default()
        };
        assert!(grid.validate().is_ok());
        assert_eq!(grid.hour_labels(), vec!["20:00", "21:00", "22:00", "23:00", "24:00"]);
    }
}
