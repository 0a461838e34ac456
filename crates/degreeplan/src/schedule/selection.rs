//! Single active selection on the class grid.
//!
//! At most one entry is active at a time across the whole week. The active
//! entry shows its edit/delete actions and draws above overlapping blocks.
//! Selection is view state only and is never persisted.

use super::types::ScheduleEntry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    active: Option<i64>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<i64> {
        self.active
    }

    pub fn is_active(&self, entry_id: i64) -> bool {
        self.active == Some(entry_id)
    }

    /// Selects an entry, moving the selection away from any other entry.
    /// Selecting the active entry again deselects it.
    pub fn select(&mut self, entry_id: i64) {
        self.active = if self.is_active(entry_id) {
            None
        } else {
            Some(entry_id)
        };
    }

    /// Selecting empty grid space clears the selection.
    pub fn clear(&mut self) {
        self.active = None;
    }

    /// Drops the selection if its entry is no longer in the listing, e.g.
    /// after it was deleted.
    pub fn reconcile(&mut self, entries: &[ScheduleEntry]) {
        if let Some(id) = self.active {
            if !entries.iter().any(|e| e.id == id) {
                self.active = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Weekday;
    use chrono::NaiveTime;

    fn entry(id: i64) -> ScheduleEntry {
        ScheduleEntry {
            id,
            subject_code: None,
            subject_name: "Lab".to_string(),
            day_of_week: Weekday::Tuesday,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            color: "teal".to_string(),
            room: None,
        }
    }

    #[test]
    fn test_single_active_entry() {
        let mut selection = Selection::new();
        selection.select(1);
        assert!(selection.is_active(1));

        selection.select(2);
        assert!(!selection.is_active(1));
        assert_eq!(selection.active(), Some(2));

        selection.clear();
        assert_eq!(selection.active(), None);
    }

    #[test]
    fn test_reselect_toggles_off() {
        let mut selection = Selection::new();
        selection.select(3);
        selection.select(3);
        assert_eq!(selection.active(), None);
    }

    #[test]
    fn test_reconcile_drops_deleted_entry() {
        let mut selection = Selection::new();
        selection.select(1);
        selection.reconcile(&[entry(1), entry(2)]);
        assert_eq!(selection.active(), Some(1));
        selection.reconcile(&[entry(2)]);
        assert_eq!(selection.active(), None);
    }
}
