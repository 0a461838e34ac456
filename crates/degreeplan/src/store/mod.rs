//! Persistence boundary for statuses, grades and schedule entries.
//!
//! The planner talks to storage only through [`MutationService`]. Any
//! backend honoring the operation contracts works: the SQLite store used by
//! the server, or the in-memory store used in tests.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::PlannerError;
use crate::progress::{Grade, GradeBook, GradeInput, StatusMap, StatusPatch, SubjectStatus};
use crate::schedule::{ScheduleEntry, ScheduleEntryInput};
use async_trait::async_trait;

/// Operations the planner needs from storage.
///
/// Writes are last-write-wins and each call stands alone: there is no
/// transaction spanning statuses and grades.
#[async_trait]
pub trait MutationService: Send + Sync {
    async fn list_statuses(&self) -> Result<Vec<SubjectStatus>, PlannerError>;

    /// Creates the record for `subject_code` if absent, otherwise applies
    /// the patch to it. Always refreshes `updated_at`.
    async fn upsert_status(
        &self,
        subject_code: &str,
        patch: StatusPatch,
    ) -> Result<SubjectStatus, PlannerError>;

    /// All grades, oldest first.
    async fn list_grades(&self) -> Result<Vec<Grade>, PlannerError>;

    async fn create_grade(
        &self,
        subject_code: &str,
        input: GradeInput,
    ) -> Result<Grade, PlannerError>;

    async fn update_grade(&self, id: i64, input: GradeInput) -> Result<Grade, PlannerError>;

    async fn delete_grade(&self, id: i64) -> Result<(), PlannerError>;

    async fn list_schedule_entries(&self) -> Result<Vec<ScheduleEntry>, PlannerError>;

    async fn create_schedule_entry(
        &self,
        input: ScheduleEntryInput,
    ) -> Result<ScheduleEntry, PlannerError>;

    async fn update_schedule_entry(
        &self,
        id: i64,
        input: ScheduleEntryInput,
    ) -> Result<ScheduleEntry, PlannerError>;

    async fn delete_schedule_entry(&self, id: i64) -> Result<(), PlannerError>;
}

/// Immutable view of everything the store holds for a student.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub statuses: StatusMap,
    pub grades: GradeBook,
    pub schedule: Vec<ScheduleEntry>,
}

impl Snapshot {
    /// Fetches all listings concurrently.
    pub async fn fetch<S: MutationService + ?Sized>(service: &S) -> Result<Self, PlannerError> {
        let (statuses, grades, schedule) = futures::try_join!(
            service.list_statuses(),
            service.list_grades(),
            service.list_schedule_entries(),
        )?;

        Ok(Snapshot {
            statuses: StatusMap::new(statuses),
            grades: GradeBook::new(grades),
            schedule: sort_schedule(schedule),
        })
    }

    pub fn with_statuses(&self, statuses: Vec<SubjectStatus>) -> Self {
        Snapshot {
            statuses: StatusMap::new(statuses),
            ..self.clone()
        }
    }

    pub fn with_grades(&self, grades: Vec<Grade>) -> Self {
        Snapshot {
            grades: GradeBook::new(grades),
            ..self.clone()
        }
    }

    pub fn with_schedule(&self, schedule: Vec<ScheduleEntry>) -> Self {
        Snapshot {
            schedule: sort_schedule(schedule),
            ..self.clone()
        }
    }

    pub fn schedule_entry(&self, id: i64) -> Option<&ScheduleEntry> {
        self.schedule.iter().find(|e| e.id == id)
    }
}

fn sort_schedule(mut entries: Vec<ScheduleEntry>) -> Vec<ScheduleEntry> {
    entries.sort_by(|a, b| {
        a.day_of_week
            .cmp(&b.day_of_week)
            .then(a.start_time.cmp(&b.start_time))
            .then(a.id.cmp(&b.id))
    });
    entries
}
