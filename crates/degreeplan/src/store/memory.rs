//! In-process store, used by tests and for throwaway sessions.

use super::MutationService;
use crate::error::PlannerError;
use crate::progress::{Grade, GradeInput, Status, StatusPatch, SubjectStatus};
use crate::schedule::{ScheduleEntry, ScheduleEntryInput};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    statuses: BTreeMap<String, SubjectStatus>,
    grades: Vec<Grade>,
    schedule: Vec<ScheduleEntry>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A [`MutationService`] backed by plain collections behind a mutex.
///
/// Writes can be made to fail on demand to exercise error paths.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    failing: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every write returns a persistence error and changes
    /// nothing.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn begin_write(&self) -> Result<(), PlannerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PlannerError::persistence("store unavailable"));
        }
        Ok(())
    }

    fn commit_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MutationService for MemoryStore {
    async fn list_statuses(&self) -> Result<Vec<SubjectStatus>, PlannerError> {
        let state = self.state.lock()?;
        Ok(state.statuses.values().cloned().collect())
    }

    async fn upsert_status(
        &self,
        subject_code: &str,
        patch: StatusPatch,
    ) -> Result<SubjectStatus, PlannerError> {
        self.begin_write()?;
        let mut state = self.state.lock()?;

        let record = state
            .statuses
            .entry(subject_code.to_string())
            .or_insert_with(|| SubjectStatus {
                subject_code: subject_code.to_string(),
                status: Status::Pending,
                notes: None,
                updated_at: Utc::now(),
            });
        if let Some(status) = patch.status {
            record.status = status;
        }
        if let Some(notes) = patch.notes {
            record.notes = Some(notes);
        }
        record.updated_at = Utc::now();

        let record = record.clone();
        self.commit_write();
        Ok(record)
    }

    async fn list_grades(&self) -> Result<Vec<Grade>, PlannerError> {
        let state = self.state.lock()?;
        Ok(state.grades.clone())
    }

    async fn create_grade(
        &self,
        subject_code: &str,
        input: GradeInput,
    ) -> Result<Grade, PlannerError> {
        self.begin_write()?;
        let mut state = self.state.lock()?;

        let grade = Grade {
            id: state.next_id(),
            subject_code: subject_code.to_string(),
            eval_name: input.eval_name,
            grade: input.grade,
            eval_date: input.eval_date,
            created_at: Utc::now(),
        };
        state.grades.push(grade.clone());
        self.commit_write();
        Ok(grade)
    }

    async fn update_grade(&self, id: i64, input: GradeInput) -> Result<Grade, PlannerError> {
        self.begin_write()?;
        let mut state = self.state.lock()?;

        let grade = state
            .grades
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| PlannerError::not_found("grade", id))?;
        grade.eval_name = input.eval_name;
        grade.grade = input.grade;
        grade.eval_date = input.eval_date;

        let grade = grade.clone();
        self.commit_write();
        Ok(grade)
    }

    async fn delete_grade(&self, id: i64) -> Result<(), PlannerError> {
        self.begin_write()?;
        let mut state = self.state.lock()?;

        let before = state.grades.len();
        state.grades.retain(|g| g.id != id);
        if state.grades.len() == before {
            return Err(PlannerError::not_found("grade", id));
        }
        self.commit_write();
        Ok(())
    }

    async fn list_schedule_entries(&self) -> Result<Vec<ScheduleEntry>, PlannerError> {
        let state = self.state.lock()?;
        Ok(state.schedule.clone())
    }

    async fn create_schedule_entry(
        &self,
        input: ScheduleEntryInput,
    ) -> Result<ScheduleEntry, PlannerError> {
        self.begin_write()?;
        let mut state = self.state.lock()?;

        let palette_index = state.schedule.len();
        let id = state.next_id();
        let entry = input.into_entry(id, palette_index);
        state.schedule.push(entry.clone());
        self.commit_write();
        Ok(entry)
    }

    async fn update_schedule_entry(
        &self,
        id: i64,
        input: ScheduleEntryInput,
    ) -> Result<ScheduleEntry, PlannerError> {
        self.begin_write()?;
        let mut state = self.state.lock()?;

        let pos = state
            .schedule
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| PlannerError::not_found("schedule entry", id))?;
        let entry = input.apply_to(&state.schedule[pos]);
        state.schedule[pos] = entry.clone();
        self.commit_write();
        Ok(entry)
    }

    async fn delete_schedule_entry(&self, id: i64) -> Result<(), PlannerError> {
        self.begin_write()?;
        let mut state = self.state.lock()?;

        let before = state.schedule.len();
        state.schedule.retain(|e| e.id != id);
        if state.schedule.len() == before {
            return Err(PlannerError::not_found("schedule entry", id));
        }
        self.commit_write();
        Ok(())
    }
}
