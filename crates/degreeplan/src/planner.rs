//! Student-facing entry points: read views over the current snapshot and
//! the mutations that change it.
//!
//! Every mutation is validated locally, sent to the store, and followed by
//! a re-fetch of the listing it touched. The snapshot is only replaced with
//! data the store returned, so a failed write leaves every view exactly as
//! it was.

use crate::catalog::{Catalog, Subject};
use crate::error::PlannerError;
use crate::progress::{
    aggregate_by_year, available, is_blocked, missing_prerequisites, subject_average, unlocks, Grade,
    GradeInput, Progress, ProgressCache, Status, StatusPatch, SubjectStatus, YearProgress,
};
use crate::schedule::{
    color_for, layout_week, GridConfig, ScheduleEntry, ScheduleEntryInput, Selection, WeekLayout,
};
use crate::store::{MutationService, Snapshot};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, RwLockWriteGuard};
use tracing::{debug, error, info, warn};

/// Everything shown on a subject's detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectView {
    pub code: String,
    pub name: String,
    pub year: u32,
    pub is_annual: bool,
    pub status: Status,
    pub notes: Option<String>,
    pub blocked: bool,
    pub missing_prerequisites: Vec<String>,
    pub unlocks: Vec<String>,
    pub grades: Vec<Grade>,
    pub average_grade: Option<f64>,
}

/// Progress summary with its per-year breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    #[serde(flatten)]
    pub overall: Progress,
    pub total_subjects: usize,
    pub by_year: Vec<YearProgress>,
}

#[derive(Debug, Clone, Copy)]
enum Listing {
    Statuses = 0,
    Grades = 1,
    Schedule = 2,
}

impl Listing {
    const ALL: [Listing; 3] = [Listing::Statuses, Listing::Grades, Listing::Schedule];
}

/// The installed snapshot and, per listing, the ticket of the fetch it
/// came from.
struct Current {
    snapshot: Arc<Snapshot>,
    installed: [u64; 3],
}

pub struct Planner {
    catalog: Arc<Catalog>,
    service: Arc<dyn MutationService>,
    current: RwLock<Current>,
    tickets: [AtomicU64; 3],
    selection: Mutex<Selection>,
    cache: ProgressCache,
}

impl Planner {
    /// Fetches every listing and builds the initial snapshot.
    pub async fn load(
        catalog: Arc<Catalog>,
        service: Arc<dyn MutationService>,
    ) -> Result<Self, PlannerError> {
        let snapshot = Snapshot::fetch(service.as_ref()).await?;
        info!(
            "Loaded plan: {} subjects, {} status records, {} grades, {} schedule entries",
            catalog.len(),
            snapshot.statuses.len(),
            snapshot.grades.len(),
            snapshot.schedule.len()
        );

        Ok(Self {
            catalog,
            service,
            current: RwLock::new(Current {
                snapshot: Arc::new(snapshot),
                installed: [0; 3],
            }),
            tickets: Default::default(),
            selection: Mutex::new(Selection::new()),
            cache: ProgressCache::default(),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The last state confirmed by the store.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .snapshot
            .clone()
    }

    fn write_current(&self) -> RwLockWriteGuard<'_, Current> {
        self.current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_selection(&self) -> std::sync::MutexGuard<'_, Selection> {
        self.selection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Numbers a fetch of `listing`. Taken before the store is asked, so a
    /// higher ticket always reflects every write confirmed before a lower one.
    fn ticket(&self, listing: Listing) -> u64 {
        self.tickets[listing as usize].fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Installs a fetched listing unless a fetch started later was already
    /// installed.
    fn install(
        &self,
        current: &mut Current,
        listing: Listing,
        ticket: u64,
        apply: impl FnOnce(&Snapshot) -> Snapshot,
    ) {
        let slot = listing as usize;
        if ticket <= current.installed[slot] {
            debug!(
                "Discarding {listing:?} fetch {ticket}, fetch {} is newer",
                current.installed[slot]
            );
            return;
        }

        let next = apply(&current.snapshot);
        self.lock_selection().reconcile(&next.schedule);
        current.snapshot = Arc::new(next);
        current.installed[slot] = ticket;
    }

    /// Re-fetches every listing.
    pub async fn refresh(&self) -> Result<(), PlannerError> {
        let tickets = Listing::ALL.map(|listing| self.ticket(listing));
        let Snapshot {
            statuses,
            grades,
            schedule,
        } = Snapshot::fetch(self.service.as_ref()).await?;

        let mut current = self.write_current();
        let [statuses_ticket, grades_ticket, schedule_ticket] = tickets;
        self.install(&mut current, Listing::Statuses, statuses_ticket, |s| Snapshot {
            statuses,
            ..s.clone()
        });
        self.install(&mut current, Listing::Grades, grades_ticket, |s| Snapshot {
            grades,
            ..s.clone()
        });
        self.install(&mut current, Listing::Schedule, schedule_ticket, |s| Snapshot {
            schedule,
            ..s.clone()
        });
        Ok(())
    }

    async fn refresh_listing(&self, listing: Listing) -> Result<(), PlannerError> {
        let ticket = self.ticket(listing);
        match listing {
            Listing::Statuses => {
                let statuses = self.service.list_statuses().await?;
                self.install(&mut self.write_current(), listing, ticket, |s| {
                    s.with_statuses(statuses)
                });
            }
            Listing::Grades => {
                let grades = self.service.list_grades().await?;
                self.install(&mut self.write_current(), listing, ticket, |s| {
                    s.with_grades(grades)
                });
            }
            Listing::Schedule => {
                let entries = self.service.list_schedule_entries().await?;
                self.install(&mut self.write_current(), listing, ticket, |s| {
                    s.with_schedule(entries)
                });
            }
        }
        Ok(())
    }

    /// Reconciles the snapshot with the outcome of a store call.
    ///
    /// On success the touched listing is re-fetched; if that re-fetch fails
    /// the write still stands and the previous snapshot stays in place. On
    /// failure the error is logged and returned, after re-fetching the
    /// listing if the target turned out to be gone.
    async fn settle<T>(
        &self,
        action: &str,
        listing: Listing,
        result: Result<T, PlannerError>,
    ) -> Result<T, PlannerError> {
        match result {
            Ok(value) => {
                if let Err(e) = self.refresh_listing(listing).await {
                    warn!("{action} succeeded but re-fetching {listing:?} failed: {e}");
                }
                Ok(value)
            }
            Err(e) => {
                error!("{action} failed: {e}");
                if e.needs_refresh() {
                    if let Err(refresh_err) = self.refresh_listing(listing).await {
                        warn!("Could not re-fetch {listing:?} after {action}: {refresh_err}");
                    }
                }
                Err(e)
            }
        }
    }

    fn subject(&self, code: &str) -> Result<&Subject, PlannerError> {
        self.catalog
            .get(code)
            .ok_or_else(|| PlannerError::not_found("subject", code))
    }

    // Reads

    pub fn progress(&self) -> Progress {
        let snapshot = self.snapshot();
        self.cache
            .get_or_compute(&self.catalog, &snapshot.statuses, &snapshot.grades)
    }

    pub fn progress_report(&self) -> ProgressReport {
        let snapshot = self.snapshot();
        ProgressReport {
            overall: self.progress(),
            total_subjects: self.catalog.len(),
            by_year: aggregate_by_year(&self.catalog, &snapshot.statuses),
        }
    }

    pub fn subject_view(&self, code: &str) -> Result<SubjectView, PlannerError> {
        let subject = self.subject(code)?;
        Ok(self.build_view(subject, &self.snapshot()))
    }

    /// Views for every catalog subject, in catalog order.
    pub fn subject_views(&self) -> Vec<SubjectView> {
        let snapshot = self.snapshot();
        self.catalog
            .iter()
            .map(|subject| self.build_view(subject, &snapshot))
            .collect()
    }

    fn build_view(&self, subject: &Subject, snapshot: &Snapshot) -> SubjectView {
        let statuses = &snapshot.statuses;
        SubjectView {
            code: subject.code.clone(),
            name: subject.name.clone(),
            year: subject.year,
            is_annual: subject.is_annual,
            status: statuses.status_of(&subject.code),
            notes: statuses.notes_of(&subject.code).map(str::to_string),
            blocked: is_blocked(subject, statuses),
            missing_prerequisites: missing_prerequisites(subject, statuses)
                .into_iter()
                .map(str::to_string)
                .collect(),
            unlocks: unlocks(subject, &self.catalog)
                .into_iter()
                .map(|s| s.code.clone())
                .collect(),
            grades: snapshot
                .grades
                .for_subject(&subject.code)
                .into_iter()
                .cloned()
                .collect(),
            average_grade: subject_average(&subject.code, &snapshot.grades),
        }
    }

    /// Subjects that can be taken now: not approved and not blocked.
    pub fn available_subjects(&self) -> Vec<SubjectView> {
        let snapshot = self.snapshot();
        available(&self.catalog, &snapshot.statuses)
            .into_iter()
            .map(|subject| self.build_view(subject, &snapshot))
            .collect()
    }

    pub fn grades(&self) -> Vec<Grade> {
        self.snapshot().grades.all().to_vec()
    }

    pub fn schedule(&self) -> Vec<ScheduleEntry> {
        self.snapshot().schedule.clone()
    }

    /// Lays out the week. `active` overrides the current selection.
    pub fn week_layout(&self, grid: &GridConfig, active: Option<i64>) -> WeekLayout {
        let active = active.or_else(|| self.selection());
        layout_week(&self.snapshot().schedule, grid, active)
    }

    // Selection

    pub fn selection(&self) -> Option<i64> {
        self.lock_selection().active()
    }

    /// Selects a schedule entry, or deselects it if it was already active.
    /// Returns the entry that is active afterwards.
    pub fn select_entry(&self, id: i64) -> Result<Option<i64>, PlannerError> {
        if self.snapshot().schedule_entry(id).is_none() {
            return Err(PlannerError::not_found("schedule entry", id));
        }
        let mut selection = self.lock_selection();
        selection.select(id);
        Ok(selection.active())
    }

    pub fn clear_selection(&self) {
        self.lock_selection().clear();
    }

    // Status and notes

    /// Records a status change. Blocked subjects can be changed too;
    /// blocking only affects how they are displayed.
    pub async fn set_status(
        &self,
        code: &str,
        status: Status,
    ) -> Result<SubjectStatus, PlannerError> {
        self.subject(code)?;
        info!("Setting status of {code} to {status}");

        let result = self
            .service
            .upsert_status(code, StatusPatch::status(status))
            .await;
        self.settle("status update", Listing::Statuses, result).await
    }

    pub async fn set_notes(&self, code: &str, notes: &str) -> Result<SubjectStatus, PlannerError> {
        self.subject(code)?;
        info!("Updating notes of {code}");

        let result = self
            .service
            .upsert_status(code, StatusPatch::notes(notes))
            .await;
        self.settle("notes update", Listing::Statuses, result).await
    }

    // Grades

    pub async fn add_grade(&self, code: &str, input: GradeInput) -> Result<Grade, PlannerError> {
        self.subject(code)?;
        input.validate()?;
        info!("Adding evaluation '{}' to {code}", input.eval_name.trim());

        let result = self.service.create_grade(code, input.normalized()).await;
        self.settle("grade creation", Listing::Grades, result).await
    }

    pub async fn update_grade(&self, id: i64, input: GradeInput) -> Result<Grade, PlannerError> {
        input.validate()?;
        info!("Updating grade {id}");

        let result = self.service.update_grade(id, input.normalized()).await;
        self.settle("grade update", Listing::Grades, result).await
    }

    pub async fn delete_grade(&self, id: i64) -> Result<(), PlannerError> {
        info!("Deleting grade {id}");

        let result = self.service.delete_grade(id).await;
        self.settle("grade deletion", Listing::Grades, result).await
    }

    // Schedule

    /// Fills in what the editor may leave blank: the catalog name for a
    /// known subject code, and the color, when `color` is given.
    fn complete_entry(&self, mut input: ScheduleEntryInput, color: Option<&str>) -> ScheduleEntryInput {
        if input.subject_name.trim().is_empty() {
            if let Some(subject) = input.subject_code.as_deref().and_then(|c| self.catalog.get(c)) {
                input.subject_name = subject.name.clone();
            }
        }
        if input.color.as_deref().map_or(true, |c| c.trim().is_empty()) {
            input.color = color.map(str::to_string);
        }
        input
    }

    pub async fn add_schedule_entry(
        &self,
        input: ScheduleEntryInput,
    ) -> Result<ScheduleEntry, PlannerError> {
        let palette_index = self.snapshot().schedule.len();
        let input = self.complete_entry(input, Some(color_for(palette_index)));
        input.validate()?;
        info!(
            "Adding schedule entry '{}' on {}",
            input.subject_name, input.day_of_week
        );

        let result = self.service.create_schedule_entry(input).await;
        self.settle("schedule entry creation", Listing::Schedule, result)
            .await
    }

    pub async fn update_schedule_entry(
        &self,
        id: i64,
        input: ScheduleEntryInput,
    ) -> Result<ScheduleEntry, PlannerError> {
        // A blank color keeps the entry's current one.
        let snapshot = self.snapshot();
        let current_color = snapshot.schedule_entry(id).map(|e| e.color.as_str());
        let input = self.complete_entry(input, current_color);
        input.validate()?;
        info!("Updating schedule entry {id}");

        let result = self.service.update_schedule_entry(id, input).await;
        self.settle("schedule entry update", Listing::Schedule, result)
            .await
    }

    pub async fn delete_schedule_entry(&self, id: i64) -> Result<(), PlannerError> {
        info!("Deleting schedule entry {id}");

        let result = self.service.delete_schedule_entry(id).await;
        self.settle("schedule entry deletion", Listing::Schedule, result)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{hhmm, Weekday};
    use crate::store::MemoryStore;

    fn chain() -> Arc<Catalog> {
        Arc::new(
            Catalog::new(vec![
                Subject::new("A", "Algebra", 1),
                Subject::new("B", "Calculus", 1).requires(&["A"]),
                Subject::new("C", "Analysis", 2).requires(&["B"]),
            ])
            .unwrap(),
        )
    }

    async fn planner() -> (Planner, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let planner = Planner::load(chain(), store.clone()).await.unwrap();
        (planner, store)
    }

    fn blocked(planner: &Planner, code: &str) -> bool {
        planner.subject_view(code).unwrap().blocked
    }

    fn grade(name: &str, value: Option<f64>) -> GradeInput {
        GradeInput {
            eval_name: name.to_string(),
            grade: value,
            eval_date: None,
        }
    }

    fn class(day: Weekday, start: &str, end: &str) -> ScheduleEntryInput {
        ScheduleEntryInput {
            subject_code: Some("A".to_string()),
            subject_name: String::new(),
            day_of_week: day,
            start_time: hhmm::parse(start).unwrap(),
            end_time: hhmm::parse(end).unwrap(),
            color: None,
            room: None,
        }
    }

    #[tokio::test]
    async fn test_prerequisite_chain_scenario() {
        let (planner, _) = planner().await;
        assert!(!blocked(&planner, "A"));
        assert!(blocked(&planner, "B"));
        assert!(blocked(&planner, "C"));

        planner.set_status("A", Status::Approved).await.unwrap();
        assert!(!blocked(&planner, "B"));
        assert!(blocked(&planner, "C"));

        planner.set_status("B", Status::Approved).await.unwrap();
        assert!(!blocked(&planner, "C"));
        assert_eq!(planner.progress().progress_percent, 67);
    }

    #[tokio::test]
    async fn test_blocked_subject_can_still_change_status() {
        let (planner, _) = planner().await;
        planner.set_status("C", Status::InProgress).await.unwrap();

        let view = planner.subject_view("C").unwrap();
        assert_eq!(view.status, Status::InProgress);
        assert!(view.blocked);
        assert_eq!(view.missing_prerequisites, vec!["B".to_string()]);
    }

    #[tokio::test]
    async fn test_repeated_status_keeps_one_record() {
        let (planner, store) = planner().await;
        planner.set_status("A", Status::Approved).await.unwrap();
        planner.set_status("A", Status::Approved).await.unwrap();

        assert_eq!(store.list_statuses().await.unwrap().len(), 1);
        assert_eq!(planner.snapshot().statuses.len(), 1);
        assert_eq!(planner.progress().approved_count, 1);
    }

    #[tokio::test]
    async fn test_status_can_be_reverted() {
        let (planner, _) = planner().await;
        planner.set_status("A", Status::Approved).await.unwrap();
        planner.set_status("A", Status::Pending).await.unwrap();
        assert!(blocked(&planner, "B"));
        assert_eq!(planner.progress().approved_count, 0);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_snapshot_untouched() {
        let (planner, store) = planner().await;
        planner.set_notes("A", "bring calculator").await.unwrap();
        let before = planner.snapshot();

        store.set_failing(true);
        let err = planner.set_status("A", Status::Approved).await.unwrap_err();
        assert!(matches!(err, PlannerError::Persistence { .. }));
        assert_eq!(*planner.snapshot(), *before);
        assert_eq!(planner.subject_view("A").unwrap().status, Status::Pending);

        store.set_failing(false);
        planner.set_status("A", Status::Approved).await.unwrap();
        let view = planner.subject_view("A").unwrap();
        assert_eq!(view.status, Status::Approved);
        assert_eq!(view.notes.as_deref(), Some("bring calculator"));
    }

    #[tokio::test]
    async fn test_unknown_subject_is_rejected_before_store() {
        let (planner, store) = planner().await;
        let err = planner.set_status("Z", Status::Approved).await.unwrap_err();
        assert!(matches!(err, PlannerError::NotFound { .. }));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_grades_flow_into_views() {
        let (planner, store) = planner().await;

        let midterm = planner.add_grade("A", grade(" 1st Midterm ", Some(6.0))).await.unwrap();
        assert_eq!(midterm.eval_name, "1st Midterm");
        planner.add_grade("A", grade("Final", None)).await.unwrap();
        planner.add_grade("C", grade("Final", Some(9.0))).await.unwrap();

        let a = planner.subject_view("A").unwrap();
        assert_eq!(a.grades.len(), 2);
        assert_eq!(a.average_grade, Some(6.0));
        assert_eq!(planner.progress().average_grade, Some(7.5));
        // Grades do not move subjects out of pending.
        assert_eq!(planner.progress().pending_count, 3);

        planner
            .update_grade(midterm.id, grade("1st Midterm", Some(8.0)))
            .await
            .unwrap();
        assert_eq!(planner.subject_view("A").unwrap().average_grade, Some(8.0));

        planner.delete_grade(midterm.id).await.unwrap();
        assert_eq!(planner.subject_view("A").unwrap().average_grade, None);

        let writes = store.write_count();
        let err = planner.add_grade("A", grade("", Some(5.0))).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn test_concurrently_deleted_grade_reconciles() {
        let (planner, store) = planner().await;
        let g = planner.add_grade("A", grade("Final", Some(7.0))).await.unwrap();

        // Removed behind the planner's back, e.g. from another device.
        store.delete_grade(g.id).await.unwrap();
        assert_eq!(planner.grades().len(), 1);

        let err = planner
            .update_grade(g.id, grade("Final", Some(8.0)))
            .await
            .unwrap_err();
        assert!(err.needs_refresh());
        assert!(planner.grades().is_empty());
    }

    #[tokio::test]
    async fn test_schedule_entries_and_layout() {
        let (planner, _) = planner().await;

        let first = planner
            .add_schedule_entry(class(Weekday::Monday, "09:00", "10:30"))
            .await
            .unwrap();
        assert_eq!(first.subject_name, "Algebra");
        assert_eq!(first.color, color_for(0));

        let second = planner
            .add_schedule_entry(class(Weekday::Monday, "10:00", "11:00"))
            .await
            .unwrap();
        assert_eq!(second.color, color_for(1));

        let layout = planner.week_layout(&GridConfig::default(), Some(first.id));
        let block = layout.block(first.id).unwrap();
        assert_eq!(block.offset, 104.0);
        assert_eq!(block.height, 78.0);
        assert!(block.active);
        assert_eq!(layout.column(Weekday::Monday).blocks.last().unwrap().entry_id, first.id);

        let moved = planner
            .update_schedule_entry(second.id, class(Weekday::Friday, "14:00", "16:00"))
            .await
            .unwrap();
        assert_eq!(moved.day_of_week, Weekday::Friday);
        assert_eq!(moved.color, second.color);

        planner.delete_schedule_entry(first.id).await.unwrap();
        assert_eq!(planner.schedule().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_entry_times_are_rejected() {
        let (planner, store) = planner().await;
        let err = planner
            .add_schedule_entry(class(Weekday::Tuesday, "11:00", "10:00"))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let mut freeform = class(Weekday::Tuesday, "10:00", "11:00");
        freeform.subject_code = None;
        let err = planner.add_schedule_entry(freeform).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_progress_report_by_year() {
        let (planner, _) = planner().await;
        planner.set_status("A", Status::Approved).await.unwrap();
        planner.set_status("C", Status::InProgress).await.unwrap();

        let report = planner.progress_report();
        assert_eq!(report.total_subjects, 3);
        assert_eq!(report.overall.approved_count, 1);
        assert_eq!(report.by_year.len(), 2);
        assert_eq!(report.by_year[0].approved_count, 1);
        assert_eq!(report.by_year[1].in_progress_count, 1);

        let unlocked: Vec<_> = planner.subject_views().iter().map(|v| v.unlocks.clone()).collect();
        assert_eq!(
            unlocked,
            vec![vec!["B".to_string()], vec!["C".to_string()], vec![]]
        );
    }

    #[tokio::test]
    async fn test_available_subjects_follow_approvals() {
        let (planner, _) = planner().await;
        let codes = |planner: &Planner| -> Vec<String> {
            planner.available_subjects().into_iter().map(|v| v.code).collect()
        };
        assert_eq!(codes(&planner), vec!["A"]);

        planner.set_status("A", Status::Approved).await.unwrap();
        assert_eq!(codes(&planner), vec!["B"]);
    }

    #[tokio::test]
    async fn test_selection_toggles_and_survives_until_delete() {
        let (planner, _) = planner().await;
        let first = planner
            .add_schedule_entry(class(Weekday::Monday, "09:00", "10:00"))
            .await
            .unwrap();
        let second = planner
            .add_schedule_entry(class(Weekday::Monday, "09:30", "11:00"))
            .await
            .unwrap();

        assert_eq!(planner.select_entry(first.id).unwrap(), Some(first.id));
        assert_eq!(planner.select_entry(second.id).unwrap(), Some(second.id));
        assert_eq!(planner.select_entry(second.id).unwrap(), None);
        assert!(planner.select_entry(999).unwrap_err().needs_refresh());

        planner.select_entry(first.id).unwrap();
        let layout = planner.week_layout(&GridConfig::default(), None);
        let monday = layout.column(Weekday::Monday);
        assert_eq!(monday.blocks.last().unwrap().entry_id, first.id);

        planner.delete_schedule_entry(first.id).await.unwrap();
        assert_eq!(planner.selection(), None);

        planner.select_entry(second.id).unwrap();
        planner.clear_selection();
        assert_eq!(planner.selection(), None);
    }

    #[tokio::test]
    async fn test_edit_without_color_keeps_entry_color() {
        let (planner, _) = planner().await;
        // Created later but sorted first on the grid.
        let first = planner
            .add_schedule_entry(class(Weekday::Monday, "10:00", "11:00"))
            .await
            .unwrap();
        let second = planner
            .add_schedule_entry(class(Weekday::Monday, "09:00", "10:00"))
            .await
            .unwrap();
        assert_ne!(first.color, second.color);

        let mut edit = class(Weekday::Monday, "10:00", "11:00");
        edit.room = Some("Lab 3".to_string());
        let edited = planner.update_schedule_entry(first.id, edit).await.unwrap();
        assert_eq!(edited.color, first.color);
        assert_eq!(edited.room.as_deref(), Some("Lab 3"));

        let colors: Vec<_> = planner.schedule().into_iter().map(|e| e.color).collect();
        assert_eq!(colors, vec![second.color.clone(), first.color.clone()]);
    }

    /// Parks the first armed `list_statuses` call after it has read the
    /// store, until released.
    #[derive(Default)]
    struct GatedStore {
        inner: MemoryStore,
        armed: std::sync::atomic::AtomicBool,
        parked: tokio::sync::Notify,
        release: tokio::sync::Notify,
    }

    #[async_trait::async_trait]
    impl MutationService for GatedStore {
        async fn list_statuses(&self) -> Result<Vec<SubjectStatus>, PlannerError> {
            let statuses = self.inner.list_statuses().await?;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.parked.notify_one();
                self.release.notified().await;
            }
            Ok(statuses)
        }

        async fn upsert_status(
            &self,
            code: &str,
            patch: StatusPatch,
        ) -> Result<SubjectStatus, PlannerError> {
            self.inner.upsert_status(code, patch).await
        }

        async fn list_grades(&self) -> Result<Vec<Grade>, PlannerError> {
            self.inner.list_grades().await
        }

        async fn create_grade(&self, code: &str, input: GradeInput) -> Result<Grade, PlannerError> {
            self.inner.create_grade(code, input).await
        }

        async fn update_grade(&self, id: i64, input: GradeInput) -> Result<Grade, PlannerError> {
            self.inner.update_grade(id, input).await
        }

        async fn delete_grade(&self, id: i64) -> Result<(), PlannerError> {
            self.inner.delete_grade(id).await
        }

        async fn list_schedule_entries(&self) -> Result<Vec<ScheduleEntry>, PlannerError> {
            self.inner.list_schedule_entries().await
        }

        async fn create_schedule_entry(
            &self,
            input: ScheduleEntryInput,
        ) -> Result<ScheduleEntry, PlannerError> {
            self.inner.create_schedule_entry(input).await
        }

        async fn update_schedule_entry(
            &self,
            id: i64,
            input: ScheduleEntryInput,
        ) -> Result<ScheduleEntry, PlannerError> {
            self.inner.update_schedule_entry(id, input).await
        }

        async fn delete_schedule_entry(&self, id: i64) -> Result<(), PlannerError> {
            self.inner.delete_schedule_entry(id).await
        }
    }

    #[tokio::test]
    async fn test_late_refetch_does_not_overwrite_newer_listing() {
        let store = Arc::new(GatedStore::default());
        let planner = Arc::new(Planner::load(chain(), store.clone()).await.unwrap());

        store.armed.store(true, Ordering::SeqCst);
        let slow = tokio::spawn({
            let planner = planner.clone();
            async move { planner.set_status("A", Status::Approved).await }
        });
        store.parked.notified().await;

        planner.set_status("B", Status::Approved).await.unwrap();
        store.release.notify_one();
        slow.await.unwrap().unwrap();

        assert_eq!(planner.subject_view("A").unwrap().status, Status::Approved);
        assert_eq!(planner.subject_view("B").unwrap().status, Status::Approved);
        assert_eq!(planner.progress().approved_count, 2);
    }

    #[tokio::test]
    async fn test_full_refresh_picks_up_outside_writes() {
        let (planner, store) = planner().await;
        store
            .upsert_status("A", StatusPatch::status(Status::Approved))
            .await
            .unwrap();
        assert_eq!(planner.progress().approved_count, 0);

        planner.refresh().await.unwrap();
        assert_eq!(planner.progress().approved_count, 1);
        assert!(!blocked(&planner, "B"));
    }

    #[tokio::test]
    async fn test_empty_notes_clear_the_view() {
        let (planner, _) = planner().await;
        planner.set_notes("A", "bring calculator").await.unwrap();
        assert_eq!(
            planner.subject_view("A").unwrap().notes.as_deref(),
            Some("bring calculator")
        );

        planner.set_notes("A", "").await.unwrap();
        assert_eq!(planner.subject_view("A").unwrap().notes, None);
    }
}
