/// SQLite-backed store for statuses, grades and schedule entries
use super::MutationService;
use crate::error::PlannerError;
use crate::progress::{Grade, GradeInput, Status, StatusPatch, SubjectStatus};
use crate::schedule::{ScheduleEntry, ScheduleEntryInput, Weekday};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Mutex;
use tracing::info;

const SCHEMA_SQL: &str = include_str!("../../sql/init.sql");

const GRADE_COLUMNS: &str = "id, subject_code, eval_name, grade, eval_date, created_at";
const ENTRY_COLUMNS: &str =
    "id, subject_code, subject_name, day_of_week, start_time, end_time, color, room";

pub struct SqliteStore {
    db: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `db_path` and applies the schema.
    pub fn open(db_path: &str) -> Result<Self, PlannerError> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        info!("Opened schedule/progress database at {}", db_path);

        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, PlannerError> {
        Self::open(":memory:")
    }

    fn fetch_status(db: &Connection, subject_code: &str) -> Result<SubjectStatus, PlannerError> {
        db.query_row(
            "SELECT subject_code, status, notes, updated_at
             FROM subject_statuses WHERE subject_code = ?1",
            [subject_code],
            |row| {
                Ok(SubjectStatus {
                    subject_code: row.get(0)?,
                    status: row.get(1)?,
                    notes: row.get(2)?,
                    updated_at: row.get(3)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| PlannerError::not_found("subject status", subject_code))
    }

    fn fetch_grade(db: &Connection, id: i64) -> Result<Grade, PlannerError> {
        db.query_row(
            &format!("SELECT {GRADE_COLUMNS} FROM grades WHERE id = ?1"),
            [id],
            grade_from_row,
        )
        .optional()?
        .ok_or_else(|| PlannerError::not_found("grade", id))
    }

    fn fetch_entry(db: &Connection, id: i64) -> Result<ScheduleEntry, PlannerError> {
        db.query_row(
            &format!("SELECT {ENTRY_COLUMNS} FROM schedule_entries WHERE id = ?1"),
            [id],
            entry_from_row,
        )
        .optional()?
        .ok_or_else(|| PlannerError::not_found("schedule entry", id))
    }
}

fn grade_from_row(row: &Row<'_>) -> rusqlite::Result<Grade> {
    Ok(Grade {
        id: row.get(0)?,
        subject_code: row.get(1)?,
        eval_name: row.get(2)?,
        grade: row.get(3)?,
        eval_date: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<ScheduleEntry> {
    Ok(ScheduleEntry {
        id: row.get(0)?,
        subject_code: row.get(1)?,
        subject_name: row.get(2)?,
        day_of_week: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        color: row.get(6)?,
        room: row.get(7)?,
    })
}

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

impl ToSql for Weekday {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Weekday {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

#[async_trait]
impl MutationService for SqliteStore {
    async fn list_statuses(&self) -> Result<Vec<SubjectStatus>, PlannerError> {
        let db = self.db.lock()?;
        let mut stmt = db.prepare(
            "SELECT subject_code, status, notes, updated_at
             FROM subject_statuses ORDER BY subject_code",
        )?;

        let statuses = stmt
            .query_map([], |row| {
                Ok(SubjectStatus {
                    subject_code: row.get(0)?,
                    status: row.get(1)?,
                    notes: row.get(2)?,
                    updated_at: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(statuses)
    }

    async fn upsert_status(
        &self,
        subject_code: &str,
        patch: StatusPatch,
    ) -> Result<SubjectStatus, PlannerError> {
        let db = self.db.lock()?;
        db.execute(
            "INSERT INTO subject_statuses (subject_code, status, notes, updated_at)
             VALUES (?1, COALESCE(?2, 'pending'), ?3, ?4)
             ON CONFLICT(subject_code) DO UPDATE SET
                 status = COALESCE(?2, status),
                 notes = COALESCE(?3, notes),
                 updated_at = ?4",
            params![subject_code, patch.status, patch.notes, Utc::now()],
        )?;

        Self::fetch_status(&db, subject_code)
    }

    async fn list_grades(&self) -> Result<Vec<Grade>, PlannerError> {
        let db = self.db.lock()?;
        let mut stmt = db.prepare(&format!(
            "SELECT {GRADE_COLUMNS} FROM grades ORDER BY created_at, id"
        ))?;

        let grades = stmt
            .query_map([], grade_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(grades)
    }

    async fn create_grade(
        &self,
        subject_code: &str,
        input: GradeInput,
    ) -> Result<Grade, PlannerError> {
        let db = self.db.lock()?;
        db.execute(
            "INSERT INTO grades (subject_code, eval_name, grade, eval_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                subject_code,
                input.eval_name,
                input.grade,
                input.eval_date,
                Utc::now()
            ],
        )?;

        Self::fetch_grade(&db, db.last_insert_rowid())
    }

    async fn update_grade(&self, id: i64, input: GradeInput) -> Result<Grade, PlannerError> {
        let db = self.db.lock()?;
        let changed = db.execute(
            "UPDATE grades SET eval_name = ?2, grade = ?3, eval_date = ?4 WHERE id = ?1",
            params![id, input.eval_name, input.grade, input.eval_date],
        )?;
        if changed == 0 {
            return Err(PlannerError::not_found("grade", id));
        }

        Self::fetch_grade(&db, id)
    }

    async fn delete_grade(&self, id: i64) -> Result<(), PlannerError> {
        let db = self.db.lock()?;
        let changed = db.execute("DELETE FROM grades WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(PlannerError::not_found("grade", id));
        }
        Ok(())
    }

    async fn list_schedule_entries(&self) -> Result<Vec<ScheduleEntry>, PlannerError> {
        let db = self.db.lock()?;
        let mut stmt = db.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM schedule_entries ORDER BY id"
        ))?;

        let entries = stmt
            .query_map([], entry_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(entries)
    }

    async fn create_schedule_entry(
        &self,
        input: ScheduleEntryInput,
    ) -> Result<ScheduleEntry, PlannerError> {
        let db = self.db.lock()?;
        let count: i64 =
            db.query_row("SELECT COUNT(*) FROM schedule_entries", [], |row| row.get(0))?;
        let entry = input.into_entry(0, count as usize);

        db.execute(
            "INSERT INTO schedule_entries
                 (subject_code, subject_name, day_of_week, start_time, end_time, color, room)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.subject_code,
                entry.subject_name,
                entry.day_of_week,
                entry.start_time,
                entry.end_time,
                entry.color,
                entry.room
            ],
        )?;

        Self::fetch_entry(&db, db.last_insert_rowid())
    }

    async fn update_schedule_entry(
        &self,
        id: i64,
        input: ScheduleEntryInput,
    ) -> Result<ScheduleEntry, PlannerError> {
        let db = self.db.lock()?;
        let entry = input.apply_to(&Self::fetch_entry(&db, id)?);

        let changed = db.execute(
            "UPDATE schedule_entries SET
                 subject_code = ?2, subject_name = ?3, day_of_week = ?4,
                 start_time = ?5, end_time = ?6, color = ?7, room = ?8
             WHERE id = ?1",
            params![
                id,
                entry.subject_code,
                entry.subject_name,
                entry.day_of_week,
                entry.start_time,
                entry.end_time,
                entry.color,
                entry.room
            ],
        )?;
        if changed == 0 {
            return Err(PlannerError::not_found("schedule entry", id));
        }

        Self::fetch_entry(&db, id)
    }

    async fn delete_schedule_entry(&self, id: i64) -> Result<(), PlannerError> {
        let db = self.db.lock()?;
        let changed = db.execute("DELETE FROM schedule_entries WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(PlannerError::not_found("schedule entry", id));
        }
        Ok(())
    }
}
