/// Types for subject status records and graded evaluations
use crate::error::PlannerError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a subject for one student.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Approved,
}

/// Persisted progress record for a subject. Created on the first status or
/// notes change and never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectStatus {
    pub subject_code: String,
    pub status: Status,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a status record. Absent fields keep their stored
/// value (or the default, for a record that does not exist yet).
///
/// Notes cannot be reset to `None` once set; an empty string clears them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusPatch {
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl StatusPatch {
    pub fn status(status: Status) -> Self {
        StatusPatch {
            status: Some(status),
            notes: None,
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        StatusPatch {
            status: None,
            notes: Some(notes.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.notes.is_none()
    }
}

/// A single evaluation of a subject, graded or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: i64,
    pub subject_code: String,
    pub eval_name: String,
    /// On a 0 to 10 scale; `None` until the evaluation is graded
    pub grade: Option<f64>,
    pub eval_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating or editing an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeInput {
    pub eval_name: String,
    #[serde(default)]
    pub grade: Option<f64>,
    #[serde(default)]
    pub eval_date: Option<NaiveDate>,
}

impl GradeInput {
    /// Checks the fields that can be rejected without consulting the store.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.eval_name.trim().is_empty() {
            return Err(PlannerError::validation(
                "eval_name",
                "an evaluation name is required",
            ));
        }
        if let Some(value) = self.grade {
            if !value.is_finite() || !(0.0..=MAX_GRADE).contains(&value) {
                return Err(PlannerError::validation(
                    "grade",
                    format!("must be between 0 and {MAX_GRADE}, got {value}"),
                ));
            }
        }
        Ok(())
    }

    /// Trims the evaluation name.
    pub fn normalized(mut self) -> Self {
        self.eval_name = self.eval_name.trim().to_string();
        self
    }
}

/// Highest grade on the scale.
pub const MAX_GRADE: f64 = 10.0;

/// Evaluation labels offered when recording a grade.
pub const EVAL_PRESETS: &[&str] = &["1st Midterm", "2nd Midterm", "Retake", "Final", "Assignment"];

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, grade: Option<f64>) -> GradeInput {
        GradeInput {
            eval_name: name.to_string(),
            grade,
            eval_date: None,
        }
    }

    #[test]
    fn test_grade_input_validation() {
        assert!(input("Final", Some(7.5)).validate().is_ok());
        assert!(input("Final", None).validate().is_ok());
        assert!(input("Final", Some(0.0)).validate().is_ok());
        assert!(input("Final", Some(10.0)).validate().is_ok());

        assert!(input("   ", Some(7.0)).validate().unwrap_err().is_validation());
        assert!(input("Final", Some(10.5)).validate().is_err());
        assert!(input("Final", Some(-1.0)).validate().is_err());
        assert!(input("Final", Some(f64::NAN)).validate().is_err());
    }

    #[test]
    fn test_status_patch_deserializes_partially() {
        let patch: StatusPatch = serde_json::from_str(r#"{"notes":"retake in march"}"#).unwrap();
        assert_eq!(patch, StatusPatch::notes("retake in march"));
        assert!(!patch.is_empty());

        let patch: StatusPatch = serde_json::from_str(r#"{"status":"approved"}"#).unwrap();
        assert_eq!(patch, StatusPatch::status(Status::Approved));
        assert!(StatusPatch::default().is_empty());
    }
}
