//! Subject status state machine and the read-only snapshots derived from
//! the store listings.

use super::types::{Grade, Status, SubjectStatus};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Approved];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Approved => "approved",
        }
    }

    /// Every state can move to every other state; there is no terminal
    /// state, so an approved subject can always be reverted.
    pub fn can_transition_to(&self, _next: Status) -> bool {
        true
    }

    /// States reachable from this one in a single user action.
    pub fn transitions(&self) -> Vec<Status> {
        Status::ALL
            .into_iter()
            .filter(|next| next != self && self.can_transition_to(*next))
            .collect()
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Status::Approved)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Status::Pending),
            "in_progress" => Ok(Status::InProgress),
            "approved" => Ok(Status::Approved),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

/// Status records keyed by subject code. Missing codes read as pending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusMap {
    records: HashMap<String, SubjectStatus>,
}

impl StatusMap {
    pub fn new(records: Vec<SubjectStatus>) -> Self {
        StatusMap {
            records: records
                .into_iter()
                .map(|r| (r.subject_code.clone(), r))
                .collect(),
        }
    }

    pub fn status_of(&self, code: &str) -> Status {
        self.records
            .get(code)
            .map(|r| r.status)
            .unwrap_or_default()
    }

    /// Notes for a subject; empty notes count as none.
    pub fn notes_of(&self, code: &str) -> Option<&str> {
        self.records
            .get(code)
            .and_then(|r| r.notes.as_deref())
            .filter(|n| !n.is_empty())
    }

    pub fn get(&self, code: &str) -> Option<&SubjectStatus> {
        self.records.get(code)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records sorted by subject code, for stable output.
    pub fn records(&self) -> Vec<&SubjectStatus> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by(|a, b| a.subject_code.cmp(&b.subject_code));
        records
    }
}

impl FromIterator<(String, Status)> for StatusMap {
    fn from_iter<I: IntoIterator<Item = (String, Status)>>(iter: I) -> Self {
        let now = chrono::Utc::now();
        StatusMap::new(
            iter.into_iter()
                .map(|(subject_code, status)| SubjectStatus {
                    subject_code,
                    status,
                    notes: None,
                    updated_at: now,
                })
                .collect(),
        )
    }
}

/// Grades grouped by subject code, each group in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradeBook {
    all: Vec<Grade>,
    by_subject: HashMap<String, Vec<usize>>,
}

impl GradeBook {
    /// Builds the book from a listing. The listing is re-sorted by creation
    /// time so callers need not rely on store ordering.
    pub fn new(mut grades: Vec<Grade>) -> Self {
        grades.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let mut by_subject: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, grade) in grades.iter().enumerate() {
            by_subject
                .entry(grade.subject_code.clone())
                .or_default()
                .push(i);
        }

        GradeBook {
            all: grades,
            by_subject,
        }
    }

    pub fn all(&self) -> &[Grade] {
        &self.all
    }

    pub fn for_subject(&self, code: &str) -> Vec<&Grade> {
        self.by_subject
            .get(code)
            .map(|idx| idx.iter().map(|&i| &self.all[i]).collect())
            .unwrap_or_default()
    }

    pub fn get(&self, id: i64) -> Option<&Grade> {
        self.all.iter().find(|g| g.id == id)
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}
