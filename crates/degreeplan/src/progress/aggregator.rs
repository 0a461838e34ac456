/// Degree progress aggregation
use super::state::{GradeBook, StatusMap};
use super::types::{Grade, Status};
use crate::catalog::Catalog;
use serde::{Deserialize, Serialize};

/// Progress totals for a set of subjects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub approved_count: usize,
    pub in_progress_count: usize,
    pub pending_count: usize,
    /// Mean of every recorded grade; `None` if nothing is graded yet
    pub average_grade: Option<f64>,
    /// Approved subjects over the whole catalog, rounded to a whole percent
    pub progress_percent: u32,
}

/// Status partition for one plan year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearProgress {
    pub year: u32,
    pub total: usize,
    pub approved_count: usize,
    pub in_progress_count: usize,
    pub pending_count: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct Partition {
    approved: usize,
    in_progress: usize,
    pending: usize,
}

impl Partition {
    fn add(&mut self, status: Status) {
        match status {
            Status::Approved => self.approved += 1,
            Status::InProgress => self.in_progress += 1,
            Status::Pending => self.pending += 1,
        }
    }
}

/// Computes the global progress summary.
///
/// Every catalog subject lands in exactly one count, so the three counts
/// always sum to the catalog size.
pub fn aggregate(catalog: &Catalog, statuses: &StatusMap, grades: &GradeBook) -> Progress {
    let mut partition = Partition::default();
    for subject in catalog {
        partition.add(statuses.status_of(&subject.code));
    }

    Progress {
        approved_count: partition.approved,
        in_progress_count: partition.in_progress,
        pending_count: partition.pending,
        average_grade: average_grade(grades.all()),
        progress_percent: percent(partition.approved, catalog.len()),
    }
}

/// Status partition per plan year, in [`Catalog::years`] order.
pub fn aggregate_by_year(catalog: &Catalog, statuses: &StatusMap) -> Vec<YearProgress> {
    let groups = catalog.by_year();
    catalog
        .years()
        .into_iter()
        .map(|year| {
            let subjects = groups.get(&year).map(Vec::as_slice).unwrap_or_default();
            let mut partition = Partition::default();
            for subject in subjects {
                partition.add(statuses.status_of(&subject.code));
            }
            YearProgress {
                year,
                total: subjects.len(),
                approved_count: partition.approved,
                in_progress_count: partition.in_progress,
                pending_count: partition.pending,
            }
        })
        .collect()
}

/// Arithmetic mean of the graded evaluations. Ungraded ones count toward
/// neither the sum nor the denominator.
pub fn average_grade<'a, I>(grades: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Grade>,
{
    let (sum, count) = grades
        .into_iter()
        .filter_map(|g| g.grade)
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Average scoped to one subject's evaluations.
pub fn subject_average(code: &str, grades: &GradeBook) -> Option<f64> {
    average_grade(grades.for_subject(code))
}

fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}
