//! Per-student progress: subject statuses, graded evaluations, and the pure
//! projections computed from them.

mod aggregator;
mod cache;
mod resolver;
mod state;
mod types;

pub use aggregator::{aggregate, aggregate_by_year, average_grade, subject_average, Progress, YearProgress};
pub use cache::{Fingerprint, ProgressCache};
pub use resolver::{available, is_blocked, missing_prerequisites, unlocks};
pub use state::{GradeBook, StatusMap};
pub use types::*;
