//! Degree plan tracking for a single student.
//!
//! A static [`catalog::Catalog`] of subjects and prerequisites, per-subject
//! statuses and grades kept behind a [`store::MutationService`], and the
//! projections built on top: which subjects are blocked, overall progress,
//! and where each weekly class block sits on the schedule grid.

pub mod catalog;
pub mod config;
pub mod error;
pub mod planner;
pub mod progress;
pub mod schedule;
pub mod server;
pub mod store;

pub use error::{CatalogError, PlannerError};
pub use planner::{Planner, ProgressReport, SubjectView};
