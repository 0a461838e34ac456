//! Prerequisite resolution over the catalog and a status snapshot.
//!
//! Blocking is advisory: it drives the "locked" affordance in views and
//! never prevents a status change from being recorded.

use super::state::StatusMap;
use crate::catalog::{Catalog, Subject};

/// Returns true if the subject should be displayed as locked.
///
/// A subject is blocked when it has at least one prerequisite that is not
/// approved. Subjects without prerequisites and subjects that are already
/// approved are never blocked.
pub fn is_blocked(subject: &Subject, statuses: &StatusMap) -> bool {
    if statuses.status_of(&subject.code).is_approved() {
        return false;
    }

    subject
        .prerequisites
        .iter()
        .any(|p| !statuses.status_of(p).is_approved())
}

/// Prerequisite codes of `subject` that are not approved yet, in the order
/// the catalog lists them.
pub fn missing_prerequisites<'a>(subject: &'a Subject, statuses: &StatusMap) -> Vec<&'a str> {
    subject
        .prerequisites
        .iter()
        .filter(|p| !statuses.status_of(p).is_approved())
        .map(String::as_str)
        .collect()
}

/// Subjects that list `subject` as a direct prerequisite.
///
/// Only direct dependents are reported; unlocking is not followed
/// transitively.
pub fn unlocks<'a>(subject: &Subject, catalog: &'a Catalog) -> Vec<&'a Subject> {
    catalog
        .iter()
        .filter(|t| t.has_prerequisite(&subject.code))
        .collect()
}

/// Subjects that can be taken now: not approved and not blocked.
pub fn available<'a>(catalog: &'a Catalog, statuses: &StatusMap) -> Vec<&'a Subject> {
    catalog
        .iter()
        .filter(|s| !statuses.status_of(&s.code).is_approved() && !is_blocked(s, statuses))
        .collect()
}
