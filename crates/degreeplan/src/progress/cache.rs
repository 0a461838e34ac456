//! Memoized progress aggregation keyed by a fingerprint of its inputs.

use super::aggregator::{aggregate, Progress};
use super::state::{GradeBook, StatusMap};
use crate::catalog::Catalog;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 digest over everything [`aggregate`] reads.
///
/// Any status or grade change yields a different fingerprint, so a cached
/// result can never be served for inputs it was not computed from.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(catalog: &Catalog, statuses: &StatusMap, grades: &GradeBook) -> Self {
        let mut hasher = Sha256::new();

        for subject in catalog {
            hasher.update(subject.code.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update([0xffu8]);

        for record in statuses.records() {
            hasher.update(record.subject_code.as_bytes());
            hasher.update([0u8]);
            hasher.update(record.status.as_str().as_bytes());
            hasher.update([0u8]);
        }
        hasher.update([0xffu8]);

        for grade in grades.all() {
            hasher.update(grade.id.to_le_bytes());
            hasher.update(grade.subject_code.as_bytes());
            hasher.update([0u8]);
            match grade.grade {
                Some(value) => {
                    hasher.update([1u8]);
                    hasher.update(value.to_bits().to_le_bytes());
                }
                None => hasher.update([0u8]),
            }
        }

        Self(hasher.finalize().into())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0[..6] {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Thread-safe memo of aggregation results.
pub struct ProgressCache {
    entries: DashMap<Fingerprint, Progress>,
    capacity: usize,
}

impl ProgressCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Returns the cached summary for these inputs, computing it on a miss.
    pub fn get_or_compute(
        &self,
        catalog: &Catalog,
        statuses: &StatusMap,
        grades: &GradeBook,
    ) -> Progress {
        let key = Fingerprint::of(catalog, statuses, grades);
        if let Some(hit) = self.entries.get(&key) {
            return hit.clone();
        }

        let progress = aggregate(catalog, statuses, grades);
        // Stale fingerprints are never requested again.
        if self.entries.len() >= self.capacity {
            self.entries.clear();
        }
        self.entries.insert(key, progress.clone());
        progress
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ProgressCache {
    fn default() -> Self {
        Self::new(16)
    }
}
