/// Types for the curriculum catalog
use serde::{Deserialize, Serialize};

/// A subject in the degree plan, as defined by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Stable, human-assigned identifier (e.g., "134")
    pub code: String,

    pub name: String,

    /// Plan year; 0 means ungrouped (e.g., a language requirement)
    pub year: u32,

    /// True if the subject spans two terms
    #[serde(default)]
    pub is_annual: bool,

    /// Codes of subjects that must be approved first
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

impl Subject {
    pub fn new(code: &str, name: &str, year: u32) -> Self {
        Subject {
            code: code.to_string(),
            name: name.to_string(),
            year,
            is_annual: false,
            prerequisites: Vec::new(),
        }
    }

    /// Builder-style helper for declaring prerequisites.
    pub fn requires(mut self, codes: &[&str]) -> Self {
        self.prerequisites = codes.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn annual(mut self) -> Self {
        self.is_annual = true;
        self
    }

    pub fn has_prerequisite(&self, code: &str) -> bool {
        self.prerequisites.iter().any(|p| p == code)
    }
}

/// On-disk shape of a catalog file.
///
/// A file may either be a bare array of subjects or an object with a
/// `subjects` field (used by the per-year files of a catalog directory).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum CatalogFile {
    List(Vec<Subject>),
    Document { subjects: Vec<Subject> },
}

impl CatalogFile {
    pub(crate) fn into_subjects(self) -> Vec<Subject> {
        match self {
            CatalogFile::List(subjects) => subjects,
            CatalogFile::Document { subjects } => subjects,
        }
    }
}
