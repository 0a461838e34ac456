//! Static curriculum catalog: every subject of the degree plan and its
//! prerequisite edges.
//!
//! The catalog is loaded once and never mutated afterwards. Loading
//! validates the graph so the resolver can rely on it being a DAG without
//! dangling references.

mod types;

pub use types::Subject;

use crate::error::CatalogError;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use types::CatalogFile;

/// The validated, read-only list of subjects.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    subjects: Vec<Subject>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog from subjects, rejecting duplicate codes, unknown or
    /// self-referencing prerequisites, and prerequisite cycles.
    pub fn new(subjects: Vec<Subject>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(subjects.len());
        for (i, subject) in subjects.iter().enumerate() {
            if index.insert(subject.code.clone(), i).is_some() {
                return Err(CatalogError::DuplicateCode {
                    code: subject.code.clone(),
                });
            }
        }

        for subject in &subjects {
            for prerequisite in &subject.prerequisites {
                if prerequisite == &subject.code {
                    return Err(CatalogError::SelfPrerequisite {
                        code: subject.code.clone(),
                    });
                }
                if !index.contains_key(prerequisite) {
                    return Err(CatalogError::DanglingPrerequisite {
                        subject: subject.code.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                }
            }
        }

        let catalog = Catalog { subjects, index };
        if let Some(path) = catalog.find_cycle() {
            return Err(CatalogError::Cycle { path });
        }

        Ok(catalog)
    }

    /// Loads a catalog from a single JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&content)?;
        let catalog = Self::new(file.into_subjects())?;

        info!(
            "Loaded catalog from {} ({} subjects)",
            path.display(),
            catalog.len()
        );
        Ok(catalog)
    }

    /// Loads a catalog from every `*.json` file in a directory, in file name
    /// order. Subjects from all files are validated together.
    pub fn load_from_directory(dir: &Path) -> Result<Self, CatalogError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut subjects = Vec::new();
        for path in &paths {
            let content = fs::read_to_string(path)?;
            let file: CatalogFile = serde_json::from_str(&content)?;
            let before = subjects.len();
            subjects.extend(file.into_subjects());
            debug!(
                "Read {} subjects from {}",
                subjects.len() - before,
                path.display()
            );
        }

        let catalog = Self::new(subjects)?;
        info!(
            "Loaded catalog from {} files in {} ({} subjects)",
            paths.len(),
            dir.display(),
            catalog.len()
        );
        Ok(catalog)
    }

    /// Loads from a directory or a single file depending on what `path` is.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if path.is_dir() {
            Self::load_from_directory(path)
        } else {
            Self::load_from_file(path)
        }
    }

    pub fn get(&self, code: &str) -> Option<&Subject> {
        self.index.get(code).map(|&i| &self.subjects[i])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    /// All subjects, in catalog order.
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Subject> {
        self.subjects.iter()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Distinct plan years, ascending, with the ungrouped year 0 last.
    pub fn years(&self) -> Vec<u32> {
        let mut years: Vec<u32> = self.by_year().into_keys().collect();
        years.sort_by_key(|&y| (y == 0, y));
        years
    }

    /// Subjects grouped by year, keeping catalog order within a year.
    pub fn by_year(&self) -> BTreeMap<u32, Vec<&Subject>> {
        let mut groups: BTreeMap<u32, Vec<&Subject>> = BTreeMap::new();
        for subject in &self.subjects {
            groups.entry(subject.year).or_default().push(subject);
        }
        groups
    }

    /// Depth-first search for a prerequisite cycle. Returns the cycle as a
    /// code path whose first and last element are equal.
    fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnStack,
            Done,
        }

        fn visit(
            catalog: &Catalog,
            i: usize,
            marks: &mut [Mark],
            stack: &mut Vec<usize>,
        ) -> Option<Vec<String>> {
            marks[i] = Mark::OnStack;
            stack.push(i);

            for prerequisite in &catalog.subjects[i].prerequisites {
                let j = catalog.index[prerequisite];
                match marks[j] {
                    Mark::OnStack => {
                        let start = stack.iter().position(|&k| k == j).unwrap_or(0);
                        let mut path: Vec<String> = stack[start..]
                            .iter()
                            .map(|&k| catalog.subjects[k].code.clone())
                            .collect();
                        path.push(catalog.subjects[j].code.clone());
                        return Some(path);
                    }
                    Mark::Unvisited => {
                        if let Some(path) = visit(catalog, j, marks, stack) {
                            return Some(path);
                        }
                    }
                    Mark::Done => {}
                }
            }

            stack.pop();
            marks[i] = Mark::Done;
            None
        }

        let mut marks = vec![Mark::Unvisited; self.subjects.len()];
        let mut stack = Vec::new();
        for i in 0..self.subjects.len() {
            if marks[i] == Mark::Unvisited {
                if let Some(path) = visit(self, i, &mut marks, &mut stack) {
                    return Some(path);
                }
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Subject;
    type IntoIter = std::slice::Iter<'a, Subject>;

    fn into_iter(self) -> Self::IntoIter {
        self.subjects.iter()
    }
}
