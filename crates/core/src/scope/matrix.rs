use super::diff::ChangeSet;
use super::filter::{normalize_pattern, PathFilter, MATCH_OPTIONS};
use super::inventory::{parent_folder, FolderInventory};
use crate::config::ConfigError;
use crate::error::ScopeError;
use crate::output::schema::{join_path, DeletionReport, FolderRecord, MatrixResult};
use glob::Pattern;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Assembles the changed-app matrix and the full app listing.
pub struct MatrixBuilder<'a> {
    inventory: &'a FolderInventory<'a>,
    filter: &'a PathFilter,
}

impl<'a> MatrixBuilder<'a> {
    pub fn new(inventory: &'a FolderInventory<'a>, filter: &'a PathFilter) -> Self {
        Self { inventory, filter }
    }

    /// One record per qualifying folder holding at least one changed path.
    pub fn changed_apps(&self, changes: &ChangeSet) -> Result<Vec<FolderRecord>, ScopeError> {
        let mut by_folder: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for path in &changes.changed {
            let Some(folder) = parent_folder(path) else {
                continue;
            };
            if self.filter.accepts_file(folder, path) {
                by_folder.entry(folder).or_default().push(path.clone());
            }
        }

        let mut apps = Vec::new();
        for (folder, files) in by_folder {
            if let Some(record) = self.inventory.inspect(folder, files)? {
                apps.push(record);
            }
        }
        Ok(apps)
    }

    /// Every qualifying folder reachable under the include pattern, or every
    /// non-hidden top-level folder without one, whether changed or not.
    pub fn all_apps(&self) -> Result<Vec<FolderRecord>, ScopeError> {
        let candidates = match self.filter.include_pattern() {
            Some(pattern) => self.expand(pattern)?,
            None => self.child_folders("", None)?,
        };

        let mut apps = Vec::new();
        for folder in candidates {
            if !self.filter.accepts(&folder) {
                continue;
            }
            if let Some(record) = self.inventory.inspect(&folder, Vec::new())? {
                apps.push(record);
            }
        }
        Ok(apps)
    }

    pub fn build(
        &self,
        reference: String,
        changes: &ChangeSet,
        deletions: DeletionReport,
    ) -> Result<MatrixResult, ScopeError> {
        let matrix = self.changed_apps(changes)?;
        let all_apps = self.all_apps()?;

        info!(
            changed_apps = matrix.len(),
            all_apps = all_apps.len(),
            deleted_apps = deletions.apps.len(),
            deleted_containers = deletions.containers.len(),
            "Scope analysis complete"
        );

        Ok(MatrixResult::new(matrix, all_apps, deletions, reference))
    }

    /// Resolves an include pattern against the tree one segment at a time,
    /// so `apps/*` lists the children of `apps` and a literal path tests
    /// that single folder.
    fn expand(&self, pattern: &str) -> Result<Vec<String>, ScopeError> {
        let mut current = vec![String::new()];

        for segment in normalize_pattern(pattern).split('/') {
            let mut next = Vec::new();
            if is_literal(segment) {
                for folder in &current {
                    let candidate = join_path(folder, segment);
                    if self.inventory.folder_exists(&candidate) {
                        next.push(candidate);
                    }
                }
            } else {
                let matcher = Pattern::new(segment).map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.to_string(),
                    error: e.to_string(),
                })?;
                for folder in &current {
                    next.extend(self.child_folders(folder, Some((segment, &matcher)))?);
                }
            }
            current = next;
        }

        current.sort();
        debug!(pattern, folders = current.len(), "Expanded include pattern");
        Ok(current)
    }

    /// Sorted child directories of `folder`. Hidden ones are only listed
    /// when the segment pattern itself starts with a dot.
    fn child_folders(
        &self,
        folder: &str,
        matcher: Option<(&str, &Pattern)>,
    ) -> Result<Vec<String>, ScopeError> {
        if !self.inventory.folder_exists(folder) {
            return Ok(Vec::new());
        }

        let dir = self.inventory.absolute(folder);
        let entries = self
            .inventory
            .fs()
            .read_dir(&dir)
            .map_err(|e| ScopeError::Filesystem {
                path: dir.display().to_string(),
                message: format!("{:#}", e),
            })?;

        let mut children: Vec<String> = entries
            .iter()
            .filter(|entry| entry.is_dir())
            .filter(|entry| match matcher {
                Some((segment, pattern)) => {
                    (!entry.is_hidden() || segment.starts_with('.'))
                        && pattern.matches_with(entry.file_name(), MATCH_OPTIONS)
                }
                None => !entry.is_hidden(),
            })
            .map(|entry| join_path(folder, entry.file_name()))
            .collect();
        children.sort();

        Ok(children)
    }
}

fn is_literal(segment: &str) -> bool {
    !segment.contains(['*', '?', '['])
}
