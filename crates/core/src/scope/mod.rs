//! Change and deletion classification.
//!
//! Flow of one run:
//! [`RefResolver`] picks the comparison ref, [`DiffClassifier`] splits the
//! name-status diff into a [`ChangeSet`], changed paths go through
//! [`PathFilter`] and [`FolderInventory`], deleted paths through
//! [`DeletionAnalyzer`], and [`MatrixBuilder`] assembles the result.

pub mod deletion;
pub mod diff;
pub mod filter;
pub mod git;
pub mod inventory;
pub mod matrix;
pub mod refs;

pub use deletion::DeletionAnalyzer;
pub use diff::{ChangeSet, DiffClassifier, DiffSource};
pub use filter::PathFilter;
pub use git::GitDiffSource;
pub use inventory::FolderInventory;
pub use matrix::MatrixBuilder;
pub use refs::{EventKind, RefResolver};

use crate::config::ScopeConfig;
use crate::error::ScopeError;
use crate::fs::FileSystem;
use crate::output::schema::MatrixResult;
use tracing::info;

/// Runs the full analysis for one configuration.
pub struct ScopeAnalyzer<'a> {
    fs: &'a dyn FileSystem,
    diff_source: &'a dyn DiffSource,
}

impl<'a> ScopeAnalyzer<'a> {
    pub fn new(fs: &'a dyn FileSystem, diff_source: &'a dyn DiffSource) -> Self {
        Self { fs, diff_source }
    }

    pub fn analyze(&self, config: &ScopeConfig) -> Result<MatrixResult, ScopeError> {
        config.validate()?;

        let filter = PathFilter::new(
            config.include_pattern.as_deref(),
            config.exclude_pattern.as_deref(),
        )?;

        let reference = RefResolver::new(config.event, config.base_ref.clone())
            .with_override(config.ref_override.clone())
            .resolve();
        info!(
            event = %config.event,
            reference = %reference,
            "Analyzing build scope"
        );

        let changes = DiffClassifier::new(self.diff_source).classify(&reference)?;

        let inventory =
            FolderInventory::new(self.fs, config.root_path.clone(), config.require_app_config);
        let deletions = DeletionAnalyzer::new(&inventory, &filter).analyze(&changes.deleted)?;

        MatrixBuilder::new(&inventory, &filter).build(reference, &changes, deletions)
    }
}
