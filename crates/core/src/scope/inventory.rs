use crate::error::ScopeError;
use crate::fs::FileSystem;
use crate::output::schema::{join_path, DockerfileRecord, FolderRecord};
use std::path::PathBuf;
use tracing::debug;

/// Deployment descriptor names, in lookup order.
pub const DESCRIPTOR_NAMES: [&str; 2] = ["app.yaml", "app.yml"];

pub fn is_descriptor(name: &str) -> bool {
    DESCRIPTOR_NAMES.contains(&name)
}

/// Whether a folder with the given contents is an app.
///
/// With `require_app_config` either a descriptor or a build file is enough;
/// otherwise a build file is required.
pub fn qualifies(require_app_config: bool, has_descriptor: bool, has_dockerfiles: bool) -> bool {
    if require_app_config {
        has_descriptor || has_dockerfiles
    } else {
        has_dockerfiles
    }
}

/// Base name of a repository-relative folder path.
pub fn app_name(folder: &str) -> &str {
    folder.rsplit('/').next().unwrap_or(folder)
}

/// Folder part of a repository-relative file path; `None` at the root.
pub fn parent_folder(path: &str) -> Option<&str> {
    path.rsplit_once('/')
        .map(|(folder, _)| folder)
        .filter(|folder| !folder.is_empty())
}

/// Inspects folders of the checkout for build files and descriptors.
pub struct FolderInventory<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
    require_app_config: bool,
}

impl<'a> FolderInventory<'a> {
    pub fn new(fs: &'a dyn FileSystem, root: impl Into<PathBuf>, require_app_config: bool) -> Self {
        Self {
            fs,
            root: root.into(),
            require_app_config,
        }
    }

    pub fn fs(&self) -> &'a dyn FileSystem {
        self.fs
    }

    pub fn absolute(&self, folder: &str) -> PathBuf {
        if folder.is_empty() {
            self.root.clone()
        } else {
            self.root.join(folder)
        }
    }

    pub fn folder_exists(&self, folder: &str) -> bool {
        self.fs.is_dir(&self.absolute(folder))
    }

    /// Build files directly inside `folder`, sorted by name.
    pub fn dockerfiles(&self, folder: &str) -> Result<Vec<DockerfileRecord>, ScopeError> {
        let dir = self.absolute(folder);
        let entries = self.fs.read_dir(&dir).map_err(|e| ScopeError::Filesystem {
            path: dir.display().to_string(),
            message: format!("{:#}", e),
        })?;

        let mut dockerfiles: Vec<DockerfileRecord> = entries
            .iter()
            .filter(|entry| entry.is_file())
            .filter_map(|entry| DockerfileRecord::from_file_name(folder, entry.file_name()))
            .collect();
        dockerfiles.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(dockerfiles)
    }

    /// First existing descriptor, `app.yaml` before `app.yml`.
    pub fn descriptor(&self, folder: &str) -> Option<String> {
        let dir = self.absolute(folder);
        DESCRIPTOR_NAMES
            .iter()
            .find(|name| self.fs.is_file(&dir.join(name)))
            .map(|name| join_path(folder, name))
    }

    /// Returns the folder's record when it qualifies as an app.
    pub fn inspect(
        &self,
        folder: &str,
        changed_files: Vec<String>,
    ) -> Result<Option<FolderRecord>, ScopeError> {
        if !self.folder_exists(folder) {
            debug!(folder, "Folder not present, skipping");
            return Ok(None);
        }

        let dockerfiles = self.dockerfiles(folder)?;
        let app_config = self.descriptor(folder);

        if !qualifies(
            self.require_app_config,
            app_config.is_some(),
            !dockerfiles.is_empty(),
        ) {
            debug!(
                folder,
                has_descriptor = app_config.is_some(),
                require_app_config = self.require_app_config,
                "Folder does not qualify as an app"
            );
            return Ok(None);
        }

        debug!(
            folder,
            dockerfiles = dockerfiles.len(),
            app_config = app_config.as_deref().unwrap_or(""),
            "Found app"
        );

        Ok(Some(FolderRecord {
            path: folder.to_string(),
            app_name: app_name(folder).to_string(),
            app_config,
            dockerfiles,
            changed_files,
        }))
    }
}
