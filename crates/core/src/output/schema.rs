use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Bare build file name; variants are `Dockerfile.<suffix>`.
pub const DOCKERFILE_NAME: &str = "Dockerfile";

/// `deleted_config` value used when the whole app folder is gone.
pub const FOLDER_DELETED: &str = "folder_deleted";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DockerfileRecord {
    pub path: String,
    pub name: String,
    pub suffix: String,
}

impl DockerfileRecord {
    /// Builds a record for `name` inside `folder`, or `None` when `name` is
    /// not a build file.
    pub fn from_file_name(folder: &str, name: &str) -> Option<Self> {
        let suffix = dockerfile_suffix(name)?;
        Some(Self {
            path: join_path(folder, name),
            name: name.to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// Container name for this build file within `app_name`.
    pub fn container_name(&self, app_name: &str) -> String {
        if self.suffix.is_empty() {
            app_name.to_string()
        } else {
            format!("{}-{}", app_name, self.suffix)
        }
    }
}

/// Returns the variant suffix of a build file name: `""` for `Dockerfile`,
/// the text after the first `.` for `Dockerfile.<suffix>`, `None` otherwise.
pub fn dockerfile_suffix(name: &str) -> Option<&str> {
    if name == DOCKERFILE_NAME {
        return Some("");
    }
    name.strip_prefix(DOCKERFILE_NAME)
        .and_then(|rest| rest.strip_prefix('.'))
        .filter(|suffix| !suffix.is_empty())
}

/// An app folder, either changed in this run or part of the full listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderRecord {
    pub path: String,
    pub app_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_config: Option<String>,
    pub dockerfiles: Vec<DockerfileRecord>,
    pub changed_files: Vec<String>,
}

/// What was removed from an app: a descriptor path or the whole folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletedConfig {
    Descriptor(String),
    FolderDeleted,
}

impl DeletedConfig {
    pub fn as_str(&self) -> &str {
        match self {
            DeletedConfig::Descriptor(path) => path,
            DeletedConfig::FolderDeleted => FOLDER_DELETED,
        }
    }
}

impl fmt::Display for DeletedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DeletedConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppDeletion {
    pub path: String,
    pub app_name: String,
    pub deleted_config: DeletedConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerDeletion {
    pub app_name: String,
    pub container_name: String,
    pub dockerfile: String,
    pub image_name: String,
}

impl ContainerDeletion {
    pub fn for_dockerfile(app_name: &str, dockerfile: &DockerfileRecord) -> Self {
        let container_name = dockerfile.container_name(app_name);
        Self {
            app_name: app_name.to_string(),
            image_name: container_name.clone(),
            container_name,
            dockerfile: dockerfile.path.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub apps: Vec<AppDeletion>,
    pub containers: Vec<ContainerDeletion>,
}

impl DeletionReport {
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty() && self.containers.is_empty()
    }
}

/// Final answer of a run. `matrix` and `all_apps` serialize in the
/// `{"include": [...]}` shape that CI strategy matrices expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixResult {
    pub matrix: Vec<FolderRecord>,
    pub all_apps: Vec<FolderRecord>,
    pub deletions: DeletionReport,
    pub reference: String,
    pub has_changes: bool,
    pub has_deletions: bool,
}

impl MatrixResult {
    pub fn new(
        matrix: Vec<FolderRecord>,
        all_apps: Vec<FolderRecord>,
        deletions: DeletionReport,
        reference: String,
    ) -> Self {
        let has_changes = !matrix.is_empty();
        let has_deletions = !deletions.is_empty();
        Self {
            matrix,
            all_apps,
            deletions,
            reference,
            has_changes,
            has_deletions,
        }
    }
}

/// Borrowed `{"include": [...]}` wrapper around a listing.
#[derive(Debug, Serialize)]
pub struct MatrixInclude<'a> {
    pub include: &'a [FolderRecord],
}

impl<'a> MatrixInclude<'a> {
    pub fn new(include: &'a [FolderRecord]) -> Self {
        Self { include }
    }
}

impl Serialize for MatrixResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MatrixResult", 6)?;
        state.serialize_field("matrix", &MatrixInclude::new(&self.matrix))?;
        state.serialize_field("all_apps", &MatrixInclude::new(&self.all_apps))?;
        state.serialize_field("deletions", &self.deletions)?;
        state.serialize_field("ref", &self.reference)?;
        state.serialize_field("has_changes", &self.has_changes)?;
        state.serialize_field("has_deletions", &self.has_deletions)?;
        state.end()
    }
}

/// Joins repository-relative path segments with `/`.
pub fn join_path(folder: &str, name: &str) -> String {
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}
