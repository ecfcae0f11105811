use super::filter::PathFilter;
use super::inventory::{app_name, is_descriptor, parent_folder, FolderInventory};
use crate::error::ScopeError;
use crate::output::schema::{
    AppDeletion, ContainerDeletion, DeletedConfig, DeletionReport, DockerfileRecord,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Deleted paths of one folder, split by what they were.
#[derive(Debug, Default)]
struct FolderDeletions {
    dockerfiles: Vec<DockerfileRecord>,
    descriptors: BTreeSet<String>,
    other: usize,
}

/// Derives app and container teardown entries from deleted paths.
///
/// Only the deleted set is consulted; changes and renames never produce
/// deletions.
pub struct DeletionAnalyzer<'a> {
    inventory: &'a FolderInventory<'a>,
    filter: &'a PathFilter,
}

impl<'a> DeletionAnalyzer<'a> {
    pub fn new(inventory: &'a FolderInventory<'a>, filter: &'a PathFilter) -> Self {
        Self { inventory, filter }
    }

    pub fn analyze(&self, deleted: &BTreeSet<String>) -> Result<DeletionReport, ScopeError> {
        let mut report = DeletionReport::default();

        for (folder, group) in self.group_by_folder(deleted) {
            let app = app_name(&folder).to_string();

            if !self.inventory.folder_exists(&folder) {
                info!(folder = %folder, app = %app, "App folder deleted");
                report.apps.push(AppDeletion {
                    path: folder.clone(),
                    app_name: app.clone(),
                    deleted_config: DeletedConfig::FolderDeleted,
                });
            } else if let Some(descriptor) = group.descriptors.iter().next() {
                info!(folder = %folder, descriptor = %descriptor, "App descriptor deleted");
                report.apps.push(AppDeletion {
                    path: folder.clone(),
                    app_name: app.clone(),
                    deleted_config: DeletedConfig::Descriptor(descriptor.clone()),
                });
            } else {
                debug!(
                    folder = %folder,
                    other = group.other,
                    "Folder still present without descriptor deletion"
                );
            }

            for dockerfile in &group.dockerfiles {
                let container = ContainerDeletion::for_dockerfile(&app, dockerfile);
                info!(
                    app = %app,
                    container = %container.container_name,
                    dockerfile = %container.dockerfile,
                    "Container deleted"
                );
                report.containers.push(container);
            }
        }

        Ok(report)
    }

    fn group_by_folder(&self, deleted: &BTreeSet<String>) -> BTreeMap<String, FolderDeletions> {
        let mut groups: BTreeMap<String, FolderDeletions> = BTreeMap::new();

        for path in deleted {
            let Some(folder) = parent_folder(path) else {
                debug!(path = %path, "Ignoring deletion at repository root");
                continue;
            };
            if !self.filter.accepts_file(folder, path) {
                continue;
            }

            let name = &path[folder.len() + 1..];
            let group = groups.entry(folder.to_string()).or_default();
            if let Some(dockerfile) = DockerfileRecord::from_file_name(folder, name) {
                group.dockerfiles.push(dockerfile);
            } else if is_descriptor(name) {
                group.descriptors.insert(path.clone());
            } else {
                group.other += 1;
            }
        }

        for group in groups.values_mut() {
            group.dockerfiles.sort_by(|a, b| a.path.cmp(&b.path));
        }

        groups
    }
}
