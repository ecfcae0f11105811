pub mod schema;

pub use schema::{
    AppDeletion, ContainerDeletion, DeletedConfig, DeletionReport, DockerfileRecord, FolderRecord,
    MatrixInclude, MatrixResult,
};
