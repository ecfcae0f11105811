pub mod config;
pub mod error;
pub mod fs;
pub mod output;
pub mod scope;

pub use config::{ConfigError, ScopeConfig};
pub use error::ScopeError;
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use output::schema::MatrixResult;
pub use scope::{EventKind, GitDiffSource, ScopeAnalyzer};
