use crate::config::ConfigError;
use thiserror::Error;

/// Fatal failures of a scope analysis run.
///
/// Malformed diff lines and missing folders are not represented here: the
/// first are skipped, the second is how a wholesale folder removal shows up.
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("Git command failed: {command} (exit status {}): {stderr}", display_status(.status))]
    GitCommand {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Failed to run git command: {command}: {source}")]
    GitSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to inspect {path}: {message}")]
    Filesystem { path: String, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn display_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "unknown".to_string(),
    }
}
