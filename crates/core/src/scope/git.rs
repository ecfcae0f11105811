use super::diff::DiffSource;
use crate::error::ScopeError;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Runs `git diff --name-status` inside a checkout.
#[derive(Debug, Clone)]
pub struct GitDiffSource {
    repo_path: PathBuf,
    program: String,
}

impl GitDiffSource {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            program: "git".to_string(),
        }
    }

    /// Uses a different executable in place of `git`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// `core.quotepath=off` keeps non-ASCII paths verbatim; git still quotes
    /// paths with control characters, quotes or backslashes.
    fn args(reference: &str) -> Vec<String> {
        vec![
            "-c".to_string(),
            "core.quotepath=off".to_string(),
            "diff".to_string(),
            "--name-status".to_string(),
            reference.to_string(),
        ]
    }
}

impl DiffSource for GitDiffSource {
    fn name_status(&self, reference: &str) -> Result<String, ScopeError> {
        let args = Self::args(reference);
        let command = format!("{} {}", self.program, args.join(" "));
        debug!(command = %command, repo = %self.repo_path.display(), "Running git");

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.repo_path)
            .output()
            .map_err(|source| ScopeError::GitSpawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ScopeError::GitCommand {
                command,
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
