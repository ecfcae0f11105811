//! Rendering of analysis results for CI consumption
//!
//! The GitHub format writes one `key=value` line per output, with structured
//! values as compact JSON. Lines go to the file named by `GITHUB_OUTPUT`, or
//! to stdout when that variable is not set.

use anyhow::{Context, Result};
use buildscope_core::output::schema::{MatrixInclude, MatrixResult};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `key=value` lines for a CI output file
    Github,
    /// The whole result as pretty JSON
    Json,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, result: &MatrixResult) -> Result<String> {
        match self.format {
            OutputFormat::Github => self.format_github(result),
            OutputFormat::Json => self.format_json(result),
        }
    }

    fn format_json(&self, result: &MatrixResult) -> Result<String> {
        serde_json::to_string_pretty(result).context("Failed to serialize analysis result to JSON")
    }

    fn format_github(&self, result: &MatrixResult) -> Result<String> {
        let lines = [
            (
                "matrix",
                to_json(&MatrixInclude::new(&result.matrix), "matrix")?,
            ),
            (
                "all_apps",
                to_json(&MatrixInclude::new(&result.all_apps), "all_apps")?,
            ),
            (
                "deleted_apps",
                to_json(&result.deletions.apps, "deleted_apps")?,
            ),
            (
                "deleted_containers",
                to_json(&result.deletions.containers, "deleted_containers")?,
            ),
            ("ref", result.reference.clone()),
            ("has_changes", result.has_changes.to_string()),
            ("has_deletions", result.has_deletions.to_string()),
        ];

        let mut output = String::new();
        for (key, value) in lines {
            output.push_str(key);
            output.push('=');
            output.push_str(&value);
            output.push('\n');
        }
        Ok(output)
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, key: &str) -> Result<String> {
    serde_json::to_string(value).context(format!("Failed to serialize {}", key))
}

/// Where rendered output ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    /// Append to a CI output file.
    File(PathBuf),
    Stdout,
}

impl OutputSink {
    /// Uses `GITHUB_OUTPUT` when it names a file, stdout otherwise.
    pub fn from_env() -> Self {
        match std::env::var("GITHUB_OUTPUT") {
            Ok(path) if !path.is_empty() => OutputSink::File(PathBuf::from(path)),
            _ => OutputSink::Stdout,
        }
    }

    pub fn emit(&self, rendered: &str) -> Result<()> {
        match self {
            OutputSink::File(path) => append_to(path, rendered),
            OutputSink::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                handle
                    .write_all(rendered.as_bytes())
                    .context("Failed to write output to stdout")?;
                if !rendered.ends_with('\n') {
                    handle.write_all(b"\n").context("Failed to write output to stdout")?;
                }
                handle.flush().context("Failed to flush stdout")
            }
        }
    }
}

fn append_to(path: &Path, rendered: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context(format!("Failed to open output file {}", path.display()))?;
    file.write_all(rendered.as_bytes())
        .context(format!("Failed to write output file {}", path.display()))?;
    if !rendered.ends_with('\n') {
        file.write_all(b"\n")
            .context(format!("Failed to write output file {}", path.display()))?;
    }
    Ok(())
}
