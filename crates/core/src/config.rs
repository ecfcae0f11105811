use crate::scope::refs::EventKind;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_ROOT_PATH: &str = ".";
const DEFAULT_EVENT_NAME: &str = "push";
const DEFAULT_BASE_REF: &str = "main";
const DEFAULT_REQUIRE_APP_CONFIG: bool = false;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid glob pattern '{pattern}': {error}")]
    InvalidPattern { pattern: String, error: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

/// Inputs of one analysis run.
///
/// `from_env` is the only place the CI environment is read; every component
/// downstream receives plain values.
#[derive(Debug, Clone)]
pub struct ScopeConfig {
    pub root_path: PathBuf,
    pub include_pattern: Option<String>,
    pub exclude_pattern: Option<String>,
    pub require_app_config: bool,
    pub event: EventKind,
    pub base_ref: String,
    pub ref_override: Option<String>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from(DEFAULT_ROOT_PATH),
            include_pattern: None,
            exclude_pattern: None,
            require_app_config: DEFAULT_REQUIRE_APP_CONFIG,
            event: EventKind::from_event_name(DEFAULT_EVENT_NAME),
            base_ref: DEFAULT_BASE_REF.to_string(),
            ref_override: None,
        }
    }
}

impl ScopeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let root_path = env::var("GITHUB_WORKSPACE")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT_PATH));

        let event = env::var("GITHUB_EVENT_NAME")
            .map(|name| EventKind::from_event_name(&name))
            .unwrap_or_else(|_| EventKind::from_event_name(DEFAULT_EVENT_NAME));

        let base_ref = env::var("GITHUB_BASE_REF")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_REF.to_string());

        let require_app_config = match env::var("BUILDSCOPE_REQUIRE_APP_CONFIG") {
            Ok(value) if !value.is_empty() => {
                parse_bool(&value).ok_or_else(|| ConfigError::ParseError {
                    field: "BUILDSCOPE_REQUIRE_APP_CONFIG".to_string(),
                    error: format!("expected true or false, got '{}'", value),
                })?
            }
            _ => DEFAULT_REQUIRE_APP_CONFIG,
        };

        Ok(Self {
            root_path,
            include_pattern: None,
            exclude_pattern: None,
            require_app_config,
            event,
            base_ref,
            ref_override: None,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Root path must not be empty".to_string(),
            ));
        }

        if self.base_ref.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Base ref must not be empty".to_string(),
            ));
        }

        for pattern in [&self.include_pattern, &self.exclude_pattern]
            .into_iter()
            .flatten()
        {
            glob::Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                error: e.to_string(),
            })?;
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl fmt::Display for ScopeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Buildscope Configuration:")?;
        writeln!(f, "  Root Path: {}", self.root_path.display())?;
        writeln!(
            f,
            "  Include Pattern: {}",
            self.include_pattern.as_deref().unwrap_or("<none>")
        )?;
        writeln!(
            f,
            "  Exclude Pattern: {}",
            self.exclude_pattern.as_deref().unwrap_or("<none>")
        )?;
        writeln!(f, "  Require App Config: {}", self.require_app_config)?;
        writeln!(f, "  Event: {}", self.event)?;
        writeln!(f, "  Base Ref: {}", self.base_ref)?;
        if let Some(ref reference) = self.ref_override {
            writeln!(f, "  Ref Override: {}", reference)?;
        }
        Ok(())
    }
}
