use buildscope_core::{EventKind, ScopeConfig};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Change and deletion scope analysis for monorepo container builds
#[derive(Parser, Debug)]
#[command(
    name = "buildscope",
    about = "Change and deletion scope analysis for monorepo container builds",
    version,
    long_about = "buildscope inspects a git diff and the checked-out tree to decide which \
                  app folders need a rebuild and which apps or sidecar containers were \
                  removed and need teardown. Results are written as key=value lines for \
                  CI pipelines."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Compute the changed-app matrix and deletion report",
        long_about = "Diffs the checkout against the comparison ref for the triggering event and \
                      classifies the result into changed apps, deleted apps and deleted \
                      containers.\n\n\
                      Examples:\n  \
                      buildscope analyze --include-pattern 'apps/*'\n  \
                      buildscope analyze --event pull_request --base-ref main\n  \
                      buildscope analyze --require-app-config --format json"
    )]
    Analyze(AnalyzeArgs),

    #[command(
        about = "Draft release notes with an Azure OpenAI deployment",
        long_about = "Sends base64-encoded git diff, commit messages and PR titles to a chat \
                      completions deployment and writes the reply to a markdown file.\n\n\
                      Requires AZURE_OPENAI_ENDPOINT, AZURE_OPENAI_DEPLOYMENT_NAME, \
                      AZURE_OPENAI_API_VERSION and AUTH_HEADER."
    )]
    ReleaseNotes(ReleaseNotesArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(
        long,
        value_name = "PATH",
        help = "Repository root (defaults to GITHUB_WORKSPACE or the current directory)"
    )]
    pub root_path: Option<PathBuf>,

    #[arg(long, value_name = "GLOB", help = "Only consider app folders matching this pattern")]
    pub include_pattern: Option<String>,

    #[arg(long, value_name = "GLOB", help = "Ignore app folders matching this pattern")]
    pub exclude_pattern: Option<String>,

    #[arg(
        long = "ref",
        value_name = "REF",
        help = "Compare against this ref instead of the event default"
    )]
    pub reference: Option<String>,

    #[arg(
        long,
        value_name = "EVENT",
        help = "Triggering event name (defaults to GITHUB_EVENT_NAME)"
    )]
    pub event: Option<String>,

    #[arg(
        long,
        value_name = "BRANCH",
        help = "Pull request base branch (defaults to GITHUB_BASE_REF)"
    )]
    pub base_ref: Option<String>,

    #[arg(
        long,
        help = "Treat folders with only an app.yaml/app.yml as apps"
    )]
    pub require_app_config: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "github",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

impl AnalyzeArgs {
    /// Layers the command-line values over an environment-derived config.
    pub fn apply_to(&self, mut config: ScopeConfig) -> ScopeConfig {
        if let Some(root) = &self.root_path {
            config.root_path = root.clone();
        }
        if let Some(event) = &self.event {
            config.event = EventKind::from_event_name(event);
        }
        if let Some(base) = self.base_ref.as_ref().filter(|b| !b.is_empty()) {
            config.base_ref = base.clone();
        }
        config.include_pattern = self.include_pattern.clone().filter(|p| !p.is_empty());
        config.exclude_pattern = self.exclude_pattern.clone().filter(|p| !p.is_empty());
        config.ref_override = self.reference.clone().filter(|r| !r.is_empty());
        config.require_app_config = config.require_app_config || self.require_app_config;
        config
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ReleaseNotesArgs {
    #[arg(long, value_name = "BASE64", default_value = "", help = "Base64-encoded git diff")]
    pub git_diff: String,

    #[arg(
        long,
        value_name = "BASE64",
        default_value = "",
        help = "Base64-encoded commit messages"
    )]
    pub commit_messages: String,

    #[arg(long, value_name = "BASE64", default_value = "", help = "Base64-encoded PR titles")]
    pub pr_titles: String,

    #[arg(long, value_name = "TEXT", default_value = "", help = "Additional instructions")]
    pub context: String,

    #[arg(long, default_value_t = 0.2)]
    pub temperature: f64,

    #[arg(long, default_value_t = 4000)]
    pub max_tokens: u32,

    #[arg(long, default_value_t = 1.0)]
    pub top_p: f64,

    #[arg(long, default_value_t = 0.1)]
    pub frequency_penalty: f64,

    #[arg(long, default_value_t = 0.1)]
    pub presence_penalty: f64,

    #[arg(long, default_value = "text", help = "Response format type (text, json_object)")]
    pub response_format: String,

    #[arg(long, help = "Sampling seed for reproducible output")]
    pub seed: Option<i64>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        default_value = "release_notes.md",
        help = "Where to write the generated notes"
    )]
    pub output: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Github,
    Json,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Github => super::output::OutputFormat::Github,
            OutputFormatArg::Json => super::output::OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_analyze_args() {
        let args = CliArgs::parse_from(["buildscope", "analyze"]);
        match args.command {
            Commands::Analyze(analyze) => {
                assert_eq!(analyze.format, OutputFormatArg::Github);
                assert!(analyze.root_path.is_none());
                assert!(analyze.include_pattern.is_none());
                assert!(analyze.reference.is_none());
                assert!(!analyze.require_app_config);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_analyze_with_all_flags() {
        let args = CliArgs::parse_from([
            "buildscope",
            "analyze",
            "--root-path",
            "/work",
            "--include-pattern",
            "apps/*",
            "--exclude-pattern",
            "apps/test-*",
            "--ref",
            "v2.0.0",
            "--event",
            "pull_request",
            "--base-ref",
            "develop",
            "--require-app-config",
            "--format",
            "json",
        ]);
        let Commands::Analyze(analyze) = args.command else {
            panic!("Expected Analyze command");
        };

        let config = analyze.apply_to(ScopeConfig::default());
        assert_eq!(config.root_path, PathBuf::from("/work"));
        assert_eq!(config.include_pattern.as_deref(), Some("apps/*"));
        assert_eq!(config.exclude_pattern.as_deref(), Some("apps/test-*"));
        assert_eq!(config.ref_override.as_deref(), Some("v2.0.0"));
        assert_eq!(config.event, EventKind::PullRequest);
        assert_eq!(config.base_ref, "develop");
        assert!(config.require_app_config);
        assert_eq!(analyze.format, OutputFormatArg::Json);
    }

    #[test]
    fn test_apply_keeps_environment_values() {
        let args = CliArgs::parse_from(["buildscope", "analyze", "--include-pattern", ""]);
        let Commands::Analyze(analyze) = args.command else {
            panic!("Expected Analyze command");
        };
        let env_config = ScopeConfig {
            root_path: PathBuf::from("/github/workspace"),
            event: EventKind::ManualDispatch,
            require_app_config: true,
            ..Default::default()
        };

        let config = analyze.apply_to(env_config);
        assert_eq!(config.root_path, PathBuf::from("/github/workspace"));
        assert_eq!(config.event, EventKind::ManualDispatch);
        assert!(config.require_app_config);
        assert!(config.include_pattern.is_none());
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["buildscope", "analyze", "-v", "--log-level", "trace"]);
        assert!(args.verbose);
        assert_eq!(args.log_level.as_deref(), Some("trace"));

        let result = CliArgs::try_parse_from(["buildscope", "-v", "-q", "analyze"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_release_notes_defaults() {
        let args = CliArgs::parse_from(["buildscope", "release-notes", "--git-diff", "ZGlmZg=="]);
        let Commands::ReleaseNotes(notes) = args.command else {
            panic!("Expected ReleaseNotes command");
        };

        assert_eq!(notes.git_diff, "ZGlmZg==");
        assert_eq!(notes.temperature, 0.2);
        assert_eq!(notes.max_tokens, 4000);
        assert_eq!(notes.response_format, "text");
        assert!(notes.seed.is_none());
        assert_eq!(notes.output, PathBuf::from("release_notes.md"));
    }
}
