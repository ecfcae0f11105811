pub mod commands;
pub mod output;
pub mod release;

pub use commands::{AnalyzeArgs, CliArgs, Commands, ReleaseNotesArgs};
pub use output::{OutputFormat, OutputFormatter, OutputSink};
pub use release::{AzureOpenAiSettings, ReleaseNotesClient};
