use buildscope_cli::cli::commands::{AnalyzeArgs, CliArgs, Commands, ReleaseNotesArgs};
use buildscope_cli::cli::output::{OutputFormat, OutputFormatter, OutputSink};
use buildscope_cli::cli::release::{write_notes, AzureOpenAiSettings, ReleaseNotesClient};
use buildscope_cli::{NAME, VERSION};
use buildscope_core::{GitDiffSource, RealFileSystem, ScopeAnalyzer, ScopeConfig};

use clap::Parser;
use std::env;
use std::process;
use tracing::{debug, error, info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Analyze(analyze_args) => handle_analyze(analyze_args),
        Commands::ReleaseNotes(notes_args) => handle_release_notes(notes_args),
    };

    process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let level = if let Some(level_str) = &args.log_level {
            parse_level(level_str)
        } else if args.verbose {
            Level::DEBUG
        } else if args.quiet {
            Level::ERROR
        } else {
            let level_str =
                env::var("BUILDSCOPE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
            parse_level(&level_str)
        };

        let mut filter = EnvFilter::from_default_env();

        if env::var("RUST_LOG").is_err() {
            for directive in [
                format!("buildscope={}", level),
                format!("buildscope_cli={}", level),
                format!("buildscope_core={}", level),
                "hyper=warn".to_string(),
                "reqwest=warn".to_string(),
            ] {
                if let Ok(parsed) = directive.parse() {
                    filter = filter.add_directive(parsed);
                }
            }
        }

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    });
}

fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn handle_analyze(args: &AnalyzeArgs) -> i32 {
    info!("Starting build scope analysis");

    let env_config = match ScopeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("\nPlease check your environment variables and command-line arguments.");
            return 1;
        }
    };
    let config = args.apply_to(env_config);
    debug!("{}", config);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your environment variables and command-line arguments.");
        return 1;
    }

    if !config.root_path.is_dir() {
        error!(
            "Root path is not a directory: {}",
            config.root_path.display()
        );
        return 1;
    }

    let fs = RealFileSystem::new();
    let diff_source = GitDiffSource::new(config.root_path.clone());

    let result = match ScopeAnalyzer::new(&fs, &diff_source).analyze(&config) {
        Ok(result) => result,
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let format: OutputFormat = args.format.into();
    let output = match OutputFormatter::new(format).format(&result) {
        Ok(out) => out,
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            return 1;
        }
    };

    let sink = match format {
        OutputFormat::Github => OutputSink::from_env(),
        OutputFormat::Json => OutputSink::Stdout,
    };
    if let Err(e) = sink.emit(&output) {
        error!("Failed to write output: {:#}", e);
        return 1;
    }
    if let OutputSink::File(path) = &sink {
        debug!("Output appended to {}", path.display());
    }

    0
}

fn handle_release_notes(args: &ReleaseNotesArgs) -> i32 {
    info!("Generating release notes");

    let settings = match AzureOpenAiSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return 1;
        }
    };

    let client = match ReleaseNotesClient::new(settings) {
        Ok(client) => client,
        Err(e) => {
            error!("{:#}", e);
            return 1;
        }
    };

    let content = match client.generate(args) {
        Ok(content) => content,
        Err(e) => {
            error!("Release notes request failed");
            eprintln!("{:#}", e);
            return 1;
        }
    };

    if let Err(e) = write_notes(&args.output, &content) {
        error!("{:#}", e);
        return 1;
    }

    0
}
