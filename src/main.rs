// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use subsplit::app_config::{self, Config, TranslationProvider};
use subsplit::app_controller::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for subsplit
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subsplit - split episodes into bilingual dialogue segments
///
/// Reads the subtitles of each episode (sidecar files and container streams),
/// aligns the primary language with its translations, and writes one audio
/// clip, one screenshot and one TSV row per aligned line.
#[derive(Parser, Debug)]
#[command(name = "subsplit")]
#[command(version)]
#[command(about = "Split episodes into aligned multilingual dialogue segments")]
#[command(long_about = "subsplit aligns the subtitles of each episode across languages and cuts one audio clip and one screenshot per aligned line.

EXAMPLES:
    subsplit ./input ./output                    # Process every episode in ./input
    subsplit --dry-run episode01.mkv ./output    # Write the TSV only, no media
    subsplit --token <KEY> ./input ./output      # Fill missing translations with DeepL
    subsplit --parallel ./input ./output         # Process several episodes at once
    subsplit completions bash > subsplit.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
#[command(args_conflicts_with_subcommands = true)]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Video file or directory of episodes
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output directory (one sub-directory per episode)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// DeepL auth key; enables machine translation of missing languages
    #[arg(short, long, env = "DEEPL_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Shortcut for --log-level debug
    #[arg(short, long)]
    verbose: bool,

    /// Align and write the TSV without generating audio or screenshots
    #[arg(short, long)]
    dry_run: bool,

    /// Process several episodes concurrently
    #[arg(short, long)]
    parallel: bool,
}

impl CommandLineOptions {
    fn requested_log_level(&self) -> Option<app_config::LogLevel> {
        if self.verbose {
            return Some(app_config::LogLevel::Debug);
        }
        self.log_level.clone().map(Into::into)
    }
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // Records are filtered by log::max_level, which is adjusted after the config loads
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subsplit", &mut std::io::stdout());
        return Ok(());
    }

    run_split(cli).await
}

/// Load the config file, or write a default one when it does not exist
fn load_or_create_config(path: &str) -> Result<Config> {
    if Path::new(path).exists() {
        return Config::from_file(path);
    }

    warn!("Config file not found at '{}', creating default config.", path);
    let config = Config::default();
    config
        .save_to_file(path)
        .with_context(|| format!("Failed to write default config to file: {}", path))?;
    Ok(config)
}

/// Apply command line flags on top of the file configuration
fn apply_cli_overrides(config: &mut Config, options: &CommandLineOptions) {
    if let Some(token) = options.token.as_ref().filter(|t| !t.is_empty()) {
        config.translation.provider = TranslationProvider::DeepL;
        config.translation.api_key = token.clone();
    }
    if options.dry_run {
        config.output.dry_run = true;
    }
    if options.parallel {
        config.output.parallel_episodes = true;
    }
    if let Some(level) = options.requested_log_level() {
        config.log_level = level;
    }
}

async fn run_split(options: CommandLineOptions) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(level) = options.requested_log_level() {
        log::set_max_level(level.to_level_filter());
    }

    let input = options
        .input
        .clone()
        .ok_or_else(|| anyhow!("INPUT is required when no subcommand is specified"))?;
    let output = options
        .output
        .clone()
        .ok_or_else(|| anyhow!("OUTPUT is required when no subcommand is specified"))?;

    let mut config = load_or_create_config(&options.config)?;
    apply_cli_overrides(&mut config, &options);

    // Just update the max level without reinitializing the logger
    log::set_max_level(config.log_level.to_level_filter());

    if config.translation.provider == TranslationProvider::None {
        info!("No DeepL token given, missing translations will stay empty");
    }
    if config.output.dry_run {
        info!("Dry run: audio clips and screenshots will not be generated");
    }

    let controller = Controller::with_config(config)?;
    let summary = controller.run(&input, &output).await?;

    if summary.processed == 0 {
        return Err(anyhow!("No episode could be processed"));
    }

    Ok(())
}
