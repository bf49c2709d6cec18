// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

use scriptcast::app_config::{self, Config};
use scriptcast::casting::{
    partition, AuthoritativeCharacter, CharacterIdentity, IdentityResolver, MergeGuard,
    RawCharacterMention, RegistryBuilder, SceneBreakdown,
};
use scriptcast::decoding::{DecodeTier, Record as DecodedRecord, ResponseDecoder};
use scriptcast::errors::AppError;
use scriptcast::screenplay::ScriptAssembler;

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
    /// Parse a screenplay and print the document as JSON
    Parse {
        /// Screenplay text file ("-" for stdin)
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
    },

    /// Build the ordered character registry and its batch plan
    Registry {
        /// Screenplay text file ("-" for stdin)
        #[arg(short, long)]
        script: PathBuf,

        /// Authoritative character list (JSON array)
        #[arg(long)]
        characters: Option<PathBuf>,

        /// Per-scene breakdown (JSON array)
        #[arg(short, long)]
        breakdown: Option<PathBuf>,
    },

    /// Recover casting records from a raw generation response
    Decode {
        /// Response text file ("-" for stdin)
        #[arg(value_name = "RESPONSE")]
        response: PathBuf,
    },

    /// Generate shell completions for scriptcast
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// scriptcast - screenplay parsing and character registry tool
///
/// Parses generated screenplay text into a structured document and builds a
/// canonical, casting-ready character registry from it.
#[derive(Parser, Debug)]
#[command(name = "scriptcast")]
#[command(version)]
#[command(about = "Screenplay parsing and character registry tool")]
#[command(long_about = "scriptcast parses screenplay text into a structured document and builds a canonical character registry.

EXAMPLES:
    scriptcast parse pilot.txt                                   # Print the parsed document
    scriptcast registry -s pilot.txt --characters cast.json      # Registry from script and cast list
    scriptcast registry -s pilot.txt -b breakdown.json           # Add per-scene breakdown data
    scriptcast decode response.txt                               # Recover records from a response
    scriptcast --log-level debug decode response.txt             # Show which decode tier was used
    scriptcast completions bash > scriptcast.bash                # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
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
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }

    // @returns: Short tag for log level
    fn tag_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "ERR",
            Level::Warn => "WRN",
            Level::Info => "INF",
            Level::Debug => "DBG",
            Level::Trace => "TRC",
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
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::color_for_level(level),
                now,
                Self::tag_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Registry output: the ordered identities and the names in each batch
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegistryReport {
    characters: Vec<CharacterIdentity>,
    batches: Vec<Vec<String>>,
}

/// Decode output: the tier used and the recovered records
#[derive(Serialize)]
struct DecodeReport {
    tier: DecodeTier,
    records: Vec<DecodedRecord>,
}

fn main() -> Result<()> {
    // Start at info; the configured level is applied once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "scriptcast", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.config_path, cli.log_level.clone())?;
    log::set_max_level(config.log_level.to_level_filter());

    match cli.command {
        Commands::Parse { script } => run_parse(&config, &script),
        Commands::Registry {
            script,
            characters,
            breakdown,
        } => run_registry(&config, &script, characters.as_deref(), breakdown.as_deref()),
        Commands::Decode { response } => run_decode(&config, &response),
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load the config file, creating a default one if it does not exist
fn load_config(config_path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    let path = Path::new(config_path);
    let mut config = if path.exists() {
        Config::from_file(path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config.save(path)?;
        config
    };

    // Command line log level wins over the config file
    if let Some(level) = log_level {
        config.log_level = level.into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

/// Read a file, or stdin when the path is "-"
fn read_input(path: &Path) -> Result<String, AppError> {
    if path == Path::new("-") {
        return Ok(std::io::read_to_string(std::io::stdin())?);
    }
    std::fs::read_to_string(path)
        .map_err(|e| AppError::File(format!("Failed to read {}: {}", path.display(), e)))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read_input(path)?;
    serde_json::from_str(&text).context(format!("Failed to parse JSON from {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output to JSON")?;
    println!("{}", json);
    Ok(())
}

fn run_parse(config: &Config, script: &Path) -> Result<()> {
    let text = read_input(script)?;
    let document = ScriptAssembler::new(config.parser.clone()).assemble(&text);

    info!(
        "Parsed {} page(s), {} scene(s), {} character(s)",
        document.metadata.page_count, document.metadata.scene_count, document.metadata.character_count
    );
    print_json(&document)
}

fn run_registry(
    config: &Config,
    script: &Path,
    characters: Option<&Path>,
    breakdown: Option<&Path>,
) -> Result<()> {
    let text = read_input(script)?;
    let document = ScriptAssembler::new(config.parser.clone()).assemble(&text);
    let mentions = RawCharacterMention::from_document(&document);
    debug!("Extracted {} cue mention(s) from the script", mentions.len());

    let authoritative: Vec<AuthoritativeCharacter> = match characters {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    let scenes: Vec<SceneBreakdown> = match breakdown {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let builder = RegistryBuilder::new(IdentityResolver::new(MergeGuard::from_config(&config.identity)));
    let registry = builder.build(&authoritative, &mentions, &scenes);

    let batches = partition(&registry, config.casting.batch_size)
        .into_iter()
        .map(|batch| batch.into_iter().map(|identity| identity.name).collect())
        .collect();

    print_json(&RegistryReport {
        characters: registry,
        batches,
    })
}

fn run_decode(config: &Config, response: &Path) -> Result<()> {
    let text = read_input(response)?;
    let decoded = ResponseDecoder::from_config(&config.casting)
        .decode(&text)
        .map_err(AppError::from)?;

    info!("Recovered {} record(s) via {} tier", decoded.records.len(), decoded.tier);
    print_json(&DecodeReport {
        tier: decoded.tier,
        records: decoded.records,
    })
}
