use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Application configuration module
/// This module handles loading, validating and saving the settings used by
/// the screenplay parser, the identity resolver and the casting service.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Screenplay parser settings
    #[serde(default)]
    pub parser: ParserConfig,

    /// Character identity resolution settings
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Casting batch and decode settings
    #[serde(default)]
    pub casting: CastingConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Settings for turning screenplay text into a paginated document
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ParserConfig {
    /// Element count after which the current page is closed
    #[serde(default = "default_page_element_threshold")]
    pub page_element_threshold: usize,

    /// Non-blank lines inspected after a candidate character cue
    #[serde(default = "default_lookahead_lines")]
    pub lookahead_lines: usize,

    /// Cue lines must be strictly shorter than this
    #[serde(default = "default_max_cue_length")]
    pub max_cue_length: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            page_element_threshold: default_page_element_threshold(),
            lookahead_lines: default_lookahead_lines(),
            max_cue_length: default_max_cue_length(),
        }
    }
}

/// Settings for merging variant character names
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IdentityConfig {
    /// Require word boundaries and a minimum key length before two names are
    /// merged by containment
    #[serde(default)]
    pub guard_containment: bool,

    /// Minimum normalized key length for a containment merge when guarded
    #[serde(default = "default_min_key_length")]
    pub min_key_length: usize,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            guard_containment: false,
            min_key_length: default_min_key_length(),
        }
    }
}

/// Settings for batching characters and decoding generated responses
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CastingConfig {
    /// Maximum characters per generation request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum number of batches in flight at once
    #[serde(default = "default_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Lower bound of the per-character token budget
    #[serde(default = "default_min_tokens_per_character")]
    pub min_tokens_per_character: u32,

    /// Upper bound of the per-character token budget
    #[serde(default = "default_max_tokens_per_character")]
    pub max_tokens_per_character: u32,

    /// Total token budget a single batch should stay under
    #[serde(default = "default_batch_token_ceiling")]
    pub batch_token_ceiling: u32,

    /// Field every decoded record must carry
    #[serde(default = "default_identifying_field")]
    pub identifying_field: String,
}

impl Default for CastingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_concurrent_requests: default_concurrent_requests(),
            min_tokens_per_character: default_min_tokens_per_character(),
            max_tokens_per_character: default_max_tokens_per_character(),
            batch_token_ceiling: default_batch_token_ceiling(),
            identifying_field: default_identifying_field(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to the `log` crate's filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_page_element_threshold() -> usize {
    55
}

fn default_lookahead_lines() -> usize {
    2
}

fn default_max_cue_length() -> usize {
    40
}

fn default_min_key_length() -> usize {
    3
}

fn default_batch_size() -> usize {
    6
}

fn default_concurrent_requests() -> usize {
    3
}

fn default_min_tokens_per_character() -> u32 {
    400
}

fn default_max_tokens_per_character() -> u32 {
    1200
}

fn default_batch_token_ceiling() -> u32 {
    8000
}

fn default_identifying_field() -> String {
    "characterName".to_string()
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .context(format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .context(format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.parser.page_element_threshold == 0 {
            return Err(anyhow!("Page element threshold must be greater than zero"));
        }

        if self.parser.max_cue_length == 0 {
            return Err(anyhow!("Maximum cue length must be greater than zero"));
        }

        if self.casting.batch_size == 0 {
            return Err(anyhow!("Casting batch size must be greater than zero"));
        }

        if self.casting.max_concurrent_requests == 0 {
            return Err(anyhow!("At least one concurrent request is required"));
        }

        if self.casting.min_tokens_per_character > self.casting.max_tokens_per_character {
            return Err(anyhow!(
                "Token floor ({}) exceeds token ceiling ({})",
                self.casting.min_tokens_per_character,
                self.casting.max_tokens_per_character
            ));
        }

        if self.casting.identifying_field.trim().is_empty() {
            return Err(anyhow!("Identifying field must not be empty"));
        }

        Ok(())
    }
}
