//! Configuration types and CLI options.
//!
//! This module defines the TOML-backed sink configuration and the structs
//! used for command-line argument parsing.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use clap::{Parser, ValueEnum};
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

use crate::config::constants::IDENTIFIER_PATTERN;
use crate::error_handling::ConfigError;
use crate::storage::BatchConfig;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern compiles"));

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace). Used with the `--log-level` CLI option.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Plain,
    Json,
}

/// Sink configuration, read from a TOML file.
///
/// ```toml
/// uri = "postgres://localhost/logs"
/// table = "access_log"
///
/// [mapping]
/// tag = "@tag"
/// time = "@timestamp"
/// status = "code"
///
/// [batch]
/// max_records = 500
/// ```
///
/// Mapping keys are destination columns, values are source selectors.
/// Declaration order is kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SinkConfig {
    /// Connection URI (`postgres://...` or `sqlite:...`)
    #[serde(default)]
    pub uri: String,

    /// Destination table, optionally schema-qualified
    #[serde(default)]
    pub table: String,

    /// Destination column to source selector
    #[serde(default)]
    pub mapping: IndexMap<String, String>,

    /// Batch bounds
    #[serde(default)]
    pub batch: BatchConfig,
}

impl SinkConfig {
    /// Parses a TOML document. Call [`SinkConfig::validate`] before use.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks required options and that every name spliced into SQL is a
    /// plain identifier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uri.trim().is_empty() {
            return Err(ConfigError::Missing("uri"));
        }
        if self.table.trim().is_empty() {
            return Err(ConfigError::Missing("table"));
        }
        if !is_table_name(&self.table) {
            return Err(ConfigError::InvalidIdentifier(self.table.clone()));
        }
        if self.mapping.is_empty() {
            return Err(ConfigError::EmptyMapping);
        }
        if let Some(column) = self.mapping.keys().find(|c| !IDENTIFIER.is_match(c)) {
            return Err(ConfigError::InvalidIdentifier(column.clone()));
        }
        if self.batch.max_records == 0 {
            return Err(ConfigError::Missing("batch.max_records"));
        }
        Ok(())
    }
}

/// `name` or `schema.name`.
fn is_table_name(table: &str) -> bool {
    let mut parts = table.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), None, None) => IDENTIFIER.is_match(name),
        (Some(schema), Some(name), None) => {
            IDENTIFIER.is_match(schema) && IDENTIFIER.is_match(name)
        }
        _ => false,
    }
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Read events from stdin
/// tail -F events.jsonl | sql_event_sink --config sink.toml
///
/// # Read a file, overriding the connection URI
/// sql_event_sink --config sink.toml --uri sqlite://./events.db events.jsonl
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "sql_event_sink",
    about = "Writes JSON-lines events into a SQL table in batched transactions."
)]
pub struct Opt {
    /// JSON-lines event file to read ("-" or absent reads stdin)
    #[arg(value_parser)]
    pub input: Option<PathBuf>,

    /// Sink configuration file (TOML)
    #[arg(long, short = 'c', value_parser)]
    pub config: PathBuf,

    /// Connection URI, overriding `uri` from the config file
    #[arg(long)]
    pub uri: Option<String>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Opt {
    /// Whether events should be read from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.input
            .as_deref()
            .map_or(true, |p| p.as_os_str() == "-")
    }
}
