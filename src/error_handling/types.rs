//! Error type definitions.
//!
//! This module defines the error enums used throughout the sink, plus the
//! write-path event categories that are counted by [`super::WriteStats`].

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Error types for loading and validating the sink configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this sink.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required string option was missing or empty.
    #[error("Missing required option: {0}")]
    Missing(&'static str),

    /// The column mapping has no entries.
    #[error("Column mapping is empty")]
    EmptyMapping,

    /// A table or column name is not a plain SQL identifier.
    #[error("Invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// The connection URI names a backend this sink cannot drive.
    #[error("Unsupported connection URI scheme: {0}")]
    UnsupportedScheme(String),

    /// `write` was called before `start` opened a connection.
    #[error("Database connection not started")]
    NotStarted,
}

/// Error types for decoding a single input event.
#[derive(Error, Debug)]
pub enum EventError {
    /// The line is not a JSON event object.
    #[error("Malformed event JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The `time` field is neither RFC 3339 text nor epoch seconds.
    #[error("Invalid event time: {0}")]
    InvalidTime(String),
}

/// Error types for the event pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Reading the input stream failed.
    #[error("Input read error: {0}")]
    Io(#[from] std::io::Error),

    /// A batch could not be written and the retry limit was reached.
    #[error("Batch write failed after {attempts} attempts: {source}")]
    WriteFailed {
        attempts: usize,
        #[source]
        source: DatabaseError,
    },

    /// A database error outside the batch write path (connect, close).
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Outcomes observed on the write path.
///
/// Failure variants line up with the recovery branches of the batch writer:
/// begin failures and commit failures hand the whole batch back, execute
/// failures trigger a rollback and shrink, rollback failures escalate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WriteEvent {
    /// A transaction was committed.
    BatchCommitted,
    /// A row was persisted by a committed transaction.
    RecordsWritten,
    /// Opening a transaction failed.
    TransactionBeginFailed,
    /// A single INSERT failed inside a transaction.
    RecordExecuteFailed,
    /// Rolling back after an INSERT failure failed.
    RollbackFailed,
    /// Committing a transaction failed.
    CommitFailed,
    /// A record failed at the head of a batch and was discarded.
    PoisonRecordDropped,
    /// Records behind a failing INSERT that were handed back to the host.
    RecordsDeferred,
    /// Events that resolved no mapped column and produced no row.
    EventsSkipped,
}

impl WriteEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteEvent::BatchCommitted => "Batches committed",
            WriteEvent::RecordsWritten => "Records written",
            WriteEvent::TransactionBeginFailed => "Transaction begin failures",
            WriteEvent::RecordExecuteFailed => "Record insert failures",
            WriteEvent::RollbackFailed => "Rollback failures",
            WriteEvent::CommitFailed => "Commit failures",
            WriteEvent::PoisonRecordDropped => "Poison records dropped",
            WriteEvent::RecordsDeferred => "Records deferred to a later batch",
            WriteEvent::EventsSkipped => "Events with no mapped columns",
        }
    }

    /// Whether this event represents a failure worth a non-zero summary warning.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            WriteEvent::TransactionBeginFailed
                | WriteEvent::RecordExecuteFailed
                | WriteEvent::RollbackFailed
                | WriteEvent::CommitFailed
                | WriteEvent::PoisonRecordDropped
        )
    }
}

impl std::fmt::Display for WriteEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
