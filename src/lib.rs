//! sql_event_sink library: batched event output into a SQL table
//!
//! Events are projected into rows through a configured column mapping and
//! written to Postgres or SQLite in batch transactions. When a row in a batch
//! fails, the batch shrinks to the prefix before the failing row; a row that
//! fails at the head of a batch is dropped so the rest of the stream keeps
//! moving.
//!
//! # Example
//!
//! ```no_run
//! use sql_event_sink::{run_sink, SinkConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SinkConfig::load(std::path::Path::new("sink.toml"))?;
//! let input = tokio::io::BufReader::new(tokio::fs::File::open("events.jsonl").await?);
//!
//! let report = run_sink(config, input).await?;
//! println!("{} events, {} records consumed", report.run.events, report.run.consumed);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

pub mod config;
pub mod encoder;
pub mod error_handling;
pub mod event;
pub mod initialization;
pub mod pipeline;
pub mod plugin;
pub mod storage;

// Re-export public API
pub use config::{LogFormat, LogLevel, Opt, SinkConfig};
pub use encoder::{Encoder, MappingTable, Selector};
pub use error_handling::{
    ConfigError, DatabaseError, EventError, PipelineError, WriteEvent, WriteStats,
};
pub use event::{Event, Value};
pub use pipeline::{Pipeline, RunReport};
pub use plugin::{OutputPlugin, SqlOutput};
pub use run::{run_sink, SinkReport};
pub use storage::{BatchConfig, BatchWriter, EncodedRecord, SqlDriver};

mod run {
    use std::time::Instant;

    use anyhow::{Context, Result};
    use log::info;
    use tokio::io::AsyncBufRead;

    use crate::config::SinkConfig;
    use crate::error_handling::WriteEvent;
    use crate::pipeline::{Pipeline, RunReport};
    use crate::plugin::{OutputPlugin, SqlOutput};
    use crate::storage::{Connect, SqlDriver};

    /// Results of a completed run.
    #[derive(Debug, Clone)]
    pub struct SinkReport {
        /// Line and record counts
        pub run: RunReport,
        /// Rows committed to the table
        pub rows_written: usize,
        /// Records dropped after failing at the head of a batch
        pub records_dropped: usize,
        /// Wall-clock duration of the run
        pub elapsed_seconds: f64,
    }

    /// Reads JSON-lines events from `input` and writes them to the configured
    /// table until end of input.
    ///
    /// The output is closed whether or not the run succeeds. A pipeline error
    /// is returned ahead of a close error.
    pub async fn run_sink<R>(config: SinkConfig, input: R) -> Result<SinkReport>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut output =
            SqlOutput::<SqlDriver>::init(config).context("Invalid sink configuration")?;
        output
            .start()
            .await
            .context("Failed to connect to database")?;
        drive(output, input).await
    }

    /// Runs a started output to end of input, then closes it.
    pub(crate) async fn drive<D, R>(output: SqlOutput<D>, input: R) -> Result<SinkReport>
    where
        D: Connect,
        R: AsyncBufRead + Unpin,
    {
        let start = Instant::now();
        let batch = output.config().batch.clone();

        let mut pipeline = Pipeline::new(output, batch);
        let result = pipeline.run(input).await;

        let mut output = pipeline.into_plugin();
        let closed = output.close().await;

        let stats = output.stats();
        stats.log_summary();

        let run = result.context("Event pipeline failed")?;
        closed.context("Failed to close database connection")?;

        let report = SinkReport {
            run,
            rows_written: stats.get(WriteEvent::RecordsWritten),
            records_dropped: stats.get(WriteEvent::PoisonRecordDropped),
            elapsed_seconds: start.elapsed().as_secs_f64(),
        };
        info!(
            "Run finished: {} events, {} rows written in {:.1}s",
            report.run.events, report.rows_written, report.elapsed_seconds
        );
        Ok(report)
    }

}
