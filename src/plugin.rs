//! Output plugin lifecycle.
//!
//! A host drives an output through `init`, `start`, then any number of
//! `encode`/`write` calls, then `close`. [`SqlOutput`] is the SQL table
//! implementation of that contract.

use std::future::Future;
use std::sync::Arc;

use crate::config::SinkConfig;
use crate::encoder::{Encoder, MappingTable};
use crate::error_handling::{ConfigError, DatabaseError, WriteEvent, WriteStats};
use crate::event::Event;
use crate::storage::{BatchWriter, Connect, EncodedRecord, PlaceholderCache};

/// The contract between a host pipeline and an output.
pub trait OutputPlugin: Sized + Send {
    type Config;
    type Record: Send + Sync;

    /// Builds the output from its configuration. No I/O.
    fn init(config: Self::Config) -> Result<Self, ConfigError>;

    /// Opens connections.
    fn start(&mut self) -> impl Future<Output = Result<(), DatabaseError>> + Send;

    /// Projects one event into a record; `None` means the event yields no row
    /// and should be dropped silently.
    fn encode(&self, event: &Event) -> Option<Self::Record>;

    /// Writes a batch and returns how many records, from the front, the host
    /// may discard. The host requeues the rest.
    fn write(
        &mut self,
        batch: &[Self::Record],
    ) -> impl Future<Output = Result<usize, DatabaseError>> + Send;

    /// Releases connections.
    fn close(&mut self) -> impl Future<Output = Result<(), DatabaseError>> + Send;
}

/// Writes events into one SQL table.
pub struct SqlOutput<D: Connect> {
    config: SinkConfig,
    encoder: Encoder,
    placeholders: Arc<PlaceholderCache>,
    stats: Arc<WriteStats>,
    writer: Option<BatchWriter<D>>,
}

impl<D: Connect> SqlOutput<D> {
    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    pub fn stats(&self) -> &Arc<WriteStats> {
        &self.stats
    }

    /// Attaches an already opened driver instead of connecting by URI.
    pub fn start_with(&mut self, driver: D) {
        self.writer = Some(BatchWriter::new(
            driver,
            self.config.table.clone(),
            Arc::clone(&self.placeholders),
            Arc::clone(&self.stats),
        ));
    }

    /// The open driver, once started.
    pub fn driver(&self) -> Option<&D> {
        self.writer.as_ref().map(BatchWriter::driver)
    }

    pub fn is_started(&self) -> bool {
        self.writer.is_some()
    }
}

impl<D: Connect> OutputPlugin for SqlOutput<D> {
    type Config = SinkConfig;
    type Record = EncodedRecord;

    fn init(config: SinkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mapping = Arc::new(MappingTable::from(&config.mapping));
        let placeholders = Arc::new(PlaceholderCache::new(mapping.len()));
        log::debug!(
            "Initialized output for table {} with {} mapped columns",
            config.table,
            mapping.len()
        );
        Ok(SqlOutput {
            encoder: Encoder::new(mapping),
            placeholders,
            stats: Arc::new(WriteStats::new()),
            writer: None,
            config,
        })
    }

    async fn start(&mut self) -> Result<(), DatabaseError> {
        let driver = D::connect(&self.config.uri).await?;
        self.start_with(driver);
        log::info!("Output started, writing to table {}", self.config.table);
        Ok(())
    }

    fn encode(&self, event: &Event) -> Option<EncodedRecord> {
        let record = self.encoder.encode(event);
        if record.is_none() {
            log::debug!("Event tagged {} has no mapped fields, skipping", event.tag);
            self.stats.increment(WriteEvent::EventsSkipped);
        }
        record
    }

    async fn write(&mut self, batch: &[EncodedRecord]) -> Result<usize, DatabaseError> {
        let writer = self.writer.as_mut().ok_or(DatabaseError::NotStarted)?;
        writer.write(batch).await
    }

    async fn close(&mut self) -> Result<(), DatabaseError> {
        match self.writer.take() {
            Some(writer) => writer.close().await.map_err(DatabaseError::SqlError),
            None => Ok(()),
        }
    }
}
