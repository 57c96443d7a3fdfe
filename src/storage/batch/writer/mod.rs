//! Batch writer implementation.
//!
//! This module provides the BatchWriter struct; the transaction and recovery
//! logic lives in `transaction.rs`.

mod transaction;

use std::sync::Arc;

use crate::error_handling::WriteStats;
use crate::storage::driver::Driver;
use crate::storage::insert::PlaceholderCache;

/// Writes batches of encoded records into one table.
///
/// `write` takes `&mut self`: a transaction handle is not reentrant, so only
/// one write may be in flight per writer.
pub struct BatchWriter<D: Driver> {
    driver: D,
    table: String,
    placeholders: Arc<PlaceholderCache>,
    stats: Arc<WriteStats>,
}

impl<D: Driver> BatchWriter<D> {
    pub fn new(
        driver: D,
        table: impl Into<String>,
        placeholders: Arc<PlaceholderCache>,
        stats: Arc<WriteStats>,
    ) -> Self {
        BatchWriter {
            driver,
            table: table.into(),
            placeholders,
            stats,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn stats(&self) -> &Arc<WriteStats> {
        &self.stats
    }

    /// Releases the underlying connection; errors are returned as-is.
    pub async fn close(&self) -> Result<(), sqlx::Error> {
        self.driver.close().await
    }
}
