//! Transactional batch write with shrink-on-failure recovery.

use std::borrow::Cow;

use crate::error_handling::{DatabaseError, WriteEvent};
use crate::storage::driver::{Driver, SqlTransaction};
use crate::storage::insert::{build_insert_query, placeholder_list};
use crate::storage::EncodedRecord;

use super::BatchWriter;

impl<D: Driver> BatchWriter<D> {
    /// Writes `batch` in one transaction and returns how many records the
    /// caller may remove from the front of its queue.
    ///
    /// - Begin or commit failure: `Err`, nothing consumed.
    /// - A record at index `i > 0` fails: the transaction is rolled back and
    ///   the prefix `[0, i)` is written again on its own. Records from `i` on
    ///   are left to the caller, which resubmits them in a later batch.
    /// - The record at index 0 fails: it can never succeed on its own, so it
    ///   is dropped and `Ok(1)` is returned to keep the queue moving.
    /// - Rollback failure after a record failure: `Err`, nothing consumed,
    ///   since the transaction state is unknown.
    ///
    /// An empty batch consumes nothing and opens no transaction.
    pub async fn write(&mut self, batch: &[EncodedRecord]) -> Result<usize, DatabaseError> {
        let consumed = self.write_prefix(batch).await?;
        let deferred = batch.len() - consumed;
        if deferred > 0 {
            self.stats.add(WriteEvent::RecordsDeferred, deferred);
        }
        Ok(consumed)
    }

    async fn write_prefix(&self, batch: &[EncodedRecord]) -> Result<usize, DatabaseError> {
        let mut end = batch.len();

        'attempt: while end > 0 {
            let records = &batch[..end];
            log::debug!("Writing batch of {} records to {}", end, self.table);

            let mut tx = self.driver.begin().await.map_err(|e| {
                log::error!("Failed to begin transaction: {}", e);
                self.stats.increment(WriteEvent::TransactionBeginFailed);
                DatabaseError::SqlError(e)
            })?;

            for (i, record) in records.iter().enumerate() {
                let placeholders = match self.placeholders.get(record.arity()) {
                    Some(list) => Cow::Borrowed(list),
                    None => Cow::Owned(placeholder_list(record.arity())),
                };
                let query = build_insert_query(&self.table, &record.columns, &placeholders);

                let Err(e) = tx.execute(&query, &record.values).await else {
                    continue;
                };
                log::error!(
                    "Failed to insert record {} of {} into {} (columns: {}): {}",
                    i + 1,
                    end,
                    self.table,
                    record.columns,
                    e
                );
                self.stats.increment(WriteEvent::RecordExecuteFailed);

                if let Err(e) = tx.rollback().await {
                    log::error!("Failed to roll back transaction: {}", e);
                    self.stats.increment(WriteEvent::RollbackFailed);
                    return Err(DatabaseError::SqlError(e));
                }

                if i > 0 {
                    log::debug!("Retrying the {} records ahead of the failed one", i);
                    end = i;
                    continue 'attempt;
                }

                log::warn!(
                    "Dropping record that keeps failing at the head of the batch (columns: {})",
                    record.columns
                );
                self.stats.increment(WriteEvent::PoisonRecordDropped);
                return Ok(1);
            }

            tx.commit().await.map_err(|e| {
                log::error!("Failed to commit transaction: {}", e);
                self.stats.increment(WriteEvent::CommitFailed);
                DatabaseError::SqlError(e)
            })?;

            self.stats.increment(WriteEvent::BatchCommitted);
            self.stats.add(WriteEvent::RecordsWritten, end);
            log::debug!("Committed {} records to {}", end, self.table);
            return Ok(end);
        }

        Ok(0)
    }
}
