//! Reference host pipeline.
//!
//! Reads JSON-lines events, encodes them through an [`OutputPlugin`], queues
//! the records and cuts size-bounded batches for `write`. Whatever a write
//! does not consume stays at the front of the queue for the next batch.
//!
//! Batches are cut when `max_records` records are queued or their estimated
//! size reaches `max_size`, and on every `flush_interval_secs` tick so a slow
//! input does not strand a partial batch.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::MissedTickBehavior;

use crate::error_handling::{write_retry_strategy, PipelineError};
use crate::event::Event;
use crate::plugin::OutputPlugin;
use crate::storage::{BatchConfig, CharCountEstimator, EncodedRecord, SizeEstimator};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Non-empty input lines read
    pub lines: usize,
    /// Lines that decoded into an event
    pub events: usize,
    /// Lines that could not be decoded and were skipped
    pub malformed: usize,
    /// Records removed from the queue by writes (including dropped poison records)
    pub consumed: usize,
}

pub struct Pipeline<P> {
    plugin: P,
    queue: VecDeque<EncodedRecord>,
    queued_size: usize,
    batch: BatchConfig,
    estimator: Arc<dyn SizeEstimator>,
    retry_delays: Vec<Duration>,
    consumed: usize,
}

impl<P> Pipeline<P>
where
    P: OutputPlugin<Record = EncodedRecord>,
{
    pub fn new(plugin: P, batch: BatchConfig) -> Self {
        Pipeline {
            plugin,
            queue: VecDeque::new(),
            queued_size: 0,
            batch,
            estimator: Arc::new(CharCountEstimator),
            retry_delays: write_retry_strategy().collect(),
            consumed: 0,
        }
    }

    /// Replaces the size policy used for batch accounting.
    pub fn with_estimator(mut self, estimator: Arc<dyn SizeEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Replaces the delays between attempts at a failing batch. The number of
    /// delays is the number of retries.
    pub fn with_retry_delays(mut self, delays: impl IntoIterator<Item = Duration>) -> Self {
        self.retry_delays = delays.into_iter().collect();
        self
    }

    pub fn plugin(&self) -> &P {
        &self.plugin
    }

    pub fn plugin_mut(&mut self) -> &mut P {
        &mut self.plugin
    }

    pub fn into_plugin(self) -> P {
        self.plugin
    }

    /// Records waiting to be written.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Summed size estimate of the queued records.
    pub fn queued_size(&self) -> usize {
        self.queued_size
    }

    pub fn enqueue(&mut self, record: EncodedRecord) {
        self.queued_size += self.estimator.estimate(&record);
        self.queue.push_back(record);
    }

    /// Encodes `event`, queues the record, and writes every full batch.
    pub async fn push(&mut self, event: &Event) -> Result<(), PipelineError> {
        if let Some(record) = self.plugin.encode(event) {
            self.enqueue(record);
        }
        while self.batch_ready() {
            if self.flush_batch().await? == 0 {
                break;
            }
        }
        Ok(())
    }

    fn batch_ready(&self) -> bool {
        self.queue.len() >= self.batch.max_records || self.queued_size >= self.batch.max_size
    }

    /// Length of the next batch: as many queued records as fit both bounds,
    /// and never fewer than one.
    fn next_batch_len(&self) -> usize {
        let mut len = 0;
        let mut size = 0;
        for record in &self.queue {
            let estimate = self.estimator.estimate(record);
            if len > 0 && (len >= self.batch.max_records || size + estimate > self.batch.max_size) {
                break;
            }
            len += 1;
            size += estimate;
        }
        len
    }

    /// Writes one batch from the front of the queue and returns how many
    /// records it consumed.
    ///
    /// A failed write is retried after each configured delay; once the
    /// delays run out the batch stays queued and the error is returned.
    pub async fn flush_batch(&mut self) -> Result<usize, PipelineError> {
        let len = self.next_batch_len();
        if len == 0 {
            return Ok(0);
        }

        let mut delays = self.retry_delays.clone().into_iter();
        let mut attempts = 0;
        loop {
            attempts += 1;
            let batch = &self.queue.make_contiguous()[..len];
            match self.plugin.write(batch).await {
                Ok(consumed) => {
                    let consumed = consumed.min(len);
                    self.pop_front(consumed);
                    if consumed < len {
                        debug!("{} of {} records requeued", len - consumed, len);
                    }
                    return Ok(consumed);
                }
                Err(e) => match delays.next() {
                    Some(delay) => {
                        warn!(
                            "Batch write attempt {} failed, retrying in {:?}: {}",
                            attempts, delay, e
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        error!("Batch write failed after {} attempts: {}", attempts, e);
                        return Err(PipelineError::WriteFailed {
                            attempts,
                            source: e,
                        });
                    }
                },
            }
        }
    }

    fn pop_front(&mut self, count: usize) {
        for record in self.queue.drain(..count) {
            self.queued_size = self
                .queued_size
                .saturating_sub(self.estimator.estimate(&record));
        }
        self.consumed += count;
    }

    /// Writes batches until the queue is empty.
    pub async fn drain(&mut self) -> Result<(), PipelineError> {
        while !self.queue.is_empty() {
            if self.flush_batch().await? == 0 {
                warn!(
                    "Write consumed nothing, leaving {} records queued",
                    self.queue.len()
                );
                break;
            }
        }
        Ok(())
    }

    /// Reads events from `reader` until end of input, then drains the queue.
    pub async fn run<R>(&mut self, reader: R) -> Result<RunReport, PipelineError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut report = RunReport::default();
        let consumed_before = self.consumed;

        let period = Duration::from_secs(self.batch.flush_interval_secs.max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    report.lines += 1;
                    match Event::from_json_line(line) {
                        Ok(event) => {
                            report.events += 1;
                            self.push(&event).await?;
                        }
                        Err(e) => {
                            report.malformed += 1;
                            warn!("Skipping input line {}: {}", report.lines, e);
                        }
                    }
                }
                _ = ticker.tick() => {
                    if !self.queue.is_empty() {
                        debug!("Flush interval elapsed, writing {} queued records", self.queue.len());
                        self.drain().await?;
                    }
                }
            }
        }

        info!("End of input, writing {} queued records", self.queue.len());
        self.drain().await?;
        report.consumed = self.consumed - consumed_before;
        Ok(report)
    }
}
