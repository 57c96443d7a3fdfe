//! Write statistics tracking.
//!
//! This module provides thread-safe counters for the outcomes of the write
//! path (commits, failures, dropped records).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::WriteEvent;

/// Thread-safe write statistics tracker.
///
/// Every [`WriteEvent`] variant is initialized to zero on creation, so
/// counters can be bumped through a shared reference from any task.
#[derive(Debug)]
pub struct WriteStats {
    counters: HashMap<WriteEvent, AtomicUsize>,
}

impl Default for WriteStats {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteStats {
    pub fn new() -> Self {
        let mut counters = HashMap::new();
        for event in WriteEvent::iter() {
            counters.insert(event, AtomicUsize::new(0));
        }
        WriteStats { counters }
    }

    /// Increment a counter by one.
    pub fn increment(&self, event: WriteEvent) {
        self.add(event, 1);
    }

    /// Increment a counter by `n`.
    pub fn add(&self, event: WriteEvent, n: usize) {
        if let Some(counter) = self.counters.get(&event) {
            counter.fetch_add(n, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment counter for {:?} which is not in the map. \
                 This indicates a bug in WriteStats initialization.",
                event
            );
        }
    }

    /// Get the count for an event.
    pub fn get(&self, event: WriteEvent) -> usize {
        self.counters
            .get(&event)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total count across all failure events.
    pub fn total_failures(&self) -> usize {
        WriteEvent::iter()
            .filter(WriteEvent::is_failure)
            .map(|e| self.get(e))
            .sum()
    }

    /// Logs a one-line-per-counter summary of non-zero counters.
    pub fn log_summary(&self) {
        log::info!(
            "Write summary: {} records in {} batches",
            self.get(WriteEvent::RecordsWritten),
            self.get(WriteEvent::BatchCommitted)
        );
        for event in WriteEvent::iter() {
            let count = self.get(event);
            if count == 0 || matches!(event, WriteEvent::RecordsWritten | WriteEvent::BatchCommitted) {
                continue;
            }
            if event.is_failure() {
                log::warn!("   {}: {}", event, count);
            } else {
                log::info!("   {}: {}", event, count);
            }
        }
    }
}
