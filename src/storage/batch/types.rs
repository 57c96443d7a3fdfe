//! Batch configuration.
//!
//! Batches are cut by whichever bound is hit first: record count or summed
//! estimated size. A periodic flush drains partially filled batches.

use serde::Deserialize;

use crate::config::{DEFAULT_BATCH_MAX_RECORDS, DEFAULT_BATCH_MAX_SIZE, DEFAULT_FLUSH_INTERVAL_SECS};

/// Configuration for batch writing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Maximum number of records per batch
    pub max_records: usize,
    /// Maximum summed size estimate per batch (a lone oversized record still forms a batch)
    pub max_size: usize,
    /// Interval between automatic flushes (in seconds)
    pub flush_interval_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            max_records: DEFAULT_BATCH_MAX_RECORDS,
            max_size: DEFAULT_BATCH_MAX_SIZE,
            flush_interval_secs: DEFAULT_FLUSH_INTERVAL_SECS,
        }
    }
}
