//! Configuration constants used as defaults.

// Batching
/// Maximum number of records per batch
pub const DEFAULT_BATCH_MAX_RECORDS: usize = 100;
/// Maximum summed size estimate per batch (1 MiB of estimated size)
pub const DEFAULT_BATCH_MAX_SIZE: usize = 1024 * 1024;
/// Interval between time-based flushes of a partial batch
pub const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 5;

// Retry
/// Consecutive failed write attempts on the same batch before giving up.
/// Only begin, commit and rollback failures count; a dropped poison record
/// is progress.
pub const MAX_WRITE_ATTEMPTS: usize = 3;

/// Initial delay in milliseconds before retrying a failed batch
pub const RETRY_INITIAL_DELAY_MS: u64 = 100;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 5;

// Identifier validation
/// A plain SQL identifier. Table and column names are spliced into the
/// INSERT statement, so nothing else is accepted.
pub const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";
