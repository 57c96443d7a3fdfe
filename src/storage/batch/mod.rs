//! Transactional batch writing.
//!
//! This module defines the BatchWriter, which commits an ordered slice of
//! encoded records as one transaction and recovers from per-record failures
//! by shrinking the batch.

mod types;
mod writer;

pub use types::BatchConfig;
pub use writer::BatchWriter;
