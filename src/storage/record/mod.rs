//! Encoded record data structure.
//!
//! Records live between encode and write time only: created per event by the
//! encoder, consumed by the batch writer, never kept across batches.

mod types;

pub use types::{CharCountEstimator, EncodedRecord, SizeEstimator};
