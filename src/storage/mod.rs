// storage/mod.rs
// Database write path: records, statements, transport and the batch writer

pub mod batch;
pub mod driver;
pub mod insert;
pub mod pool;
pub mod record;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use batch::{BatchConfig, BatchWriter};
pub use driver::{Driver, SqlDriver, SqlDriverTx, SqlTransaction};
pub use insert::PlaceholderCache;
pub use pool::{connect, Connect};
pub use record::{CharCountEstimator, EncodedRecord, SizeEstimator};
