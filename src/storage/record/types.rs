//! Encoded record data structure.
//!
//! This module defines the EncodedRecord type, the column-list/value-list pair
//! produced from one event, and the size policy used for batch accounting.

use crate::event::Value;

/// A row ready for insertion.
///
/// `columns` is the comma-joined list of destination columns that resolved
/// for the source event; `values` is positionally aligned with it.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    pub columns: String,
    pub values: Vec<Value>,
}

impl EncodedRecord {
    pub fn new(columns: String, values: Vec<Value>) -> Self {
        EncodedRecord { columns, values }
    }

    /// Number of bound parameters (and placeholders) this record needs.
    pub fn arity(&self) -> usize {
        self.values.len()
    }

    /// Cheap size proxy: column-list characters plus value count.
    pub fn size(&self) -> usize {
        CharCountEstimator.estimate(self)
    }
}

/// Policy for estimating a record's contribution to a batch's size.
///
/// Estimates only drive batch boundaries; they are not byte-accurate.
pub trait SizeEstimator: Send + Sync {
    fn estimate(&self, record: &EncodedRecord) -> usize;
}

/// Default estimator: `columns.len() + values.len()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharCountEstimator;

impl SizeEstimator for CharCountEstimator {
    fn estimate(&self, record: &EncodedRecord) -> usize {
        record.columns.len() + record.values.len()
    }
}

impl<F> SizeEstimator for F
where
    F: Fn(&EncodedRecord) -> usize + Send + Sync,
{
    fn estimate(&self, record: &EncodedRecord) -> usize {
        self(record)
    }
}
