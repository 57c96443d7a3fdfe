//! Error handling and write statistics.
//!
//! This module provides:
//! - Error type definitions for configuration, database and pipeline failures
//! - Write-path outcome categories
//! - Thread-safe counters for those outcomes
//! - Retry strategy for failed batch writes

mod retry;
mod stats;
mod types;

// Re-export public API
pub use retry::write_retry_strategy;
pub use stats::WriteStats;
pub use types::{
    ConfigError, DatabaseError, EventError, InitializationError, PipelineError, WriteEvent,
};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_write_stats_initialization() {
        let stats = WriteStats::new();
        for event in WriteEvent::iter() {
            assert_eq!(stats.get(event), 0);
        }
    }

    #[test]
    fn test_write_stats_increment_and_add() {
        let stats = WriteStats::new();
        stats.increment(WriteEvent::BatchCommitted);
        stats.add(WriteEvent::RecordsWritten, 42);
        stats.add(WriteEvent::RecordsWritten, 8);
        assert_eq!(stats.get(WriteEvent::BatchCommitted), 1);
        assert_eq!(stats.get(WriteEvent::RecordsWritten), 50);
    }

    #[test]
    fn test_total_failures_ignores_success_counters() {
        let stats = WriteStats::new();
        stats.add(WriteEvent::RecordsWritten, 10);
        stats.increment(WriteEvent::BatchCommitted);
        stats.increment(WriteEvent::RecordsDeferred);
        stats.increment(WriteEvent::CommitFailed);
        stats.increment(WriteEvent::PoisonRecordDropped);
        assert_eq!(stats.total_failures(), 2);
    }

    #[test]
    fn test_write_event_display() {
        assert_eq!(WriteEvent::RollbackFailed.to_string(), "Rollback failures");
        assert!(WriteEvent::RollbackFailed.is_failure());
        assert!(!WriteEvent::EventsSkipped.is_failure());
    }

    #[test]
    fn test_database_error_display() {
        let err = DatabaseError::UnsupportedScheme("mysql".to_string());
        assert_eq!(
            err.to_string(),
            "Unsupported connection URI scheme: mysql"
        );
        assert_eq!(
            DatabaseError::NotStarted.to_string(),
            "Database connection not started"
        );
    }
}
