//! Retry strategy for batch writes.

use std::time::Duration;

use tokio_retry::strategy::ExponentialBackoff;

use crate::config::{MAX_WRITE_ATTEMPTS, RETRY_FACTOR, RETRY_INITIAL_DELAY_MS, RETRY_MAX_DELAY_SECS};

/// Delays between attempts to write the same batch.
///
/// Yields `MAX_WRITE_ATTEMPTS - 1` delays: one per retry after the first
/// attempt.
pub fn write_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(RETRY_INITIAL_DELAY_MS)
        .factor(RETRY_FACTOR)
        .max_delay(Duration::from_secs(RETRY_MAX_DELAY_SECS))
        .take(MAX_WRITE_ATTEMPTS.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_strategy_is_bounded() {
        let delays: Vec<Duration> = write_retry_strategy().collect();
        assert_eq!(delays.len(), MAX_WRITE_ATTEMPTS - 1);
        for d in delays {
            assert!(d <= Duration::from_secs(RETRY_MAX_DELAY_SECS));
            assert!(d > Duration::ZERO);
        }
    }
}
