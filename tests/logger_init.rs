//! Logger installation runs in its own test binary: env_logger can be
//! installed once per process, and the logger would otherwise stay active
//! for every other test.

use log::LevelFilter;
use sql_event_sink::error_handling::InitializationError;
use sql_event_sink::initialization::init_logger_with;
use sql_event_sink::LogFormat;

#[test]
fn test_init_logger_twice_does_not_panic() {
    let first = init_logger_with(LevelFilter::Error, LogFormat::Plain);
    assert!(first.is_ok());

    let second = init_logger_with(LevelFilter::Debug, LogFormat::Json);
    assert!(matches!(second, Err(InitializationError::LoggerError(_))));
}
