//! Tests for command-line parsing.

use clap::Parser;
use sql_event_sink::{LogFormat, LogLevel, Opt};
use std::path::PathBuf;

#[test]
fn test_config_is_required() {
    let result = Opt::try_parse_from(["sql_event_sink", "events.jsonl"]);
    assert!(result.is_err(), "--config should be required");
}

#[test]
fn test_defaults() {
    let opt = Opt::try_parse_from(["sql_event_sink", "--config", "sink.toml"]).unwrap();
    assert_eq!(opt.config, PathBuf::from("sink.toml"));
    assert!(opt.input.is_none());
    assert!(opt.uri.is_none());
    assert!(matches!(opt.log_level, LogLevel::Info));
    assert!(matches!(opt.log_format, LogFormat::Plain));
    assert!(opt.reads_stdin());
}

#[test]
fn test_all_options() {
    let opt = Opt::try_parse_from([
        "sql_event_sink",
        "-c",
        "sink.toml",
        "--uri",
        "postgres://localhost/logs",
        "--log-level",
        "debug",
        "--log-format",
        "json",
        "events.jsonl",
    ])
    .unwrap();
    assert_eq!(opt.input, Some(PathBuf::from("events.jsonl")));
    assert_eq!(opt.uri.as_deref(), Some("postgres://localhost/logs"));
    assert!(matches!(opt.log_level, LogLevel::Debug));
    assert!(matches!(opt.log_format, LogFormat::Json));
    assert!(!opt.reads_stdin());
}

#[test]
fn test_invalid_log_level_rejected() {
    let result = Opt::try_parse_from([
        "sql_event_sink",
        "-c",
        "sink.toml",
        "--log-level",
        "verbose",
    ]);
    assert!(result.is_err());
}
