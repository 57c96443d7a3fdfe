//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `sql_event_sink` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Opening the event input (file or stdin)
//! - User-facing output formatting

use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use tokio::io::{AsyncBufRead, BufReader};

use sql_event_sink::initialization::init_logger_with;
use sql_event_sink::{run_sink, Opt, SinkConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    match run(opt).await {
        Ok(report) => {
            println!(
                "Read {} event{} ({} malformed line{} skipped), wrote {} row{}, dropped {} in {:.1}s",
                report.run.events,
                if report.run.events == 1 { "" } else { "s" },
                report.run.malformed,
                if report.run.malformed == 1 { "" } else { "s" },
                report.rows_written,
                if report.rows_written == 1 { "" } else { "s" },
                report.records_dropped,
                report.elapsed_seconds
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("sql_event_sink error: {:#}", e);
            process::exit(1);
        }
    }
}

async fn run(opt: Opt) -> Result<sql_event_sink::SinkReport> {
    let mut config = SinkConfig::load(&opt.config)
        .with_context(|| format!("Failed to load config {}", opt.config.display()))?;
    if let Some(uri) = opt.uri.clone() {
        config.uri = uri;
    }

    let input: Box<dyn AsyncBufRead + Unpin> = match opt.input.as_deref() {
        Some(path) if !opt.reads_stdin() => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        _ => Box::new(BufReader::new(tokio::io::stdin())),
    };

    run_sink(config, input).await
}
