//! Sink configuration and constants.
//!
//! This module provides:
//! - Configuration constants (batch bounds, retry limits)
//! - The TOML-backed sink configuration
//! - CLI option types and parsing

mod constants;
mod types;

pub use constants::*;
pub use types::{LogFormat, LogLevel, Opt, SinkConfig};
