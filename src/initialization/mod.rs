//! Process-level initialization.
//!
//! The sink needs little global setup: a logger, and the database connection
//! that `OutputPlugin::start` opens.

mod logger;

pub use logger::init_logger_with;
