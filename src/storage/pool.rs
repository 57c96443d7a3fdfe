//! Database connection management.
//!
//! Opens a connection pool for the backend named by the connection URI:
//! - `postgres://` / `postgresql://` connect to Postgres
//! - `sqlite:` opens (and creates if missing) a SQLite database with WAL mode
//!   enabled for file-backed databases

use std::future::Future;
use std::str::FromStr;

use log::{error, info};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::error_handling::DatabaseError;

use super::driver::{Driver, SqlDriver};

/// A driver that can open itself from a connection URI.
pub trait Connect: Driver + Sized {
    fn connect(uri: &str) -> impl Future<Output = Result<Self, DatabaseError>> + Send;
}

impl Connect for SqlDriver {
    async fn connect(uri: &str) -> Result<Self, DatabaseError> {
        connect(uri).await
    }
}

/// Opens a connection pool for `uri`.
///
/// SQLite pools hold a single connection: there is one in-flight write per
/// sink, and in-memory databases are private to the connection that made them.
pub async fn connect(uri: &str) -> Result<SqlDriver, DatabaseError> {
    let scheme = uri.split(':').next().unwrap_or_default();
    match scheme {
        "postgres" | "postgresql" => {
            let pool = PgPoolOptions::new().connect(uri).await.map_err(|e| {
                error!("Failed to connect to database: {e}");
                DatabaseError::SqlError(e)
            })?;
            info!("Connected to Postgres");
            Ok(SqlDriver::Postgres(pool))
        }
        "sqlite" => {
            let mut options = SqliteConnectOptions::from_str(uri)
                .map_err(DatabaseError::SqlError)?
                .create_if_missing(true);
            if !uri.contains(":memory:") {
                options = options.journal_mode(SqliteJournalMode::Wal);
            }
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options)
                .await
                .map_err(|e| {
                    error!("Failed to connect to database: {e}");
                    DatabaseError::SqlError(e)
                })?;
            info!("Connected to SQLite database {uri}");
            Ok(SqlDriver::Sqlite(pool))
        }
        other => {
            error!("Unsupported connection URI scheme: {other:?}");
            Err(DatabaseError::UnsupportedScheme(other.to_string()))
        }
    }
}
