// Shared test helpers for file-backed databases and sink configs.

use sqlx::SqlitePool;
use std::path::Path;

use sql_event_sink::SinkConfig;

pub const TABLE_DDL: &str = "CREATE TABLE access_log (
    tag TEXT NOT NULL,
    time TEXT,
    code INTEGER,
    path TEXT CHECK (path IS NULL OR path <> '/poison')
)";

/// Creates a SQLite database file with the `access_log` table.
pub async fn create_test_db(db_path: &Path) -> SqlitePool {
    let pool = SqlitePool::connect(&format!("sqlite://{}?mode=rwc", db_path.display()))
        .await
        .expect("Failed to create test database");
    sqlx::query(TABLE_DDL)
        .execute(&pool)
        .await
        .expect("Failed to create access_log table");
    pool
}

/// A sink config writing to `db_path` with the given batch size.
pub fn sink_config(db_path: &Path, max_records: usize) -> SinkConfig {
    SinkConfig::from_toml_str(&format!(
        r#"
uri = "sqlite://{}"
table = "access_log"

[mapping]
tag = "@tag"
time = "@timestamp"
code = "status"
path = "path"

[batch]
max_records = {max_records}
flush_interval_secs = 60
"#,
        db_path.display()
    ))
    .expect("Failed to parse test config")
}

/// One JSON-lines event.
pub fn event_line(status: i64, path: &str) -> String {
    format!(
        "{{\"tag\":\"web\",\"time\":\"2024-01-01T00:00:00Z\",\"record\":{{\"status\":{status},\"path\":\"{path}\"}}}}\n"
    )
}

#[allow(dead_code)] // Used by other test files
pub async fn paths(pool: &SqlitePool) -> Vec<String> {
    sqlx::query_scalar("SELECT path FROM access_log ORDER BY rowid")
        .fetch_all(pool)
        .await
        .expect("Failed to read rows")
}
