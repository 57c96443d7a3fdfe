//! Shared test helpers for storage module tests.
//!
//! This module provides an in-memory SQLite pool for tests that want a real
//! database, and a scripted [`MockDriver`] for tests that need to inject
//! failures at a specific step of a transaction.

use std::sync::{Arc, Mutex};

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;
use crate::event::Value;
use crate::storage::driver::{Driver, SqlTransaction};
use crate::storage::pool::Connect;
use crate::storage::EncodedRecord;

/// Creates a single-connection in-memory pool with a `logs` table.
///
/// `msg` rejects the text `'bad'` through a CHECK constraint so tests can
/// make one specific row fail.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    sqlx::query(
        "CREATE TABLE logs (
            tag TEXT,
            time TEXT,
            msg TEXT CHECK (msg IS NULL OR msg <> 'bad'),
            level INTEGER
        )",
    )
    .execute(&pool)
    .await
    .expect("Failed to create logs table");
    pool
}

/// Counts rows in the `logs` table.
pub async fn count_rows(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM logs")
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}

/// A record whose single `msg` column holds `msg`.
pub fn msg_record(msg: &str) -> EncodedRecord {
    EncodedRecord::new("msg".to_string(), vec![Value::from(msg)])
}

/// Failure script and observations shared between a mock driver and its
/// transactions.
#[derive(Debug, Default)]
pub struct MockState {
    /// Remaining `begin` calls that fail.
    pub fail_begin: usize,
    /// A single `begin` call (1-based) that fails.
    pub fail_begin_on: Option<usize>,
    /// Any statement bound with this value fails.
    pub poison: Option<Value>,
    /// Remaining `rollback` calls that fail.
    pub fail_rollback: usize,
    /// Remaining `commit` calls that fail.
    pub fail_commit: usize,
    /// `close` fails.
    pub fail_close: bool,
    pub begins: usize,
    pub commits: usize,
    pub rollbacks: usize,
    /// Every statement executed, in order, with its bound values.
    pub executed: Vec<(String, Vec<Value>)>,
    /// Values of rows made durable by a successful commit.
    pub committed: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    pub state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails every statement that binds `value`.
    pub fn with_poison(self, value: impl Into<Value>) -> Self {
        self.state.lock().unwrap().poison = Some(value.into());
        self
    }

    pub fn with_failing_begin(self, times: usize) -> Self {
        self.state.lock().unwrap().fail_begin = times;
        self
    }

    pub fn with_begin_failing_on_call(self, call: usize) -> Self {
        self.state.lock().unwrap().fail_begin_on = Some(call);
        self
    }

    pub fn with_failing_rollback(self, times: usize) -> Self {
        self.state.lock().unwrap().fail_rollback = times;
        self
    }

    pub fn with_failing_commit(self, times: usize) -> Self {
        self.state.lock().unwrap().fail_commit = times;
        self
    }

    pub fn with_failing_close(self) -> Self {
        self.state.lock().unwrap().fail_close = true;
        self
    }

    pub fn snapshot<T>(&self, f: impl FnOnce(&MockState) -> T) -> T {
        f(&self.state.lock().unwrap())
    }
}

pub struct MockTx {
    state: Arc<Mutex<MockState>>,
    pending: Vec<Vec<Value>>,
}

fn injected(what: &str) -> sqlx::Error {
    sqlx::Error::Protocol(format!("injected {what} failure"))
}

impl Driver for MockDriver {
    type Tx = MockTx;

    async fn begin(&self) -> Result<MockTx, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        state.begins += 1;
        if state.fail_begin > 0 {
            state.fail_begin -= 1;
            return Err(injected("begin"));
        }
        if state.fail_begin_on == Some(state.begins) {
            return Err(injected("begin"));
        }
        Ok(MockTx {
            state: Arc::clone(&self.state),
            pending: Vec::new(),
        })
    }

    async fn close(&self) -> Result<(), sqlx::Error> {
        if self.state.lock().unwrap().fail_close {
            return Err(injected("close"));
        }
        Ok(())
    }
}

impl Connect for MockDriver {
    async fn connect(_uri: &str) -> Result<Self, DatabaseError> {
        Ok(MockDriver::new())
    }
}

impl SqlTransaction for MockTx {
    async fn execute(&mut self, sql: &str, values: &[Value]) -> Result<u64, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        state.executed.push((sql.to_string(), values.to_vec()));
        if let Some(poison) = &state.poison {
            if values.contains(poison) {
                return Err(injected("execute"));
            }
        }
        self.pending.push(values.to_vec());
        Ok(1)
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        if state.fail_commit > 0 {
            state.fail_commit -= 1;
            return Err(injected("commit"));
        }
        state.commits += 1;
        state.committed.extend(self.pending);
        Ok(())
    }

    async fn rollback(self) -> Result<(), sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        if state.fail_rollback > 0 {
            state.fail_rollback -= 1;
            return Err(injected("rollback"));
        }
        state.rollbacks += 1;
        Ok(())
    }
}
