//! SQL transport seam.
//!
//! The batch writer needs only four things from a database: begin a
//! transaction, execute a parameterized statement inside it, and commit or
//! roll it back. [`Driver`] and [`SqlTransaction`] capture that contract so
//! the writer can run against Postgres, SQLite or a scripted test double.

use std::future::Future;

use chrono::{DateTime, Utc};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgArgumentBuffer, PgArguments, PgTypeInfo};
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Encode, PgPool, Postgres, Sqlite, SqlitePool, Transaction, Type};

use crate::event::Value;

/// A connection source that can open transactions.
pub trait Driver: Send + Sync {
    type Tx: SqlTransaction;

    /// Opens a new transaction.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, sqlx::Error>> + Send;

    /// Releases the underlying connections.
    fn close(&self) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

/// An open transaction.
pub trait SqlTransaction: Send {
    /// Executes `sql` with `values` bound positionally; returns rows affected.
    fn execute(
        &mut self,
        sql: &str,
        values: &[Value],
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;

    fn commit(self) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    fn rollback(self) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

/// SQL NULL sent with an unspecified parameter type, so Postgres infers the
/// type from the target column instead of rejecting a TEXT-typed NULL.
#[derive(Debug, Clone, Copy)]
struct UntypedNull;

impl Type<Postgres> for UntypedNull {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_oid(Oid(0))
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}

impl Encode<'_, Postgres> for UntypedNull {
    fn encode_by_ref(&self, _buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        Ok(IsNull::Yes)
    }
}

/// Binds one [`Value`] onto a Postgres query.
///
/// Nested JSON goes over as `jsonb`, which also assigns into `json` and text
/// columns.
fn bind_postgres<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q Value,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Value::Null => query.bind(UntypedNull),
        Value::Bool(b) => query.bind(*b),
        Value::Int(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::Text(s) => query.bind(s.as_str()),
        Value::Timestamp(t) => query.bind::<DateTime<Utc>>(*t),
        Value::Json(j) => query.bind(j),
    }
}

/// Binds one [`Value`] onto a SQLite query. SQLite columns are dynamically
/// typed, so NULL needs no type and JSON is stored as its text.
fn bind_sqlite<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &'q Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Int(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::Text(s) => query.bind(s.as_str()),
        Value::Timestamp(t) => query.bind::<DateTime<Utc>>(*t),
        Value::Json(j) => query.bind(j.to_string()),
    }
}

macro_rules! impl_sqlx_driver {
    ($pool:ty, $db:ty, $bind:ident, $persistent:expr) => {
        impl Driver for $pool {
            type Tx = Transaction<'static, $db>;

            async fn begin(&self) -> Result<Self::Tx, sqlx::Error> {
                sqlx::Pool::<$db>::begin(self).await
            }

            async fn close(&self) -> Result<(), sqlx::Error> {
                sqlx::Pool::<$db>::close(self).await;
                Ok(())
            }
        }

        impl SqlTransaction for Transaction<'static, $db> {
            async fn execute(&mut self, sql: &str, values: &[Value]) -> Result<u64, sqlx::Error> {
                let mut query = sqlx::query::<$db>(sql).persistent($persistent);
                for value in values {
                    query = $bind(query, value);
                }
                let result = query.execute(&mut **self).await?;
                Ok(result.rows_affected())
            }

            async fn commit(self) -> Result<(), sqlx::Error> {
                Transaction::<'static, $db>::commit(self).await
            }

            async fn rollback(self) -> Result<(), sqlx::Error> {
                Transaction::<'static, $db>::rollback(self).await
            }
        }
    };
}

// Postgres fixes parameter types when a statement is prepared, and the same
// column list can carry different value types from record to record, so
// Postgres statements are not cached.
impl_sqlx_driver!(PgPool, Postgres, bind_postgres, false);
impl_sqlx_driver!(SqlitePool, Sqlite, bind_sqlite, true);

/// Backend chosen from the connection URI scheme.
#[derive(Debug, Clone)]
pub enum SqlDriver {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

/// Transaction of whichever backend [`SqlDriver`] wraps.
pub enum SqlDriverTx {
    Postgres(Transaction<'static, Postgres>),
    Sqlite(Transaction<'static, Sqlite>),
}

impl Driver for SqlDriver {
    type Tx = SqlDriverTx;

    async fn begin(&self) -> Result<SqlDriverTx, sqlx::Error> {
        match self {
            SqlDriver::Postgres(pool) => Driver::begin(pool).await.map(SqlDriverTx::Postgres),
            SqlDriver::Sqlite(pool) => Driver::begin(pool).await.map(SqlDriverTx::Sqlite),
        }
    }

    async fn close(&self) -> Result<(), sqlx::Error> {
        match self {
            SqlDriver::Postgres(pool) => Driver::close(pool).await,
            SqlDriver::Sqlite(pool) => Driver::close(pool).await,
        }
    }
}

impl SqlTransaction for SqlDriverTx {
    async fn execute(&mut self, sql: &str, values: &[Value]) -> Result<u64, sqlx::Error> {
        match self {
            SqlDriverTx::Postgres(tx) => SqlTransaction::execute(tx, sql, values).await,
            SqlDriverTx::Sqlite(tx) => SqlTransaction::execute(tx, sql, values).await,
        }
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        match self {
            SqlDriverTx::Postgres(tx) => SqlTransaction::commit(tx).await,
            SqlDriverTx::Sqlite(tx) => SqlTransaction::commit(tx).await,
        }
    }

    async fn rollback(self) -> Result<(), sqlx::Error> {
        match self {
            SqlDriverTx::Postgres(tx) => SqlTransaction::rollback(tx).await,
            SqlDriverTx::Sqlite(tx) => SqlTransaction::rollback(tx).await,
        }
    }
}
