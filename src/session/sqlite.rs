//! SQLite session over `rusqlite`.

use super::{Backend, QuerySession};
use crate::config::DatabaseConfig;
use crate::error::FluentError;
use crate::row::Row;
use chrono::NaiveDateTime;
use rusqlite::types::{Value as SqliteValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use sea_query::{Value, Values};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Text layout timestamps are stored in
const TIMESTAMP_STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// [`QuerySession`] backed by a `rusqlite::Connection`
#[derive(Debug)]
pub struct SqliteSession {
    conn: Connection,
}

impl SqliteSession {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open_in_memory() -> Result<Self, FluentError> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FluentError> {
        Ok(Self::new(Connection::open(path)?))
    }

    /// Open the database named by `config.url`: `:memory:`, `sqlite::memory:`,
    /// `sqlite://path`, `sqlite:path` or a bare path.
    pub fn open_with(config: &DatabaseConfig) -> Result<Self, FluentError> {
        let url = config.url.as_str();
        if url == ":memory:" || url == "sqlite::memory:" {
            return Self::open_in_memory();
        }
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);
        if path.is_empty() {
            return Err(FluentError::config("sqlite url names no database file"));
        }
        Self::open(path)
    }

    /// Run several `;`-separated statements, e.g. schema setup
    pub fn execute_batch(&self, sql: &str) -> Result<(), FluentError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn record<T>(
        &self,
        sql: &str,
        run: impl FnOnce() -> Result<T, FluentError>,
    ) -> Result<T, FluentError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(sql).entered();

        let start = Instant::now();
        let result = run();
        let elapsed = start.elapsed();
        log::debug!("sqlite statement took {elapsed:?}: {sql}");

        #[cfg(feature = "metrics")]
        {
            METRICS.record_query(elapsed);
            if result.is_err() {
                METRICS.record_error();
            }
        }

        result
    }
}

impl QuerySession for SqliteSession {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    fn query_all(&self, sql: &str, values: &Values) -> Result<Vec<Row>, FluentError> {
        self.record(sql, || {
            let params = bind_values(values)?;
            let mut stmt = self.conn.prepare(sql)?;
            let columns: Arc<[String]> = stmt
                .column_names()
                .into_iter()
                .map(str::to_string)
                .collect();
            let mut rows = stmt.query(params_from_iter(params))?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                let mut decoded = Vec::with_capacity(columns.len());
                for idx in 0..columns.len() {
                    decoded.push(decode_value(row.get_ref(idx)?)?);
                }
                out.push(Row::new(Arc::clone(&columns), decoded)?);
            }
            Ok(out)
        })
    }

    fn execute(&self, sql: &str, values: &Values) -> Result<u64, FluentError> {
        self.record(sql, || {
            let params = bind_values(values)?;
            let affected = self.conn.execute(sql, params_from_iter(params))?;
            Ok(affected as u64)
        })
    }
}

fn bind_values(values: &Values) -> Result<Vec<SqliteValue>, FluentError> {
    values.iter().map(bind_value).collect()
}

fn bind_value(value: &Value) -> Result<SqliteValue, FluentError> {
    if crate::value::is_null(value) {
        return Ok(SqliteValue::Null);
    }
    let bound = match value {
        Value::Bool(Some(b)) => SqliteValue::Integer(i64::from(*b)),
        Value::TinyInt(Some(i)) => SqliteValue::Integer(i64::from(*i)),
        Value::SmallInt(Some(i)) => SqliteValue::Integer(i64::from(*i)),
        Value::Int(Some(i)) => SqliteValue::Integer(i64::from(*i)),
        Value::BigInt(Some(i)) => SqliteValue::Integer(*i),
        Value::TinyUnsigned(Some(u)) => SqliteValue::Integer(i64::from(*u)),
        Value::SmallUnsigned(Some(u)) => SqliteValue::Integer(i64::from(*u)),
        Value::Unsigned(Some(u)) => SqliteValue::Integer(i64::from(*u)),
        Value::BigUnsigned(Some(u)) => SqliteValue::Integer(i64::try_from(*u).map_err(|_| {
            FluentError::Other(format!("BigUnsigned value {u} exceeds i64::MAX and cannot be bound"))
        })?),
        Value::Float(Some(f)) => SqliteValue::Real(f64::from(*f)),
        Value::Double(Some(d)) => SqliteValue::Real(*d),
        Value::String(Some(s)) => SqliteValue::Text(s.to_string()),
        Value::Char(Some(c)) => SqliteValue::Text(c.to_string()),
        Value::Bytes(Some(b)) => SqliteValue::Blob(b.to_vec()),
        Value::ChronoDateTime(Some(dt)) => {
            let dt: &NaiveDateTime = dt;
            SqliteValue::Text(dt.format(TIMESTAMP_STORAGE_FORMAT).to_string())
        }
        Value::Json(Some(j)) => {
            let j: &serde_json::Value = j;
            SqliteValue::Text(j.to_string())
        }
        other => {
            return Err(FluentError::Other(format!(
                "Unsupported value type in query: {other:?}"
            )))
        }
    };
    Ok(bound)
}

fn decode_value(value: ValueRef<'_>) -> Result<Value, FluentError> {
    Ok(match value {
        ValueRef::Null => Value::String(None),
        ValueRef::Integer(i) => Value::BigInt(Some(i)),
        ValueRef::Real(f) => Value::Double(Some(f)),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| FluentError::ParseError(format!("invalid UTF-8 in text column: {e}")))?;
            Value::from(text)
        }
        ValueRef::Blob(bytes) => Value::from(bytes.to_vec()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TryGetable;

    fn session() -> SqliteSession {
        let session = SqliteSession::open_in_memory().unwrap();
        session
            .execute_batch(
                "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT, done BOOLEAN, at TIMESTAMP);",
            )
            .unwrap();
        session
    }

    #[test]
    fn test_execute_and_query_round_trip() {
        let session = session();
        let at = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(8, 30, 0))
            .unwrap();
        let inserted = session
            .execute(
                "INSERT INTO notes (id, body, done, at) VALUES (?, ?, ?, ?)",
                &Values(vec![Value::from(1i32), Value::from("hello"), Value::from(true), Value::from(at)]),
            )
            .unwrap();
        assert_eq!(inserted, 1);

        let rows = session
            .query_all("SELECT id, body, done, at FROM notes", &Values(Vec::new()))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].columns(), &["id", "body", "done", "at"].map(String::from));
        assert_eq!(rows[0].try_get::<i32>("id").unwrap(), 1);
        assert!(rows[0].try_get::<bool>("done").unwrap());
        assert_eq!(NaiveDateTime::try_get(rows[0].get("at").unwrap()).unwrap(), at);
    }

    #[test]
    fn test_nulls_decode_as_null() {
        let session = session();
        session
            .execute("INSERT INTO notes (id) VALUES (?)", &Values(vec![Value::from(2i64)]))
            .unwrap();
        let rows = session
            .query_all("SELECT body FROM notes", &Values(Vec::new()))
            .unwrap();
        assert_eq!(rows[0].try_get::<Option<String>>("body").unwrap(), None);
    }

    #[test]
    fn test_driver_error_is_propagated() {
        let session = session();
        let err = session
            .query_all("SELECT nope FROM missing", &Values(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, FluentError::SqliteError(_)));
    }

    #[test]
    fn test_open_with_memory_url() {
        let config = DatabaseConfig {
            url: ":memory:".to_string(),
        };
        assert!(SqliteSession::open_with(&config).is_ok());
        let empty = DatabaseConfig {
            url: "sqlite://".to_string(),
        };
        assert!(SqliteSession::open_with(&empty).unwrap_err().is_configuration());
    }
}
