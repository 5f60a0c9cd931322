//! Query sessions: the executable query interface the builder runs against.
//!
//! A session receives SQL already rendered for its [`Backend`] together with
//! the bound `sea_query::Values`, and returns backend-neutral [`Row`]s.

mod postgres;
#[cfg(feature = "sqlite")]
mod sqlite;
mod transaction;

pub use postgres::{connect, validate_connection_string, ConnectionError, MayPostgresSession};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSession;
pub use transaction::{IsolationLevel, Transaction};

use crate::config::DatabaseConfig;
use crate::error::FluentError;
use crate::row::Row;
use sea_query::{
    MysqlQueryBuilder, PostgresQueryBuilder, SelectStatement, SqliteQueryBuilder, Values,
};

/// SQL dialect spoken by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Postgres,
    Sqlite,
    MySql,
}

impl Backend {
    /// Guess the backend from a connection URL
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("host=")
        {
            Some(Backend::Postgres)
        } else if url.starts_with("sqlite:") || url == ":memory:" || url.ends_with(".db") {
            Some(Backend::Sqlite)
        } else if url.starts_with("mysql://") {
            Some(Backend::MySql)
        } else {
            None
        }
    }

    /// Render a statement with placeholders for this dialect
    pub fn build(self, statement: &SelectStatement) -> (String, Values) {
        match self {
            Backend::Postgres => statement.build(PostgresQueryBuilder),
            Backend::Sqlite => statement.build(SqliteQueryBuilder),
            Backend::MySql => statement.build(MysqlQueryBuilder),
        }
    }

    /// Render a statement with values inlined, for logging and debugging
    pub fn inline(self, statement: &SelectStatement) -> String {
        match self {
            Backend::Postgres => statement.to_string(PostgresQueryBuilder),
            Backend::Sqlite => statement.to_string(SqliteQueryBuilder),
            Backend::MySql => statement.to_string(MysqlQueryBuilder),
        }
    }
}

/// Open a session for `config.url`, picking the backend from the URL
///
/// No session exists for MySQL; those URLs are rejected.
pub fn open_session(config: &DatabaseConfig) -> Result<Box<dyn QuerySession>, FluentError> {
    match Backend::from_url(&config.url) {
        Some(Backend::Postgres) => Ok(Box::new(MayPostgresSession::connect_with(config)?)),
        #[cfg(feature = "sqlite")]
        Some(Backend::Sqlite) => Ok(Box::new(SqliteSession::open_with(config)?)),
        Some(backend) => Err(FluentError::config(format!(
            "no session is available for {backend:?} urls"
        ))),
        None => Err(FluentError::config(
            "cannot tell the backend from the database url",
        )),
    }
}

/// Executable query interface
///
/// Implementations must be usable through `&dyn QuerySession`; builders
/// borrow a session for their whole lifetime and never store it elsewhere.
pub trait QuerySession {
    /// Dialect the session expects statements in
    fn backend(&self) -> Backend;

    /// Whether the session can run statements right now
    fn accepts_queries(&self) -> bool {
        true
    }

    /// Savepoint depth when the session is itself an open transaction
    fn transaction_depth(&self) -> Option<u32> {
        None
    }

    /// Run a statement and collect every row
    fn query_all(&self, sql: &str, values: &Values) -> Result<Vec<Row>, FluentError>;

    /// Run a statement that returns no rows, returning the affected row count
    fn execute(&self, sql: &str, values: &Values) -> Result<u64, FluentError>;
}
