//! Error type shared by the builder, the materializer and the sessions.
//!
//! Configuration mistakes are reported as soon as they can be detected
//! (construction or compilation). Errors raised by the database layer are
//! carried unchanged so callers can inspect the driver error directly.

use crate::value::ValueExtractionError;
use may_postgres::Error as PostgresError;
use std::fmt;

/// Error type for every fallible fluentguard operation
#[derive(Debug)]
pub enum FluentError {
    /// The builder was configured in a way that cannot produce a valid query
    ConfigurationError(String),
    /// A field outside of a specific-fields projection was read
    AttributeNotLoaded {
        /// The field that was requested
        field: String,
        /// The fields the projection actually carries
        selected: Vec<String>,
    },
    /// Joined one-to-many rows were materialized without de-duplication
    AmbiguousResult(String),
    /// `PostgreSQL` error from `may_postgres`
    PostgresError(PostgresError),
    /// `SQLite` error from `rusqlite`
    #[cfg(feature = "sqlite")]
    SqliteError(rusqlite::Error),
    /// Query execution error reported by a session
    QueryError(String),
    /// Row parsing/conversion error
    ParseError(String),
    /// Other errors
    Other(String),
}

impl FluentError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        FluentError::ConfigurationError(msg.into())
    }

    /// Whether this error was raised by the builder configuration rather than the database
    pub fn is_configuration(&self) -> bool {
        matches!(self, FluentError::ConfigurationError(_))
    }
}

impl fmt::Display for FluentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FluentError::ConfigurationError(s) => write!(f, "Configuration error: {s}"),
            FluentError::AttributeNotLoaded { field, selected } => write!(
                f,
                "Attribute '{field}' was not loaded; selected fields are [{}]",
                selected.join(", ")
            ),
            FluentError::AmbiguousResult(s) => write!(f, "Ambiguous result: {s}"),
            FluentError::PostgresError(e) => write!(f, "PostgreSQL error: {e}"),
            #[cfg(feature = "sqlite")]
            FluentError::SqliteError(e) => write!(f, "SQLite error: {e}"),
            FluentError::QueryError(s) => write!(f, "Query error: {s}"),
            FluentError::ParseError(s) => write!(f, "Parse error: {s}"),
            FluentError::Other(s) => write!(f, "Execution error: {s}"),
        }
    }
}

impl std::error::Error for FluentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FluentError::PostgresError(e) => Some(e),
            #[cfg(feature = "sqlite")]
            FluentError::SqliteError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PostgresError> for FluentError {
    fn from(err: PostgresError) -> Self {
        FluentError::PostgresError(err)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for FluentError {
    fn from(err: rusqlite::Error) -> Self {
        FluentError::SqliteError(err)
    }
}

impl From<ValueExtractionError> for FluentError {
    fn from(err: ValueExtractionError) -> Self {
        FluentError::ParseError(err.to_string())
    }
}
