//! Transactions over any [`QuerySession`].
//!
//! A [`Transaction`] is itself a session, so builders bound to it run their
//! statements inside the transaction. Nested transactions use savepoints.

use super::{Backend, QuerySession};
use crate::error::FluentError;
use crate::row::Row;
use sea_query::Values;
use serde::Deserialize;
use std::cell::Cell;

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Transaction isolation level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    /// Read uncommitted (PostgreSQL treats it as read committed)
    ReadUncommitted,
    /// Read committed (default)
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn as_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }

    /// Statements that open a transaction at this level on `backend`
    fn begin_statements(&self, backend: Backend) -> Vec<String> {
        match backend {
            Backend::Postgres => vec![format!("BEGIN ISOLATION LEVEL {}", self.as_sql())],
            // SQLite transactions are always serializable
            Backend::Sqlite => vec!["BEGIN".to_string()],
            Backend::MySql => vec![
                format!("SET TRANSACTION ISOLATION LEVEL {}", self.as_sql()),
                "START TRANSACTION".to_string(),
            ],
        }
    }
}

/// A database transaction
///
/// Dropping an open transaction rolls it back.
///
/// ```no_run
/// use fluentguard::{FluentError, IsolationLevel, SqliteSession, Transaction};
///
/// # fn main() -> Result<(), FluentError> {
/// let session = SqliteSession::open_in_memory()?;
/// let tx = Transaction::begin(&session, IsolationLevel::Serializable)?;
/// // build and run queries against `&tx`
/// tx.commit()?;
/// # Ok(())
/// # }
/// ```
pub struct Transaction<'s> {
    session: &'s dyn QuerySession,
    depth: u32,
    closed: Cell<bool>,
}

impl<'s> Transaction<'s> {
    /// Start a transaction on `session`
    pub fn begin(
        session: &'s dyn QuerySession,
        isolation: IsolationLevel,
    ) -> Result<Self, FluentError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::begin_transaction_span(isolation.as_sql()).entered();

        if !session.accepts_queries() {
            return Err(FluentError::config(
                "cannot begin a transaction on a session that does not accept queries",
            ));
        }
        if let Some(depth) = session.transaction_depth() {
            log::debug!(
                "already inside a transaction; {} is inherited from the outer one",
                isolation.as_sql()
            );
            return Self::savepoint(session, depth + 1);
        }
        for statement in isolation.begin_statements(session.backend()) {
            session.execute(&statement, &Values(Vec::new()))?;
        }
        log::debug!("transaction started ({})", isolation.as_sql());
        Ok(Self {
            session,
            depth: 0,
            closed: Cell::new(false),
        })
    }

    /// Start a nested transaction backed by a savepoint
    pub fn begin_nested(&self) -> Result<Transaction<'_>, FluentError> {
        self.ensure_open()?;
        Transaction::savepoint(self, self.depth + 1)
    }

    fn savepoint(session: &'s dyn QuerySession, depth: u32) -> Result<Self, FluentError> {
        session.execute(&format!("SAVEPOINT sp_{depth}"), &Values(Vec::new()))?;
        Ok(Self {
            session,
            depth,
            closed: Cell::new(false),
        })
    }

    /// Commit; the transaction stops accepting queries afterwards
    pub fn commit(&self) -> Result<(), FluentError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::commit_transaction_span().entered();

        self.ensure_open()?;
        let sql = if self.depth == 0 {
            "COMMIT".to_string()
        } else {
            format!("RELEASE SAVEPOINT sp_{}", self.depth)
        };
        self.finish(&sql)
    }

    /// Roll back; the transaction stops accepting queries afterwards
    pub fn rollback(&self) -> Result<(), FluentError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::rollback_transaction_span().entered();

        self.ensure_open()?;
        let sql = self.rollback_sql();
        self.finish(&sql)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    fn rollback_sql(&self) -> String {
        if self.depth == 0 {
            "ROLLBACK".to_string()
        } else {
            format!("ROLLBACK TO SAVEPOINT sp_{}", self.depth)
        }
    }

    fn finish(&self, sql: &str) -> Result<(), FluentError> {
        // closed even when the statement fails; the driver state is unknown
        self.closed.set(true);
        self.session.execute(sql, &Values(Vec::new()))?;
        log::debug!("transaction finished with {sql}");
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), FluentError> {
        if self.closed.get() {
            return Err(FluentError::config(
                "transaction has already been committed or rolled back",
            ));
        }
        Ok(())
    }
}

impl QuerySession for Transaction<'_> {
    fn backend(&self) -> Backend {
        self.session.backend()
    }

    fn accepts_queries(&self) -> bool {
        !self.closed.get() && self.session.accepts_queries()
    }

    fn transaction_depth(&self) -> Option<u32> {
        (!self.closed.get()).then_some(self.depth)
    }

    fn query_all(&self, sql: &str, values: &Values) -> Result<Vec<Row>, FluentError> {
        self.ensure_open()?;
        self.session.query_all(sql, values)
    }

    fn execute(&self, sql: &str, values: &Values) -> Result<u64, FluentError> {
        self.ensure_open()?;
        self.session.execute(sql, values)
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.closed.get() {
            return;
        }
        log::warn!("transaction dropped without commit or rollback; rolling back");
        let sql = self.rollback_sql();
        self.closed.set(true);
        if let Err(err) = self.session.execute(&sql, &Values(Vec::new())) {
            log::warn!("rollback on drop failed: {err}");
        }
    }
}
