//! Scripted [`QuerySession`] for unit tests.
//!
//! Results are queued ahead of time and handed out one per `query_all` call;
//! every statement is captured with its bound values.

use crate::error::FluentError;
use crate::row::Row;
use crate::session::{Backend, QuerySession};
use sea_query::Values;
use std::cell::RefCell;
use std::collections::VecDeque;

#[derive(Debug)]
enum MockResult {
    Rows(Vec<Row>),
    Error(String),
}

/// In-memory session returning queued results
///
/// Available to downstream crates with the `mock` feature.
///
/// ```ignore
/// use fluentguard::mock::MockSession;
/// use fluentguard::{Backend, QuerySession, Row};
/// use sea_query::Values;
///
/// let session = MockSession::new(Backend::Postgres)
///     .append_query_results([vec![Row::from_pairs([("id", 1i64.into())])]]);
/// let rows = session.query_all("SELECT id FROM t", &Values(Vec::new())).unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(session.statements(), vec!["SELECT id FROM t".to_string()]);
/// ```
#[derive(Debug)]
pub struct MockSession {
    backend: Backend,
    accepts_queries: bool,
    results: RefCell<VecDeque<MockResult>>,
    captured: RefCell<Vec<(String, Values)>>,
}

impl MockSession {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            accepts_queries: true,
            results: RefCell::new(VecDeque::new()),
            captured: RefCell::new(Vec::new()),
        }
    }

    /// A session that reports it cannot run queries
    pub fn refusing(backend: Backend) -> Self {
        Self {
            accepts_queries: false,
            ..Self::new(backend)
        }
    }

    /// Queue result sets, one per future `query_all` call
    #[must_use]
    pub fn append_query_results<I>(self, results: I) -> Self
    where
        I: IntoIterator<Item = Vec<Row>>,
    {
        self.results
            .borrow_mut()
            .extend(results.into_iter().map(MockResult::Rows));
        self
    }

    /// Queue a failure for the next `query_all` call
    #[must_use]
    pub fn append_query_error(self, message: &str) -> Self {
        self.results
            .borrow_mut()
            .push_back(MockResult::Error(message.to_string()));
        self
    }

    /// Every statement run so far
    pub fn statements(&self) -> Vec<String> {
        self.captured.borrow().iter().map(|(sql, _)| sql.clone()).collect()
    }

    /// Every statement run so far, with its bound values
    pub fn captured(&self) -> Vec<(String, Values)> {
        self.captured.borrow().clone()
    }

    /// Queued results not consumed yet
    pub fn pending_results(&self) -> usize {
        self.results.borrow().len()
    }

    fn capture(&self, sql: &str, values: &Values) {
        self.captured
            .borrow_mut()
            .push((sql.to_string(), values.clone()));
    }
}

impl QuerySession for MockSession {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn accepts_queries(&self) -> bool {
        self.accepts_queries
    }

    fn query_all(&self, sql: &str, values: &Values) -> Result<Vec<Row>, FluentError> {
        self.capture(sql, values);
        match self.results.borrow_mut().pop_front() {
            Some(MockResult::Rows(rows)) => Ok(rows),
            Some(MockResult::Error(message)) => Err(FluentError::QueryError(message)),
            None => Ok(Vec::new()),
        }
    }

    fn execute(&self, sql: &str, values: &Values) -> Result<u64, FluentError> {
        self.capture(sql, values);
        Ok(0)
    }
}
