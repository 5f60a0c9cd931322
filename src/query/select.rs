//! The select builder and the state it accumulates.
//!
//! Configuration methods only record intent in [`SelectState`]; nothing
//! touches the database until a terminal method (see the `execution` and
//! `paginate` modules) compiles the state and hands it to the session.

use super::expr::{GroupKey, LoadHint, OrderTerm, SelectItem};
use crate::entity::EntityTrait;
use crate::error::FluentError;
use crate::session::QuerySession;
use sea_query::{Condition, IntoCondition};

/// Accumulated query-construction state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectState {
    pub(crate) projection: Vec<SelectItem>,
    pub(crate) filters: Vec<Condition>,
    pub(crate) group_by: Vec<GroupKey>,
    pub(crate) having: Vec<Condition>,
    pub(crate) order_by: Vec<OrderTerm>,
    pub(crate) offset: Option<u64>,
    pub(crate) limit: Option<u64>,
    pub(crate) load_hints: Vec<LoadHint>,
}

impl SelectState {
    pub fn projection(&self) -> &[SelectItem] {
        &self.projection
    }

    pub fn filters(&self) -> &[Condition] {
        &self.filters
    }

    pub fn group_by(&self) -> &[GroupKey] {
        &self.group_by
    }

    pub fn having(&self) -> &[Condition] {
        &self.having
    }

    pub fn order_by(&self) -> &[OrderTerm] {
        &self.order_by
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn load_hints(&self) -> &[LoadHint] {
        &self.load_hints
    }

    /// Whether the projection names explicit columns or labels instead of whole entities
    pub fn is_specific_fields(&self) -> bool {
        self.projection.iter().any(|item| !item.is_entity())
    }
}

/// Chainable SELECT builder bound to a session and a target entity
///
/// ```no_run
/// # use fluentguard::{ColumnTrait, EntityTrait, FluentError, SelectBuilder, SqliteSession};
/// # fn run<E: EntityTrait>(entity: E, name: E::Column) -> Result<(), FluentError> {
/// let session = SqliteSession::open_in_memory()?;
/// let first = SelectBuilder::new(&session, entity)?
///     .filter(name.like("A%"))
///     .order_by(name.asc())
///     .first()?;
/// # Ok(())
/// # }
/// ```
pub struct SelectBuilder<'s, E: EntityTrait> {
    pub(crate) session: &'s dyn QuerySession,
    pub(crate) entity: E,
    pub(crate) state: SelectState,
}

impl<'s, E: EntityTrait> SelectBuilder<'s, E> {
    /// Bind a new builder to `session`
    ///
    /// Fails with a configuration error when the session cannot run queries,
    /// e.g. a transaction that was already committed.
    pub fn new(session: &'s dyn QuerySession, entity: E) -> Result<Self, FluentError> {
        if !session.accepts_queries() {
            return Err(FluentError::config(format!(
                "session cannot execute queries for '{}'",
                entity.table_name()
            )));
        }
        Ok(Self {
            session,
            entity,
            state: SelectState::default(),
        })
    }

    /// Replace the projection
    ///
    /// An empty list, or only [`SelectItem::entity`], selects every column of
    /// the entity. Explicit columns or labels switch to specific-fields mode.
    pub fn select<I, T>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<SelectItem>,
    {
        self.state.projection = items.into_iter().map(Into::into).collect();
        self
    }

    /// Select every column of the entity
    pub fn select_all(mut self) -> Self {
        self.state.projection.clear();
        self
    }

    /// Add a WHERE predicate; predicates are AND-combined in call order
    pub fn filter<F: IntoCondition>(mut self, condition: F) -> Self {
        self.state.filters.push(condition.into_condition());
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.state.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.state.limit = Some(limit);
        self
    }

    /// Add a grouping key: a column, a labeled expression or an output column name
    ///
    /// Call once per key; keys are grouped in call order.
    pub fn group_by<K: Into<GroupKey>>(mut self, key: K) -> Self {
        self.state.group_by.push(key.into());
        self
    }

    /// Add a HAVING predicate; does not imply a GROUP BY clause
    pub fn having<F: IntoCondition>(mut self, condition: F) -> Self {
        self.state.having.push(condition.into_condition());
        self
    }

    /// Add an ordering term; call once per term, earlier terms sort first
    pub fn order_by<T: Into<OrderTerm>>(mut self, term: T) -> Self {
        self.state.order_by.push(term.into());
        self
    }

    /// Add an eager-load hint; call once per relation, repeats are ignored
    pub fn options(mut self, hint: LoadHint) -> Self {
        self.state.load_hints.push(hint);
        self
    }

    /// The target entity
    pub fn entity(&self) -> E {
        self.entity
    }

    pub fn state(&self) -> &SelectState {
        &self.state
    }
}
