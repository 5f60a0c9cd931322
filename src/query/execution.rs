//! Terminal operations of [`SelectBuilder`] and the raw [`ResultSet`].

use super::compile::{compile, compile_count, CompiledSelect, COUNT_ALIAS};
use super::materialize::{FieldRecord, Shape};
use super::select::{SelectBuilder, SelectState};
use crate::entity::{EntityTrait, FromRow};
use crate::error::FluentError;
use crate::row::Row;
use crate::session::QuerySession;
use crate::value::TryGetable;
use sea_query::SelectStatement;

/// Rows returned by [`SelectBuilder::execute`]
#[derive(Debug, Clone)]
pub struct ResultSet {
    rows: Vec<Row>,
    shape: Shape,
    unique: bool,
}

impl ResultSet {
    /// Mark the rows for de-duplication by primary key when materialized
    ///
    /// Required before [`ResultSet::models`] when a one-to-many relation was
    /// joined, since each entity then spans several rows.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First column of the first row; `None` when there are no rows
    pub fn scalar<T: TryGetable>(&self) -> Result<Option<T>, FluentError> {
        self.rows.first().map(|row| row.try_get_at(0)).transpose()
    }

    /// First column of every row
    pub fn scalars<T: TryGetable>(&self) -> Result<Vec<T>, FluentError> {
        self.rows.iter().map(|row| row.try_get_at(0)).collect()
    }

    /// Decode models, one per row or one per entity after [`ResultSet::unique`]
    pub fn models<M: FromRow>(self) -> Result<Vec<M>, FluentError> {
        if self.shape.is_specific_fields() {
            return Err(FluentError::config(
                "models cannot be decoded from a specific-fields projection; use records()",
            ));
        }
        if self.shape.joined_many() && !self.unique {
            return Err(FluentError::AmbiguousResult(
                "a one-to-many relation was joined; call unique() to collapse rows per entity"
                    .to_string(),
            ));
        }
        self.shape.models(self.rows, self.unique)
    }

    /// One [`FieldRecord`] per row exposing the output columns
    pub fn records(self) -> Result<Vec<FieldRecord>, FluentError> {
        self.shape.records(self.rows)
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

pub(crate) fn fetch(
    session: &dyn QuerySession,
    statement: &SelectStatement,
) -> Result<Vec<Row>, FluentError> {
    let (sql, values) = session.backend().build(statement);
    log::debug!("executing select ({} params): {sql}", values.0.len());
    let rows = session.query_all(&sql, &values)?;
    log::debug!("select returned {} rows", rows.len());
    Ok(rows)
}

pub(crate) fn count_with<E: EntityTrait>(
    session: &dyn QuerySession,
    entity: E,
    state: &SelectState,
) -> Result<u64, FluentError> {
    let statement = compile_count(entity, state)?;
    let rows = fetch(session, &statement)?;
    match rows.first() {
        Some(row) => row.try_get::<u64>(COUNT_ALIAS),
        None => Ok(0),
    }
}

impl<'s, E: EntityTrait> SelectBuilder<'s, E> {
    /// Compile and run the query, returning the raw rows
    pub fn execute(&self) -> Result<ResultSet, FluentError> {
        let compiled = compile(self.entity, &self.state)?;
        let rows = fetch(self.session, &compiled.statement)?;
        Ok(ResultSet {
            rows,
            shape: Shape::of(&compiled),
            unique: false,
        })
    }

    /// Materialize every matching entity
    ///
    /// With joined eager loads, rows are collapsed to one model per primary
    /// key, keeping the first occurrence and its position.
    pub fn get(&self) -> Result<Vec<E::Model>, FluentError> {
        self.ensure_full_entity("get")?;
        let compiled = compile(self.entity, &self.state)?;
        self.models(&compiled)
    }

    /// Materialize every matching row as a record of the selected fields
    pub fn get_fields(&self) -> Result<Vec<FieldRecord>, FluentError> {
        let compiled = compile(self.entity, &self.state)?;
        let rows = fetch(self.session, &compiled.statement)?;
        Shape::of(&compiled).records(rows)
    }

    /// The first matching entity
    ///
    /// Runs with `LIMIT 1` for this call only; the builder keeps its own limit.
    pub fn first(&self) -> Result<Option<E::Model>, FluentError> {
        self.ensure_full_entity("first")?;
        let compiled = compile(self.entity, &self.first_state())?;
        Ok(self.models(&compiled)?.into_iter().next())
    }

    /// The first matching row as a record of the selected fields
    pub fn first_fields(&self) -> Result<Option<FieldRecord>, FluentError> {
        let compiled = compile(self.entity, &self.first_state())?;
        let rows = fetch(self.session, &compiled.statement)?;
        Ok(Shape::of(&compiled).records(rows)?.into_iter().next())
    }

    /// Number of entities the query matches, ignoring order, offset and limit
    ///
    /// An entity joined to several related rows is counted once.
    pub fn count(&self) -> Result<u64, FluentError> {
        count_with(self.session, self.entity, &self.state)
    }

    /// The compiled statement with values inlined, in the session's dialect
    pub fn to_sql(&self) -> Result<String, FluentError> {
        let compiled = compile(self.entity, &self.state)?;
        Ok(self.session.backend().inline(&compiled.statement))
    }

    pub(crate) fn ensure_full_entity(&self, operation: &str) -> Result<(), FluentError> {
        if self.state.is_specific_fields() {
            return Err(FluentError::config(format!(
                "{operation}() materializes whole entities but specific fields were selected"
            )));
        }
        Ok(())
    }

    pub(crate) fn models_with(
        &self,
        session: &dyn QuerySession,
        compiled: &CompiledSelect,
    ) -> Result<Vec<E::Model>, FluentError> {
        let rows = fetch(session, &compiled.statement)?;
        let shape = Shape::of(compiled);
        let dedup = !shape.relations.is_empty();
        shape.models(rows, dedup)
    }

    fn models(&self, compiled: &CompiledSelect) -> Result<Vec<E::Model>, FluentError> {
        self.models_with(self.session, compiled)
    }

    fn first_state(&self) -> SelectState {
        SelectState {
            limit: Some(1),
            ..self.state.clone()
        }
    }
}
