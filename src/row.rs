//! Backend-neutral result rows.
//!
//! Every session decodes its driver rows into [`Row`]: an ordered list of
//! output column names paired with `sea_query::Value`s. Rows coming from the
//! same statement share one column list.

use crate::error::FluentError;
use crate::value::{is_null, TryGetable};
use sea_query::Value;
use std::sync::Arc;

/// Separator between a relation name and a column name in joined output columns
pub const RELATION_SEPARATOR: &str = "__";

/// One row of a result set
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row; `values` must line up with `columns`
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Result<Self, FluentError> {
        if columns.len() != values.len() {
            return Err(FluentError::ParseError(format!(
                "row has {} values for {} columns",
                values.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, values })
    }

    /// Build a row from `(column, value)` pairs
    ///
    /// ```
    /// use fluentguard::Row;
    ///
    /// let row = Row::from_pairs([("id", 1i64.into()), ("name", "Ada".into())]);
    /// assert_eq!(row.try_get::<String>("name").unwrap(), "Ada");
    /// ```
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) =
            pairs.into_iter().map(|(c, v)| (c.into(), v)).unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    /// Output column names in select order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in select order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Position of an output column
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Raw value of an output column
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.index_of(column).map(|idx| &self.values[idx])
    }

    /// Raw value by position
    pub fn get_at(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Typed value of an output column
    pub fn try_get<T: TryGetable>(&self, column: &str) -> Result<T, FluentError> {
        let value = self
            .get(column)
            .ok_or_else(|| FluentError::ParseError(format!("column '{column}' not in row")))?;
        T::try_get(value)
            .map_err(|e| FluentError::ParseError(format!("column '{column}': {e}")))
    }

    /// Typed value by position
    pub fn try_get_at<T: TryGetable>(&self, idx: usize) -> Result<T, FluentError> {
        let value = self
            .get_at(idx)
            .ok_or_else(|| FluentError::ParseError(format!("column index {idx} out of range")))?;
        T::try_get(value).map_err(|e| FluentError::ParseError(format!("column {idx}: {e}")))
    }

    pub(crate) fn values_mut(&mut self) -> &mut [Value] {
        &mut self.values
    }

    pub(crate) fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// The columns a joined relation contributed to this row, with the
    /// `relation__` prefix stripped.
    ///
    /// Returns `None` when the relation has no columns in the row or when all of
    /// them are NULL (a LEFT JOIN that matched nothing).
    pub fn nested(&self, relation: &str) -> Option<Row> {
        let prefix = format!("{relation}{RELATION_SEPARATOR}");
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for (column, value) in self.columns.iter().zip(&self.values) {
            if let Some(stripped) = column.strip_prefix(&prefix) {
                columns.push(stripped.to_string());
                values.push(value.clone());
            }
        }
        if values.is_empty() || values.iter().all(is_null) {
            return None;
        }
        Some(Row {
            columns: columns.into(),
            values,
        })
    }
}
