//! Shaping raw rows into models or field records.

use super::compile::CompiledSelect;
use crate::entity::{ColumnType, FromRow, RelationDef};
use crate::error::FluentError;
use crate::row::Row;
use crate::value::{identity_key, TryGetable};
use sea_query::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;

/// The closed set of fields a specific-fields query returns
///
/// Shared by every record of one result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet(Arc<[String]>);

impl FieldSet {
    pub(crate) fn new(names: Vec<String>) -> Self {
        Self(names.into())
    }

    /// Field names in select order
    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.0.iter().position(|name| name == field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read-only record of a specific-fields projection
///
/// Only the selected fields can be read; any other name fails with
/// [`FluentError::AttributeNotLoaded`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRecord {
    fields: FieldSet,
    values: Vec<Value>,
}

impl FieldRecord {
    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Raw value of a selected field
    pub fn get(&self, field: &str) -> Result<&Value, FluentError> {
        self.fields
            .position(field)
            .map(|idx| &self.values[idx])
            .ok_or_else(|| FluentError::AttributeNotLoaded {
                field: field.to_string(),
                selected: self.fields.names().to_vec(),
            })
    }

    /// Typed value of a selected field
    pub fn try_get<T: TryGetable>(&self, field: &str) -> Result<T, FluentError> {
        let value = self.get(field)?;
        T::try_get(value).map_err(|e| FluentError::ParseError(format!("field '{field}': {e}")))
    }
}

/// Everything needed to turn the rows of one compiled statement into results
#[derive(Debug, Clone)]
pub(crate) struct Shape {
    pub field_set: Option<FieldSet>,
    pub coercions: Vec<(String, ColumnType)>,
    pub primary_key: &'static str,
    pub relations: Vec<RelationDef>,
}

impl Shape {
    pub fn of(compiled: &CompiledSelect) -> Self {
        Self {
            field_set: compiled.field_set.clone(),
            coercions: compiled.coercions.clone(),
            primary_key: compiled.primary_key,
            relations: compiled.relations.clone(),
        }
    }

    pub fn is_specific_fields(&self) -> bool {
        self.field_set.is_some()
    }

    pub fn joined_many(&self) -> bool {
        self.relations.iter().any(|r| r.kind.is_to_many())
    }

    /// Normalize target-entity columns to their declared types
    fn coerce(&self, row: &mut Row) {
        for (name, column_type) in &self.coercions {
            if let Some(idx) = row.index_of(name) {
                let slot = &mut row.values_mut()[idx];
                let raw = std::mem::replace(slot, Value::Bool(None));
                *slot = column_type.coerce(raw);
            }
        }
    }

    /// Decode one model per row, or one per distinct primary key when `dedup`
    /// is set. The first occurrence of a key wins and keeps its position;
    /// joined related rows are attached to the surviving model.
    pub fn models<M: FromRow>(&self, rows: Vec<Row>, dedup: bool) -> Result<Vec<M>, FluentError> {
        let mut models: Vec<M> = Vec::with_capacity(rows.len());
        let mut seen: HashMap<String, usize> = HashMap::new();
        let row_count = rows.len();

        for mut row in rows {
            self.coerce(&mut row);
            let existing = if dedup {
                let key = row.get(self.primary_key).map(identity_key).ok_or_else(|| {
                    FluentError::ParseError(format!(
                        "primary key column '{}' missing from row",
                        self.primary_key
                    ))
                })?;
                match seen.get(&key) {
                    Some(&idx) => Some(idx),
                    None => {
                        seen.insert(key, models.len());
                        None
                    }
                }
            } else {
                None
            };

            let idx = match existing {
                Some(idx) => idx,
                None => {
                    models.push(M::from_row(&row)?);
                    models.len() - 1
                }
            };
            for relation in &self.relations {
                if let Some(related) = row.nested(relation.name) {
                    models[idx].attach_related(relation.name, &related)?;
                }
            }
        }

        log::debug!("materialized {} models from {row_count} rows", models.len());
        #[cfg(feature = "metrics")]
        METRICS.record_rows(row_count);
        Ok(models)
    }

    /// One record per row, exposing exactly the output columns
    pub fn records(&self, rows: Vec<Row>) -> Result<Vec<FieldRecord>, FluentError> {
        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };
        let fields = match &self.field_set {
            Some(fields) => fields.clone(),
            None => FieldSet::new(first.columns().to_vec()),
        };
        let row_count = rows.len();

        let records = rows
            .into_iter()
            .map(|mut row| {
                if row.len() != fields.len() {
                    return Err(FluentError::ParseError(format!(
                        "row has {} columns, projection selects {}",
                        row.len(),
                        fields.len()
                    )));
                }
                self.coerce(&mut row);
                Ok(FieldRecord {
                    fields: fields.clone(),
                    values: row.into_values(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        #[cfg(feature = "metrics")]
        METRICS.record_rows(row_count);
        log::debug!("materialized {row_count} field records");
        Ok(records)
    }
}
