//! Entity descriptors.
//!
//! An entity is a zero-sized marker type describing one mapped table: its
//! name, its columns in declaration order, its primary key and its named
//! relationships. The query builder only ever reads these descriptions.

mod column;
mod relation;

pub use column::{ColumnDef, ColumnPath, ColumnTrait, ColumnType};
pub use relation::{RelationDef, RelationKind};

use crate::error::FluentError;
use crate::row::Row;

/// Description of a mapped table
pub trait EntityTrait: Copy + Default + std::fmt::Debug + 'static {
    /// The model type rows of this table decode into
    type Model: FromRow;

    /// The column enum of this table
    type Column: ColumnTrait<Entity = Self>;

    /// Table name
    fn table_name(&self) -> &'static str;

    /// All columns in declaration order
    fn columns(&self) -> Vec<Self::Column>;

    /// Primary key column
    fn primary_key(&self) -> Self::Column;

    /// Declared relationships
    fn relations(&self) -> Vec<RelationDef> {
        Vec::new()
    }

    /// Look up a relationship by name
    fn relation(&self, name: &str) -> Option<RelationDef> {
        self.relations().into_iter().find(|r| r.name == name)
    }
}

/// Decoding of a model from a result row
///
/// Rows reaching `from_row` carry the entity's columns under their plain
/// names, already coerced to the declared [`ColumnType`].
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self, FluentError>;

    /// Attach one row of an eagerly joined relation.
    ///
    /// Called once per joined row for the model that survived
    /// de-duplication. `row` holds the related columns with the relation
    /// prefix removed. The default ignores related rows.
    fn attach_related(&mut self, relation: &str, row: &Row) -> Result<(), FluentError> {
        let _ = (relation, row);
        Ok(())
    }
}
