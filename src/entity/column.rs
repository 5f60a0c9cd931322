//! Column descriptors and type-safe column operations.

use super::EntityTrait;
use crate::query::expr::{Labeled, OrderTerm};
use crate::value::parse_timestamp;
use sea_query::{Alias, Expr, ExprTrait, Order, Value};

/// Declared storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Boolean,
    Integer,
    BigInteger,
    Double,
    Text,
    Binary,
    Timestamp,
    Json,
}

impl ColumnType {
    /// Normalize a decoded value to this column type.
    ///
    /// Nulls become typed nulls and storage-class differences are folded
    /// (integer booleans, textual timestamps). Values that cannot be converted
    /// are returned unchanged so the model decoder reports the mismatch.
    pub fn coerce(self, value: Value) -> Value {
        if crate::value::is_null(&value) {
            return self.null();
        }
        match (self, value) {
            (ColumnType::Boolean, Value::BigInt(Some(i))) if i == 0 || i == 1 => {
                Value::from(i == 1)
            }
            (ColumnType::Boolean, Value::Int(Some(i))) if i == 0 || i == 1 => Value::from(i == 1),
            (ColumnType::Integer, Value::BigInt(Some(i))) => match i32::try_from(i) {
                Ok(narrow) => Value::from(narrow),
                Err(_) => Value::BigInt(Some(i)),
            },
            (ColumnType::BigInteger, Value::Int(Some(i))) => Value::from(i64::from(i)),
            (ColumnType::Double, Value::Float(Some(f))) => Value::from(f64::from(f)),
            #[allow(clippy::cast_precision_loss)]
            (ColumnType::Double, Value::BigInt(Some(i))) => Value::from(i as f64),
            (ColumnType::Timestamp, Value::String(Some(s))) => match parse_timestamp(&s) {
                Some(dt) => Value::from(dt),
                None => Value::String(Some(s)),
            },
            (ColumnType::Json, Value::String(Some(s))) => {
                match serde_json::from_str::<serde_json::Value>(&s) {
                    Ok(json) => Value::from(json),
                    Err(_) => Value::String(Some(s)),
                }
            }
            (_, other) => other,
        }
    }

    /// Typed NULL for this column type
    pub fn null(self) -> Value {
        match self {
            ColumnType::Boolean => Value::Bool(None),
            ColumnType::Integer => Value::Int(None),
            ColumnType::BigInteger => Value::BigInt(None),
            ColumnType::Double => Value::Double(None),
            ColumnType::Text => Value::String(None),
            ColumnType::Binary => Value::Bytes(None),
            ColumnType::Timestamp => Value::ChronoDateTime(None),
            ColumnType::Json => Value::Json(None),
        }
    }
}

/// Column metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub nullable: bool,
}

impl ColumnDef {
    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullable: false,
        }
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Table-qualified column reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnPath {
    pub table: &'static str,
    pub name: &'static str,
}

impl ColumnPath {
    pub const fn new(table: &'static str, name: &'static str) -> Self {
        Self { table, name }
    }

    /// `"table"."column"`
    pub fn expr(&self) -> Expr {
        Expr::col((Alias::new(self.table), Alias::new(self.name)))
    }
}

/// Trait for type-safe column operations
///
/// Implemented by the column enum of each entity. All expressions produced
/// here are qualified with the entity's table name.
///
/// ```ignore
/// use fluentguard::ColumnTrait;
///
/// let filter = UserColumn::Email.eq("ada@example.com");
/// let newest_first = UserColumn::CreatedAt.desc();
/// ```
pub trait ColumnTrait: Copy + std::fmt::Debug + 'static {
    /// The entity this column belongs to
    type Entity: EntityTrait;

    /// Column metadata; `name` must be the database column name
    fn def(&self) -> ColumnDef;

    fn name(&self) -> &'static str {
        self.def().name
    }

    fn path(&self) -> ColumnPath {
        ColumnPath::new(Self::Entity::default().table_name(), self.name())
    }

    /// Qualified column expression
    fn expr(self) -> Expr {
        self.path().expr()
    }

    /// Create an equality filter: `column = value`
    fn eq<T: Into<Value>>(self, value: T) -> Expr {
        self.expr().eq(value)
    }

    /// Create a not-equal filter: `column <> value`
    fn ne<T: Into<Value>>(self, value: T) -> Expr {
        self.expr().ne(value)
    }

    /// Create a greater-than filter: `column > value`
    fn gt<T: Into<Value>>(self, value: T) -> Expr {
        self.expr().gt(value)
    }

    /// Create a greater-than-or-equal filter: `column >= value`
    fn gte<T: Into<Value>>(self, value: T) -> Expr {
        self.expr().gte(value)
    }

    /// Create a less-than filter: `column < value`
    fn lt<T: Into<Value>>(self, value: T) -> Expr {
        self.expr().lt(value)
    }

    /// Create a less-than-or-equal filter: `column <= value`
    fn lte<T: Into<Value>>(self, value: T) -> Expr {
        self.expr().lte(value)
    }

    /// Create a LIKE filter: `column LIKE pattern`
    fn like(self, pattern: &str) -> Expr {
        self.expr().like(pattern)
    }

    /// Create an IN filter: `column IN (values)`
    #[allow(clippy::wrong_self_convention)]
    fn is_in<T, I>(self, values: I) -> Expr
    where
        T: Into<Value>,
        I: IntoIterator<Item = T>,
    {
        self.expr().is_in(values)
    }

    #[allow(clippy::wrong_self_convention)]
    fn is_null(self) -> Expr {
        self.expr().is_null()
    }

    #[allow(clippy::wrong_self_convention)]
    fn is_not_null(self) -> Expr {
        self.expr().is_not_null()
    }

    /// Ascending order term
    fn asc(self) -> OrderTerm {
        OrderTerm::column(self.path(), Order::Asc)
    }

    /// Descending order term
    fn desc(self) -> OrderTerm {
        OrderTerm::column(self.path(), Order::Desc)
    }

    /// Column with an output label, `"table"."column" AS "label"`
    fn label(self, label: &str) -> Labeled {
        Labeled::new(self.expr(), label)
    }
}
