//! Building blocks accepted by the select builder.

use crate::entity::{ColumnPath, ColumnTrait, EntityTrait};
use sea_query::{Expr, Order};

/// An expression with an output label, `expr AS label`
#[derive(Debug, Clone, PartialEq)]
pub struct Labeled {
    expr: Expr,
    label: String,
}

impl Labeled {
    pub fn new(expr: impl Into<Expr>, label: &str) -> Self {
        Self {
            expr: expr.into(),
            label: label.to_string(),
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn asc(self) -> OrderTerm {
        OrderTerm::new(OrderKey::Labeled(self), Order::Asc)
    }

    pub fn desc(self) -> OrderTerm {
        OrderTerm::new(OrderKey::Labeled(self), Order::Desc)
    }
}

/// One entry of a projection
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// Every column of the named entity table
    Entity { table: &'static str },
    Column(ColumnPath),
    Labeled(Labeled),
}

impl SelectItem {
    /// The whole-entity marker
    pub fn entity<E: EntityTrait>(entity: E) -> Self {
        SelectItem::Entity {
            table: entity.table_name(),
        }
    }

    pub(crate) fn is_entity(&self) -> bool {
        matches!(self, SelectItem::Entity { .. })
    }
}

impl<C: ColumnTrait> From<C> for SelectItem {
    fn from(column: C) -> Self {
        SelectItem::Column(column.path())
    }
}

impl From<Labeled> for SelectItem {
    fn from(labeled: Labeled) -> Self {
        SelectItem::Labeled(labeled)
    }
}

/// A grouping key
///
/// `Reference` names an output column or label and is emitted unqualified,
/// so it resolves against the select list rather than a table.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    Column(ColumnPath),
    Labeled(Labeled),
    Reference(String),
}

impl<C: ColumnTrait> From<C> for GroupKey {
    fn from(column: C) -> Self {
        GroupKey::Column(column.path())
    }
}

impl From<Labeled> for GroupKey {
    fn from(labeled: Labeled) -> Self {
        GroupKey::Labeled(labeled)
    }
}

impl From<&str> for GroupKey {
    fn from(name: &str) -> Self {
        GroupKey::Reference(name.to_string())
    }
}

impl From<String> for GroupKey {
    fn from(name: String) -> Self {
        GroupKey::Reference(name)
    }
}

/// What an order term sorts by
#[derive(Debug, Clone, PartialEq)]
pub enum OrderKey {
    Column(ColumnPath),
    Labeled(Labeled),
    Reference(String),
    Expr(Expr),
}

/// An ordering key with its direction
///
/// A term built from a bare column has no direction and is rejected when
/// the query is compiled; use [`ColumnTrait::asc`] or [`ColumnTrait::desc`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTerm {
    key: OrderKey,
    order: Option<Order>,
}

impl OrderTerm {
    pub fn new(key: OrderKey, order: Order) -> Self {
        Self {
            key,
            order: Some(order),
        }
    }

    pub fn column(path: ColumnPath, order: Order) -> Self {
        Self::new(OrderKey::Column(path), order)
    }

    /// Order by an output column or label name
    pub fn reference(name: &str, order: Order) -> Self {
        Self::new(OrderKey::Reference(name.to_string()), order)
    }

    /// Order by an arbitrary expression
    pub fn expr(expr: Expr, order: Order) -> Self {
        Self::new(OrderKey::Expr(expr), order)
    }

    pub fn key(&self) -> &OrderKey {
        &self.key
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }
}

impl<C: ColumnTrait> From<C> for OrderTerm {
    fn from(column: C) -> Self {
        Self {
            key: OrderKey::Column(column.path()),
            order: None,
        }
    }
}

/// Eager-load strategy hint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadHint {
    /// Load the named relation through a LEFT JOIN in the same statement
    Joined(String),
}

impl LoadHint {
    pub fn joined(relation: &str) -> Self {
        LoadHint::Joined(relation.to_string())
    }

    pub fn relation(&self) -> &str {
        match self {
            LoadHint::Joined(name) => name,
        }
    }
}
