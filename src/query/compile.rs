//! Compilation of [`SelectState`] into a `sea_query::SelectStatement`.
//!
//! Compilation is pure: the same entity and state always produce the same
//! statement, and every configuration mistake is reported here, before any
//! database round-trip.

use super::expr::{GroupKey, OrderKey, OrderTerm, SelectItem};
use super::materialize::FieldSet;
use super::select::SelectState;
use crate::entity::{ColumnPath, ColumnTrait, ColumnType, EntityTrait, RelationDef};
use crate::error::FluentError;
use crate::row::RELATION_SEPARATOR;
use sea_query::{Alias, Expr, ExprTrait, JoinType, Query, SelectStatement};
use std::collections::HashSet;

/// Output alias of the count column
pub(crate) const COUNT_ALIAS: &str = "count";
const COUNT_SUBQUERY_ALIAS: &str = "count_subquery";

/// A compiled statement plus what the materializer needs to shape its rows
#[derive(Debug, Clone)]
pub(crate) struct CompiledSelect {
    pub statement: SelectStatement,
    /// Output columns of a specific-fields projection; `None` in full-entity mode
    pub field_set: Option<FieldSet>,
    /// Declared types of output columns that map onto target-entity columns
    pub coercions: Vec<(String, ColumnType)>,
    /// Primary key output column of the target entity
    pub primary_key: &'static str,
    /// Relations loaded through joins, in hint order
    pub relations: Vec<RelationDef>,
}

/// Compile `state` for `entity`
pub(crate) fn compile<E: EntityTrait>(
    entity: E,
    state: &SelectState,
) -> Result<CompiledSelect, FluentError> {
    let table = entity.table_name();
    let declared = entity.relations();
    let relations = resolve_relations(&entity, state)?;

    let specific = state.is_specific_fields();
    if !relations.is_empty() && specific {
        return Err(FluentError::config(
            "eager loads require a full-entity projection",
        ));
    }
    if !relations.is_empty() && !state.group_by.is_empty() {
        return Err(FluentError::config(
            "eager loads cannot be combined with GROUP BY",
        ));
    }

    for item in &state.projection {
        if let SelectItem::Entity { table: marker } = item {
            if *marker != table {
                return Err(FluentError::config(format!(
                    "entity '{marker}' cannot be selected from '{table}'"
                )));
            }
        }
    }

    let allowed_tables: HashSet<&str> = std::iter::once(table)
        .chain(declared.iter().map(|r| r.to_table))
        .collect();
    let check_path = |path: &ColumnPath| -> Result<(), FluentError> {
        if allowed_tables.contains(path.table) {
            Ok(())
        } else {
            Err(FluentError::config(format!(
                "column '{}.{}' does not belong to '{table}' or its relations",
                path.table, path.name
            )))
        }
    };

    for term in &state.order_by {
        if term.order().is_none() {
            return Err(FluentError::config(format!(
                "order term {:?} has no direction; use asc() or desc()",
                term.key()
            )));
        }
        if let OrderKey::Column(path) = term.key() {
            check_path(path)?;
        }
    }
    for key in &state.group_by {
        if let GroupKey::Column(path) = key {
            check_path(path)?;
        }
    }

    let mut stmt = Query::select();
    let mut coercions = Vec::new();
    let mut labels = HashSet::new();

    let field_set = if specific {
        let mut names = Vec::new();
        for item in &state.projection {
            match item {
                SelectItem::Entity { .. } => {
                    for column in entity.columns() {
                        let def = column.def();
                        stmt.expr(column.expr());
                        coercions.push((def.name.to_string(), def.column_type));
                        names.push(def.name.to_string());
                    }
                }
                SelectItem::Column(path) => {
                    check_path(path)?;
                    stmt.expr(path.expr());
                    if path.table == table {
                        if let Some(column) = entity.columns().into_iter().find(|c| c.name() == path.name) {
                            coercions.push((path.name.to_string(), column.def().column_type));
                        }
                    }
                    names.push(path.name.to_string());
                }
                SelectItem::Labeled(labeled) => {
                    stmt.expr_as(labeled.expr().clone(), Alias::new(labeled.label()));
                    labels.insert(labeled.label().to_string());
                    names.push(labeled.label().to_string());
                }
            }
        }
        let mut seen = HashSet::new();
        if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(FluentError::config(format!(
                "field '{dup}' is selected twice; label one of them"
            )));
        }
        Some(FieldSet::new(names))
    } else {
        for column in entity.columns() {
            let def = column.def();
            stmt.expr(column.expr());
            coercions.push((def.name.to_string(), def.column_type));
        }
        None
    };

    for relation in &relations {
        for &column in relation.to_columns {
            stmt.expr_as(
                ColumnPath::new(relation.to_table, column).expr(),
                Alias::new(format!("{}{RELATION_SEPARATOR}{column}", relation.name)),
            );
        }
    }

    let joined_many = relations.iter().any(|r| r.kind.is_to_many());
    let limit_in_subquery = joined_many && (state.limit.is_some() || state.offset.is_some());

    if limit_in_subquery {
        for term in &state.order_by {
            if let OrderKey::Column(path) = term.key() {
                if path.table != table {
                    return Err(FluentError::config(format!(
                        "ordering by '{}.{}' cannot be combined with a limit on a one-to-many eager load",
                        path.table, path.name
                    )));
                }
            }
        }
        // limit entities, not joined rows
        let mut inner = Query::select();
        for column in entity.columns() {
            inner.expr(column.expr());
        }
        inner.from(Alias::new(table));
        if !state.filters.is_empty() {
            // filters may name joined tables
            inner.distinct();
            join_relations(&mut inner, table, &relations);
            for condition in &state.filters {
                inner.cond_where(condition.clone());
            }
        }
        for term in &state.order_by {
            if let Some(order) = term.order() {
                inner.order_by_expr(order_expr(term, &labels), order.clone());
            }
        }
        if let Some(limit) = state.limit {
            inner.limit(limit);
        }
        if let Some(offset) = state.offset {
            inner.offset(offset);
        }
        stmt.from_subquery(inner, Alias::new(table));
    } else {
        stmt.from(Alias::new(table));
    }
    join_relations(&mut stmt, table, &relations);
    for condition in &state.filters {
        stmt.cond_where(condition.clone());
    }

    if !state.group_by.is_empty() {
        let keys: Vec<Expr> = state
            .group_by
            .iter()
            .map(|key| group_expr(key, &labels))
            .collect();
        stmt.add_group_by(keys);
    }
    for condition in &state.having {
        stmt.cond_having(condition.clone());
    }

    for term in &state.order_by {
        if let Some(order) = term.order() {
            stmt.order_by_expr(order_expr(term, &labels), order.clone());
        }
    }
    if !limit_in_subquery {
        if let Some(limit) = state.limit {
            stmt.limit(limit);
        }
        if let Some(offset) = state.offset {
            stmt.offset(offset);
        }
    }

    Ok(CompiledSelect {
        statement: stmt,
        field_set,
        coercions,
        primary_key: entity.primary_key().name(),
        relations,
    })
}

/// `SELECT COUNT(*) FROM (<filtered select>) AS count_subquery`
///
/// Ordering, offset and limit do not change the count and are left out of the
/// inner statement. With eager loads the joins stay, since filters may name
/// joined tables, and the inner statement selects distinct primary keys so
/// every entity is counted once.
pub(crate) fn compile_count<E: EntityTrait>(
    entity: E,
    state: &SelectState,
) -> Result<SelectStatement, FluentError> {
    let inner_state = SelectState {
        order_by: Vec::new(),
        offset: None,
        limit: None,
        ..state.clone()
    };
    let mut inner = compile(entity, &inner_state)?;
    if !inner.relations.is_empty() {
        inner
            .statement
            .clear_selects()
            .distinct()
            .expr(entity.primary_key().expr());
    }
    let mut stmt = Query::select();
    stmt.expr_as(Expr::cust("COUNT(*)"), Alias::new(COUNT_ALIAS))
        .from_subquery(inner.statement, Alias::new(COUNT_SUBQUERY_ALIAS));
    Ok(stmt)
}

fn join_relations(stmt: &mut SelectStatement, table: &str, relations: &[RelationDef]) {
    for relation in relations {
        stmt.join(
            JoinType::LeftJoin,
            Alias::new(relation.to_table),
            Expr::col((Alias::new(table), Alias::new(relation.from_column)))
                .equals((Alias::new(relation.to_table), Alias::new(relation.to_column))),
        );
    }
}

fn resolve_relations<E: EntityTrait>(
    entity: &E,
    state: &SelectState,
) -> Result<Vec<RelationDef>, FluentError> {
    let mut relations: Vec<RelationDef> = Vec::new();
    for hint in &state.load_hints {
        let name = hint.relation();
        if relations.iter().any(|r| r.name == name) {
            continue;
        }
        let relation = entity.relation(name).ok_or_else(|| {
            FluentError::config(format!(
                "'{}' has no relation named '{name}'",
                entity.table_name()
            ))
        })?;
        relations.push(relation);
    }
    Ok(relations)
}

fn group_expr(key: &GroupKey, labels: &HashSet<String>) -> Expr {
    match key {
        GroupKey::Column(path) => path.expr(),
        GroupKey::Labeled(labeled) if labels.contains(labeled.label()) => {
            Expr::col(Alias::new(labeled.label()))
        }
        GroupKey::Labeled(labeled) => labeled.expr().clone(),
        GroupKey::Reference(name) => Expr::col(Alias::new(name.as_str())),
    }
}

fn order_expr(term: &OrderTerm, labels: &HashSet<String>) -> Expr {
    match term.key() {
        OrderKey::Column(path) => path.expr(),
        OrderKey::Labeled(labeled) if labels.contains(labeled.label()) => {
            Expr::col(Alias::new(labeled.label()))
        }
        OrderKey::Labeled(labeled) => labeled.expr().clone(),
        OrderKey::Reference(name) => Expr::col(Alias::new(name.as_str())),
        OrderKey::Expr(expr) => expr.clone(),
    }
}
