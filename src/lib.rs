//! # Fluentguard
//!
//! Fluent SELECT query builder over `sea-query`, executed through explicit
//! sessions (`may_postgres`, `rusqlite`).
//!
//! Declare entities with [`EntityTrait`] and [`ColumnTrait`], bind a
//! [`SelectBuilder`] to a session, chain configuration calls and finish with
//! a terminal such as [`SelectBuilder::get`] or [`SelectBuilder::paginate`].

pub mod config;
pub mod entity;
pub mod error;
pub mod metrics;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod query;
pub mod row;
pub mod session;
#[cfg(test)]
mod tests_cfg;
pub mod value;

pub use config::{DatabaseConfig, FluentConfig};
pub use entity::{
    ColumnDef, ColumnPath, ColumnTrait, ColumnType, EntityTrait, FromRow, RelationDef,
    RelationKind,
};
pub use error::FluentError;
pub use query::{
    Consistency, EntityFinder, FieldRecord, FieldSet, GroupKey, Labeled, LoadHint, OrderKey,
    OrderTerm, Page, PaginateOptions, ResultSet, SelectBuilder, SelectItem, SelectState,
};
pub use row::Row;
#[cfg(feature = "sqlite")]
pub use session::SqliteSession;
pub use session::{
    open_session, Backend, ConnectionError, IsolationLevel, MayPostgresSession, QuerySession,
    Transaction,
};
pub use value::{TryGetable, ValueExtractionError};
