//! The SELECT builder.
//!
//! - **Select**: [`SelectBuilder`] and its accumulated [`SelectState`]
//! - **Expr**: projection items, grouping keys, order terms and load hints
//! - **Compile**: pure translation of state into a `sea_query::SelectStatement`
//! - **Execution**: terminal operations and the raw [`ResultSet`]
//! - **Materialize**: models, field records and de-duplication
//! - **Paginate**: count plus page queries
//! - **Finder**: `find`, `all` and `filter` shortcuts on entities

mod compile;
pub mod execution;
pub mod expr;
pub mod finder;
pub mod materialize;
pub mod paginate;
pub mod select;

pub use execution::ResultSet;
pub use expr::{GroupKey, Labeled, LoadHint, OrderKey, OrderTerm, SelectItem};
pub use finder::EntityFinder;
pub use materialize::{FieldRecord, FieldSet};
pub use paginate::{last_page, Consistency, Page, PaginateOptions};
pub use select::{SelectBuilder, SelectState};
