//! Entity-level read shortcuts over [`SelectBuilder`].

use super::select::SelectBuilder;
use crate::entity::{ColumnTrait, EntityTrait};
use crate::error::FluentError;
use crate::session::QuerySession;
use sea_query::{IntoCondition, Value};

/// `find`, `all` and `filter` entry points, available on every entity
///
/// ```no_run
/// # use fluentguard::{EntityFinder, EntityTrait, FluentError, SqliteSession};
/// # fn run<E: EntityTrait>() -> Result<(), FluentError> {
/// let session = SqliteSession::open_in_memory()?;
/// let user = E::find(&session, 42)?;
/// let everyone = E::all(&session)?;
/// # Ok(())
/// # }
/// ```
pub trait EntityFinder: EntityTrait {
    /// A builder over every row of the entity
    fn query(session: &dyn QuerySession) -> Result<SelectBuilder<'_, Self>, FluentError> {
        SelectBuilder::new(session, Self::default())
    }

    /// Look up one entity by primary key
    fn find<V: Into<Value>>(
        session: &dyn QuerySession,
        id: V,
    ) -> Result<Option<Self::Model>, FluentError> {
        let primary_key = Self::default().primary_key();
        Self::query(session)?.filter(primary_key.eq(id)).first()
    }

    /// Every entity in the table
    fn all(session: &dyn QuerySession) -> Result<Vec<Self::Model>, FluentError> {
        Self::query(session)?.get()
    }

    /// A builder starting from one predicate
    fn filter<F: IntoCondition>(
        session: &dyn QuerySession,
        condition: F,
    ) -> Result<SelectBuilder<'_, Self>, FluentError> {
        Ok(Self::query(session)?.filter(condition))
    }
}

impl<E: EntityTrait> EntityFinder for E {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSession;
    use crate::session::Backend;
    use crate::tests_cfg::{post_row, Post, PostColumn};

    #[test]
    fn test_find_filters_on_primary_key_with_limit() {
        let session = MockSession::new(Backend::Postgres)
            .append_query_results([vec![post_row(5, "five")], vec![]]);
        let found = Post::find(&session, 5i64).unwrap();
        assert_eq!(found.map(|p| p.title), Some("five".to_string()));
        assert!(Post::find(&session, 6i64).unwrap().is_none());

        let (sql, values) = session.captured().remove(0);
        assert!(sql.ends_with(r#"WHERE "posts"."id" = $1 LIMIT $2"#));
        assert_eq!(values.0, vec![Value::BigInt(Some(5)), Value::BigUnsigned(Some(1))]);
    }

    #[test]
    fn test_all_and_filter() {
        let session = MockSession::new(Backend::Sqlite)
            .append_query_results([vec![post_row(1, "a"), post_row(2, "b")]]);
        assert_eq!(Post::all(&session).unwrap().len(), 2);

        let builder = Post::filter(&session, PostColumn::Title.eq("a")).unwrap();
        assert_eq!(builder.state().filters().len(), 1);
        assert_eq!(builder.entity(), Post);
    }

    #[test]
    fn test_refusing_session() {
        let session = MockSession::refusing(Backend::Postgres);
        assert!(Post::all(&session).unwrap_err().is_configuration());
    }
}
