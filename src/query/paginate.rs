//! Page-based pagination: a count query plus a page query over the same state.

use super::compile::compile;
use super::execution::count_with;
use super::select::{SelectBuilder, SelectState};
use crate::entity::EntityTrait;
use crate::error::FluentError;
use crate::session::{IsolationLevel, QuerySession, Transaction};
use serde::{Deserialize, Serialize};

/// How the count and page queries of [`SelectBuilder::paginate_with`] relate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    /// Run both queries directly on the session
    #[default]
    Independent,
    /// Run both queries inside one transaction at the given isolation level
    Transactional(IsolationLevel),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct PaginateOptions {
    #[serde(default)]
    pub consistency: Consistency,
}

/// One page of entities plus the totals needed to navigate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<M> {
    pub data: Vec<M>,
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub last_page: u64,
}

impl<M> Page<M> {
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }
}

/// `ceil(total / per_page)`, 0 for an empty result
pub fn last_page(total: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page)
}

impl<'s, E: EntityTrait> SelectBuilder<'s, E> {
    /// Fetch page `page` (1-based) of `per_page` entities
    ///
    /// The total is counted with a separate statement. Rows written between
    /// the count and the page query can make `total` and `data` disagree; use
    /// [`SelectBuilder::paginate_with`] and [`Consistency::Transactional`] when
    /// that matters.
    pub fn paginate(&self, page: u64, per_page: u64) -> Result<Page<E::Model>, FluentError> {
        self.paginate_with(page, per_page, &PaginateOptions::default())
    }

    pub fn paginate_with(
        &self,
        page: u64,
        per_page: u64,
        options: &PaginateOptions,
    ) -> Result<Page<E::Model>, FluentError> {
        if page < 1 {
            return Err(FluentError::config(format!("page must be at least 1, got {page}")));
        }
        if per_page < 1 {
            return Err(FluentError::config(format!(
                "per_page must be at least 1, got {per_page}"
            )));
        }
        self.ensure_full_entity("paginate")?;

        let offset = (page - 1).checked_mul(per_page).ok_or_else(|| {
            FluentError::config(format!("page {page} with per_page {per_page} overflows the offset"))
        })?;
        let page_state = SelectState {
            offset: Some(offset),
            limit: Some(per_page),
            ..self.state.clone()
        };
        // compile first so misconfiguration never costs a round-trip
        let compiled = compile(self.entity, &page_state)?;

        let run = |session: &dyn QuerySession| -> Result<(u64, Vec<E::Model>), FluentError> {
            let total = count_with(session, self.entity, &self.state)?;
            let data = self.models_with(session, &compiled)?;
            Ok((total, data))
        };

        let (total, data) = match options.consistency {
            Consistency::Independent => run(self.session)?,
            Consistency::Transactional(isolation) => {
                let tx = Transaction::begin(self.session, isolation)?;
                let result = run(&tx)?;
                tx.commit()?;
                result
            }
        };

        let last_page = last_page(total, per_page);
        log::debug!(
            "page {page}/{last_page} of '{}': {} rows, {total} total",
            self.entity.table_name(),
            data.len()
        );
        Ok(Page {
            data,
            total,
            per_page,
            current_page: page,
            last_page,
        })
    }
}
