//! Row-count subqueries.

use tracing::instrument;

use crate::filter::QueryFilter;
use crate::types::BindValue;
use crate::Result;
use super::builder::SqlQueryBuilder;
use super::predicate::PredicateSet;
use super::select::SelectBuilder;
use super::table::TableDescriptor;

impl SqlQueryBuilder {
    /// `SELECT COUNT(table.id)` with `?` markers, scoped for the caller.
    ///
    /// With a filter the count also honours its time range; without one it
    /// is the total count.
    pub(crate) fn raw_count_query(
        table: &TableDescriptor,
        base: PredicateSet,
        actor_id: u64,
        for_admin: bool,
        include_archived: bool,
        filter: Option<&QueryFilter>,
    ) -> Result<(String, Vec<BindValue>)> {
        table.validate()?;

        let mut predicates = Self::count_scope(table, base, actor_id, for_admin, include_archived)?;
        if let Some(filter) = filter {
            predicates = predicates.with_time_range(table, filter)?;
        }

        SelectBuilder::new(table.name)?
            .count(&table.id_column())?
            .joins(table.joins)?
            .filter(predicates)
            .build()
    }

    /// Counts every row the caller may see, ignoring any time range.
    #[instrument(skip(self, table), fields(table = table.name))]
    pub fn build_total_count_query(
        &self,
        table: &TableDescriptor,
        actor_id: u64,
        for_admin: bool,
        include_archived: bool,
    ) -> Result<(String, Vec<BindValue>)> {
        let built = Self::raw_count_query(table, PredicateSet::new(), actor_id, for_admin, include_archived, None);
        self.finish(table.name, "total_count", built)
    }

    /// Counts the rows the caller may see that also match the filter's time
    /// range. A missing filter counts the same rows as the total count.
    #[instrument(skip(self, table, filter), fields(table = table.name))]
    pub fn build_filtered_count_query(
        &self,
        table: &TableDescriptor,
        actor_id: u64,
        for_admin: bool,
        filter: Option<&QueryFilter>,
    ) -> Result<(String, Vec<BindValue>)> {
        let include_archived = filter.is_some_and(|f| f.include_archived);
        let built = Self::raw_count_query(table, PredicateSet::new(), actor_id, for_admin, include_archived, filter);
        self.finish(table.name, "filtered_count", built)
    }
}
