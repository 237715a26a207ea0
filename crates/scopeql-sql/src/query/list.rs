//! The list query: one SELECT carrying its own pagination counts.
//!
//! The statement projects the table's columns followed by two scalar
//! subqueries, `filtered_count` and `total_count`, so a single round trip
//! returns a page of rows together with the numbers a client needs to
//! paginate. Arguments are ordered filtered-count, total-count, outer query,
//! matching the order the markers appear in the SQL text.

use tracing::{field, instrument, Span};

use crate::filter::QueryFilter;
use crate::types::BindValue;
use crate::Result;
use super::builder::SqlQueryBuilder;
use super::helpers::{qualify, ID_COLUMN};
use super::predicate::PredicateSet;
use super::select::SelectBuilder;
use super::table::TableDescriptor;

/// Alias of the filtered row-count column.
pub const FILTERED_COUNT_ALIAS: &str = "filtered_count";
/// Alias of the total row-count column.
pub const TOTAL_COUNT_ALIAS: &str = "total_count";

impl SqlQueryBuilder {
    /// Builds a paginated list query for `table`.
    ///
    /// `actor_id` is the owner the rows must belong to (0 for none). Admin
    /// callers are not scoped to an owner and, on the outer query, not to
    /// live rows either.
    pub fn build_list_query(
        &self,
        table: &TableDescriptor,
        actor_id: u64,
        for_admin: bool,
        filter: Option<&QueryFilter>,
    ) -> Result<(String, Vec<BindValue>)> {
        self.build_list_query_where(table, PredicateSet::new(), actor_id, for_admin, filter)
    }

    /// [`Self::build_list_query`] with extra predicates applied to the outer
    /// query and both counts.
    #[instrument(
        skip(self, table, base, filter),
        fields(table = table.name, page = field::Empty, limit = field::Empty, sort = field::Empty)
    )]
    pub fn build_list_query_where(
        &self,
        table: &TableDescriptor,
        base: PredicateSet,
        actor_id: u64,
        for_admin: bool,
        filter: Option<&QueryFilter>,
    ) -> Result<(String, Vec<BindValue>)> {
        if let Some(filter) = filter {
            let span = Span::current();
            span.record("page", filter.effective_page());
            span.record(
                "limit",
                filter.effective_page_size(self.config().default_page_size, self.config().max_page_size),
            );
            span.record("sort", field::debug(filter.sort_by));
        }

        let built = self.assemble_list_query(table, base, actor_id, for_admin, filter);
        self.finish(table.name, "list", built)
    }

    fn assemble_list_query(
        &self,
        table: &TableDescriptor,
        base: PredicateSet,
        actor_id: u64,
        for_admin: bool,
        filter: Option<&QueryFilter>,
    ) -> Result<(String, Vec<BindValue>)> {
        table.validate()?;

        let default_filter = QueryFilter::default();
        let filter_or_default = filter.unwrap_or(&default_filter);
        let include_archived = filter_or_default.include_archived;

        let (filtered_sql, filtered_args) = Self::raw_count_query(
            table,
            base.clone(),
            actor_id,
            for_admin,
            include_archived,
            filter,
        )?;
        let (total_sql, total_args) =
            Self::raw_count_query(table, base.clone(), actor_id, for_admin, include_archived, None)?;

        let mut predicates = Self::outer_scope(table, base, actor_id, for_admin)?;
        if let Some(filter) = filter {
            predicates = predicates.with_time_range(table, filter)?;
        }

        let mut group_by = vec![table.id_column()];
        for join in table.joins {
            let joined_id = qualify(join.table, ID_COLUMN);
            if !group_by.contains(&joined_id) {
                group_by.push(joined_id);
            }
        }

        let (limit, offset) = filter_or_default
            .limit_and_offset(self.config().default_page_size, self.config().max_page_size);

        SelectBuilder::new(table.name)?
            .columns(table.columns)?
            .subquery(filtered_sql, filtered_args, FILTERED_COUNT_ALIAS)?
            .subquery(total_sql, total_args, TOTAL_COUNT_ALIAS)?
            .joins(table.joins)?
            .filter(predicates)
            .group_by(&group_by)?
            .order_by(&table.id_column(), filter_or_default.sort_by.into())?
            .limit(limit)
            .offset(offset)
            .build()
    }
}
