//! Lookups by an ordered list of IDs.

use tracing::{debug, instrument};

use crate::types::BindValue;
use crate::Result;
use super::builder::SqlQueryBuilder;
use super::helpers::build_when_then_statement;
use super::predicate::PredicateSet;
use super::select::SelectBuilder;
use super::table::TableDescriptor;

impl SqlQueryBuilder {
    /// Selects the rows whose IDs appear in `ids`, returned in the order the
    /// IDs were given, at most `limit` of them.
    ///
    /// IDs are bound in the `IN` list and written as literals in the
    /// `ORDER BY CASE` expression; they are integers, so nothing caller
    /// controlled reaches the SQL text. An empty list yields a statement that
    /// matches no rows. A zero limit means the configured default page size.
    ///
    /// Archived rows are never returned. `for_admin` only drops the
    /// ownership predicate.
    #[instrument(skip(self, table, ids), fields(table = table.name, id_count = ids.len()))]
    pub fn build_ordered_ids_query(
        &self,
        table: &TableDescriptor,
        actor_id: u64,
        ids: &[u64],
        limit: u8,
        for_admin: bool,
    ) -> Result<(String, Vec<BindValue>)> {
        let limit = match limit {
            0 => self.config().default_page_size,
            n => n.min(self.config().max_page_size),
        };
        let built = Self::assemble_ordered_ids_query(table, actor_id, ids, limit, for_admin);
        self.finish(table.name, "ordered_ids", built)
    }

    fn assemble_ordered_ids_query(
        table: &TableDescriptor,
        actor_id: u64,
        ids: &[u64],
        limit: u8,
        for_admin: bool,
    ) -> Result<(String, Vec<BindValue>)> {
        table.validate()?;

        let id_column = table.id_column();
        let owner = if for_admin { 0 } else { actor_id };
        let base = Self::actor_scope(table, PredicateSet::new(), owner)?;

        let select = SelectBuilder::new(table.name)?
            .columns(table.columns)?
            .joins(table.joins)?;

        let select = if ids.is_empty() {
            debug!("Empty ID list, query will match nothing");
            select.filter(base.never())
        } else {
            let values = ids.iter().copied().map(BindValue::from).collect();
            select
                .filter(base.eq_any(&id_column, values)?)
                .order_by_expr(format!("CASE {} {}", id_column, build_when_then_statement(ids)))
        };

        select.limit(u64::from(limit)).build()
    }
}
