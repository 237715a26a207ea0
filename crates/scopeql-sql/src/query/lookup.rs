//! Fixed-shape lookups: global counts, ID-range batches and JSON context
//! searches.

use tracing::instrument;

use crate::dialect::checked_json_predicate;
use crate::tables::AUDIT_LOG;
use crate::types::BindValue;
use crate::Result;
use super::builder::SqlQueryBuilder;
use super::helpers::CREATED_ON_COLUMN;
use super::predicate::PredicateSet;
use super::select::SelectBuilder;
use super::table::TableDescriptor;

/// JSON column of the audit log holding the event's context.
pub const AUDIT_LOG_CONTEXT_COLUMN: &str = "context";

impl SqlQueryBuilder {
    /// `SELECT COUNT(table.id) FROM table WHERE table.archived_on IS NULL`
    ///
    /// Binds nothing, so only the SQL text is returned.
    #[instrument(skip_all, fields(table = table.name))]
    pub fn build_all_count_query(&self, table: &TableDescriptor) -> Result<String> {
        let built = table.validate().and_then(|_| {
            SelectBuilder::new(table.name)?
                .count(&table.id_column())?
                .filter(PredicateSet::new().is_null(&table.archived_on_column())?)
                .build()
        });
        self.finish_query_only(table.name, "all_count", built)
    }

    /// Every row with `begin_id < id < end_id`, archived rows included.
    #[instrument(skip(self, table), fields(table = table.name))]
    pub fn build_batch_query(
        &self,
        table: &TableDescriptor,
        begin_id: u64,
        end_id: u64,
    ) -> Result<(String, Vec<BindValue>)> {
        let built = table.validate().and_then(|_| {
            let id_column = table.id_column();
            SelectBuilder::new(table.name)?
                .columns(table.columns)?
                .filter(PredicateSet::new().gt(&id_column, begin_id)?.lt(&id_column, end_id)?)
                .build()
        });
        self.finish(table.name, "batch", built)
    }

    /// Rows of `table` whose JSON `column` holds `value` under `key`,
    /// ordered by creation time.
    #[instrument(skip(self, table, value), fields(table = table.name))]
    pub fn build_json_context_query(
        &self,
        table: &TableDescriptor,
        column: &str,
        key: &str,
        value: BindValue,
    ) -> Result<(String, Vec<BindValue>)> {
        let built = table.validate().and_then(|_| {
            let predicate = checked_json_predicate(self.dialect(), &table.qualified(column), key, &value)?;
            SelectBuilder::new(table.name)?
                .columns(table.columns)?
                .filter(PredicateSet::new().raw(predicate.sql, predicate.args))
                .order_by_column(&table.qualified(CREATED_ON_COLUMN))?
                .build()
        });
        self.finish(table.name, "json_context", built)
    }

    /// Audit log entries whose context carries `key = value`, oldest first.
    pub fn build_audit_log_entries_query(
        &self,
        key: &str,
        value: impl Into<BindValue>,
    ) -> Result<(String, Vec<BindValue>)> {
        self.build_json_context_query(&AUDIT_LOG, AUDIT_LOG_CONTEXT_COLUMN, key, value.into())
    }
}
