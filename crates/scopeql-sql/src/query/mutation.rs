//! Create, update and archive operations.

use tracing::instrument;

use crate::types::BindValue;
use crate::Result;
use super::builder::SqlQueryBuilder;
use super::helpers::{ARCHIVED_ON_COLUMN, ID_COLUMN, LAST_UPDATED_ON_COLUMN};
use super::modify::{InsertBuilder, UpdateBuilder};
use super::predicate::PredicateSet;
use super::table::TableDescriptor;

impl SqlQueryBuilder {
    /// `INSERT INTO table (c1,c2) VALUES (?,?)`, followed by the dialect's
    /// ID-returning suffix when it has one.
    #[instrument(skip_all, fields(table = table.name, columns = values.len()))]
    pub fn build_insert_query(
        &self,
        table: &TableDescriptor,
        values: &[(&str, BindValue)],
    ) -> Result<(String, Vec<BindValue>)> {
        let built = self.assemble_insert(table, values);
        self.finish(table.name, "insert", built)
    }

    /// Updates the live row `id` owned by `owner_id`, stamping
    /// `last_updated_on` with the database's current time.
    #[instrument(skip(self, table, values), fields(table = table.name))]
    pub fn build_update_query(
        &self,
        table: &TableDescriptor,
        values: &[(&str, BindValue)],
        id: u64,
        owner_id: u64,
    ) -> Result<(String, Vec<BindValue>)> {
        let built = self.assemble_update(table, values, id, owner_id);
        self.finish(table.name, "update", built)
    }

    /// Archives (soft deletes) the live row `id` owned by `owner_id`.
    #[instrument(skip(self, table), fields(table = table.name))]
    pub fn build_archive_query(
        &self,
        table: &TableDescriptor,
        id: u64,
        owner_id: u64,
    ) -> Result<(String, Vec<BindValue>)> {
        let built = self.assemble_archive(table, id, owner_id);
        self.finish(table.name, "archive", built)
    }

    /// Runs a prepared UPDATE through the shared parity check and logging.
    pub(crate) fn build_prepared_update(
        &self,
        table: &TableDescriptor,
        operation: &'static str,
        update: Result<UpdateBuilder>,
    ) -> Result<(String, Vec<BindValue>)> {
        let built = update.and_then(|update| update.build());
        self.finish(table.name, operation, built)
    }

    /// `archived_on IS NULL AND <owner> = ? AND id = ?` with unqualified
    /// column names.
    pub(crate) fn mutation_scope(table: &TableDescriptor, id: u64, owner_id: u64) -> Result<PredicateSet> {
        let mut predicates = PredicateSet::new()
            .is_null(ARCHIVED_ON_COLUMN)?
            .eq(ID_COLUMN, id)?;
        if owner_id != 0 {
            if let Some(owner) = table.ownership_column.filter(|c| !c.is_empty()) {
                predicates = predicates.eq(owner, owner_id)?;
            }
        }
        Ok(predicates)
    }

    fn assemble_insert(&self, table: &TableDescriptor, values: &[(&str, BindValue)]) -> Result<(String, Vec<BindValue>)> {
        values
            .iter()
            .try_fold(InsertBuilder::new(table.name)?, |insert, (column, value)| {
                insert.value(column, value.clone())
            })?
            .returning(self.dialect().insert_returning_suffix())
            .build()
    }

    fn assemble_update(
        &self,
        table: &TableDescriptor,
        values: &[(&str, BindValue)],
        id: u64,
        owner_id: u64,
    ) -> Result<(String, Vec<BindValue>)> {
        let now = self.dialect().current_timestamp_expr();
        let update = values
            .iter()
            .try_fold(UpdateBuilder::new(table.name)?, |update, (column, value)| {
                update.set(column, value.clone())
            })?;

        update
            .set_expr(LAST_UPDATED_ON_COLUMN, now, Vec::new())?
            .filter(Self::mutation_scope(table, id, owner_id)?)
            .build()
    }

    fn assemble_archive(&self, table: &TableDescriptor, id: u64, owner_id: u64) -> Result<(String, Vec<BindValue>)> {
        let now = self.dialect().current_timestamp_expr();
        UpdateBuilder::new(table.name)?
            .set_expr(LAST_UPDATED_ON_COLUMN, now, Vec::new())?
            .set_expr(ARCHIVED_ON_COLUMN, now, Vec::new())?
            .filter(Self::mutation_scope(table, id, owner_id)?)
            .build()
    }
}
