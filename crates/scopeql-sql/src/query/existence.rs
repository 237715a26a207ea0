//! Single-row and existence lookups.
//!
//! These statements carry one equality predicate set and nothing else: no
//! pagination, no count subqueries. Live rows only unless the caller goes
//! through [`SqlQueryBuilder::build_select_query`].

use tracing::instrument;

use crate::types::BindValue;
use crate::Result;
use super::builder::SqlQueryBuilder;
use super::predicate::PredicateSet;
use super::select::SelectBuilder;
use super::table::TableDescriptor;

impl SqlQueryBuilder {
    /// `SELECT EXISTS ( SELECT table.id FROM table WHERE table.archived_on IS NULL AND ... )`
    #[instrument(skip_all, fields(table = table.name))]
    pub fn build_exists_query(
        &self,
        table: &TableDescriptor,
        predicates: PredicateSet,
    ) -> Result<(String, Vec<BindValue>)> {
        let built = Self::live_rows(table, predicates).and_then(|predicates| {
            SelectBuilder::new(table.name)?
                .columns(&[table.id_column()])?
                .joins(table.joins)?
                .filter(predicates)
                .build_exists()
        });
        self.finish(table.name, "exists", built)
    }

    /// `SELECT <columns> FROM table WHERE table.archived_on IS NULL AND ...`
    #[instrument(skip_all, fields(table = table.name))]
    pub fn build_get_query(
        &self,
        table: &TableDescriptor,
        predicates: PredicateSet,
    ) -> Result<(String, Vec<BindValue>)> {
        let built = Self::live_rows(table, predicates)
            .and_then(|predicates| Self::raw_select(table, predicates));
        self.finish(table.name, "get", built)
    }

    /// `SELECT <columns> FROM table WHERE ...` with exactly the given
    /// predicates, archived rows included.
    #[instrument(skip_all, fields(table = table.name))]
    pub fn build_select_query(
        &self,
        table: &TableDescriptor,
        predicates: PredicateSet,
    ) -> Result<(String, Vec<BindValue>)> {
        let built = Self::raw_select(table, predicates);
        self.finish(table.name, "select", built)
    }

    /// Existence of the live row `id`, scoped to `owner_id` when the table
    /// has an ownership column and the owner is known.
    pub fn build_exists_by_id_query(
        &self,
        table: &TableDescriptor,
        id: u64,
        owner_id: u64,
    ) -> Result<(String, Vec<BindValue>)> {
        match Self::id_and_owner(table, id, owner_id) {
            Ok(predicates) => self.build_exists_query(table, predicates),
            Err(err) => self.finish(table.name, "exists", Err(err)),
        }
    }

    /// The live row `id`, scoped like [`Self::build_exists_by_id_query`].
    pub fn build_get_by_id_query(
        &self,
        table: &TableDescriptor,
        id: u64,
        owner_id: u64,
    ) -> Result<(String, Vec<BindValue>)> {
        match Self::id_and_owner(table, id, owner_id) {
            Ok(predicates) => self.build_get_query(table, predicates),
            Err(err) => self.finish(table.name, "get", Err(err)),
        }
    }

    fn live_rows(table: &TableDescriptor, predicates: PredicateSet) -> Result<PredicateSet> {
        table.validate()?;
        predicates.is_null(&table.archived_on_column())
    }

    fn raw_select(table: &TableDescriptor, predicates: PredicateSet) -> Result<(String, Vec<BindValue>)> {
        table.validate()?;
        SelectBuilder::new(table.name)?
            .columns(table.columns)?
            .joins(table.joins)?
            .filter(predicates)
            .build()
    }

    pub(crate) fn id_and_owner(table: &TableDescriptor, id: u64, owner_id: u64) -> Result<PredicateSet> {
        let mut predicates = PredicateSet::new().eq(&table.id_column(), id)?;
        if owner_id != 0 {
            if let Some(owner) = table.qualified_ownership_column() {
                predicates = predicates.eq(&owner, owner_id)?;
            }
        }
        Ok(predicates)
    }
}
