//! The query engine shared by every entity wrapper.

use tracing::{error, trace};

use crate::config::BuilderConfig;
use crate::dialect::{count_placeholders, render_placeholders, Dialect, PlaceholderStyle};
use crate::types::BindValue;
use crate::{Result, ScopeQlError};
use super::predicate::PredicateSet;
use super::table::TableDescriptor;

/// Builds parameterized statements for one SQL dialect.
///
/// The builder holds only an immutable dialect adapter and configuration,
/// so one instance can be shared across threads (`Arc<SqlQueryBuilder>` or a
/// plain `&'static`) without locking.
///
/// Every operation returns `(sql, args)` where `sql` uses the dialect's
/// placeholder style and `args` lists the values for those placeholders in
/// order.
#[derive(Debug)]
pub struct SqlQueryBuilder {
    dialect: Box<dyn Dialect>,
    config: BuilderConfig,
}

impl SqlQueryBuilder {
    /// Creates a builder for the dialect named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `ScopeQlError::Configuration` if the page-size bounds are invalid.
    pub fn new(config: BuilderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            dialect: config.dialect.adapter(),
            config,
        })
    }

    /// Creates a builder with a custom dialect adapter. `config.dialect` is
    /// kept for reference but the given adapter is what renders SQL.
    pub fn with_dialect(dialect: Box<dyn Dialect>, config: BuilderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { dialect, config })
    }

    /// Active dialect adapter.
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Builder configuration.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Predicates applied to count subqueries.
    ///
    /// Non-admin callers always see live rows only, scoped to the actor when
    /// the table has an ownership column and the actor is known. Admin
    /// callers see archived rows only when they ask for them.
    pub(crate) fn count_scope(
        table: &TableDescriptor,
        base: PredicateSet,
        actor_id: u64,
        for_admin: bool,
        include_archived: bool,
    ) -> Result<PredicateSet> {
        if !for_admin {
            return Self::actor_scope(table, base, actor_id);
        }
        if !include_archived {
            return base.is_null(&table.archived_on_column());
        }
        Ok(base)
    }

    /// Predicates applied to the outer list query. Admin callers get no
    /// ownership or archival predicate here, even though their counts may
    /// still exclude archived rows.
    pub(crate) fn outer_scope(
        table: &TableDescriptor,
        base: PredicateSet,
        actor_id: u64,
        for_admin: bool,
    ) -> Result<PredicateSet> {
        if for_admin {
            return Ok(base);
        }
        Self::actor_scope(table, base, actor_id)
    }

    /// `archived_on IS NULL`, plus `ownership = actor` when both are set.
    pub(crate) fn actor_scope(
        table: &TableDescriptor,
        base: PredicateSet,
        actor_id: u64,
    ) -> Result<PredicateSet> {
        let mut set = base.is_null(&table.archived_on_column())?;
        if actor_id != 0 {
            if let Some(owner) = table.qualified_ownership_column() {
                set = set.eq(&owner, actor_id)?;
            }
        }
        Ok(set)
    }

    /// Final step of every operation: checks placeholder/argument parity,
    /// rewrites placeholders for the dialect and logs failures.
    pub(crate) fn finish(
        &self,
        table: &str,
        operation: &'static str,
        built: Result<(String, Vec<BindValue>)>,
    ) -> Result<(String, Vec<BindValue>)> {
        let (sql, args) = match built {
            Ok(built) => built,
            Err(err) => {
                let err = err.into_construction_error();
                self.log_query_building_error(table, operation, &err);
                return Err(err);
            }
        };

        let markers = count_placeholders(&sql, PlaceholderStyle::Question);
        if markers != args.len() {
            let err = ScopeQlError::QueryConstruction(format!(
                "{} on '{}' rendered {} placeholders for {} arguments",
                operation,
                table,
                markers,
                args.len()
            ));
            self.log_query_building_error(table, operation, &err);
            return Err(err);
        }

        let sql = render_placeholders(&sql, self.dialect.placeholder_style());
        trace!(table, operation, dialect = self.dialect.name(), args = args.len(), sql = %sql, "Built query");

        Ok((sql, args))
    }

    /// Like [`Self::finish`] for statements that bind nothing.
    pub(crate) fn finish_query_only(
        &self,
        table: &str,
        operation: &'static str,
        built: Result<(String, Vec<BindValue>)>,
    ) -> Result<String> {
        self.finish(table, operation, built).map(|(sql, _)| sql)
    }

    /// Construction errors only come from malformed internal calls, so each
    /// one is logged where it is raised with enough context to alert on.
    fn log_query_building_error(&self, table: &str, operation: &'static str, err: &ScopeQlError) {
        error!(
            table,
            operation,
            dialect = self.dialect.name(),
            query_error = true,
            error = %err,
            "Failed to build query"
        );
    }
}
