//! Table descriptors: the static metadata the engine scopes queries with.

use crate::Result;
use crate::ScopeQlError;
use super::helpers::{
    qualify, validate_identifier, validate_identifier_part, ARCHIVED_ON_COLUMN, ID_COLUMN,
};
use super::join::JoinClause;

/// Static description of one entity table.
///
/// Descriptors are `const` values handed to the engine per call; the engine
/// never owns or mutates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Table name
    pub name: &'static str,
    /// Foreign key scoping a row to its owner; `None` disables actor scoping
    pub ownership_column: Option<&'static str>,
    /// Projected columns, fully qualified (`items.id`), in output order
    pub columns: &'static [&'static str],
    /// Joins applied after FROM, in declaration order
    pub joins: &'static [JoinClause],
}

impl TableDescriptor {
    /// A descriptor with no ownership column and no joins.
    pub const fn new(name: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            name,
            ownership_column: None,
            columns,
            joins: &[],
        }
    }

    /// Scopes the table by `column`.
    pub const fn owned_by(mut self, column: &'static str) -> Self {
        self.ownership_column = Some(column);
        self
    }

    /// Attaches joins.
    pub const fn with_joins(mut self, joins: &'static [JoinClause]) -> Self {
        self.joins = joins;
        self
    }

    /// `<table>.<column>`
    pub fn qualified(&self, column: &str) -> String {
        qualify(self.name, column)
    }

    /// `<table>.id`
    pub fn id_column(&self) -> String {
        self.qualified(ID_COLUMN)
    }

    /// `<table>.archived_on`
    pub fn archived_on_column(&self) -> String {
        self.qualified(ARCHIVED_ON_COLUMN)
    }

    /// `<table>.<ownership column>`, if one is configured.
    pub fn qualified_ownership_column(&self) -> Option<String> {
        self.ownership_column
            .filter(|c| !c.is_empty())
            .map(|c| self.qualified(c))
    }

    /// Checks every identifier in the descriptor.
    pub fn validate(&self) -> Result<()> {
        validate_identifier_part(self.name)?;

        if let Some(column) = self.ownership_column.filter(|c| !c.is_empty()) {
            validate_identifier_part(column)?;
        }

        if self.columns.is_empty() {
            return Err(ScopeQlError::QueryConstruction(format!(
                "Table '{}' has no projected columns",
                self.name
            )));
        }

        for column in self.columns {
            validate_identifier(column)?;
        }

        for join in self.joins {
            join.validate()?;
        }

        Ok(())
    }
}
