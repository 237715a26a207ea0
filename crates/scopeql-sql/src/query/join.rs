//! JOIN clause types.

use crate::Result;
use super::helpers::validate_identifier_part;
use super::types::JoinType;

/// A join from a table descriptor's base table onto another table.
///
/// Renders as `JOIN <table> ON <table>.<column> = <base>.<references>`.
/// Only plain `column = column` conditions are expressible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinClause {
    /// Type of JOIN
    pub join_type: JoinType,
    /// Table to join
    pub table: &'static str,
    /// Column on the joined table
    pub column: &'static str,
    /// Column on the base table it must equal
    pub references: &'static str,
}

impl JoinClause {
    /// An inner join.
    pub const fn inner(table: &'static str, column: &'static str, references: &'static str) -> Self {
        Self {
            join_type: JoinType::Inner,
            table,
            column,
            references,
        }
    }

    /// Checks every identifier in the clause.
    pub fn validate(&self) -> Result<()> {
        validate_identifier_part(self.table)?;
        validate_identifier_part(self.column)?;
        validate_identifier_part(self.references)?;
        Ok(())
    }

    /// Generate SQL for the clause against `base_table`.
    pub fn to_sql(&self, base_table: &str) -> String {
        format!(
            "{} {} ON {}.{} = {}.{}",
            self.join_type.to_sql(),
            self.table,
            self.table,
            self.column,
            base_table,
            self.references
        )
    }
}
