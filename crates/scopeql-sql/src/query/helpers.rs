//! Query builder helper functions.

use crate::{Result, ScopeQlError};
use unicode_normalization::UnicodeNormalization;

/// Column every table uses for its sequential primary key.
pub const ID_COLUMN: &str = "id";
/// Row creation time, epoch seconds.
pub const CREATED_ON_COLUMN: &str = "created_on";
/// Latest update time, epoch seconds.
pub const LAST_UPDATED_ON_COLUMN: &str = "last_updated_on";
/// Archive (soft delete) time; NULL while the row is live.
pub const ARCHIVED_ON_COLUMN: &str = "archived_on";

pub(crate) const EXISTENCE_PREFIX: &str = "SELECT EXISTS (";
pub(crate) const EXISTENCE_SUFFIX: &str = ")";

/// Qualifies a column with its table: `items` + `id` -> `items.id`.
pub fn qualify(table: &str, column: &str) -> String {
    format!("{}.{}", table, column)
}

/// Validates a SQL identifier (table/column name).
///
/// Supports both simple identifiers and qualified names (e.g., "items.id").
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ScopeQlError::Validation("Identifier cannot be empty".to_string()));
    }

    if name.contains('.') {
        let parts: Vec<&str> = name.split('.').collect();

        if parts.len() != 2 {
            return Err(ScopeQlError::Validation(
                format!("Invalid qualified identifier '{}': must be in format 'table.column'", name)
            ));
        }

        for part in parts {
            validate_identifier_part(part)?;
        }

        return Ok(());
    }

    validate_identifier_part(name)
}

/// Validates a single part of an identifier (no dots allowed).
pub fn validate_identifier_part(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ScopeQlError::Validation("Identifier part cannot be empty".to_string()));
    }

    // Normalize to NFKC to prevent Unicode confusables
    let name = name.nfkc().collect::<String>();

    // 63 bytes is the tightest limit of the supported backends (PostgreSQL)
    if name.len() > 63 {
        return Err(ScopeQlError::Validation(
            format!("Identifier '{}' exceeds maximum length of 63", name)
        ));
    }

    let first_char = name.chars().next()
        .ok_or_else(|| ScopeQlError::Validation(
            format!("Identifier '{}' is empty or invalid", name)
        ))?;
    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(ScopeQlError::Validation(
            format!("Identifier '{}' must start with a letter or underscore", name)
        ));
    }

    for ch in name.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '_' {
            return Err(ScopeQlError::Validation(
                format!("Identifier '{}' contains invalid character '{}'", name, ch)
            ));
        }
    }

    const SQL_KEYWORDS: &[&str] = &[
        "select", "insert", "update", "delete", "drop", "create", "alter",
        "truncate", "grant", "revoke", "exec", "execute", "union", "declare",
        "table", "index", "view", "schema", "database",
        "from", "where", "join", "inner", "outer", "left", "right",
        "on", "using", "and", "or", "not", "in", "exists", "between",
        "like", "ilike", "is", "null", "true", "false", "case", "when",
        "then", "else", "end", "as", "order", "by", "group", "having",
        "limit", "offset", "distinct", "all", "any", "some",
    ];

    let name_lower = name.to_lowercase();
    if SQL_KEYWORDS.contains(&name_lower.as_str()) {
        return Err(ScopeQlError::Validation(
            format!("Identifier '{}' is a reserved SQL keyword", name)
        ));
    }

    Ok(())
}

/// Builds the `WHEN id THEN position ... END` tail of an ordering CASE.
///
/// Positions follow the slice order, so the caller's ranking survives.
pub fn build_when_then_statement(ids: &[u64]) -> String {
    let mut statement = ids
        .iter()
        .enumerate()
        .map(|(position, id)| format!("WHEN {} THEN {}", id, position))
        .collect::<Vec<_>>()
        .join(" ");

    if !statement.is_empty() {
        statement.push(' ');
    }
    statement.push_str("END");
    statement
}
