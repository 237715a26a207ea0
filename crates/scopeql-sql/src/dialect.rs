//! SQL dialect adapters.
//!
//! The query engine renders every statement with `?` markers and asks the
//! active [`Dialect`] for the handful of idioms that differ between backends:
//! the placeholder style, the "current time" expression written into
//! `last_updated_on`/`archived_on`, and the JSON-containment predicate used
//! by audit-log lookups.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::helpers::validate_identifier;
use crate::types::BindValue;
use crate::{Result, ScopeQlError};

/// How positional parameters are written in the final SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` for every parameter (MariaDB, SQLite)
    Question,
    /// `$1`, `$2`, ... (PostgreSQL)
    Dollar,
}

/// A rendered predicate fragment with the values it binds.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPredicate {
    /// SQL fragment written with `?` markers
    pub sql: String,
    /// Values for the markers in `sql`, in order
    pub args: Vec<BindValue>,
}

/// Strategy for the backend-specific parts of a statement.
///
/// Implementations must be stateless; a single adapter is shared by every
/// builder call on every thread.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Human-readable dialect name used in logs.
    fn name(&self) -> &'static str;

    /// Placeholder style for bound parameters.
    fn placeholder_style(&self) -> PlaceholderStyle;

    /// Expression evaluating to the current time in epoch seconds.
    fn current_timestamp_expr(&self) -> &'static str;

    /// Predicate testing whether the JSON document in `column` holds `value`
    /// under the top-level `key`.
    ///
    /// `column` is a qualified column name and `key` a plain identifier;
    /// both are validated before this is called.
    fn json_contains_predicate(&self, column: &str, key: &str, value: &BindValue) -> JsonPredicate;

    /// Suffix appended to INSERT statements so the new row ID comes back.
    fn insert_returning_suffix(&self) -> Option<&'static str> {
        None
    }
}

/// PostgreSQL: `$n` placeholders, `extract(epoch FROM NOW())`, `->` JSON access.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Dollar
    }

    fn current_timestamp_expr(&self) -> &'static str {
        "extract(epoch FROM NOW())"
    }

    fn json_contains_predicate(&self, column: &str, key: &str, value: &BindValue) -> JsonPredicate {
        JsonPredicate {
            sql: format!("{}->'{}' = ?", column, key),
            args: vec![value.clone()],
        }
    }

    fn insert_returning_suffix(&self) -> Option<&'static str> {
        Some("RETURNING id")
    }
}

/// MariaDB: `?` placeholders, `UNIX_TIMESTAMP()`, `JSON_CONTAINS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MariaDb;

impl Dialect for MariaDb {
    fn name(&self) -> &'static str {
        "mariadb"
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Question
    }

    fn current_timestamp_expr(&self) -> &'static str {
        "UNIX_TIMESTAMP()"
    }

    fn json_contains_predicate(&self, column: &str, key: &str, value: &BindValue) -> JsonPredicate {
        // JSON_CONTAINS compares against a JSON document, so the candidate
        // is bound as its JSON text rather than as a scalar.
        let candidate = match value {
            BindValue::Json(v) => v.to_string(),
            BindValue::Null => "null".to_string(),
            BindValue::Text(v) => serde_json::Value::String(v.clone()).to_string(),
            other => other.to_string(),
        };
        JsonPredicate {
            sql: format!("JSON_CONTAINS({}, ?, '$.{}')", column, key),
            args: vec![BindValue::Text(candidate)],
        }
    }
}

/// SQLite: `?` placeholders, `strftime('%s','now')`, `json_extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Question
    }

    fn current_timestamp_expr(&self) -> &'static str {
        "(strftime('%s','now'))"
    }

    fn json_contains_predicate(&self, column: &str, key: &str, value: &BindValue) -> JsonPredicate {
        JsonPredicate {
            sql: format!("json_extract({}, '$.{}') = ?", column, key),
            args: vec![value.clone()],
        }
    }
}

/// Configurable dialect selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    Postgres,
    #[serde(alias = "mysql")]
    MariaDb,
    Sqlite,
}

impl DialectKind {
    /// Returns the adapter implementing this dialect.
    pub fn adapter(self) -> Box<dyn Dialect> {
        match self {
            DialectKind::Postgres => Box::new(Postgres),
            DialectKind::MariaDb => Box::new(MariaDb),
            DialectKind::Sqlite => Box::new(Sqlite),
        }
    }
}

impl std::str::FromStr for DialectKind {
    type Err = ScopeQlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DialectKind::Postgres),
            "mariadb" | "mysql" => Ok(DialectKind::MariaDb),
            "sqlite" | "sqlite3" => Ok(DialectKind::Sqlite),
            other => Err(ScopeQlError::Configuration(format!(
                "Unknown SQL dialect '{}'",
                other
            ))),
        }
    }
}

/// Builds the dialect's JSON predicate after validating its identifiers.
pub(crate) fn checked_json_predicate(
    dialect: &dyn Dialect,
    column: &str,
    key: &str,
    value: &BindValue,
) -> Result<JsonPredicate> {
    validate_identifier(column)?;
    crate::query::helpers::validate_identifier_part(key)?;
    Ok(dialect.json_contains_predicate(column, key, value))
}

/// Rewrites `?` markers into the dialect's placeholder style.
///
/// Markers inside single-quoted literals are left alone.
pub fn render_placeholders(sql: &str, style: PlaceholderStyle) -> String {
    if style == PlaceholderStyle::Question {
        return sql.to_string();
    }

    let mut result = String::with_capacity(sql.len() + 8);
    let mut in_literal = false;
    let mut index = 0usize;

    for ch in sql.chars() {
        match ch {
            '\'' => {
                in_literal = !in_literal;
                result.push(ch);
            }
            '?' if !in_literal => {
                index += 1;
                result.push('$');
                result.push_str(&index.to_string());
            }
            _ => result.push(ch),
        }
    }

    result
}

/// Counts the positional placeholders in already-rendered SQL.
pub fn count_placeholders(sql: &str, style: PlaceholderStyle) -> usize {
    let mut in_literal = false;
    let mut count = 0usize;
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' => in_literal = !in_literal,
            '?' if !in_literal && style == PlaceholderStyle::Question => count += 1,
            '$' if !in_literal && style == PlaceholderStyle::Dollar => {
                if chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                    count += 1;
                    while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                        chars.next();
                    }
                }
            }
            _ => {}
        }
    }

    count
}
