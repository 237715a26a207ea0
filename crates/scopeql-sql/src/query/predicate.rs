//! Append-only WHERE predicate sets.
//!
//! Equality-style predicates (`=`, `IN`, `IS NULL`) are keyed by column and
//! always render in sorted column order; every other term renders after them
//! in the order it was added. The same logical input therefore always yields
//! the same SQL text and the same argument order.
//!
//! Sets are values: every method consumes `self` and returns the extended
//! set, so a base set can be cloned and extended independently for the
//! total count, the filtered count and the outer query.

use std::collections::BTreeMap;

use crate::filter::QueryFilter;
use crate::types::BindValue;
use crate::{Result, ScopeQlError};
use super::helpers::{validate_identifier, CREATED_ON_COLUMN, LAST_UPDATED_ON_COLUMN};
use super::table::TableDescriptor;
use super::types::Operator;

#[derive(Debug, Clone, PartialEq)]
enum Equality {
    Null,
    Value(BindValue),
    AnyOf(Vec<BindValue>),
}

#[derive(Debug, Clone, PartialEq)]
enum Term {
    Compare {
        column: String,
        operator: Operator,
        value: BindValue,
    },
    Raw {
        sql: String,
        args: Vec<BindValue>,
    },
    Never,
}

/// An immutable conjunction of WHERE predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateSet {
    equalities: BTreeMap<String, Equality>,
    terms: Vec<Term>,
}

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column IS NULL`
    pub fn is_null(self, column: &str) -> Result<Self> {
        self.insert_equality(column, Equality::Null)
    }

    /// `column = ?`
    pub fn eq(self, column: &str, value: impl Into<BindValue>) -> Result<Self> {
        let value = value.into();
        if value.is_null() {
            return self.is_null(column);
        }
        self.insert_equality(column, Equality::Value(value))
    }

    /// `column IN (?,?,...)`; the list must not be empty.
    pub fn eq_any(self, column: &str, values: Vec<BindValue>) -> Result<Self> {
        if values.is_empty() {
            return Err(ScopeQlError::QueryConstruction(format!(
                "IN predicate on '{}' requires at least one value",
                column
            )));
        }
        self.insert_equality(column, Equality::AnyOf(values))
    }

    /// `column > ?`
    pub fn gt(self, column: &str, value: impl Into<BindValue>) -> Result<Self> {
        self.push_comparison(column, Operator::Gt, value.into())
    }

    /// `column < ?`
    pub fn lt(self, column: &str, value: impl Into<BindValue>) -> Result<Self> {
        self.push_comparison(column, Operator::Lt, value.into())
    }

    /// `column LIKE ?`. Wildcards in `pattern` are passed through as given.
    pub fn like(self, column: &str, pattern: impl Into<String>) -> Result<Self> {
        self.push_comparison(column, Operator::Like, BindValue::Text(pattern.into()))
    }

    /// A pre-rendered fragment written with `?` markers.
    pub(crate) fn raw(mut self, sql: String, args: Vec<BindValue>) -> Self {
        self.terms.push(Term::Raw { sql, args });
        self
    }

    /// A predicate no row satisfies.
    pub fn never(mut self) -> Self {
        self.terms.push(Term::Never);
        self
    }

    /// Adds the filter's exclusive time bounds on `created_on` and
    /// `last_updated_on`.
    pub fn with_time_range(self, table: &TableDescriptor, filter: &QueryFilter) -> Result<Self> {
        let created_on = table.qualified(CREATED_ON_COLUMN);
        let updated_on = table.qualified(LAST_UPDATED_ON_COLUMN);

        let mut set = self;
        if let Some(ts) = filter.created_after {
            set = set.gt(&created_on, ts)?;
        }
        if let Some(ts) = filter.created_before {
            set = set.lt(&created_on, ts)?;
        }
        if let Some(ts) = filter.updated_after {
            set = set.gt(&updated_on, ts)?;
        }
        if let Some(ts) = filter.updated_before {
            set = set.lt(&updated_on, ts)?;
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.equalities.is_empty() && self.terms.is_empty()
    }

    /// Number of individual predicates in the set.
    pub fn len(&self) -> usize {
        self.equalities.len() + self.terms.len()
    }

    /// Returns true if some predicate constrains `column`.
    pub fn constrains(&self, column: &str) -> bool {
        self.equalities.contains_key(column)
            || self.terms.iter().any(|t| matches!(t, Term::Compare { column: c, .. } if c == column))
    }

    /// Renders the conjunction with `?` markers, appending bound values to
    /// `params`. Returns `None` for an empty set.
    pub fn render(&self, params: &mut Vec<BindValue>) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let mut parts = Vec::with_capacity(self.len());

        for (column, equality) in &self.equalities {
            match equality {
                Equality::Null => {
                    parts.push(format!("{} {}", column, Operator::IsNull.to_sql()));
                }
                Equality::Value(value) => {
                    params.push(value.clone());
                    parts.push(format!("{} {} ?", column, Operator::Eq.to_sql()));
                }
                Equality::AnyOf(values) => {
                    params.extend(values.iter().cloned());
                    let markers = vec!["?"; values.len()].join(",");
                    parts.push(format!("{} {} ({})", column, Operator::In.to_sql(), markers));
                }
            }
        }

        for term in &self.terms {
            match term {
                Term::Compare { column, operator, value } => {
                    params.push(value.clone());
                    parts.push(format!("{} {} ?", column, operator.to_sql()));
                }
                Term::Raw { sql, args } => {
                    params.extend(args.iter().cloned());
                    parts.push(sql.clone());
                }
                Term::Never => parts.push("1 = 0".to_string()),
            }
        }

        Some(parts.join(" AND "))
    }

    fn insert_equality(mut self, column: &str, equality: Equality) -> Result<Self> {
        validate_identifier(column)?;

        if let Some(existing) = self.equalities.get(column) {
            if *existing != equality {
                return Err(ScopeQlError::QueryConstruction(format!(
                    "Conflicting predicates for column '{}'",
                    column
                )));
            }
            return Ok(self);
        }

        self.equalities.insert(column.to_string(), equality);
        Ok(self)
    }

    fn push_comparison(mut self, column: &str, operator: Operator, value: BindValue) -> Result<Self> {
        validate_identifier(column)?;
        if value.is_null() {
            return Err(ScopeQlError::QueryConstruction(format!(
                "Cannot compare '{}' {} NULL",
                column,
                operator.to_sql()
            )));
        }
        self.terms.push(Term::Compare {
            column: column.to_string(),
            operator,
            value,
        });
        Ok(self)
    }
}
