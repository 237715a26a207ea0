//! INSERT and UPDATE statement builders.
//!
//! Mutations address a single table, so their columns are written
//! unqualified (`SET name = ?`, `WHERE id = ?`).

use crate::types::BindValue;
use crate::{Result, ScopeQlError};
use super::helpers::validate_identifier_part;
use super::predicate::PredicateSet;

/// Right-hand side of a `SET column = ...` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// A bound value
    Value(BindValue),
    /// An engine-built SQL expression with its own bound values
    Expr { sql: String, args: Vec<BindValue> },
}

/// UPDATE builder with parameter collection.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: String,
    assignments: Vec<(String, Assignment)>,
    predicates: PredicateSet,
}

impl UpdateBuilder {
    pub fn new(table: &str) -> Result<Self> {
        validate_identifier_part(table)?;
        Ok(Self {
            table: table.to_string(),
            assignments: Vec::new(),
            predicates: PredicateSet::new(),
        })
    }

    /// `SET column = ?`
    pub fn set(self, column: &str, value: impl Into<BindValue>) -> Result<Self> {
        self.assign(column, Assignment::Value(value.into()))
    }

    /// `SET column = <expr>`; `expr` must come from the engine or a dialect.
    pub(crate) fn set_expr(self, column: &str, sql: impl Into<String>, args: Vec<BindValue>) -> Result<Self> {
        self.assign(column, Assignment::Expr { sql: sql.into(), args })
    }

    /// Sets the WHERE predicates.
    pub fn filter(mut self, predicates: PredicateSet) -> Self {
        self.predicates = predicates;
        self
    }

    /// Builds the statement and returns (SQL, parameters).
    pub fn build(&self) -> Result<(String, Vec<BindValue>)> {
        if self.assignments.is_empty() {
            return Err(ScopeQlError::QueryConstruction(format!(
                "Cannot update '{}' with no values",
                self.table
            )));
        }

        let mut sql = format!("UPDATE {} SET ", self.table);
        let mut params = Vec::new();

        let set_parts: Vec<String> = self
            .assignments
            .iter()
            .map(|(column, assignment)| match assignment {
                Assignment::Value(value) => {
                    params.push(value.clone());
                    format!("{} = ?", column)
                }
                Assignment::Expr { sql, args } => {
                    params.extend(args.iter().cloned());
                    format!("{} = {}", column, sql)
                }
            })
            .collect();
        sql.push_str(&set_parts.join(", "));

        if let Some(where_sql) = self.predicates.render(&mut params) {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        Ok((sql, params))
    }

    fn assign(mut self, column: &str, assignment: Assignment) -> Result<Self> {
        validate_identifier_part(column)?;
        if self.assignments.iter().any(|(c, _)| c == column) {
            return Err(ScopeQlError::QueryConstruction(format!(
                "Column '{}' assigned twice in UPDATE of '{}'",
                column, self.table
            )));
        }
        self.assignments.push((column.to_string(), assignment));
        Ok(self)
    }
}

/// INSERT builder for a single row.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: String,
    columns: Vec<String>,
    values: Vec<BindValue>,
    returning: Option<&'static str>,
}

impl InsertBuilder {
    pub fn new(table: &str) -> Result<Self> {
        validate_identifier_part(table)?;
        Ok(Self {
            table: table.to_string(),
            columns: Vec::new(),
            values: Vec::new(),
            returning: None,
        })
    }

    /// Adds one column and its value.
    pub fn value(mut self, column: &str, value: impl Into<BindValue>) -> Result<Self> {
        validate_identifier_part(column)?;
        if self.columns.iter().any(|c| c == column) {
            return Err(ScopeQlError::QueryConstruction(format!(
                "Column '{}' inserted twice into '{}'",
                column, self.table
            )));
        }
        self.columns.push(column.to_string());
        self.values.push(value.into());
        Ok(self)
    }

    /// Appends a dialect suffix such as `RETURNING id`.
    pub(crate) fn returning(mut self, suffix: Option<&'static str>) -> Self {
        self.returning = suffix;
        self
    }

    /// Builds `INSERT INTO t (a,b) VALUES (?,?)`.
    pub fn build(&self) -> Result<(String, Vec<BindValue>)> {
        if self.columns.is_empty() {
            return Err(ScopeQlError::QueryConstruction(format!(
                "Cannot insert into '{}' with no values",
                self.table
            )));
        }

        let markers = vec!["?"; self.values.len()].join(",");
        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            self.columns.join(","),
            markers
        );

        if let Some(suffix) = self.returning {
            sql.push(' ');
            sql.push_str(suffix);
        }

        Ok((sql, self.values.clone()))
    }
}
