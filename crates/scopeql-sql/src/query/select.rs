//! Fluent SELECT statement builder.
//!
//! Output always uses `?` markers; the engine rewrites them into the active
//! dialect's placeholder style once the whole statement is assembled.

use crate::types::BindValue;
use crate::{Result, ScopeQlError};
use super::helpers::{validate_identifier, validate_identifier_part, EXISTENCE_PREFIX, EXISTENCE_SUFFIX};
use super::join::JoinClause;
use super::predicate::PredicateSet;
use super::types::OrderDirection;

/// One entry of the SELECT list.
#[derive(Debug, Clone, PartialEq)]
enum Projection {
    Column(String),
    Count(String),
    Subquery {
        sql: String,
        params: Vec<BindValue>,
        alias: String,
    },
}

/// An ORDER BY term: either a validated column or an engine-built expression.
#[derive(Debug, Clone, PartialEq)]
struct OrderTerm {
    expr: String,
    direction: Option<OrderDirection>,
}

/// SELECT builder with parameter collection.
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    table: String,
    projections: Vec<Projection>,
    joins: Vec<JoinClause>,
    predicates: PredicateSet,
    group_by: Vec<String>,
    order_by: Vec<OrderTerm>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectBuilder {
    /// Creates a new builder selecting from `table`.
    ///
    /// # Errors
    ///
    /// Returns error if the table name is invalid.
    pub fn new(table: &str) -> Result<Self> {
        validate_identifier_part(table)?;
        Ok(Self {
            table: table.to_string(),
            projections: Vec::new(),
            joins: Vec::new(),
            predicates: PredicateSet::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        })
    }

    /// Appends columns to the SELECT list.
    pub fn columns<S: AsRef<str>>(mut self, columns: &[S]) -> Result<Self> {
        for column in columns {
            validate_identifier(column.as_ref())?;
            self.projections.push(Projection::Column(column.as_ref().to_string()));
        }
        Ok(self)
    }

    /// Appends `COUNT(column)` to the SELECT list.
    pub fn count(mut self, column: &str) -> Result<Self> {
        validate_identifier(column)?;
        self.projections.push(Projection::Count(column.to_string()));
        Ok(self)
    }

    /// Appends `(sql) AS alias` to the SELECT list. `sql` must use `?` markers
    /// and `params` must match them.
    pub fn subquery(mut self, sql: String, params: Vec<BindValue>, alias: &str) -> Result<Self> {
        validate_identifier_part(alias)?;
        self.projections.push(Projection::Subquery {
            sql,
            params,
            alias: alias.to_string(),
        });
        Ok(self)
    }

    /// Adds JOIN clauses in order.
    pub fn joins(mut self, joins: &[JoinClause]) -> Result<Self> {
        for join in joins {
            join.validate()?;
            self.joins.push(*join);
        }
        Ok(self)
    }

    /// Sets the WHERE predicates.
    pub fn filter(mut self, predicates: PredicateSet) -> Self {
        self.predicates = predicates;
        self
    }

    /// Adds GROUP BY columns.
    pub fn group_by<S: AsRef<str>>(mut self, columns: &[S]) -> Result<Self> {
        for column in columns {
            validate_identifier(column.as_ref())?;
            self.group_by.push(column.as_ref().to_string());
        }
        Ok(self)
    }

    /// Adds an ORDER BY column.
    pub fn order_by(mut self, column: &str, direction: OrderDirection) -> Result<Self> {
        validate_identifier(column)?;
        self.order_by.push(OrderTerm {
            expr: column.to_string(),
            direction: Some(direction),
        });
        Ok(self)
    }

    /// Adds an ORDER BY column with the backend's default direction.
    pub fn order_by_column(mut self, column: &str) -> Result<Self> {
        validate_identifier(column)?;
        self.order_by.push(OrderTerm {
            expr: column.to_string(),
            direction: None,
        });
        Ok(self)
    }

    /// Adds an engine-built ORDER BY expression. Never pass caller text here.
    pub(crate) fn order_by_expr(mut self, expr: String) -> Self {
        self.order_by.push(OrderTerm { expr, direction: None });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Builds the statement and returns (SQL, parameters).
    ///
    /// Parameters are ordered as their markers appear: SELECT-list subqueries
    /// first, then WHERE terms. LIMIT and OFFSET are rendered as literals.
    pub fn build(&self) -> Result<(String, Vec<BindValue>)> {
        if self.projections.is_empty() {
            return Err(ScopeQlError::QueryConstruction(format!(
                "SELECT from '{}' has no columns",
                self.table
            )));
        }

        let mut sql = String::from("SELECT ");
        let mut params = Vec::new();

        let select_parts: Vec<String> = self
            .projections
            .iter()
            .map(|projection| match projection {
                Projection::Column(column) => column.clone(),
                Projection::Count(column) => format!("COUNT({})", column),
                Projection::Subquery { sql, params: sub_params, alias } => {
                    params.extend(sub_params.iter().cloned());
                    format!("({}) AS {}", sql, alias)
                }
            })
            .collect();
        sql.push_str(&select_parts.join(", "));

        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_sql(&self.table));
        }

        if let Some(where_sql) = self.predicates.render(&mut params) {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            let order_parts: Vec<String> = self
                .order_by
                .iter()
                .map(|term| match term.direction {
                    Some(direction) => format!("{} {}", term.expr, direction.to_sql()),
                    None => term.expr.clone(),
                })
                .collect();
            sql.push_str(&order_parts.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        Ok((sql, params))
    }

    /// Builds `SELECT EXISTS ( <statement> )`.
    pub fn build_exists(&self) -> Result<(String, Vec<BindValue>)> {
        let (inner, params) = self.build()?;
        Ok((format!("{} {} {}", EXISTENCE_PREFIX, inner, EXISTENCE_SUFFIX), params))
    }
}
