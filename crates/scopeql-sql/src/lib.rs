//! Parameterized SQL construction for multi-tenant, soft-deleting data stores.
//!
//! This crate turns service-level intent ("the items of account 42, page 3,
//! newest first") into a SQL string plus an ordered argument list that a
//! database driver can execute unmodified. It never touches a connection.
//!
//! # Architecture
//!
//! ```text
//! Service layer (entity wrappers: build_get_items_query, ...)
//!           |
//!    Query engine (list / count / existence / ordered-ID / mutations)
//!           |
//!    Dialect adapter (PostgreSQL, MariaDB, SQLite)
//!           |
//!    (sql, args) -> driver
//! ```
//!
//! # Key Features
//!
//! - **Tenant scoping**: every non-admin read is limited to the actor's rows
//!   through the table's ownership column.
//! - **Soft deletes**: rows are archived, never deleted, and archived rows are
//!   hidden unless an admin asks for them.
//! - **Single round-trip pagination**: list queries embed filtered and total
//!   row counts as scalar subqueries.
//! - **Deterministic output**: equality predicates render in sorted column
//!   order, so the same input always yields the same SQL and argument order.
//! - **Validated identifiers**: table and column names are checked before
//!   they reach SQL text; values are always bound.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use scopeql_sql::{BuilderConfig, DialectKind, QueryFilter, SortDirection, SqlQueryBuilder};
//!
//! let builder = SqlQueryBuilder::new(BuilderConfig::for_dialect(DialectKind::Postgres))?;
//!
//! let filter = QueryFilter::new().with_page(2).with_sort(SortDirection::Descending);
//! let (sql, args) = builder.build_get_items_query(42, false, Some(&filter))?;
//!
//! let (sql, args) = builder.build_item_exists_query(7, 42)?;
//! ```

pub mod config;
pub mod dialect;
pub mod entities;
pub mod filter;
pub mod query;
pub mod tables;
pub mod types;

pub use config::{BuilderConfig, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use dialect::{Dialect, DialectKind, JsonPredicate, MariaDb, PlaceholderStyle, Postgres, Sqlite};
pub use filter::{QueryFilter, SortDirection};
pub use query::{
    JoinClause, OrderDirection, PredicateSet, SelectBuilder, SqlQueryBuilder, TableDescriptor,
};
pub use types::BindValue;

// Re-export from common
pub use scopeql_common::{Result, ScopeQlError};
