//! Query construction engine.
//!
//! Statements are assembled from small validated pieces ([`PredicateSet`],
//! [`SelectBuilder`], [`UpdateBuilder`], [`InsertBuilder`]) written with `?`
//! markers, then finished by [`SqlQueryBuilder`], which checks that markers
//! and arguments line up and rewrites the markers for the active dialect.
//!
//! # Examples
//!
//! ## List Query
//!
//! ```ignore
//! use scopeql_sql::{tables, BuilderConfig, QueryFilter, SqlQueryBuilder};
//!
//! let builder = SqlQueryBuilder::new(BuilderConfig::default())?;
//! let filter = QueryFilter::new().with_page(10);
//! let (sql, args) = builder.build_list_query(&tables::ITEMS, 42, false, Some(&filter))?;
//! // ... WHERE items.archived_on IS NULL AND items.belongs_to_account = $3
//! //     GROUP BY items.id ORDER BY items.id ASC LIMIT 20 OFFSET 180
//! ```
//!
//! ## Existence Query
//!
//! ```ignore
//! use scopeql_sql::{tables, BuilderConfig, DialectKind, SqlQueryBuilder};
//!
//! let builder = SqlQueryBuilder::new(BuilderConfig::for_dialect(DialectKind::MariaDb))?;
//! let (sql, args) = builder.build_exists_by_id_query(&tables::ITEMS, 7, 42)?;
//! // Result: "SELECT EXISTS ( SELECT items.id FROM items WHERE items.archived_on IS NULL
//! //          AND items.belongs_to_account = ? AND items.id = ? )", args [42, 7]
//! ```

mod types;
mod join;
pub(crate) mod helpers;
mod predicate;
mod table;
mod select;
mod modify;
mod builder;
mod count;
mod list;
mod existence;
mod ordered;
mod lookup;
mod mutation;

#[cfg(test)]
mod tests;

// Re-export all public types
pub use types::{Operator, OrderDirection, JoinType};
pub use join::JoinClause;
pub use predicate::PredicateSet;
pub use table::TableDescriptor;
pub use select::SelectBuilder;
pub use modify::{Assignment, InsertBuilder, UpdateBuilder};
pub use builder::SqlQueryBuilder;
pub use list::{FILTERED_COUNT_ALIAS, TOTAL_COUNT_ALIAS};
pub use lookup::AUDIT_LOG_CONTEXT_COLUMN;
pub use helpers::{
    qualify, validate_identifier, ARCHIVED_ON_COLUMN, CREATED_ON_COLUMN, ID_COLUMN,
    LAST_UPDATED_ON_COLUMN,
};
