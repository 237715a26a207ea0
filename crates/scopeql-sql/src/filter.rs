//! Caller-supplied pagination, sorting and time-range filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::query::OrderDirection;

/// Pagination, sort and time-range options for list queries.
///
/// A missing page means page 1 and a missing page size means the builder's
/// configured default. Time bounds are exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryFilter {
    pub page: Option<u64>,
    #[serde(rename = "limit")]
    pub page_size: Option<u8>,
    pub sort_by: SortDirection,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
    pub include_archived: bool,
}

/// Sort direction for list results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl From<SortDirection> for OrderDirection {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Ascending => OrderDirection::Asc,
            SortDirection::Descending => OrderDirection::Desc,
        }
    }
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_page_size(mut self, page_size: u8) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_sort(mut self, sort_by: SortDirection) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn created_after(mut self, ts: DateTime<Utc>) -> Self {
        self.created_after = Some(ts);
        self
    }

    pub fn created_before(mut self, ts: DateTime<Utc>) -> Self {
        self.created_before = Some(ts);
        self
    }

    pub fn updated_after(mut self, ts: DateTime<Utc>) -> Self {
        self.updated_after = Some(ts);
        self
    }

    pub fn updated_before(mut self, ts: DateTime<Utc>) -> Self {
        self.updated_before = Some(ts);
        self
    }

    pub fn including_archived(mut self, include: bool) -> Self {
        self.include_archived = include;
        self
    }

    /// Effective 1-based page number.
    pub fn effective_page(&self) -> u64 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    /// Effective page size: zero or missing falls back to `default`, and
    /// anything above `max` is clamped.
    pub fn effective_page_size(&self, default: u8, max: u8) -> u8 {
        match self.page_size {
            Some(0) | None => default.min(max),
            Some(size) => size.min(max),
        }
    }

    /// `(LIMIT, OFFSET)` pair for this filter.
    pub fn limit_and_offset(&self, default: u8, max: u8) -> (u64, u64) {
        let limit = u64::from(self.effective_page_size(default, max));
        let offset = (self.effective_page() - 1).saturating_mul(limit);
        (limit, offset)
    }

    /// Returns true when any time bound is set.
    pub fn has_time_bounds(&self) -> bool {
        self.created_after.is_some()
            || self.created_before.is_some()
            || self.updated_after.is_some()
            || self.updated_before.is_some()
    }
}
