//! Item statements. Items belong to an account.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::filter::QueryFilter;
use crate::query::SqlQueryBuilder;
use crate::tables::{ACCOUNT_OWNERSHIP_COLUMN, ITEMS};
use crate::types::BindValue;
use crate::Result;
use super::audit_log::ITEM_ASSIGNMENT_KEY;

/// Fields needed to create an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCreationInput {
    pub name: String,
    pub details: String,
    pub belongs_to_account: u64,
}

/// Replacement values for an existing item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdateInput {
    pub id: u64,
    pub name: String,
    pub details: String,
    pub belongs_to_account: u64,
}

impl SqlQueryBuilder {
    pub fn build_item_exists_query(&self, item_id: u64, account_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_exists_by_id_query(&ITEMS, item_id, account_id)
    }

    pub fn build_get_item_query(&self, item_id: u64, account_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_get_by_id_query(&ITEMS, item_id, account_id)
    }

    pub fn build_get_all_items_count_query(&self) -> Result<String> {
        self.build_all_count_query(&ITEMS)
    }

    pub fn build_get_batch_of_items_query(&self, begin_id: u64, end_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_batch_query(&ITEMS, begin_id, end_id)
    }

    /// A page of the account's items. Admin callers see every account's.
    pub fn build_get_items_query(
        &self,
        account_id: u64,
        for_admin: bool,
        filter: Option<&QueryFilter>,
    ) -> Result<(String, Vec<BindValue>)> {
        self.build_list_query(&ITEMS, account_id, for_admin, filter)
    }

    /// The account's items with the given IDs, in the given order.
    pub fn build_get_items_with_ids_query(
        &self,
        account_id: u64,
        limit: u8,
        ids: &[u64],
        for_admin: bool,
    ) -> Result<(String, Vec<BindValue>)> {
        self.build_ordered_ids_query(&ITEMS, account_id, ids, limit, for_admin)
    }

    #[instrument(skip_all, fields(account_id = input.belongs_to_account))]
    pub fn build_create_item_query(&self, input: &ItemCreationInput) -> Result<(String, Vec<BindValue>)> {
        self.build_insert_query(
            &ITEMS,
            &[
                ("name", input.name.as_str().into()),
                ("details", input.details.as_str().into()),
                (ACCOUNT_OWNERSHIP_COLUMN, input.belongs_to_account.into()),
            ],
        )
    }

    #[instrument(skip_all, fields(item_id = input.id, account_id = input.belongs_to_account))]
    pub fn build_update_item_query(&self, input: &ItemUpdateInput) -> Result<(String, Vec<BindValue>)> {
        self.build_update_query(
            &ITEMS,
            &[
                ("name", input.name.as_str().into()),
                ("details", input.details.as_str().into()),
            ],
            input.id,
            input.belongs_to_account,
        )
    }

    pub fn build_archive_item_query(&self, item_id: u64, account_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_archive_query(&ITEMS, item_id, account_id)
    }

    pub fn build_get_audit_log_entries_for_item_query(&self, item_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_audit_log_entries_query(ITEM_ASSIGNMENT_KEY, item_id)
    }
}
