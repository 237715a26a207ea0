//! Account statements. Accounts belong to the user who created them and are
//! read joined to their memberships.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::filter::QueryFilter;
use crate::query::{SqlQueryBuilder, UpdateBuilder};
use crate::tables::{ACCOUNTS, ACCOUNTS_UNJOINED, USER_OWNERSHIP_COLUMN};
use crate::types::BindValue;
use crate::Result;
use super::audit_log::ACCOUNT_ASSIGNMENT_KEY;

/// Fields needed to create an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCreationInput {
    pub name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    pub belongs_to_user: u64,
}

/// Replacement values for an existing account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdateInput {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    pub belongs_to_user: u64,
}

impl SqlQueryBuilder {
    /// The account with its memberships, if `user_id` owns it.
    pub fn build_get_account_query(&self, account_id: u64, user_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_get_by_id_query(&ACCOUNTS, account_id, user_id)
    }

    pub fn build_get_all_accounts_count_query(&self) -> Result<String> {
        self.build_all_count_query(&ACCOUNTS_UNJOINED)
    }

    pub fn build_get_batch_of_accounts_query(&self, begin_id: u64, end_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_batch_query(&ACCOUNTS_UNJOINED, begin_id, end_id)
    }

    /// A page of the user's accounts with their memberships.
    pub fn build_get_accounts_query(
        &self,
        user_id: u64,
        for_admin: bool,
        filter: Option<&QueryFilter>,
    ) -> Result<(String, Vec<BindValue>)> {
        self.build_list_query(&ACCOUNTS, user_id, for_admin, filter)
    }

    #[instrument(skip_all, fields(user_id = input.belongs_to_user))]
    pub fn build_create_account_query(&self, input: &AccountCreationInput) -> Result<(String, Vec<BindValue>)> {
        self.build_insert_query(
            &ACCOUNTS_UNJOINED,
            &[
                ("name", input.name.as_str().into()),
                ("contact_email", input.contact_email.as_str().into()),
                ("contact_phone", input.contact_phone.as_str().into()),
                (USER_OWNERSHIP_COLUMN, input.belongs_to_user.into()),
            ],
        )
    }

    #[instrument(skip_all, fields(account_id = input.id, user_id = input.belongs_to_user))]
    pub fn build_update_account_query(&self, input: &AccountUpdateInput) -> Result<(String, Vec<BindValue>)> {
        self.build_update_query(
            &ACCOUNTS_UNJOINED,
            &[
                ("name", input.name.as_str().into()),
                ("contact_email", input.contact_email.as_str().into()),
                ("contact_phone", input.contact_phone.as_str().into()),
            ],
            input.id,
            input.belongs_to_user,
        )
    }

    pub fn build_archive_account_query(&self, account_id: u64, user_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_archive_query(&ACCOUNTS_UNJOINED, account_id, user_id)
    }

    /// Hands a live account from `current_owner_id` to `new_owner_id`.
    #[instrument(skip(self))]
    pub fn build_transfer_account_ownership_query(
        &self,
        current_owner_id: u64,
        new_owner_id: u64,
        account_id: u64,
    ) -> Result<(String, Vec<BindValue>)> {
        let update = Self::mutation_scope(&ACCOUNTS_UNJOINED, account_id, current_owner_id).and_then(|scope| {
            Ok(UpdateBuilder::new(ACCOUNTS_UNJOINED.name)?
                .set(USER_OWNERSHIP_COLUMN, new_owner_id)?
                .filter(scope))
        });
        self.build_prepared_update(&ACCOUNTS_UNJOINED, "transfer_account_ownership", update)
    }

    pub fn build_get_audit_log_entries_for_account_query(&self, account_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_audit_log_entries_query(ACCOUNT_ASSIGNMENT_KEY, account_id)
    }
}
