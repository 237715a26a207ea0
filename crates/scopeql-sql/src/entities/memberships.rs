//! Account membership statements.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::query::{
    JoinClause, PredicateSet, SelectBuilder, SqlQueryBuilder, TableDescriptor, UpdateBuilder,
    ARCHIVED_ON_COLUMN, LAST_UPDATED_ON_COLUMN,
};
use crate::tables::{
    ACCOUNTS, ACCOUNTS_TABLE, ACCOUNT_OWNERSHIP_COLUMN, ACCOUNT_USER_MEMBERSHIPS,
    MEMBERSHIPS_ACCOUNT_ROLES_COLUMN, MEMBERSHIPS_DEFAULT_ACCOUNT_COLUMN, MEMBERSHIPS_TABLE,
    USER_OWNERSHIP_COLUMN,
};
use crate::types::BindValue;
use crate::Result;

/// Role granted to the creator of a new account.
pub const ACCOUNT_ADMIN_ROLE: &str = "account_admin";

/// Separator for the roles column, which is stored as text.
const ROLE_SEPARATOR: &str = ",";

/// A user invited into an existing account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserToAccountInput {
    pub user_id: u64,
    #[serde(default)]
    pub account_roles: Vec<String>,
}

/// Memberships joined to the name of the account they grant.
const MEMBERSHIPS_WITH_ACCOUNT_NAME: TableDescriptor = TableDescriptor::new(
    MEMBERSHIPS_TABLE,
    &[
        "account_user_memberships.id",
        "account_user_memberships.belongs_to_user",
        "account_user_memberships.belongs_to_account",
        "account_user_memberships.account_roles",
        "account_user_memberships.default_account",
        "account_user_memberships.created_on",
        "account_user_memberships.last_updated_on",
        "account_user_memberships.archived_on",
        "accounts.name",
    ],
)
.owned_by(USER_OWNERSHIP_COLUMN)
.with_joins(MEMBERSHIP_ACCOUNT_JOINS);

const MEMBERSHIP_ACCOUNT_JOINS: &[JoinClause] =
    &[JoinClause::inner(ACCOUNTS_TABLE, "id", ACCOUNT_OWNERSHIP_COLUMN)];

impl SqlQueryBuilder {
    /// Every live membership the user holds, with the account names.
    #[instrument(skip(self))]
    pub fn build_get_account_memberships_for_user_query(&self, user_id: u64) -> Result<(String, Vec<BindValue>)> {
        let table = &MEMBERSHIPS_WITH_ACCOUNT_NAME;
        match PredicateSet::new().eq(&table.qualified(USER_OWNERSHIP_COLUMN), user_id) {
            Ok(predicates) => self.build_get_query(table, predicates),
            Err(err) => self.finish(table.name, "get_memberships_for_user", Err(err)),
        }
    }

    /// Whether the user holds a live membership in the account.
    #[instrument(skip(self))]
    pub fn build_user_is_member_of_account_query(
        &self,
        user_id: u64,
        account_id: u64,
    ) -> Result<(String, Vec<BindValue>)> {
        let table = &ACCOUNT_USER_MEMBERSHIPS;
        let predicates = PredicateSet::new()
            .eq(&table.qualified(ACCOUNT_OWNERSHIP_COLUMN), account_id)
            .and_then(|set| set.eq(&table.qualified(USER_OWNERSHIP_COLUMN), user_id));
        match predicates {
            Ok(predicates) => self.build_exists_query(table, predicates),
            Err(err) => self.finish(table.name, "user_is_member", Err(err)),
        }
    }

    /// The ID of the account the user marked as default.
    #[instrument(skip(self))]
    pub fn build_get_default_account_id_for_user_query(&self, user_id: u64) -> Result<(String, Vec<BindValue>)> {
        let memberships = &ACCOUNT_USER_MEMBERSHIPS;
        let built = PredicateSet::new()
            .eq(&memberships.qualified(USER_OWNERSHIP_COLUMN), user_id)
            .and_then(|set| set.eq(&memberships.qualified(MEMBERSHIPS_DEFAULT_ACCOUNT_COLUMN), true))
            .and_then(|predicates| {
                SelectBuilder::new(ACCOUNTS.name)?
                    .columns(&[ACCOUNTS.id_column()])?
                    .joins(ACCOUNTS.joins)?
                    .filter(predicates)
                    .build()
            });
        self.finish(ACCOUNTS.name, "get_default_account_id", built)
    }

    /// Makes `account_id` the user's only default account: every live
    /// membership of the user gets `default_account` set to whether it is
    /// the membership for that account.
    #[instrument(skip(self))]
    pub fn build_mark_account_as_user_default_query(
        &self,
        user_id: u64,
        account_id: u64,
    ) -> Result<(String, Vec<BindValue>)> {
        let update = mark_default_update(user_id, account_id);
        self.build_prepared_update(&ACCOUNT_USER_MEMBERSHIPS, "mark_default_account", update)
    }

    /// Archives every live membership the user holds.
    #[instrument(skip(self))]
    pub fn build_archive_account_memberships_for_user_query(&self, user_id: u64) -> Result<(String, Vec<BindValue>)> {
        let now = self.dialect().current_timestamp_expr();
        let update = live_memberships_of(user_id).and_then(|scope| {
            Ok(UpdateBuilder::new(MEMBERSHIPS_TABLE)?
                .set_expr(ARCHIVED_ON_COLUMN, now, Vec::new())?
                .filter(scope))
        });
        self.build_prepared_update(&ACCOUNT_USER_MEMBERSHIPS, "archive_memberships_for_user", update)
    }

    /// First membership of a new user: default account, admin role.
    #[instrument(skip(self))]
    pub fn build_create_membership_for_new_user_query(
        &self,
        user_id: u64,
        account_id: u64,
    ) -> Result<(String, Vec<BindValue>)> {
        self.build_insert_query(
            &ACCOUNT_USER_MEMBERSHIPS,
            &[
                (USER_OWNERSHIP_COLUMN, user_id.into()),
                (ACCOUNT_OWNERSHIP_COLUMN, account_id.into()),
                (MEMBERSHIPS_DEFAULT_ACCOUNT_COLUMN, true.into()),
                (MEMBERSHIPS_ACCOUNT_ROLES_COLUMN, ACCOUNT_ADMIN_ROLE.into()),
            ],
        )
    }

    #[instrument(skip(self, input), fields(user_id = input.user_id))]
    pub fn build_add_user_to_account_query(
        &self,
        account_id: u64,
        input: &AddUserToAccountInput,
    ) -> Result<(String, Vec<BindValue>)> {
        self.build_insert_query(
            &ACCOUNT_USER_MEMBERSHIPS,
            &[
                (USER_OWNERSHIP_COLUMN, input.user_id.into()),
                (ACCOUNT_OWNERSHIP_COLUMN, account_id.into()),
                (MEMBERSHIPS_ACCOUNT_ROLES_COLUMN, input.account_roles.join(ROLE_SEPARATOR).into()),
            ],
        )
    }

    /// Archives the user's live membership of the account.
    #[instrument(skip(self))]
    pub fn build_remove_user_from_account_query(
        &self,
        user_id: u64,
        account_id: u64,
    ) -> Result<(String, Vec<BindValue>)> {
        let now = self.dialect().current_timestamp_expr();
        let update = membership_of(user_id, account_id).and_then(|scope| {
            Ok(UpdateBuilder::new(MEMBERSHIPS_TABLE)?
                .set_expr(LAST_UPDATED_ON_COLUMN, now, Vec::new())?
                .set_expr(ARCHIVED_ON_COLUMN, now, Vec::new())?
                .filter(scope))
        });
        self.build_prepared_update(&ACCOUNT_USER_MEMBERSHIPS, "remove_user_from_account", update)
    }

    /// Replaces the roles the user holds in the account.
    #[instrument(skip(self, roles))]
    pub fn build_modify_user_permissions_query(
        &self,
        user_id: u64,
        account_id: u64,
        roles: &[String],
    ) -> Result<(String, Vec<BindValue>)> {
        let now = self.dialect().current_timestamp_expr();
        let update = membership_of(user_id, account_id).and_then(|scope| {
            Ok(UpdateBuilder::new(MEMBERSHIPS_TABLE)?
                .set(MEMBERSHIPS_ACCOUNT_ROLES_COLUMN, roles.join(ROLE_SEPARATOR))?
                .set_expr(LAST_UPDATED_ON_COLUMN, now, Vec::new())?
                .filter(scope))
        });
        self.build_prepared_update(&ACCOUNT_USER_MEMBERSHIPS, "modify_user_permissions", update)
    }

    /// Moves the current owner's live membership of an account to the new
    /// owner, alongside an ownership transfer.
    #[instrument(skip(self))]
    pub fn build_transfer_account_memberships_query(
        &self,
        current_owner_id: u64,
        new_owner_id: u64,
        account_id: u64,
    ) -> Result<(String, Vec<BindValue>)> {
        let update = membership_of(current_owner_id, account_id).and_then(|scope| {
            Ok(UpdateBuilder::new(MEMBERSHIPS_TABLE)?
                .set(USER_OWNERSHIP_COLUMN, new_owner_id)?
                .filter(scope))
        });
        self.build_prepared_update(&ACCOUNT_USER_MEMBERSHIPS, "transfer_account_memberships", update)
    }
}

/// `archived_on IS NULL AND belongs_to_user = ?`, unqualified for UPDATEs.
fn live_memberships_of(user_id: u64) -> Result<PredicateSet> {
    PredicateSet::new()
        .eq(USER_OWNERSHIP_COLUMN, user_id)?
        .is_null(ARCHIVED_ON_COLUMN)
}

/// The user's live membership of one account, unqualified for UPDATEs.
fn membership_of(user_id: u64, account_id: u64) -> Result<PredicateSet> {
    live_memberships_of(user_id)?.eq(ACCOUNT_OWNERSHIP_COLUMN, account_id)
}

fn mark_default_update(user_id: u64, account_id: u64) -> Result<UpdateBuilder> {
    let mut condition_args = Vec::new();
    let condition = PredicateSet::new()
        .eq(USER_OWNERSHIP_COLUMN, user_id)?
        .eq(ACCOUNT_OWNERSHIP_COLUMN, account_id)?
        .render(&mut condition_args)
        .unwrap_or_default();

    Ok(UpdateBuilder::new(MEMBERSHIPS_TABLE)?
        .set_expr(MEMBERSHIPS_DEFAULT_ACCOUNT_COLUMN, format!("({})", condition), condition_args)?
        .filter(live_memberships_of(user_id)?))
}
