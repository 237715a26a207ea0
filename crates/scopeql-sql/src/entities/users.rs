//! User statements. Users own nothing above them, so no actor scoping
//! applies to the users table itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::filter::QueryFilter;
use crate::query::{PredicateSet, SqlQueryBuilder, UpdateBuilder, LAST_UPDATED_ON_COLUMN};
use crate::tables::{
    USERS, USERS_HASHED_PASSWORD_COLUMN, USERS_REPUTATION_COLUMN, USERS_TABLE, USERS_USERNAME_COLUMN,
};
use crate::types::BindValue;
use crate::Result;
use super::audit_log::USER_ASSIGNMENT_KEY;

/// Reputation of a freshly registered user.
pub const UNVERIFIED_REPUTATION: &str = "unverified";
/// Reputation of a user in good standing.
pub const GOOD_STANDING_REPUTATION: &str = "good";
/// Reputation of a banned user.
pub const BANNED_REPUTATION: &str = "banned";
/// Service role every new user starts with.
pub const SERVICE_USER_ROLE: &str = "service_user";

/// Fields needed to register a user. The password arrives already hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreationInput {
    pub username: String,
    pub hashed_password: String,
    pub two_factor_secret: String,
}

/// Replacement values for an existing user's profile and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateInput {
    pub id: u64,
    pub username: String,
    pub hashed_password: String,
    #[serde(default)]
    pub avatar_src: Option<String>,
    pub two_factor_secret: String,
    #[serde(default)]
    pub two_factor_secret_verified_on: Option<DateTime<Utc>>,
}

/// A reputation change made by a service admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReputationUpdateInput {
    pub target_user_id: u64,
    pub new_reputation: String,
    pub reason: String,
}

impl SqlQueryBuilder {
    pub fn build_get_user_query(&self, user_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_get_by_id_query(&USERS, user_id, 0)
    }

    #[instrument(skip(self, username))]
    pub fn build_get_user_by_username_query(&self, username: &str) -> Result<(String, Vec<BindValue>)> {
        match PredicateSet::new().eq(&USERS.qualified(USERS_USERNAME_COLUMN), username) {
            Ok(predicates) => self.build_get_query(&USERS, predicates),
            Err(err) => self.finish(USERS.name, "get_user_by_username", Err(err)),
        }
    }

    /// Live users whose username starts with `username_query`.
    #[instrument(skip(self, username_query))]
    pub fn build_search_for_user_by_username_query(
        &self,
        username_query: &str,
    ) -> Result<(String, Vec<BindValue>)> {
        let pattern = format!("{}%", username_query);
        match PredicateSet::new().like(&USERS.qualified(USERS_USERNAME_COLUMN), pattern) {
            Ok(predicates) => self.build_get_query(&USERS, predicates),
            Err(err) => self.finish(USERS.name, "search_users_by_username", Err(err)),
        }
    }

    /// Whether the live user currently holds one of `statuses`. An empty
    /// list matches nobody.
    #[instrument(skip(self, statuses), fields(status_count = statuses.len()))]
    pub fn build_user_has_status_query(&self, user_id: u64, statuses: &[&str]) -> Result<(String, Vec<BindValue>)> {
        let predicates = PredicateSet::new().eq(&USERS.id_column(), user_id).and_then(|set| {
            if statuses.is_empty() {
                return Ok(set.never());
            }
            let values = statuses.iter().map(|status| BindValue::from(*status)).collect();
            set.eq_any(&USERS.qualified(USERS_REPUTATION_COLUMN), values)
        });
        match predicates {
            Ok(predicates) => self.build_exists_query(&USERS, predicates),
            Err(err) => self.finish(USERS.name, "user_has_status", Err(err)),
        }
    }

    /// A page of all live users.
    pub fn build_get_users_query(&self, filter: Option<&QueryFilter>) -> Result<(String, Vec<BindValue>)> {
        self.build_list_query(&USERS, 0, false, filter)
    }

    pub fn build_get_all_users_count_query(&self) -> Result<String> {
        self.build_all_count_query(&USERS)
    }

    pub fn build_get_batch_of_users_query(&self, begin_id: u64, end_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_batch_query(&USERS, begin_id, end_id)
    }

    /// New users start unverified with the plain service role.
    #[instrument(skip_all)]
    pub fn build_create_user_query(&self, input: &UserCreationInput) -> Result<(String, Vec<BindValue>)> {
        self.build_insert_query(
            &USERS,
            &[
                (USERS_USERNAME_COLUMN, input.username.as_str().into()),
                (USERS_HASHED_PASSWORD_COLUMN, input.hashed_password.as_str().into()),
                ("two_factor_secret", input.two_factor_secret.as_str().into()),
                (USERS_REPUTATION_COLUMN, UNVERIFIED_REPUTATION.into()),
                ("service_roles", SERVICE_USER_ROLE.into()),
            ],
        )
    }

    #[instrument(skip_all, fields(user_id = input.id))]
    pub fn build_update_user_query(&self, input: &UserUpdateInput) -> Result<(String, Vec<BindValue>)> {
        self.build_update_query(
            &USERS,
            &[
                (USERS_USERNAME_COLUMN, input.username.as_str().into()),
                (USERS_HASHED_PASSWORD_COLUMN, input.hashed_password.as_str().into()),
                ("avatar_src", input.avatar_src.clone().into()),
                ("two_factor_secret", input.two_factor_secret.as_str().into()),
                ("two_factor_secret_verified_on", input.two_factor_secret_verified_on.into()),
            ],
            input.id,
            0,
        )
    }

    /// Stores a new password hash and clears any forced password change.
    #[instrument(skip(self, new_hash))]
    pub fn build_update_user_password_query(&self, user_id: u64, new_hash: &str) -> Result<(String, Vec<BindValue>)> {
        let now = self.dialect().current_timestamp_expr();
        let update = Self::mutation_scope(&USERS, user_id, 0).and_then(|scope| {
            Ok(UpdateBuilder::new(USERS_TABLE)?
                .set(USERS_HASHED_PASSWORD_COLUMN, new_hash)?
                .set("requires_password_change", false)?
                .set_expr("password_last_changed_on", now, Vec::new())?
                .set_expr(LAST_UPDATED_ON_COLUMN, now, Vec::new())?
                .filter(scope))
        });
        self.build_prepared_update(&USERS, "update_user_password", update)
    }

    #[instrument(skip_all, fields(user_id = input.target_user_id))]
    pub fn build_set_user_status_query(&self, input: &UserReputationUpdateInput) -> Result<(String, Vec<BindValue>)> {
        self.build_update_query(
            &USERS,
            &[
                (USERS_REPUTATION_COLUMN, input.new_reputation.as_str().into()),
                ("reputation_explanation", input.reason.as_str().into()),
            ],
            input.target_user_id,
            0,
        )
    }

    pub fn build_archive_user_query(&self, user_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_archive_query(&USERS, user_id, 0)
    }

    pub fn build_get_audit_log_entries_for_user_query(&self, user_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_audit_log_entries_query(USER_ASSIGNMENT_KEY, user_id)
    }
}
