//! API client statements. Clients belong to a user.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::filter::QueryFilter;
use crate::query::{PredicateSet, SqlQueryBuilder};
use crate::tables::{API_CLIENTS, API_CLIENTS_CLIENT_ID_COLUMN, USER_OWNERSHIP_COLUMN};
use crate::types::BindValue;
use crate::Result;
use super::audit_log::API_CLIENT_ASSIGNMENT_KEY;

/// Fields needed to register an API client. `secret_key` is stored as
/// given; hashing it is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiClientCreationInput {
    pub name: String,
    pub client_id: String,
    pub secret_key: String,
    pub belongs_to_user: u64,
}

/// Replacement values for an existing API client. The secret is never
/// rewritten in place; rotate it by registering a new client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiClientUpdateInput {
    pub id: u64,
    pub name: String,
    pub client_id: String,
    pub belongs_to_user: u64,
}

impl SqlQueryBuilder {
    pub fn build_get_api_client_by_database_id_query(
        &self,
        client_id: u64,
        user_id: u64,
    ) -> Result<(String, Vec<BindValue>)> {
        self.build_get_by_id_query(&API_CLIENTS, client_id, user_id)
    }

    /// Lookup by the public client ID used during authentication; not scoped
    /// to a user because the caller is not known yet.
    #[instrument(skip_all)]
    pub fn build_get_api_client_by_client_id_query(&self, client_id: &str) -> Result<(String, Vec<BindValue>)> {
        match PredicateSet::new().eq(&API_CLIENTS.qualified(API_CLIENTS_CLIENT_ID_COLUMN), client_id) {
            Ok(predicates) => self.build_get_query(&API_CLIENTS, predicates),
            Err(err) => self.finish(API_CLIENTS.name, "get_api_client_by_client_id", Err(err)),
        }
    }

    pub fn build_get_api_clients_query(
        &self,
        user_id: u64,
        filter: Option<&QueryFilter>,
    ) -> Result<(String, Vec<BindValue>)> {
        self.build_list_query(&API_CLIENTS, user_id, false, filter)
    }

    pub fn build_get_all_api_clients_count_query(&self) -> Result<String> {
        self.build_all_count_query(&API_CLIENTS)
    }

    pub fn build_get_batch_of_api_clients_query(&self, begin_id: u64, end_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_batch_query(&API_CLIENTS, begin_id, end_id)
    }

    #[instrument(skip_all, fields(user_id = input.belongs_to_user))]
    pub fn build_create_api_client_query(&self, input: &ApiClientCreationInput) -> Result<(String, Vec<BindValue>)> {
        self.build_insert_query(
            &API_CLIENTS,
            &[
                ("name", input.name.as_str().into()),
                (API_CLIENTS_CLIENT_ID_COLUMN, input.client_id.as_str().into()),
                ("secret_key", input.secret_key.as_str().into()),
                (USER_OWNERSHIP_COLUMN, input.belongs_to_user.into()),
            ],
        )
    }

    #[instrument(skip_all, fields(client_id = input.id, user_id = input.belongs_to_user))]
    pub fn build_update_api_client_query(&self, input: &ApiClientUpdateInput) -> Result<(String, Vec<BindValue>)> {
        self.build_update_query(
            &API_CLIENTS,
            &[
                ("name", input.name.as_str().into()),
                (API_CLIENTS_CLIENT_ID_COLUMN, input.client_id.as_str().into()),
            ],
            input.id,
            input.belongs_to_user,
        )
    }

    pub fn build_archive_api_client_query(&self, client_id: u64, user_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_archive_query(&API_CLIENTS, client_id, user_id)
    }

    pub fn build_get_audit_log_entries_for_api_client_query(&self, client_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_audit_log_entries_query(API_CLIENT_ASSIGNMENT_KEY, client_id)
    }
}
