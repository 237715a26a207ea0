//! Audit log statements.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::instrument;

use crate::filter::QueryFilter;
use crate::query::{PredicateSet, SqlQueryBuilder, AUDIT_LOG_CONTEXT_COLUMN};
use crate::tables::{AUDIT_LOG, AUDIT_LOG_EVENT_TYPE_COLUMN};
use crate::types::BindValue;
use crate::Result;

/// Context key holding the ID of the item an event concerns.
pub const ITEM_ASSIGNMENT_KEY: &str = "item_id";
/// Context key holding the ID of the account an event concerns.
pub const ACCOUNT_ASSIGNMENT_KEY: &str = "account_id";
/// Context key holding the ID of the user an event concerns.
pub const USER_ASSIGNMENT_KEY: &str = "user_id";
/// Context key holding the database ID of the API client an event concerns.
pub const API_CLIENT_ASSIGNMENT_KEY: &str = "api_client_id";
/// Context key holding the ID of the webhook an event concerns.
pub const WEBHOOK_ASSIGNMENT_KEY: &str = "webhook_id";

/// A new audit log entry. `context` is stored as a JSON document whose keys
/// are the assignment keys above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntryCreationInput {
    pub event_type: String,
    pub context: JsonValue,
}

impl SqlQueryBuilder {
    /// A single audit log entry by ID.
    pub fn build_get_audit_log_entry_query(&self, entry_id: u64) -> Result<(String, Vec<BindValue>)> {
        match PredicateSet::new().eq(&AUDIT_LOG.id_column(), entry_id) {
            Ok(predicates) => self.build_select_query(&AUDIT_LOG, predicates),
            Err(err) => self.finish(AUDIT_LOG.name, "get_audit_log_entry", Err(err)),
        }
    }

    #[instrument(skip_all, fields(event_type = %input.event_type))]
    pub fn build_create_audit_log_entry_query(
        &self,
        input: &AuditLogEntryCreationInput,
    ) -> Result<(String, Vec<BindValue>)> {
        self.build_insert_query(
            &AUDIT_LOG,
            &[
                (AUDIT_LOG_EVENT_TYPE_COLUMN, input.event_type.as_str().into()),
                (AUDIT_LOG_CONTEXT_COLUMN, input.context.clone().into()),
            ],
        )
    }

    /// Count of all audit log entries.
    pub fn build_get_all_audit_log_entries_count_query(&self) -> Result<String> {
        self.build_all_count_query(&AUDIT_LOG)
    }

    /// A page of audit log entries. The log is global, so no actor scoping
    /// applies.
    pub fn build_get_audit_log_entries_query(
        &self,
        filter: Option<&QueryFilter>,
    ) -> Result<(String, Vec<BindValue>)> {
        self.build_list_query(&AUDIT_LOG, 0, false, filter)
    }

    /// A range of audit log entries by ID, for bulk export.
    pub fn build_get_batch_of_audit_log_entries_query(
        &self,
        begin_id: u64,
        end_id: u64,
    ) -> Result<(String, Vec<BindValue>)> {
        self.build_batch_query(&AUDIT_LOG, begin_id, end_id)
    }
}
