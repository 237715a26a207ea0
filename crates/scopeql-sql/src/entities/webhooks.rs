//! Webhook statements. Webhooks belong to an account.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::filter::QueryFilter;
use crate::query::SqlQueryBuilder;
use crate::tables::{ACCOUNT_OWNERSHIP_COLUMN, WEBHOOKS};
use crate::types::BindValue;
use crate::Result;
use super::audit_log::WEBHOOK_ASSIGNMENT_KEY;

/// Separator for the list-valued columns, which are stored as text.
const LIST_SEPARATOR: &str = ",";

/// Fields needed to create a webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookCreationInput {
    pub name: String,
    pub content_type: String,
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub data_types: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub belongs_to_account: u64,
}

/// Replacement values for an existing webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookUpdateInput {
    pub id: u64,
    pub name: String,
    pub content_type: String,
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub data_types: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub belongs_to_account: u64,
}

impl SqlQueryBuilder {
    pub fn build_get_webhook_query(&self, webhook_id: u64, account_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_get_by_id_query(&WEBHOOKS, webhook_id, account_id)
    }

    pub fn build_get_webhooks_query(
        &self,
        account_id: u64,
        filter: Option<&QueryFilter>,
    ) -> Result<(String, Vec<BindValue>)> {
        self.build_list_query(&WEBHOOKS, account_id, false, filter)
    }

    pub fn build_get_all_webhooks_count_query(&self) -> Result<String> {
        self.build_all_count_query(&WEBHOOKS)
    }

    pub fn build_get_batch_of_webhooks_query(&self, begin_id: u64, end_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_batch_query(&WEBHOOKS, begin_id, end_id)
    }

    #[instrument(skip_all, fields(account_id = input.belongs_to_account))]
    pub fn build_create_webhook_query(&self, input: &WebhookCreationInput) -> Result<(String, Vec<BindValue>)> {
        self.build_insert_query(
            &WEBHOOKS,
            &[
                ("name", input.name.as_str().into()),
                ("content_type", input.content_type.as_str().into()),
                ("url", input.url.as_str().into()),
                ("method", input.method.as_str().into()),
                ("events", input.events.join(LIST_SEPARATOR).into()),
                ("data_types", input.data_types.join(LIST_SEPARATOR).into()),
                ("topics", input.topics.join(LIST_SEPARATOR).into()),
                (ACCOUNT_OWNERSHIP_COLUMN, input.belongs_to_account.into()),
            ],
        )
    }

    #[instrument(skip_all, fields(webhook_id = input.id, account_id = input.belongs_to_account))]
    pub fn build_update_webhook_query(&self, input: &WebhookUpdateInput) -> Result<(String, Vec<BindValue>)> {
        self.build_update_query(
            &WEBHOOKS,
            &[
                ("name", input.name.as_str().into()),
                ("content_type", input.content_type.as_str().into()),
                ("url", input.url.as_str().into()),
                ("method", input.method.as_str().into()),
                ("events", input.events.join(LIST_SEPARATOR).into()),
                ("data_types", input.data_types.join(LIST_SEPARATOR).into()),
                ("topics", input.topics.join(LIST_SEPARATOR).into()),
            ],
            input.id,
            input.belongs_to_account,
        )
    }

    pub fn build_archive_webhook_query(&self, webhook_id: u64, account_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_archive_query(&WEBHOOKS, webhook_id, account_id)
    }

    pub fn build_get_audit_log_entries_for_webhook_query(&self, webhook_id: u64) -> Result<(String, Vec<BindValue>)> {
        self.build_audit_log_entries_query(WEBHOOK_ASSIGNMENT_KEY, webhook_id)
    }
}
