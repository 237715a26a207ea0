//! Per-entity statement builders.
//!
//! Thin wrappers that bind an entity's table descriptor, ownership column
//! and input fields to the generic engine operations.

pub mod accounts;
pub mod api_clients;
pub mod audit_log;
pub mod items;
pub mod memberships;
pub mod users;
pub mod webhooks;

pub use accounts::{AccountCreationInput, AccountUpdateInput};
pub use api_clients::{ApiClientCreationInput, ApiClientUpdateInput};
pub use audit_log::AuditLogEntryCreationInput;
pub use items::{ItemCreationInput, ItemUpdateInput};
pub use memberships::AddUserToAccountInput;
pub use users::{UserCreationInput, UserReputationUpdateInput, UserUpdateInput};
pub use webhooks::{WebhookCreationInput, WebhookUpdateInput};
