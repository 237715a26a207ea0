//! Table registry: one constant descriptor per entity table.
//!
//! Column lists are fully qualified and in the order rows are scanned.

use crate::query::{JoinClause, TableDescriptor};

pub const USER_OWNERSHIP_COLUMN: &str = "belongs_to_user";
pub const ACCOUNT_OWNERSHIP_COLUMN: &str = "belongs_to_account";

//
// Users
//

pub const USERS_TABLE: &str = "users";
pub const USERS_USERNAME_COLUMN: &str = "username";
pub const USERS_HASHED_PASSWORD_COLUMN: &str = "hashed_password";
pub const USERS_REPUTATION_COLUMN: &str = "reputation";

pub const USERS: TableDescriptor = TableDescriptor::new(
    USERS_TABLE,
    &[
        "users.id",
        "users.username",
        "users.avatar_src",
        "users.hashed_password",
        "users.requires_password_change",
        "users.password_last_changed_on",
        "users.two_factor_secret",
        "users.two_factor_secret_verified_on",
        "users.service_roles",
        "users.reputation",
        "users.reputation_explanation",
        "users.created_on",
        "users.last_updated_on",
        "users.archived_on",
    ],
);

//
// Accounts
//

pub const ACCOUNTS_TABLE: &str = "accounts";

pub const ACCOUNT_COLUMNS: &[&str] = &[
    "accounts.id",
    "accounts.name",
    "accounts.billing_status",
    "accounts.contact_email",
    "accounts.contact_phone",
    "accounts.payment_processor_customer_id",
    "accounts.subscription_plan_id",
    "accounts.created_on",
    "accounts.last_updated_on",
    "accounts.archived_on",
    "accounts.belongs_to_user",
];

/// Accounts joined to their memberships; the projection carries both
/// tables' columns.
pub const ACCOUNTS: TableDescriptor = TableDescriptor::new(
    ACCOUNTS_TABLE,
    &[
        "accounts.id",
        "accounts.name",
        "accounts.billing_status",
        "accounts.contact_email",
        "accounts.contact_phone",
        "accounts.payment_processor_customer_id",
        "accounts.subscription_plan_id",
        "accounts.created_on",
        "accounts.last_updated_on",
        "accounts.archived_on",
        "accounts.belongs_to_user",
        "account_user_memberships.id",
        "account_user_memberships.belongs_to_user",
        "account_user_memberships.belongs_to_account",
        "account_user_memberships.account_roles",
        "account_user_memberships.default_account",
        "account_user_memberships.created_on",
        "account_user_memberships.last_updated_on",
        "account_user_memberships.archived_on",
    ],
)
.owned_by(USER_OWNERSHIP_COLUMN)
.with_joins(ACCOUNT_MEMBERSHIP_JOINS);

const ACCOUNT_MEMBERSHIP_JOINS: &[JoinClause] =
    &[JoinClause::inner(MEMBERSHIPS_TABLE, ACCOUNT_OWNERSHIP_COLUMN, "id")];

/// The accounts table on its own, for statements that must not join.
pub const ACCOUNTS_UNJOINED: TableDescriptor =
    TableDescriptor::new(ACCOUNTS_TABLE, ACCOUNT_COLUMNS).owned_by(USER_OWNERSHIP_COLUMN);

//
// Account memberships
//

pub const MEMBERSHIPS_TABLE: &str = "account_user_memberships";
pub const MEMBERSHIPS_ACCOUNT_ROLES_COLUMN: &str = "account_roles";
pub const MEMBERSHIPS_DEFAULT_ACCOUNT_COLUMN: &str = "default_account";

pub const ACCOUNT_USER_MEMBERSHIPS: TableDescriptor = TableDescriptor::new(
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
    ],
)
.owned_by(USER_OWNERSHIP_COLUMN);

//
// API clients
//

pub const API_CLIENTS_TABLE: &str = "api_clients";
pub const API_CLIENTS_CLIENT_ID_COLUMN: &str = "client_id";

pub const API_CLIENTS: TableDescriptor = TableDescriptor::new(
    API_CLIENTS_TABLE,
    &[
        "api_clients.id",
        "api_clients.name",
        "api_clients.client_id",
        "api_clients.secret_key",
        "api_clients.created_on",
        "api_clients.last_updated_on",
        "api_clients.archived_on",
        "api_clients.belongs_to_user",
    ],
)
.owned_by(USER_OWNERSHIP_COLUMN);

//
// Webhooks
//

pub const WEBHOOKS_TABLE: &str = "webhooks";

pub const WEBHOOKS: TableDescriptor = TableDescriptor::new(
    WEBHOOKS_TABLE,
    &[
        "webhooks.id",
        "webhooks.name",
        "webhooks.content_type",
        "webhooks.url",
        "webhooks.method",
        "webhooks.events",
        "webhooks.data_types",
        "webhooks.topics",
        "webhooks.created_on",
        "webhooks.last_updated_on",
        "webhooks.archived_on",
        "webhooks.belongs_to_account",
    ],
)
.owned_by(ACCOUNT_OWNERSHIP_COLUMN);

//
// Items
//

pub const ITEMS_TABLE: &str = "items";

pub const ITEMS: TableDescriptor = TableDescriptor::new(
    ITEMS_TABLE,
    &[
        "items.id",
        "items.name",
        "items.details",
        "items.created_on",
        "items.last_updated_on",
        "items.archived_on",
        "items.belongs_to_account",
    ],
)
.owned_by(ACCOUNT_OWNERSHIP_COLUMN);

//
// Audit log
//

pub const AUDIT_LOG_TABLE: &str = "audit_log";
pub const AUDIT_LOG_EVENT_TYPE_COLUMN: &str = "event_type";

pub const AUDIT_LOG: TableDescriptor = TableDescriptor::new(
    AUDIT_LOG_TABLE,
    &[
        "audit_log.id",
        "audit_log.event_type",
        "audit_log.context",
        "audit_log.created_on",
    ],
);

/// Every registered table.
pub const ALL: &[TableDescriptor] = &[
    USERS,
    ACCOUNTS,
    ACCOUNT_USER_MEMBERSHIPS,
    API_CLIENTS,
    WEBHOOKS,
    ITEMS,
    AUDIT_LOG,
];
