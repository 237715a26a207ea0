use super::*;
use crate::config::BuilderConfig;
use crate::dialect::DialectKind;
use crate::filter::{QueryFilter, SortDirection};
use crate::tables::{ACCOUNTS, AUDIT_LOG, ITEMS, USERS};
use crate::types::BindValue;
use crate::ScopeQlError;
use chrono::{TimeZone, Utc};

const ITEM_COLUMNS: &str = "items.id, items.name, items.details, items.created_on, items.last_updated_on, items.archived_on, items.belongs_to_account";
const AUDIT_COLUMNS: &str = "audit_log.id, audit_log.event_type, audit_log.context, audit_log.created_on";

fn builder(kind: DialectKind) -> SqlQueryBuilder {
    SqlQueryBuilder::new(BuilderConfig::for_dialect(kind)).unwrap()
}

fn id(v: u64) -> BindValue {
    BindValue::UnsignedBigInt(v)
}

fn ts(secs: i64) -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn fleshed_out_filter() -> QueryFilter {
    QueryFilter::new()
        .with_page(10)
        .with_page_size(20)
        .created_after(ts(100))
        .created_before(ts(200))
        .updated_after(ts(300))
        .updated_before(ts(400))
}

// ========================================
// Existence / single row
// ========================================

#[test]
fn test_item_exists_mariadb() {
    let (sql, args) = builder(DialectKind::MariaDb).build_item_exists_query(7, 42).unwrap();
    assert_eq!(
        sql,
        "SELECT EXISTS ( SELECT items.id FROM items WHERE items.archived_on IS NULL AND items.belongs_to_account = ? AND items.id = ? )"
    );
    assert_eq!(args, vec![id(42), id(7)]);
}

#[test]
fn test_item_exists_postgres() {
    let (sql, args) = builder(DialectKind::Postgres).build_item_exists_query(7, 42).unwrap();
    assert_eq!(
        sql,
        "SELECT EXISTS ( SELECT items.id FROM items WHERE items.archived_on IS NULL AND items.belongs_to_account = $1 AND items.id = $2 )"
    );
    assert_eq!(args, vec![id(42), id(7)]);
}

#[test]
fn test_get_item_sqlite() {
    let (sql, args) = builder(DialectKind::Sqlite).build_get_item_query(7, 42).unwrap();
    assert_eq!(
        sql,
        format!(
            "SELECT {} FROM items WHERE items.archived_on IS NULL AND items.belongs_to_account = ? AND items.id = ?",
            ITEM_COLUMNS
        )
    );
    assert_eq!(args, vec![id(42), id(7)]);
}

#[test]
fn test_get_without_owner_skips_ownership() {
    let (sql, args) = builder(DialectKind::MariaDb).build_get_item_query(7, 0).unwrap();
    assert!(sql.ends_with("WHERE items.archived_on IS NULL AND items.id = ?"));
    assert_eq!(args, vec![id(7)]);
}

#[test]
fn test_conflicting_archive_predicate_is_construction_error() {
    let predicates = PredicateSet::new().eq("items.archived_on", 5u64).unwrap();
    let err = builder(DialectKind::MariaDb)
        .build_get_query(&ITEMS, predicates)
        .unwrap_err();
    assert!(matches!(err, ScopeQlError::QueryConstruction(_)));
    assert!(!err.is_retryable());
}

#[test]
fn test_bad_descriptor_is_rejected() {
    const BROKEN: TableDescriptor = TableDescriptor::new("items", &["items.id", "items.na-me"]);
    let err = builder(DialectKind::Postgres).build_get_by_id_query(&BROKEN, 1, 0).unwrap_err();
    assert!(err.is_construction_error());
}

#[test]
fn test_descriptor_without_columns_is_rejected() {
    const EMPTY: TableDescriptor = TableDescriptor::new("items", &[]);
    let err = builder(DialectKind::Postgres).build_list_query(&EMPTY, 1, false, None).unwrap_err();
    assert!(matches!(err, ScopeQlError::QueryConstruction(_)));
}

// ========================================
// Count queries
// ========================================

#[test]
fn test_total_count_non_admin() {
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_total_count_query(&ITEMS, 42, false, false)
        .unwrap();
    assert_eq!(
        sql,
        "SELECT COUNT(items.id) FROM items WHERE items.archived_on IS NULL AND items.belongs_to_account = ?"
    );
    assert_eq!(args, vec![id(42)]);
}

#[test]
fn test_total_count_admin() {
    let qb = builder(DialectKind::MariaDb);

    let (live, args) = qb.build_total_count_query(&ITEMS, 42, true, false).unwrap();
    assert_eq!(live, "SELECT COUNT(items.id) FROM items WHERE items.archived_on IS NULL");
    assert!(args.is_empty());

    let (all, args) = qb.build_total_count_query(&ITEMS, 42, true, true).unwrap();
    assert_eq!(all, "SELECT COUNT(items.id) FROM items");
    assert!(args.is_empty());
}

#[test]
fn test_filtered_count_applies_time_range() {
    let filter = fleshed_out_filter();
    let (sql, args) = builder(DialectKind::Postgres)
        .build_filtered_count_query(&ITEMS, 42, false, Some(&filter))
        .unwrap();
    assert_eq!(
        sql,
        "SELECT COUNT(items.id) FROM items WHERE items.archived_on IS NULL AND items.belongs_to_account = $1 AND items.created_on > $2 AND items.created_on < $3 AND items.last_updated_on > $4 AND items.last_updated_on < $5"
    );
    assert_eq!(
        args,
        vec![
            id(42),
            BindValue::BigInt(100),
            BindValue::BigInt(200),
            BindValue::BigInt(300),
            BindValue::BigInt(400),
        ]
    );
}

#[test]
fn test_filtered_count_without_filter_matches_total() {
    let qb = builder(DialectKind::Sqlite);
    let total = qb.build_total_count_query(&ITEMS, 42, false, false).unwrap();
    let filtered = qb.build_filtered_count_query(&ITEMS, 42, false, None).unwrap();
    assert_eq!(total, filtered);
}

#[test]
fn test_all_count() {
    let sql = builder(DialectKind::Postgres).build_get_all_items_count_query().unwrap();
    assert_eq!(sql, "SELECT COUNT(items.id) FROM items WHERE items.archived_on IS NULL");
}

// ========================================
// List queries
// ========================================

#[test]
fn test_list_default_filter_mariadb() {
    let (sql, args) = builder(DialectKind::MariaDb).build_get_items_query(42, false, None).unwrap();
    let count = "SELECT COUNT(items.id) FROM items WHERE items.archived_on IS NULL AND items.belongs_to_account = ?";
    assert_eq!(
        sql,
        format!(
            "SELECT {cols}, ({count}) AS filtered_count, ({count}) AS total_count FROM items WHERE items.archived_on IS NULL AND items.belongs_to_account = ? GROUP BY items.id ORDER BY items.id ASC LIMIT 20 OFFSET 0",
            cols = ITEM_COLUMNS,
            count = count
        )
    );
    assert_eq!(args, vec![id(42), id(42), id(42)]);
}

#[test]
fn test_list_fleshed_out_filter_mariadb() {
    let filter = fleshed_out_filter();
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_get_items_query(42, false, Some(&filter))
        .unwrap();

    let scope = "items.archived_on IS NULL AND items.belongs_to_account = ?";
    let range = "items.created_on > ? AND items.created_on < ? AND items.last_updated_on > ? AND items.last_updated_on < ?";
    assert_eq!(
        sql,
        format!(
            "SELECT {cols}, (SELECT COUNT(items.id) FROM items WHERE {scope} AND {range}) AS filtered_count, (SELECT COUNT(items.id) FROM items WHERE {scope}) AS total_count FROM items WHERE {scope} AND {range} GROUP BY items.id ORDER BY items.id ASC LIMIT 20 OFFSET 180",
            cols = ITEM_COLUMNS,
            scope = scope,
            range = range
        )
    );

    let range_args = vec![
        BindValue::BigInt(100),
        BindValue::BigInt(200),
        BindValue::BigInt(300),
        BindValue::BigInt(400),
    ];
    let mut expected = vec![id(42)];
    expected.extend(range_args.clone());
    expected.push(id(42));
    expected.push(id(42));
    expected.extend(range_args);
    assert_eq!(args, expected);
}

#[test]
fn test_list_postgres_numbers_placeholders_in_order() {
    let (sql, args) = builder(DialectKind::Postgres).build_get_items_query(42, false, None).unwrap();
    assert!(sql.contains("items.belongs_to_account = $1) AS filtered_count"));
    assert!(sql.contains("items.belongs_to_account = $2) AS total_count"));
    assert!(sql.contains("FROM items WHERE items.archived_on IS NULL AND items.belongs_to_account = $3 GROUP BY"));
    assert_eq!(args.len(), 3);
}

#[test]
fn test_list_admin_outer_query_is_unscoped() {
    let (sql, args) = builder(DialectKind::MariaDb).build_get_items_query(42, true, None).unwrap();
    let count = "SELECT COUNT(items.id) FROM items WHERE items.archived_on IS NULL";
    assert_eq!(
        sql,
        format!(
            "SELECT {cols}, ({count}) AS filtered_count, ({count}) AS total_count FROM items GROUP BY items.id ORDER BY items.id ASC LIMIT 20 OFFSET 0",
            cols = ITEM_COLUMNS,
            count = count
        )
    );
    assert!(args.is_empty());
}

#[test]
fn test_list_admin_including_archived() {
    let filter = QueryFilter::new().including_archived(true);
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_get_items_query(42, true, Some(&filter))
        .unwrap();
    assert!(sql.contains("(SELECT COUNT(items.id) FROM items) AS filtered_count"));
    assert!(sql.contains("(SELECT COUNT(items.id) FROM items) AS total_count"));
    assert!(!sql.contains("archived_on IS NULL"));
    assert!(args.is_empty());
}

#[test]
fn test_list_non_admin_ignores_include_archived() {
    let filter = QueryFilter::new().including_archived(true);
    let (sql, _) = builder(DialectKind::MariaDb)
        .build_get_items_query(42, false, Some(&filter))
        .unwrap();
    assert_eq!(sql.matches("items.archived_on IS NULL").count(), 3);
}

#[test]
fn test_list_descending() {
    let filter = QueryFilter::new().with_sort(SortDirection::Descending);
    let (sql, _) = builder(DialectKind::Sqlite)
        .build_get_items_query(42, false, Some(&filter))
        .unwrap();
    assert!(sql.ends_with("GROUP BY items.id ORDER BY items.id DESC LIMIT 20 OFFSET 0"));
}

#[test]
fn test_list_clamps_page_size() {
    let filter = QueryFilter::new().with_page(2).with_page_size(255);
    let (sql, _) = builder(DialectKind::Sqlite)
        .build_get_items_query(42, false, Some(&filter))
        .unwrap();
    assert!(sql.ends_with("LIMIT 250 OFFSET 250"));
}

#[test]
fn test_list_uses_configured_default_page_size() {
    let config = BuilderConfig {
        default_page_size: 50,
        ..BuilderConfig::for_dialect(DialectKind::Sqlite)
    };
    let qb = SqlQueryBuilder::new(config).unwrap();
    let (sql, _) = qb.build_get_items_query(42, false, None).unwrap();
    assert!(sql.ends_with("LIMIT 50 OFFSET 0"));
}

#[test]
fn test_list_without_ownership_column() {
    let (sql, args) = builder(DialectKind::MariaDb).build_get_users_query(None).unwrap();
    assert!(sql.contains("FROM users WHERE users.archived_on IS NULL GROUP BY users.id"));
    assert!(!sql.contains("belongs_to"));
    assert!(args.is_empty());
}

#[test]
fn test_list_with_join_groups_by_joined_id() {
    let (sql, args) = builder(DialectKind::MariaDb).build_get_accounts_query(3, false, None).unwrap();
    let join = "JOIN account_user_memberships ON account_user_memberships.belongs_to_account = accounts.id";
    assert!(sql.contains(&format!("(SELECT COUNT(accounts.id) FROM accounts {} WHERE accounts.archived_on IS NULL AND accounts.belongs_to_user = ?) AS filtered_count", join)));
    assert!(sql.contains(&format!("AS total_count FROM accounts {} WHERE", join)));
    assert!(sql.contains("GROUP BY accounts.id, account_user_memberships.id ORDER BY accounts.id ASC"));
    assert_eq!(args, vec![id(3), id(3), id(3)]);
}

#[test]
fn test_list_with_extra_predicates() {
    let base = PredicateSet::new().eq("items.name", "thing").unwrap();
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_list_query_where(&ITEMS, base, 42, false, None)
        .unwrap();
    assert!(sql.contains(
        "FROM items WHERE items.archived_on IS NULL AND items.belongs_to_account = ? AND items.name = ? GROUP BY"
    ));
    assert_eq!(args.len(), 6);
}

// ========================================
// Ordered ID lists
// ========================================

#[test]
fn test_items_with_ids_mariadb() {
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_get_items_with_ids_query(42, 20, &[789, 123, 456], false)
        .unwrap();
    assert_eq!(
        sql,
        format!(
            "SELECT {} FROM items WHERE items.archived_on IS NULL AND items.belongs_to_account = ? AND items.id IN (?,?,?) ORDER BY CASE items.id WHEN 789 THEN 0 WHEN 123 THEN 1 WHEN 456 THEN 2 END LIMIT 20",
            ITEM_COLUMNS
        )
    );
    assert_eq!(args, vec![id(42), id(789), id(123), id(456)]);
}

#[test]
fn test_items_with_ids_postgres() {
    let (sql, _) = builder(DialectKind::Postgres)
        .build_get_items_with_ids_query(42, 5, &[2, 1], false)
        .unwrap();
    assert!(sql.ends_with(
        "WHERE items.archived_on IS NULL AND items.belongs_to_account = $1 AND items.id IN ($2,$3) ORDER BY CASE items.id WHEN 2 THEN 0 WHEN 1 THEN 1 END LIMIT 5"
    ));
}

#[test]
fn test_items_with_ids_admin() {
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_get_items_with_ids_query(42, 20, &[1], true)
        .unwrap();
    assert!(sql.ends_with(
        "FROM items WHERE items.archived_on IS NULL AND items.id IN (?) ORDER BY CASE items.id WHEN 1 THEN 0 END LIMIT 20"
    ));
    assert_eq!(args, vec![id(1)]);
}

#[test]
fn test_items_with_ids_admin_skips_archived_rows() {
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_get_items_with_ids_query(42, 20, &[789, 123, 456], true)
        .unwrap();
    assert!(sql.contains("items.archived_on IS NULL"));
    assert!(!sql.contains("belongs_to_account = "));
    assert!(sql.contains("ORDER BY CASE items.id WHEN 789 THEN 0 WHEN 123 THEN 1 WHEN 456 THEN 2 END"));
    assert_eq!(args, vec![id(789), id(123), id(456)]);
}

#[test]
fn test_items_with_empty_ids_match_nothing() {
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_get_items_with_ids_query(42, 20, &[], false)
        .unwrap();
    assert!(sql.ends_with(
        "WHERE items.archived_on IS NULL AND items.belongs_to_account = ? AND 1 = 0 LIMIT 20"
    ));
    assert!(!sql.contains("CASE"));
    assert_eq!(args, vec![id(42)]);
}

#[test]
fn test_items_with_ids_zero_limit_uses_default() {
    let (sql, _) = builder(DialectKind::MariaDb)
        .build_get_items_with_ids_query(42, 0, &[1], false)
        .unwrap();
    assert!(sql.ends_with("LIMIT 20"));
}

// ========================================
// Batches
// ========================================

#[test]
fn test_batch_query() {
    let (sql, args) = builder(DialectKind::Postgres).build_get_batch_of_items_query(1, 1000).unwrap();
    assert_eq!(
        sql,
        format!("SELECT {} FROM items WHERE items.id > $1 AND items.id < $2", ITEM_COLUMNS)
    );
    assert_eq!(args, vec![id(1), id(1000)]);
}

// ========================================
// Mutations
// ========================================

#[test]
fn test_create_item_postgres_returns_id() {
    let input = crate::entities::ItemCreationInput {
        name: "thing".to_string(),
        details: "stuff".to_string(),
        belongs_to_account: 42,
    };
    let (sql, args) = builder(DialectKind::Postgres).build_create_item_query(&input).unwrap();
    assert_eq!(
        sql,
        "INSERT INTO items (name,details,belongs_to_account) VALUES ($1,$2,$3) RETURNING id"
    );
    assert_eq!(args, vec![BindValue::from("thing"), BindValue::from("stuff"), id(42)]);
}

#[test]
fn test_create_item_mariadb() {
    let input = crate::entities::ItemCreationInput {
        name: "thing".to_string(),
        details: "stuff".to_string(),
        belongs_to_account: 42,
    };
    let (sql, _) = builder(DialectKind::MariaDb).build_create_item_query(&input).unwrap();
    assert_eq!(sql, "INSERT INTO items (name,details,belongs_to_account) VALUES (?,?,?)");
}

#[test]
fn test_update_item_per_dialect() {
    let input = crate::entities::ItemUpdateInput {
        id: 7,
        name: "thing".to_string(),
        details: "stuff".to_string(),
        belongs_to_account: 42,
    };

    let (sql, args) = builder(DialectKind::MariaDb).build_update_item_query(&input).unwrap();
    assert_eq!(
        sql,
        "UPDATE items SET name = ?, details = ?, last_updated_on = UNIX_TIMESTAMP() WHERE archived_on IS NULL AND belongs_to_account = ? AND id = ?"
    );
    assert_eq!(args, vec![BindValue::from("thing"), BindValue::from("stuff"), id(42), id(7)]);

    let (sql, _) = builder(DialectKind::Postgres).build_update_item_query(&input).unwrap();
    assert_eq!(
        sql,
        "UPDATE items SET name = $1, details = $2, last_updated_on = extract(epoch FROM NOW()) WHERE archived_on IS NULL AND belongs_to_account = $3 AND id = $4"
    );
}

#[test]
fn test_archive_item_sqlite() {
    let (sql, args) = builder(DialectKind::Sqlite).build_archive_item_query(7, 42).unwrap();
    assert_eq!(
        sql,
        "UPDATE items SET last_updated_on = (strftime('%s','now')), archived_on = (strftime('%s','now')) WHERE archived_on IS NULL AND belongs_to_account = ? AND id = ?"
    );
    assert_eq!(args, vec![id(42), id(7)]);
}

#[test]
fn test_archive_user_has_no_owner() {
    let (sql, args) = builder(DialectKind::Postgres).build_archive_user_query(7).unwrap();
    assert_eq!(
        sql,
        "UPDATE users SET last_updated_on = extract(epoch FROM NOW()), archived_on = extract(epoch FROM NOW()) WHERE archived_on IS NULL AND id = $1"
    );
    assert_eq!(args, vec![id(7)]);
}

#[test]
fn test_insert_rejects_unknown_column_shape() {
    let err = builder(DialectKind::Postgres)
        .build_insert_query(&ITEMS, &[("items.name", BindValue::from("x"))])
        .unwrap_err();
    assert!(err.is_construction_error());
}

#[test]
fn test_insert_without_values_fails() {
    let err = builder(DialectKind::Postgres).build_insert_query(&ITEMS, &[]).unwrap_err();
    assert!(matches!(err, ScopeQlError::QueryConstruction(_)));
}

// ========================================
// Audit log
// ========================================

#[test]
fn test_audit_entries_for_item_per_dialect() {
    let (sql, args) = builder(DialectKind::Postgres)
        .build_get_audit_log_entries_for_item_query(7)
        .unwrap();
    assert_eq!(
        sql,
        format!(
            "SELECT {} FROM audit_log WHERE audit_log.context->'item_id' = $1 ORDER BY audit_log.created_on",
            AUDIT_COLUMNS
        )
    );
    assert_eq!(args, vec![id(7)]);

    let (sql, args) = builder(DialectKind::MariaDb)
        .build_get_audit_log_entries_for_item_query(7)
        .unwrap();
    assert_eq!(
        sql,
        format!(
            "SELECT {} FROM audit_log WHERE JSON_CONTAINS(audit_log.context, ?, '$.item_id') ORDER BY audit_log.created_on",
            AUDIT_COLUMNS
        )
    );
    assert_eq!(args, vec![BindValue::Text("7".to_string())]);

    let (sql, args) = builder(DialectKind::Sqlite)
        .build_get_audit_log_entries_for_item_query(7)
        .unwrap();
    assert_eq!(
        sql,
        format!(
            "SELECT {} FROM audit_log WHERE json_extract(audit_log.context, '$.item_id') = ? ORDER BY audit_log.created_on",
            AUDIT_COLUMNS
        )
    );
    assert_eq!(args, vec![id(7)]);
}

#[test]
fn test_audit_entry_by_id_includes_archived() {
    let (sql, args) = builder(DialectKind::MariaDb).build_get_audit_log_entry_query(9).unwrap();
    assert_eq!(sql, format!("SELECT {} FROM audit_log WHERE audit_log.id = ?", AUDIT_COLUMNS));
    assert_eq!(args, vec![id(9)]);
}

#[test]
fn test_json_context_rejects_bad_key() {
    let err = builder(DialectKind::Postgres)
        .build_audit_log_entries_query("item_id' OR '1'='1", 7u64)
        .unwrap_err();
    assert!(matches!(err, ScopeQlError::QueryConstruction(_)));
}

#[test]
fn test_bad_identifiers_surface_as_construction_errors() {
    let qb = builder(DialectKind::Sqlite);
    let bad = TableDescriptor::new("widgets; DROP TABLE users", &["widgets.id"]);

    for err in [
        qb.build_get_by_id_query(&bad, 1, 0).unwrap_err(),
        qb.build_archive_query(&bad, 1, 0).unwrap_err(),
        qb.build_list_query(&bad, 1, false, None).unwrap_err(),
        qb.build_all_count_query(&bad).unwrap_err(),
    ] {
        assert!(matches!(err, ScopeQlError::QueryConstruction(_)), "{:?}", err);
    }
}

#[test]
fn test_audit_log_list_is_global() {
    let (sql, args) = builder(DialectKind::MariaDb).build_get_audit_log_entries_query(None).unwrap();
    assert!(sql.starts_with(&format!("SELECT {}, (SELECT COUNT(audit_log.id)", AUDIT_COLUMNS)));
    assert!(args.is_empty());
}

// ========================================
// Accounts and memberships
// ========================================

#[test]
fn test_get_account_is_joined() {
    let (sql, args) = builder(DialectKind::MariaDb).build_get_account_query(5, 3).unwrap();
    assert!(sql.starts_with("SELECT accounts.id, accounts.name,"));
    assert!(sql.ends_with(
        "account_user_memberships.archived_on FROM accounts JOIN account_user_memberships ON account_user_memberships.belongs_to_account = accounts.id WHERE accounts.archived_on IS NULL AND accounts.belongs_to_user = ? AND accounts.id = ?"
    ));
    assert_eq!(args, vec![id(3), id(5)]);
}

#[test]
fn test_all_accounts_count_is_not_joined() {
    let sql = builder(DialectKind::MariaDb).build_get_all_accounts_count_query().unwrap();
    assert_eq!(sql, "SELECT COUNT(accounts.id) FROM accounts WHERE accounts.archived_on IS NULL");
}

#[test]
fn test_transfer_account_ownership() {
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_transfer_account_ownership_query(1, 2, 5)
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE accounts SET belongs_to_user = ? WHERE archived_on IS NULL AND belongs_to_user = ? AND id = ?"
    );
    assert_eq!(args, vec![id(2), id(1), id(5)]);
}

#[test]
fn test_transfer_account_memberships() {
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_transfer_account_memberships_query(1, 2, 5)
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE account_user_memberships SET belongs_to_user = ? WHERE archived_on IS NULL AND belongs_to_account = ? AND belongs_to_user = ?"
    );
    assert_eq!(args, vec![id(2), id(5), id(1)]);
}

#[test]
fn test_mark_account_as_user_default() {
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_mark_account_as_user_default_query(3, 5)
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE account_user_memberships SET default_account = (belongs_to_account = ? AND belongs_to_user = ?) WHERE archived_on IS NULL AND belongs_to_user = ?"
    );
    assert_eq!(args, vec![id(5), id(3), id(3)]);
}

#[test]
fn test_archive_memberships_for_user() {
    let (sql, args) = builder(DialectKind::Postgres)
        .build_archive_account_memberships_for_user_query(3)
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE account_user_memberships SET archived_on = extract(epoch FROM NOW()) WHERE archived_on IS NULL AND belongs_to_user = $1"
    );
    assert_eq!(args, vec![id(3)]);
}

#[test]
fn test_user_is_member_of_account() {
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_user_is_member_of_account_query(3, 5)
        .unwrap();
    assert_eq!(
        sql,
        "SELECT EXISTS ( SELECT account_user_memberships.id FROM account_user_memberships WHERE account_user_memberships.archived_on IS NULL AND account_user_memberships.belongs_to_account = ? AND account_user_memberships.belongs_to_user = ? )"
    );
    assert_eq!(args, vec![id(5), id(3)]);
}

#[test]
fn test_memberships_for_user() {
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_get_account_memberships_for_user_query(3)
        .unwrap();
    assert!(sql.ends_with(
        "accounts.name FROM account_user_memberships JOIN accounts ON accounts.id = account_user_memberships.belongs_to_account WHERE account_user_memberships.archived_on IS NULL AND account_user_memberships.belongs_to_user = ?"
    ));
    assert_eq!(args, vec![id(3)]);
}

#[test]
fn test_default_account_id_for_user() {
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_get_default_account_id_for_user_query(3)
        .unwrap();
    assert_eq!(
        sql,
        "SELECT accounts.id FROM accounts JOIN account_user_memberships ON account_user_memberships.belongs_to_account = accounts.id WHERE account_user_memberships.belongs_to_user = ? AND account_user_memberships.default_account = ?"
    );
    assert_eq!(args, vec![id(3), BindValue::Bool(true)]);
}

#[test]
fn test_create_membership_for_new_user() {
    let (sql, args) = builder(DialectKind::Sqlite)
        .build_create_membership_for_new_user_query(3, 5)
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO account_user_memberships (belongs_to_user,belongs_to_account,default_account,account_roles) VALUES (?,?,?,?)"
    );
    assert_eq!(
        args,
        vec![id(3), id(5), BindValue::Bool(true), BindValue::from("account_admin")]
    );
}

#[test]
fn test_add_user_to_account() {
    let input = crate::entities::AddUserToAccountInput {
        user_id: 3,
        account_roles: vec!["account_member".to_string(), "reader".to_string()],
    };
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_add_user_to_account_query(5, &input)
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO account_user_memberships (belongs_to_user,belongs_to_account,account_roles) VALUES (?,?,?)"
    );
    assert_eq!(args, vec![id(3), id(5), BindValue::from("account_member,reader")]);
}

#[test]
fn test_remove_user_from_account_archives_membership() {
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_remove_user_from_account_query(3, 5)
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE account_user_memberships SET last_updated_on = UNIX_TIMESTAMP(), archived_on = UNIX_TIMESTAMP() WHERE archived_on IS NULL AND belongs_to_account = ? AND belongs_to_user = ?"
    );
    assert_eq!(args, vec![id(5), id(3)]);
}

#[test]
fn test_modify_user_permissions() {
    let roles = vec!["account_admin".to_string()];
    let (sql, args) = builder(DialectKind::Postgres)
        .build_modify_user_permissions_query(3, 5, &roles)
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE account_user_memberships SET account_roles = $1, last_updated_on = extract(epoch FROM NOW()) WHERE archived_on IS NULL AND belongs_to_account = $2 AND belongs_to_user = $3"
    );
    assert_eq!(args, vec![BindValue::from("account_admin"), id(5), id(3)]);
}

// ========================================
// Users, API clients, webhooks
// ========================================

#[test]
fn test_get_user_by_username() {
    let (sql, args) = builder(DialectKind::Postgres)
        .build_get_user_by_username_query("alice")
        .unwrap();
    assert!(sql.starts_with("SELECT users.id, users.username,"));
    assert!(sql.ends_with("FROM users WHERE users.archived_on IS NULL AND users.username = $1"));
    assert_eq!(args, vec![BindValue::from("alice")]);
}

#[test]
fn test_get_api_client_by_client_id_is_unscoped() {
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_get_api_client_by_client_id_query("abc")
        .unwrap();
    assert!(sql.ends_with("FROM api_clients WHERE api_clients.archived_on IS NULL AND api_clients.client_id = ?"));
    assert_eq!(args, vec![BindValue::from("abc")]);
}

#[test]
fn test_create_webhook_joins_lists() {
    let input = crate::entities::WebhookCreationInput {
        name: "hook".to_string(),
        content_type: "application/json".to_string(),
        url: "https://example.com".to_string(),
        method: "POST".to_string(),
        events: vec!["create".to_string(), "update".to_string()],
        data_types: vec!["item".to_string()],
        topics: vec![],
        belongs_to_account: 42,
    };
    let (sql, args) = builder(DialectKind::MariaDb).build_create_webhook_query(&input).unwrap();
    assert_eq!(
        sql,
        "INSERT INTO webhooks (name,content_type,url,method,events,data_types,topics,belongs_to_account) VALUES (?,?,?,?,?,?,?,?)"
    );
    assert_eq!(args[4], BindValue::from("create,update"));
    assert_eq!(args[6], BindValue::from(""));
    assert_eq!(args[7], id(42));
}

#[test]
fn test_webhooks_list_is_account_scoped() {
    let (sql, args) = builder(DialectKind::MariaDb).build_get_webhooks_query(42, None).unwrap();
    assert!(sql.contains("FROM webhooks WHERE webhooks.archived_on IS NULL AND webhooks.belongs_to_account = ? GROUP BY webhooks.id"));
    assert_eq!(args.len(), 3);
}

#[test]
fn test_search_for_user_by_username_prefix() {
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_search_for_user_by_username_query("ali")
        .unwrap();
    assert!(sql.starts_with("SELECT users.id, users.username,"));
    assert!(sql.ends_with("FROM users WHERE users.archived_on IS NULL AND users.username LIKE ?"));
    assert_eq!(args, vec![BindValue::from("ali%")]);
}

#[test]
fn test_user_has_status() {
    use crate::entities::users::{BANNED_REPUTATION, GOOD_STANDING_REPUTATION};

    let (sql, args) = builder(DialectKind::MariaDb)
        .build_user_has_status_query(7, &[GOOD_STANDING_REPUTATION, BANNED_REPUTATION])
        .unwrap();
    assert_eq!(
        sql,
        "SELECT EXISTS ( SELECT users.id FROM users WHERE users.archived_on IS NULL AND users.id = ? AND users.reputation IN (?,?) )"
    );
    assert_eq!(args, vec![id(7), BindValue::from("good"), BindValue::from("banned")]);
}

#[test]
fn test_user_has_no_status_matches_nothing() {
    let (sql, args) = builder(DialectKind::MariaDb).build_user_has_status_query(7, &[]).unwrap();
    assert_eq!(
        sql,
        "SELECT EXISTS ( SELECT users.id FROM users WHERE users.archived_on IS NULL AND users.id = ? AND 1 = 0 )"
    );
    assert_eq!(args, vec![id(7)]);
}

#[test]
fn test_create_user_starts_unverified() {
    let input = crate::entities::UserCreationInput {
        username: "alice".to_string(),
        hashed_password: "hashed".to_string(),
        two_factor_secret: "secret".to_string(),
    };
    let (sql, args) = builder(DialectKind::MariaDb).build_create_user_query(&input).unwrap();
    assert_eq!(
        sql,
        "INSERT INTO users (username,hashed_password,two_factor_secret,reputation,service_roles) VALUES (?,?,?,?,?)"
    );
    assert_eq!(
        args,
        vec![
            BindValue::from("alice"),
            BindValue::from("hashed"),
            BindValue::from("secret"),
            BindValue::from("unverified"),
            BindValue::from("service_user"),
        ]
    );
}

#[test]
fn test_update_user() {
    let input = crate::entities::UserUpdateInput {
        id: 7,
        username: "alice".to_string(),
        hashed_password: "hashed".to_string(),
        avatar_src: None,
        two_factor_secret: "secret".to_string(),
        two_factor_secret_verified_on: Some(ts(1_600_000_000)),
    };
    let (sql, args) = builder(DialectKind::Sqlite).build_update_user_query(&input).unwrap();
    assert_eq!(
        sql,
        "UPDATE users SET username = ?, hashed_password = ?, avatar_src = ?, two_factor_secret = ?, two_factor_secret_verified_on = ?, last_updated_on = (strftime('%s','now')) WHERE archived_on IS NULL AND id = ?"
    );
    assert_eq!(args[2], BindValue::Null);
    assert_eq!(args[4], BindValue::BigInt(1_600_000_000));
    assert_eq!(args[5], id(7));
}

#[test]
fn test_update_user_password() {
    let (sql, args) = builder(DialectKind::MariaDb)
        .build_update_user_password_query(7, "new-hash")
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE users SET hashed_password = ?, requires_password_change = ?, password_last_changed_on = UNIX_TIMESTAMP(), last_updated_on = UNIX_TIMESTAMP() WHERE archived_on IS NULL AND id = ?"
    );
    assert_eq!(args, vec![BindValue::from("new-hash"), BindValue::Bool(false), id(7)]);
}

#[test]
fn test_set_user_status() {
    let input = crate::entities::UserReputationUpdateInput {
        target_user_id: 7,
        new_reputation: crate::entities::users::BANNED_REPUTATION.to_string(),
        reason: "spam".to_string(),
    };
    let (sql, args) = builder(DialectKind::Postgres).build_set_user_status_query(&input).unwrap();
    assert_eq!(
        sql,
        "UPDATE users SET reputation = $1, reputation_explanation = $2, last_updated_on = extract(epoch FROM NOW()) WHERE archived_on IS NULL AND id = $3"
    );
    assert_eq!(args, vec![BindValue::from("banned"), BindValue::from("spam"), id(7)]);
}

#[test]
fn test_update_account() {
    let input = crate::entities::AccountUpdateInput {
        id: 5,
        name: "Acme".to_string(),
        contact_email: "ops@acme.test".to_string(),
        contact_phone: String::new(),
        belongs_to_user: 9,
    };
    let (sql, args) = builder(DialectKind::MariaDb).build_update_account_query(&input).unwrap();
    assert_eq!(
        sql,
        "UPDATE accounts SET name = ?, contact_email = ?, contact_phone = ?, last_updated_on = UNIX_TIMESTAMP() WHERE archived_on IS NULL AND belongs_to_user = ? AND id = ?"
    );
    assert_eq!(&args[3..], &[id(9), id(5)]);
}

#[test]
fn test_update_api_client() {
    let input = crate::entities::ApiClientUpdateInput {
        id: 5,
        name: "ci".to_string(),
        client_id: "abc".to_string(),
        belongs_to_user: 9,
    };
    let (sql, args) = builder(DialectKind::Postgres).build_update_api_client_query(&input).unwrap();
    assert_eq!(
        sql,
        "UPDATE api_clients SET name = $1, client_id = $2, last_updated_on = extract(epoch FROM NOW()) WHERE archived_on IS NULL AND belongs_to_user = $3 AND id = $4"
    );
    assert_eq!(args, vec![BindValue::from("ci"), BindValue::from("abc"), id(9), id(5)]);
}

#[test]
fn test_update_webhook_joins_lists() {
    let input = crate::entities::WebhookUpdateInput {
        id: 5,
        name: "hook".to_string(),
        content_type: "application/json".to_string(),
        url: "https://example.com".to_string(),
        method: "PUT".to_string(),
        events: vec!["archive".to_string()],
        data_types: vec!["item".to_string(), "account".to_string()],
        topics: vec![],
        belongs_to_account: 42,
    };
    let (sql, args) = builder(DialectKind::MariaDb).build_update_webhook_query(&input).unwrap();
    assert_eq!(
        sql,
        "UPDATE webhooks SET name = ?, content_type = ?, url = ?, method = ?, events = ?, data_types = ?, topics = ?, last_updated_on = UNIX_TIMESTAMP() WHERE archived_on IS NULL AND belongs_to_account = ? AND id = ?"
    );
    assert_eq!(args[5], BindValue::from("item,account"));
    assert_eq!(&args[7..], &[id(42), id(5)]);
}

#[test]
fn test_create_audit_log_entry_postgres() {
    let input = crate::entities::AuditLogEntryCreationInput {
        event_type: "item_created".to_string(),
        context: serde_json::json!({ "item_id": 7, "performed_by": 3 }),
    };
    let (sql, args) = builder(DialectKind::Postgres)
        .build_create_audit_log_entry_query(&input)
        .unwrap();
    assert_eq!(sql, "INSERT INTO audit_log (event_type,context) VALUES ($1,$2) RETURNING id");
    assert_eq!(args[0], BindValue::from("item_created"));
    assert_eq!(args[1], BindValue::Json(serde_json::json!({ "item_id": 7, "performed_by": 3 })));
}

// ========================================
// Invariants across every statement
// ========================================

#[test]
fn test_placeholder_parity_for_every_wrapper() {
    use crate::dialect::count_placeholders;

    for kind in [DialectKind::Postgres, DialectKind::MariaDb, DialectKind::Sqlite] {
        let qb = builder(kind);
        let style = qb.dialect().placeholder_style();
        let filter = fleshed_out_filter();

        let built = vec![
            qb.build_item_exists_query(1, 2).unwrap(),
            qb.build_get_items_query(2, false, Some(&filter)).unwrap(),
            qb.build_get_items_query(2, true, Some(&filter)).unwrap(),
            qb.build_get_items_with_ids_query(2, 10, &[3, 4, 5], false).unwrap(),
            qb.build_get_accounts_query(2, false, Some(&filter)).unwrap(),
            qb.build_get_users_query(Some(&filter)).unwrap(),
            qb.build_get_api_clients_query(2, None).unwrap(),
            qb.build_get_webhooks_query(2, Some(&filter)).unwrap(),
            qb.build_get_audit_log_entries_query(Some(&filter)).unwrap(),
            qb.build_get_audit_log_entries_for_account_query(2).unwrap(),
            qb.build_mark_account_as_user_default_query(1, 2).unwrap(),
            qb.build_archive_webhook_query(1, 2).unwrap(),
            qb.build_user_has_status_query(1, &["good"]).unwrap(),
            qb.build_search_for_user_by_username_query("a").unwrap(),
            qb.build_modify_user_permissions_query(1, 2, &[]).unwrap(),
            qb.build_remove_user_from_account_query(1, 2).unwrap(),
            qb.build_update_user_password_query(1, "h").unwrap(),
        ];

        for (sql, args) in built {
            assert_eq!(count_placeholders(&sql, style), args.len(), "{}", sql);
        }
    }
}

#[test]
fn test_identical_input_yields_identical_output() {
    let qb = builder(DialectKind::Postgres);
    let filter = fleshed_out_filter();
    assert_eq!(
        qb.build_get_items_query(42, false, Some(&filter)).unwrap(),
        qb.build_get_items_query(42, false, Some(&filter)).unwrap()
    );
}

#[test]
fn test_count_aliases() {
    let (sql, _) = builder(DialectKind::Postgres)
        .build_list_query(&USERS, 0, false, None)
        .unwrap();
    assert!(sql.contains(&format!(") AS {}", FILTERED_COUNT_ALIAS)));
    assert!(sql.contains(&format!(") AS {}", TOTAL_COUNT_ALIAS)));
    assert!(sql.find(FILTERED_COUNT_ALIAS) < sql.find(TOTAL_COUNT_ALIAS));
}

#[test]
fn test_registry_tables_are_usable_with_every_operation() {
    let qb = builder(DialectKind::Sqlite);
    for table in crate::tables::ALL {
        qb.build_list_query(table, 1, false, None).unwrap();
        qb.build_get_by_id_query(table, 1, 1).unwrap();
        qb.build_exists_by_id_query(table, 1, 1).unwrap();
        qb.build_all_count_query(table).unwrap();
        qb.build_batch_query(table, 1, 10).unwrap();
        qb.build_archive_query(table, 1, 1).unwrap();
    }
    assert_eq!(ACCOUNTS.joins.len(), 1);
    assert_eq!(AUDIT_LOG.ownership_column, None);
}
