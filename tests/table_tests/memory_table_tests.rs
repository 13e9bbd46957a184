//! In-Memory Table Tests
//!
//! Tests verify:
//! - Insert / clobber / update / delete preconditions
//! - Version checks on (row_version, create_date)
//! - Batch reads and deletes
//! - Type checks when reading rows back

use chrono::Duration;
use dyntable::{
    CompositePrimaryKeyTable, InMemoryTable, RowStatus, TableBackend, TableConfig, TableError,
    TypedDatabaseItem,
};

use crate::common::*;

// =============================================================================
// Insert / Get Tests
// =============================================================================

#[test]
fn test_new_table_is_empty() {
    let table = setup_table();
    assert!(table.is_empty());
    assert_eq!(table.len(), 0);
    assert_eq!(table.partition_count(), 0);
}

#[test]
fn test_insert_and_get_returns_item_unchanged() {
    let table = setup_table();
    let item = item_a("customer#1", "profile", "Alice");

    table.insert_item(&item).unwrap();

    let fetched: Option<ItemA> = table.get_item(&key("customer#1", "profile")).unwrap();
    assert_eq!(fetched, Some(item));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_get_nonexistent_key() {
    let table = setup_table();
    let fetched: Option<ItemA> = table.get_item(&key("nobody", "profile")).unwrap();
    assert_eq!(fetched, None);
}

#[test]
fn test_insert_twice_fails_with_conditional_check_failed() {
    let table = setup_table();
    let item = item_a("customer#1", "profile", "Alice");
    table.insert_item(&item).unwrap();

    let err = table.insert_item(&item_a("customer#1", "profile", "Bob")).unwrap_err();
    assert_eq!(
        err,
        TableError::conditional_check_failed("customer#1", "profile", "Row already exists.")
    );

    // First insert is untouched
    let fetched: Option<ItemA> = table.get_item(&key("customer#1", "profile")).unwrap();
    assert_eq!(fetched, Some(item));
}

// =============================================================================
// Clobber Tests
// =============================================================================

#[test]
fn test_clobber_creates_missing_item() {
    let table = setup_table();
    let item = item_a("customer#1", "profile", "Alice");

    table.clobber_item(&item).unwrap();

    let fetched: Option<ItemA> = table.get_item(&key("customer#1", "profile")).unwrap();
    assert_eq!(fetched, Some(item));
}

#[test]
fn test_clobber_overwrites_regardless_of_version() {
    let table = setup_table();
    let original = item_a("customer#1", "profile", "Alice");
    table.insert_item(&original).unwrap();

    let replacement = item_a("customer#1", "profile", "Bob");
    table.clobber_item(&replacement).unwrap();

    let fetched: Option<ItemA> = table.get_item(&key("customer#1", "profile")).unwrap();
    assert_eq!(fetched, Some(replacement));
    assert_eq!(table.len(), 1);
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_update_with_matching_version() {
    let table = setup_table();
    let existing = item_a("customer#1", "profile", "Alice");
    table.insert_item(&existing).unwrap();

    let updated = existing.create_updated_item(TestTypeA::new("Alice", "Jones"));
    table.update_item(&updated, &existing).unwrap();

    let fetched: ItemA = table.get_item(&key("customer#1", "profile")).unwrap().unwrap();
    assert_eq!(fetched, updated);
    assert_eq!(fetched.row_status().row_version, 2);
    assert_eq!(fetched.create_date(), existing.create_date());
}

#[test]
fn test_update_with_stale_version_fails() {
    let table = setup_table();
    let existing = item_a("customer#1", "profile", "Alice");
    table.insert_item(&existing).unwrap();

    let first = existing.create_updated_item(TestTypeA::new("Alice", "Jones"));
    table.update_item(&first, &existing).unwrap();

    // Second writer still holds version 1
    let second = existing.create_updated_item(TestTypeA::new("Alice", "Brown"));
    let err = table.update_item(&second, &existing).unwrap_err();
    assert!(err.is_conditional_check_failed());

    let fetched: ItemA = table.get_item(&key("customer#1", "profile")).unwrap().unwrap();
    assert_eq!(fetched, first);
}

#[test]
fn test_update_with_different_create_date_fails() {
    let table = setup_table();
    let existing = item_a("customer#1", "profile", "Alice");
    table.insert_item(&existing).unwrap();

    // Same row version, but a different incarnation of the row
    let impostor = ItemA::from_parts(
        existing.composite_primary_key().clone(),
        existing.create_date() - Duration::seconds(1),
        existing.row_status(),
        existing.row_value().clone(),
    );
    let updated = impostor.create_updated_item(TestTypeA::new("Eve", "Smith"));

    let err = table.update_item(&updated, &impostor).unwrap_err();
    assert!(err.is_conditional_check_failed());
}

#[test]
fn test_update_missing_item_fails() {
    let table = setup_table();
    let existing = item_a("customer#1", "profile", "Alice");
    let updated = existing.create_updated_item(TestTypeA::new("Alice", "Jones"));

    let err = table.update_item(&updated, &existing).unwrap_err();
    assert_eq!(
        err,
        TableError::conditional_check_failed("customer#1", "profile", "Existing item does not exist.")
    );
    assert!(table.is_empty());
}

#[test]
fn test_update_across_keys_is_invalid_request() {
    let table = setup_table();
    let existing = item_a("customer#1", "profile", "Alice");
    table.insert_item(&existing).unwrap();

    let elsewhere = item_a("customer#2", "profile", "Bob");
    let err = table.update_item(&elsewhere, &existing).unwrap_err();
    assert!(matches!(err, TableError::InvalidRequest(_)));
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_is_idempotent() {
    let table = setup_table();
    table.insert_item(&item_a("customer#1", "profile", "Alice")).unwrap();

    table.delete_item_for_key(&key("customer#1", "profile")).unwrap();
    table.delete_item_for_key(&key("customer#1", "profile")).unwrap();

    let fetched: Option<ItemA> = table.get_item(&key("customer#1", "profile")).unwrap();
    assert_eq!(fetched, None);
}

#[test]
fn test_delete_never_existing_key() {
    let table = setup_table();
    table.delete_item_for_key(&key("nobody", "profile")).unwrap();
    assert!(table.is_empty());
}

#[test]
fn test_delete_drops_empty_partition() {
    let table = setup_partition("customer#1", &["a", "b"]);
    assert_eq!(table.partition_count(), 1);

    table.delete_item_for_key(&key("customer#1", "a")).unwrap();
    assert_eq!(table.partition_count(), 1);

    table.delete_item_for_key(&key("customer#1", "b")).unwrap();
    assert_eq!(table.partition_count(), 0);
}

#[test]
fn test_delete_existing_item_checks_version() {
    let table = setup_table();
    let existing = item_a("customer#1", "profile", "Alice");
    table.insert_item(&existing).unwrap();

    let updated = existing.create_updated_item(TestTypeA::new("Alice", "Jones"));
    table.update_item(&updated, &existing).unwrap();

    let err = table.delete_existing_item(&existing).unwrap_err();
    assert!(err.is_conditional_check_failed());
    assert_eq!(table.len(), 1);

    table.delete_existing_item(&updated).unwrap();
    assert!(table.is_empty());
}

#[test]
fn test_delete_existing_item_that_is_gone() {
    let table = setup_table();
    let existing = item_a("customer#1", "profile", "Alice");

    let err = table.delete_existing_item(&existing).unwrap_err();
    assert!(err.is_conditional_check_failed());
}

// =============================================================================
// Batch Tests
// =============================================================================

#[test]
fn test_get_items_returns_only_present_keys() {
    let table = setup_partition("customer#1", &["a", "b", "c"]);

    let keys = vec![key("customer#1", "a"), key("customer#1", "c"), key("customer#1", "zzz")];
    let items = table.get_items::<ItemA>(&keys).unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[&key("customer#1", "a")].row_value().first_name, "a");
    assert_eq!(items[&key("customer#1", "c")].row_value().first_name, "c");
    assert!(!items.contains_key(&key("customer#1", "zzz")));
}

#[test]
fn test_get_items_rejects_unrequested_keys() {
    let table = ExtraKeyTable { inner: setup_partition("customer#1", &["a"]) };

    let err = table.get_items::<ItemA>(&[key("customer#1", "a")]).unwrap_err();
    assert!(matches!(err, TableError::UnexpectedResponse(_)));
}

#[test]
fn test_delete_items_for_keys() {
    let table = setup_partition("customer#1", &["a", "b", "c"]);

    table
        .delete_items_for_keys(&[key("customer#1", "a"), key("customer#1", "c"), key("customer#1", "zzz")])
        .unwrap();

    let remaining: Vec<ItemA> = table.query("customer#1", None).unwrap();
    assert_eq!(sort_keys_of(&remaining), vec!["b"]);
}

// =============================================================================
// Type Check Tests
// =============================================================================

#[test]
fn test_get_with_wrong_payload_type_is_type_mismatch() {
    let table = setup_table();
    table.insert_item(&item_a("customer#1", "profile", "Alice")).unwrap();

    let err = table.get_item::<ItemB>(&key("customer#1", "profile")).unwrap_err();
    assert!(matches!(err, TableError::TypeMismatch { .. }));
    assert!(err.is_type_mismatch());
}

#[test]
fn test_get_with_wrong_key_schema_is_type_mismatch() {
    let table = setup_table();
    table.insert_item(&item_a("customer#1", "profile", "Alice")).unwrap();

    let gsi_key = dyntable::CompositePrimaryKey::<GsiKeyAttributes>::new("customer#1", "profile");
    let err = table
        .get_item::<TypedDatabaseItem<GsiKeyAttributes, TestTypeA>>(&gsi_key)
        .unwrap_err();
    assert!(matches!(err, TableError::TypeMismatch { .. }));
}

#[test]
fn test_polymorphic_and_typed_reads_share_a_row() {
    let table = setup_table();
    let poly = PolyItem::new(key("customer#1", "order"), TestRow::TypeB(TestTypeB::new("ship", "ops")));
    table.insert_item(&poly).unwrap();

    let as_poly: PolyItem = table.get_item(&key("customer#1", "order")).unwrap().unwrap();
    assert_eq!(as_poly, poly);

    let as_typed: ItemB = table.get_item(&key("customer#1", "order")).unwrap().unwrap();
    assert_eq!(as_typed.row_value(), &TestTypeB::new("ship", "ops"));
    assert_eq!(as_typed.row_status(), poly.row_status());
}

#[test]
fn test_polymorphic_writes_store_the_variant_payload() {
    let table = setup_table();
    let poly = PolyItem::new(key("customer#1", "row"), TestRow::TypeA(TestTypeA::new("Alice", "Smith")));
    table.insert_item(&poly).unwrap();

    let stored = table.read_item(&key("customer#1", "row").item_key()).unwrap().unwrap();
    assert!(stored.row_value.is::<TestTypeA>());
    assert!(!stored.row_value.is::<TestRow>());

    // Switching variant on update stores the new variant's payload
    let updated = poly.create_updated_item(TestRow::TypeB(TestTypeB::new("close", "admin")));
    table.update_item(&updated, &poly).unwrap();

    let stored = table.read_item(&key("customer#1", "row").item_key()).unwrap().unwrap();
    assert!(stored.row_value.is::<TestTypeB>());
    assert!(!stored.row_value.is::<TestRow>());

    let as_typed: ItemB = table.get_item(&key("customer#1", "row")).unwrap().unwrap();
    assert_eq!(as_typed.row_status().row_version, 2);
    let as_poly: PolyItem = table.get_item(&key("customer#1", "row")).unwrap().unwrap();
    assert_eq!(as_poly, updated);

    table.clobber_item(&poly).unwrap();
    let stored = table.read_item(&key("customer#1", "row").item_key()).unwrap().unwrap();
    assert!(stored.row_value.is::<TestTypeA>());
}

#[test]
fn test_polymorphic_read_of_unlisted_type_is_unexpected_type() {
    let table = setup_table();
    let item = ItemC::new(key("customer#1", "note"), TestTypeC { note: "hi".to_string() });
    table.insert_item(&item).unwrap();

    let err = table.get_item::<PolyItem>(&key("customer#1", "note")).unwrap_err();
    assert!(matches!(err, TableError::UnexpectedType { .. }));
}

#[test]
fn test_from_parts_round_trips_through_the_table() {
    let table = setup_table();
    let original = item_a("customer#1", "profile", "Alice");
    let rebuilt = ItemA::from_parts(
        original.composite_primary_key().clone(),
        original.create_date(),
        RowStatus {
            row_version: 7,
            last_updated_date: original.row_status().last_updated_date,
        },
        original.row_value().clone(),
    );

    table.clobber_item(&rebuilt).unwrap();
    let fetched: ItemA = table.get_item(&key("customer#1", "profile")).unwrap().unwrap();
    assert_eq!(fetched.row_status().row_version, 7);
    assert_eq!(fetched, rebuilt);
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
fn test_with_config() {
    let config = TableConfig::builder().table_name("orders").retries(3).build();
    let table = InMemoryTable::with_config(config);

    assert_eq!(table.config().table_name, "orders");
    assert_eq!(table.config().retry.retries, 3);
}

#[test]
fn test_default_config() {
    let table = InMemoryTable::default();
    assert_eq!(table.config().table_name, "dyntable");
    assert_eq!(table.config().retry.retries, dyntable::DEFAULT_RETRIES);
}
