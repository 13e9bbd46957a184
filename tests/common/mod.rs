//! Shared fixtures for the integration test targets

#![allow(dead_code)]

use dyntable::{
    possible_item_types, CompositePrimaryKey, CompositePrimaryKeyTable, DeleteMode, InMemoryTable, ItemKey,
    PolymorphicDatabaseItem, PrimaryKeyAttributes, QueryPage, QueryRequest, StandardPrimaryKeyAttributes,
    StoredItem, TableBackend, TableError, TypedDatabaseItem, WriteMode,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// Payloads
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestTypeA {
    pub first_name: String,
    pub last_name: String,
}

impl TestTypeA {
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestTypeB {
    pub action: String,
    pub action_set_by: String,
}

impl TestTypeB {
    pub fn new(action: &str, action_set_by: &str) -> Self {
        Self {
            action: action.to_string(),
            action_set_by: action_set_by.to_string(),
        }
    }
}

/// Not a member of `TestRow`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestTypeC {
    pub note: String,
}

possible_item_types! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum TestRow {
        TypeA(TestTypeA),
        TypeB(TestTypeB),
    }
}

// =============================================================================
// Key Schemas
// =============================================================================

/// A secondary-index key schema, distinct from `StandardPrimaryKeyAttributes`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GsiKeyAttributes;

impl PrimaryKeyAttributes for GsiKeyAttributes {
    fn partition_key_attribute_name() -> &'static str {
        "GSI-1-PK"
    }

    fn sort_key_attribute_name() -> &'static str {
        "GSI-1-SK"
    }

    fn index_name() -> Option<&'static str> {
        Some("GSI-1")
    }
}

pub type Key = CompositePrimaryKey<StandardPrimaryKeyAttributes>;
pub type ItemA = TypedDatabaseItem<StandardPrimaryKeyAttributes, TestTypeA>;
pub type ItemB = TypedDatabaseItem<StandardPrimaryKeyAttributes, TestTypeB>;
pub type ItemC = TypedDatabaseItem<StandardPrimaryKeyAttributes, TestTypeC>;
pub type CounterItem = TypedDatabaseItem<StandardPrimaryKeyAttributes, u64>;
pub type PolyItem = PolymorphicDatabaseItem<StandardPrimaryKeyAttributes, TestRow>;

// =============================================================================
// Helpers
// =============================================================================

pub fn key(partition_key: &str, sort_key: &str) -> Key {
    Key::new(partition_key, sort_key)
}

pub fn item_a(partition_key: &str, sort_key: &str, first_name: &str) -> ItemA {
    ItemA::new(key(partition_key, sort_key), TestTypeA::new(first_name, "Smith"))
}

pub fn item_b(partition_key: &str, sort_key: &str, action: &str) -> ItemB {
    ItemB::new(key(partition_key, sort_key), TestTypeB::new(action, "admin"))
}

pub fn setup_table() -> InMemoryTable {
    InMemoryTable::new()
}

/// Table holding one `TestTypeA` row per sort key under `partition_key`
pub fn setup_partition(partition_key: &str, sort_keys: &[&str]) -> InMemoryTable {
    let table = setup_table();
    for sort_key in sort_keys {
        table.insert_item(&item_a(partition_key, sort_key, sort_key)).unwrap();
    }
    table
}

pub fn sort_keys_of(items: &[ItemA]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.composite_primary_key().sort_key().to_string())
        .collect()
}

// =============================================================================
// Failing Backend
// =============================================================================

/// Passes everything through, except writes into one partition, which fail
/// with `DatabaseError`
pub struct FailingWritesTable {
    pub inner: InMemoryTable,
    pub failing_partition: String,
}

impl FailingWritesTable {
    pub fn new(failing_partition: &str) -> Self {
        Self {
            inner: InMemoryTable::new(),
            failing_partition: failing_partition.to_string(),
        }
    }
}

impl TableBackend for FailingWritesTable {
    fn read_item(&self, key: &ItemKey) -> dyntable::Result<Option<StoredItem>> {
        self.inner.read_item(key)
    }

    fn write_item(&self, item: StoredItem, mode: WriteMode) -> dyntable::Result<()> {
        if item.key.partition_key == self.failing_partition {
            return Err(TableError::DatabaseError(format!("write to {} refused", item.key)));
        }
        self.inner.write_item(item, mode)
    }

    fn delete_item(&self, key: &ItemKey, mode: DeleteMode) -> dyntable::Result<()> {
        self.inner.delete_item(key, mode)
    }

    fn range_query(&self, request: &QueryRequest) -> dyntable::Result<QueryPage<StoredItem>> {
        self.inner.range_query(request)
    }
}

// =============================================================================
// Misbehaving Backend
// =============================================================================

/// Answers every non-empty batch read with an extra item nobody asked for
pub struct ExtraKeyTable {
    pub inner: InMemoryTable,
}

impl TableBackend for ExtraKeyTable {
    fn read_item(&self, key: &ItemKey) -> dyntable::Result<Option<StoredItem>> {
        self.inner.read_item(key)
    }

    fn read_items(&self, keys: &[ItemKey]) -> dyntable::Result<Vec<StoredItem>> {
        let mut items = self.inner.read_items(keys)?;
        if let Some(mut extra) = items.first().cloned() {
            extra.key = ItemKey::new("unrequested", "key");
            items.push(extra);
        }
        Ok(items)
    }

    fn write_item(&self, item: StoredItem, mode: WriteMode) -> dyntable::Result<()> {
        self.inner.write_item(item, mode)
    }

    fn delete_item(&self, key: &ItemKey, mode: DeleteMode) -> dyntable::Result<()> {
        self.inner.delete_item(key, mode)
    }

    fn range_query(&self, request: &QueryRequest) -> dyntable::Result<QueryPage<StoredItem>> {
        self.inner.range_query(request)
    }
}
