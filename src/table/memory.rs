//! In-memory table engine
//!
//! The reference implementation of the table contract.
//!
//! ## Responsibilities
//! - Hold every partition's items, sort keys ordered bytewise
//! - Enforce insert/update/delete preconditions
//! - Evaluate range queries and slice them into offset-cursor pages

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

use crate::config::TableConfig;
use crate::error::{Result, TableError};
use crate::model::{ExpectedVersion, ItemKey, StoredItem};
use crate::query::{paginate, QueryPage, QueryRequest};

use super::{DeleteMode, TableBackend, WriteMode};

/// partition key → (sort key → item)
type PartitionStore = HashMap<String, BTreeMap<String, StoredItem>>;

/// In-memory composite-primary-key table
///
/// ## Concurrency Model: Single Lock
///
/// - One `Mutex` guards the entire store
/// - Every operation (reads, writes, deletes, whole queries including
///   pagination slicing) holds it from start to finish
/// - The guard is released on every exit path, errors included
///
/// All operations are therefore serialized. Nothing under the lock does
/// I/O, so hold times are bounded by in-memory work.
pub struct InMemoryTable {
    /// Table configuration
    config: TableConfig,

    /// All partitions (the only shared mutable state)
    store: Mutex<PartitionStore>,
}

impl InMemoryTable {
    /// Create an empty table with the default config
    pub fn new() -> Self {
        Self::with_config(TableConfig::default())
    }

    pub fn with_config(config: TableConfig) -> Self {
        Self {
            config,
            store: Mutex::new(HashMap::new()),
        }
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Total number of items across all partitions
    pub fn len(&self) -> usize {
        self.store.lock().values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of partitions holding at least one item
    pub fn partition_count(&self) -> usize {
        self.store.lock().len()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Check `expected` against what is stored at `key` (lock held by caller)
    fn check_expected_version(
        store: &PartitionStore,
        key: &ItemKey,
        expected: &ExpectedVersion,
        action: &str,
    ) -> Result<()> {
        let existing = store
            .get(&key.partition_key)
            .and_then(|partition| partition.get(&key.sort_key));

        match existing {
            None => Err(TableError::conditional_check_failed(
                &key.partition_key,
                &key.sort_key,
                "Existing item does not exist.",
            )),
            Some(item) if !item.matches_version(expected) => Err(TableError::conditional_check_failed(
                &key.partition_key,
                &key.sort_key,
                format!(
                    "Trying to {} incorrect version: stored ({}, {}), expected ({}, {}).",
                    action,
                    item.row_status.row_version,
                    item.create_date,
                    expected.row_version,
                    expected.create_date
                ),
            )),
            Some(_) => Ok(()),
        }
    }

    /// Remove `key`, dropping its partition if it became empty (lock held by caller)
    fn remove(store: &mut PartitionStore, key: &ItemKey) {
        if let Some(partition) = store.get_mut(&key.partition_key) {
            partition.remove(&key.sort_key);
            if partition.is_empty() {
                store.remove(&key.partition_key);
            }
        }
    }
}

impl Default for InMemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBackend for InMemoryTable {
    fn read_item(&self, key: &ItemKey) -> Result<Option<StoredItem>> {
        let store = self.store.lock();
        tracing::trace!("[{}] get {}", self.config.table_name, key);

        Ok(store
            .get(&key.partition_key)
            .and_then(|partition| partition.get(&key.sort_key))
            .cloned())
    }

    fn read_items(&self, keys: &[ItemKey]) -> Result<Vec<StoredItem>> {
        let store = self.store.lock();
        tracing::trace!("[{}] batch get of {} keys", self.config.table_name, keys.len());

        Ok(keys
            .iter()
            .filter_map(|key| {
                store
                    .get(&key.partition_key)
                    .and_then(|partition| partition.get(&key.sort_key))
                    .cloned()
            })
            .collect())
    }

    fn write_item(&self, item: StoredItem, mode: WriteMode) -> Result<()> {
        let mut store = self.store.lock();
        tracing::trace!("[{}] write {} ({:?})", self.config.table_name, item.key, mode);

        match mode {
            WriteMode::Insert => {
                let partition = store.entry(item.key.partition_key.clone()).or_default();
                if partition.contains_key(&item.key.sort_key) {
                    tracing::debug!("[{}] insert rejected, {} exists", self.config.table_name, item.key);
                    return Err(TableError::conditional_check_failed(
                        &item.key.partition_key,
                        &item.key.sort_key,
                        "Row already exists.",
                    ));
                }
                partition.insert(item.key.sort_key.clone(), item);
            }
            WriteMode::Clobber => {
                store
                    .entry(item.key.partition_key.clone())
                    .or_default()
                    .insert(item.key.sort_key.clone(), item);
            }
            WriteMode::ConditionalUpdate(expected) => {
                if let Err(e) = Self::check_expected_version(&store, &item.key, &expected, "overwrite") {
                    tracing::debug!("[{}] update rejected: {}", self.config.table_name, e);
                    return Err(e);
                }
                store
                    .entry(item.key.partition_key.clone())
                    .or_default()
                    .insert(item.key.sort_key.clone(), item);
            }
        }

        Ok(())
    }

    fn delete_item(&self, key: &ItemKey, mode: DeleteMode) -> Result<()> {
        let mut store = self.store.lock();
        tracing::trace!("[{}] delete {} ({:?})", self.config.table_name, key, mode);

        if let DeleteMode::Conditional(expected) = mode {
            if let Err(e) = Self::check_expected_version(&store, key, &expected, "delete") {
                tracing::debug!("[{}] delete rejected: {}", self.config.table_name, e);
                return Err(e);
            }
        }

        Self::remove(&mut store, key);
        Ok(())
    }

    fn range_query(&self, request: &QueryRequest) -> Result<QueryPage<StoredItem>> {
        let store = self.store.lock();

        // BTreeMap iteration is already ascending by sort key
        let matching: Vec<StoredItem> = store
            .get(&request.partition_key)
            .map(|partition| {
                partition
                    .iter()
                    .filter(|(sort_key, _)| {
                        crate::query::matches(request.sort_key_condition.as_ref(), sort_key)
                    })
                    .map(|(_, item)| item.clone())
                    .collect()
            })
            .unwrap_or_default();

        let page = paginate(matching, request)?;
        tracing::debug!(
            "[{}] query {} returned {} items, next cursor {:?}",
            self.config.table_name,
            request.partition_key,
            page.items.len(),
            page.last_evaluated_key
        );

        Ok(page)
    }
}
