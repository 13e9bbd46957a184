//! Table Module
//!
//! The operation contract of a composite-primary-key table.
//!
//! ## Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ CompositePrimaryKeyTable (typed, blanket impl)               │
//! │   insert / clobber / update / get / delete / query           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  to_stored() / from_stored()
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │ TableBackend (type-erased, object-safe)                      │
//! │   read_item / write_item(mode) / delete_item(mode) /         │
//! │   range_query                                                │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            ▼                                  ▼
//!    InMemoryTable                    SimulateConcurrencyTable<T>
//!    (Mutex over the whole store)     (injects racing writers)
//! ```
//!
//! A backend only has to honor the erased contract; every typed operation,
//! including monomorphic and polymorphic queries, is derived from it.

mod memory;
mod simulate;

pub use memory::InMemoryTable;
pub use simulate::SimulateConcurrencyTable;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{Result, TableError};
use crate::model::{
    CompositePrimaryKey, DatabaseItem, ExpectedVersion, ItemKey, PrimaryKeyAttributes, StoredItem,
};
use crate::query::{AttributeCondition, QueryPage, QueryRequest};

/// How a write treats whatever is currently stored at the key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fail with `ConditionalCheckFailed` if an item exists
    Insert,

    /// Overwrite or create, never fails on existing state
    Clobber,

    /// Replace only if the stored item is exactly the expected version
    ConditionalUpdate(ExpectedVersion),
}

/// How a delete treats whatever is currently stored at the key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Remove if present, no-op otherwise
    Unconditional,

    /// Remove only if the stored item is exactly the expected version
    Conditional(ExpectedVersion),
}

/// Type-erased store contract every backend implements
pub trait TableBackend: Send + Sync {
    fn read_item(&self, key: &ItemKey) -> Result<Option<StoredItem>>;

    /// Batch read; keys with no item are simply absent from the result
    fn read_items(&self, keys: &[ItemKey]) -> Result<Vec<StoredItem>> {
        let mut items = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(item) = self.read_item(key)? {
                items.push(item);
            }
        }
        Ok(items)
    }

    fn write_item(&self, item: StoredItem, mode: WriteMode) -> Result<()>;

    fn delete_item(&self, key: &ItemKey, mode: DeleteMode) -> Result<()>;

    /// One page of the partition's items matching the request, in request order
    fn range_query(&self, request: &QueryRequest) -> Result<QueryPage<StoredItem>>;
}

impl<T: TableBackend + ?Sized> TableBackend for Arc<T> {
    fn read_item(&self, key: &ItemKey) -> Result<Option<StoredItem>> {
        (**self).read_item(key)
    }

    fn read_items(&self, keys: &[ItemKey]) -> Result<Vec<StoredItem>> {
        (**self).read_items(keys)
    }

    fn write_item(&self, item: StoredItem, mode: WriteMode) -> Result<()> {
        (**self).write_item(item, mode)
    }

    fn delete_item(&self, key: &ItemKey, mode: DeleteMode) -> Result<()> {
        (**self).delete_item(key, mode)
    }

    fn range_query(&self, request: &QueryRequest) -> Result<QueryPage<StoredItem>> {
        (**self).range_query(request)
    }
}

/// Typed table operations, available on every backend
pub trait CompositePrimaryKeyTable: TableBackend {
    /// Store a new item; fails if anything already exists at its key
    fn insert_item<I: DatabaseItem>(&self, item: &I) -> Result<()> {
        self.write_item(item.to_stored(), WriteMode::Insert)
    }

    /// Store an item unconditionally
    fn clobber_item<I: DatabaseItem>(&self, item: &I) -> Result<()> {
        self.write_item(item.to_stored(), WriteMode::Clobber)
    }

    /// Replace `existing_item` with `new_item`
    ///
    /// Fails with `ConditionalCheckFailed` unless the stored item still has
    /// `existing_item`'s `(row_version, create_date)`. `new_item` is written
    /// verbatim; bumping its version is the caller's job
    /// (see [`TypedDatabaseItem::create_updated_item`](crate::TypedDatabaseItem::create_updated_item)).
    fn update_item<I: DatabaseItem>(&self, new_item: &I, existing_item: &I) -> Result<()> {
        if new_item.composite_primary_key() != existing_item.composite_primary_key() {
            return Err(TableError::InvalidRequest(format!(
                "update of {} presented existing item {}",
                new_item.composite_primary_key().item_key(),
                existing_item.composite_primary_key().item_key()
            )));
        }

        self.write_item(
            new_item.to_stored(),
            WriteMode::ConditionalUpdate(existing_item.expected_version()),
        )
    }

    /// Fetch the item at `key` as an `I`
    ///
    /// Returns `Ok(None)` if nothing is stored there and a type error if what
    /// is stored is not an `I`.
    fn get_item<I: DatabaseItem>(&self, key: &CompositePrimaryKey<I::Key>) -> Result<Option<I>> {
        self.read_item(&key.item_key())?
            .map(I::from_stored)
            .transpose()
    }

    /// Fetch several items at once; missing keys are absent from the map
    fn get_items<I: DatabaseItem>(
        &self,
        keys: &[CompositePrimaryKey<I::Key>],
    ) -> Result<HashMap<CompositePrimaryKey<I::Key>, I>> {
        let item_keys: Vec<ItemKey> = keys.iter().map(|k| k.item_key()).collect();
        let requested: HashSet<&ItemKey> = item_keys.iter().collect();

        let mut items = HashMap::with_capacity(keys.len());
        for stored in self.read_items(&item_keys)? {
            if !requested.contains(&stored.key) {
                return Err(TableError::UnexpectedResponse(format!(
                    "batch read returned unrequested key {}",
                    stored.key
                )));
            }
            let item = I::from_stored(stored)?;
            items.insert(item.composite_primary_key().clone(), item);
        }
        Ok(items)
    }

    /// Remove the item at `key` if there is one
    fn delete_item_for_key<K: PrimaryKeyAttributes>(&self, key: &CompositePrimaryKey<K>) -> Result<()> {
        self.delete_item(&key.item_key(), DeleteMode::Unconditional)
    }

    fn delete_items_for_keys<K: PrimaryKeyAttributes>(&self, keys: &[CompositePrimaryKey<K>]) -> Result<()> {
        for key in keys {
            self.delete_item_for_key(key)?;
        }
        Ok(())
    }

    /// Remove `existing_item`, with the same version check as `update_item`
    fn delete_existing_item<I: DatabaseItem>(&self, existing_item: &I) -> Result<()> {
        self.delete_item(
            &existing_item.composite_primary_key().item_key(),
            DeleteMode::Conditional(existing_item.expected_version()),
        )
    }

    /// All items of a partition matching `sort_key_condition`, ascending
    ///
    /// Drains every page the backend hands back.
    fn query<I: DatabaseItem>(
        &self,
        partition_key: &str,
        sort_key_condition: Option<&AttributeCondition>,
    ) -> Result<Vec<I>> {
        let mut request = QueryRequest::new(partition_key);
        request.sort_key_condition = sort_key_condition.cloned();

        let mut items = Vec::new();
        loop {
            let page = self.query_page::<I>(&request)?;
            items.extend(page.items);
            match page.last_evaluated_key {
                Some(cursor) => request.exclusive_start_key = Some(cursor),
                None => return Ok(items),
            }
        }
    }

    /// One page of a query
    fn query_page<I: DatabaseItem>(&self, request: &QueryRequest) -> Result<QueryPage<I>> {
        self.range_query(request)?.map_items(I::from_stored)
    }
}

impl<T: TableBackend + ?Sized> CompositePrimaryKeyTable for T {}
