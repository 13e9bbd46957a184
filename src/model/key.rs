//! Composite primary keys
//!
//! A key is a (partition key, sort key) pair tagged with the key schema
//! (`PrimaryKeyAttributes`) it belongs to.

use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// Names the key attributes of an entity type
///
/// Implementors are zero-sized markers; two items with different marker
/// types never share a key space, even if the attribute names coincide.
pub trait PrimaryKeyAttributes: Send + Sync + 'static {
    fn partition_key_attribute_name() -> &'static str;

    fn sort_key_attribute_name() -> &'static str;

    /// Name of the index this schema addresses, `None` for the base table
    fn index_name() -> Option<&'static str> {
        None
    }
}

/// The conventional "PK"/"SK" key schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StandardPrimaryKeyAttributes;

impl PrimaryKeyAttributes for StandardPrimaryKeyAttributes {
    fn partition_key_attribute_name() -> &'static str {
        "PK"
    }

    fn sort_key_attribute_name() -> &'static str {
        "SK"
    }
}

/// Runtime identity of a key schema, carried by type-erased items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySchemaId {
    type_id: TypeId,
    name: &'static str,
}

impl KeySchemaId {
    pub fn of<K: PrimaryKeyAttributes>() -> Self {
        Self {
            type_id: TypeId::of::<K>(),
            name: std::any::type_name::<K>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Untyped (partition key, sort key) pair used at the backend boundary
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub partition_key: String,
    pub sort_key: String,
}

impl ItemKey {
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.partition_key, self.sort_key)
    }
}

/// Identifies a unique item within a table
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct CompositePrimaryKey<K> {
    partition_key: String,
    sort_key: String,
    #[serde(skip)]
    attributes: PhantomData<fn() -> K>,
}

impl<K: PrimaryKeyAttributes> CompositePrimaryKey<K> {
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
            attributes: PhantomData,
        }
    }

    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    pub fn sort_key(&self) -> &str {
        &self.sort_key
    }

    pub fn item_key(&self) -> ItemKey {
        ItemKey::new(self.partition_key.clone(), self.sort_key.clone())
    }

    pub(crate) fn from_item_key(key: ItemKey) -> Self {
        Self::new(key.partition_key, key.sort_key)
    }

    /// Re-tag under another key schema; callers must have checked the schemas match
    pub(crate) fn retag<B: PrimaryKeyAttributes>(self) -> CompositePrimaryKey<B> {
        CompositePrimaryKey::new(self.partition_key, self.sort_key)
    }
}

// Manual impls so that the marker type doesn't need to implement anything.

impl<K> Clone for CompositePrimaryKey<K> {
    fn clone(&self) -> Self {
        Self {
            partition_key: self.partition_key.clone(),
            sort_key: self.sort_key.clone(),
            attributes: PhantomData,
        }
    }
}

impl<K> fmt::Debug for CompositePrimaryKey<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositePrimaryKey")
            .field("partition_key", &self.partition_key)
            .field("sort_key", &self.sort_key)
            .finish()
    }
}

impl<K> PartialEq for CompositePrimaryKey<K> {
    fn eq(&self, other: &Self) -> bool {
        self.partition_key == other.partition_key && self.sort_key == other.sort_key
    }
}

impl<K> Eq for CompositePrimaryKey<K> {}

impl<K> Hash for CompositePrimaryKey<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.partition_key.hash(state);
        self.sort_key.hash(state);
    }
}

impl<K> PartialOrd for CompositePrimaryKey<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for CompositePrimaryKey<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.partition_key, &self.sort_key).cmp(&(&other.partition_key, &other.sort_key))
    }
}
