//! Versioned item envelopes
//!
//! Items are never mutated in place: every update produces a new envelope
//! with a bumped `row_version` and a refreshed `last_updated_date`, while the
//! `create_date` of the first insert is carried forward.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};
use super::key::{CompositePrimaryKey, KeySchemaId, PrimaryKeyAttributes};
use super::polymorphic::{PolymorphicDatabaseItem, PossibleItemTypes, RowValue};

/// Optimistic-concurrency state of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowStatus {
    pub row_version: u64,
    pub last_updated_date: DateTime<Utc>,
}

/// Proof of the state a writer read: `(row_version, create_date)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedVersion {
    pub row_version: u64,
    pub create_date: DateTime<Utc>,
}

/// An item whose payload has a single, statically known type
#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "V: Serialize", deserialize = "V: Deserialize<'de>"))]
pub struct TypedDatabaseItem<K, V> {
    composite_primary_key: CompositePrimaryKey<K>,
    create_date: DateTime<Utc>,
    row_status: RowStatus,
    row_value: V,
}

impl<K: PrimaryKeyAttributes, V> TypedDatabaseItem<K, V> {
    /// Create a brand-new item at version 1
    pub fn new(composite_primary_key: CompositePrimaryKey<K>, row_value: V) -> Self {
        let now = Utc::now();
        Self {
            composite_primary_key,
            create_date: now,
            row_status: RowStatus {
                row_version: 1,
                last_updated_date: now,
            },
            row_value,
        }
    }

    /// Rebuild an item verbatim from its parts
    pub fn from_parts(
        composite_primary_key: CompositePrimaryKey<K>,
        create_date: DateTime<Utc>,
        row_status: RowStatus,
        row_value: V,
    ) -> Self {
        Self {
            composite_primary_key,
            create_date,
            row_status,
            row_value,
        }
    }

    /// Produce the successor of this item carrying `row_value`
    pub fn create_updated_item(&self, row_value: V) -> Self {
        Self {
            composite_primary_key: self.composite_primary_key.clone(),
            create_date: self.create_date,
            row_status: RowStatus {
                row_version: self.row_status.row_version + 1,
                last_updated_date: Utc::now(),
            },
            row_value,
        }
    }

    pub fn composite_primary_key(&self) -> &CompositePrimaryKey<K> {
        &self.composite_primary_key
    }

    pub fn create_date(&self) -> DateTime<Utc> {
        self.create_date
    }

    pub fn row_status(&self) -> RowStatus {
        self.row_status
    }

    pub fn row_value(&self) -> &V {
        &self.row_value
    }

    pub fn into_row_value(self) -> V {
        self.row_value
    }

    pub fn expected_version(&self) -> ExpectedVersion {
        ExpectedVersion {
            row_version: self.row_status.row_version,
            create_date: self.create_date,
        }
    }
}

impl<K, V> TypedDatabaseItem<K, V>
where
    K: PrimaryKeyAttributes,
    V: Send + Sync + 'static,
{
    /// Convert into a polymorphic item keyed by `B` whose payload is one of `P`
    ///
    /// Fails with `TypeMismatch` if `B` is not this item's key schema and with
    /// `UnexpectedType` if `V` is not a member of `P`.
    pub fn into_polymorphic<B, P>(self) -> Result<PolymorphicDatabaseItem<B, P>>
    where
        B: PrimaryKeyAttributes,
        P: PossibleItemTypes,
    {
        let expected = KeySchemaId::of::<B>();
        let actual = KeySchemaId::of::<K>();
        if expected != actual {
            return Err(TableError::TypeMismatch {
                expected: expected.name().to_string(),
                actual: actual.name().to_string(),
            });
        }

        let row_value = RowValue::new(self.row_value);
        let value = P::from_row_value(&row_value).ok_or_else(|| TableError::UnexpectedType {
            provided: row_value.type_name().to_string(),
        })?;

        Ok(PolymorphicDatabaseItem::from_parts(
            self.composite_primary_key.retag::<B>(),
            self.create_date,
            self.row_status,
            value,
        ))
    }
}

impl<K, V: Clone> Clone for TypedDatabaseItem<K, V> {
    fn clone(&self) -> Self {
        Self {
            composite_primary_key: self.composite_primary_key.clone(),
            create_date: self.create_date,
            row_status: self.row_status,
            row_value: self.row_value.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for TypedDatabaseItem<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedDatabaseItem")
            .field("composite_primary_key", &self.composite_primary_key)
            .field("create_date", &self.create_date)
            .field("row_status", &self.row_status)
            .field("row_value", &self.row_value)
            .finish()
    }
}

impl<K, V: PartialEq> PartialEq for TypedDatabaseItem<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.composite_primary_key == other.composite_primary_key
            && self.create_date == other.create_date
            && self.row_status == other.row_status
            && self.row_value == other.row_value
    }
}

/// A payload that carries its own monotonically increasing item version
///
/// Used by versioned history: the primary row's `item_version` picks the
/// sort key of the history row written alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowWithItemVersion<V> {
    pub item_version: u64,
    pub row_value: V,
}

impl<V> RowWithItemVersion<V> {
    pub fn new(row_value: V) -> Self {
        Self {
            item_version: 1,
            row_value,
        }
    }

    pub fn create_updated_item(&self, item_version: u64, row_value: V) -> Self {
        Self {
            item_version,
            row_value,
        }
    }
}
