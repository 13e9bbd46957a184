//! Type-erased store envelope
//!
//! `StoredItem` is what a backend holds. `DatabaseItem` is the bridge between
//! it and the typed/polymorphic item kinds: `to_stored` on every write and the
//! fallible `from_stored` on every read.

use chrono::{DateTime, Utc};

use crate::error::{Result, TableError};
use super::item::{ExpectedVersion, RowStatus, TypedDatabaseItem};
use super::key::{CompositePrimaryKey, ItemKey, KeySchemaId, PrimaryKeyAttributes};
use super::polymorphic::{PolymorphicDatabaseItem, PossibleItemTypes, RowValue};

/// An item as held by a backend
#[derive(Debug, Clone)]
pub struct StoredItem {
    pub key: ItemKey,
    pub key_schema: KeySchemaId,
    pub create_date: DateTime<Utc>,
    pub row_status: RowStatus,
    pub row_value: RowValue,
}

impl StoredItem {
    pub fn expected_version(&self) -> ExpectedVersion {
        ExpectedVersion {
            row_version: self.row_status.row_version,
            create_date: self.create_date,
        }
    }

    /// True if this is exactly the state the writer claims to have read
    pub fn matches_version(&self, expected: &ExpectedVersion) -> bool {
        self.row_status.row_version == expected.row_version
            && self.create_date == expected.create_date
    }

    /// Same payload, next version, as a competing writer would produce
    pub fn with_next_version(&self) -> Self {
        Self {
            row_status: RowStatus {
                row_version: self.row_status.row_version + 1,
                last_updated_date: Utc::now(),
            },
            ..self.clone()
        }
    }

    fn check_key_schema<K: PrimaryKeyAttributes>(&self) -> Result<()> {
        let expected = KeySchemaId::of::<K>();
        if self.key_schema != expected {
            return Err(TableError::TypeMismatch {
                expected: expected.name().to_string(),
                actual: self.key_schema.name().to_string(),
            });
        }
        Ok(())
    }
}

/// An item kind that can be written to and read back from a backend
pub trait DatabaseItem: Sized + Send + 'static {
    type Key: PrimaryKeyAttributes;

    fn composite_primary_key(&self) -> &CompositePrimaryKey<Self::Key>;

    fn expected_version(&self) -> ExpectedVersion;

    /// Erase into the backend representation
    fn to_stored(&self) -> StoredItem;

    /// Downcast from the backend representation
    fn from_stored(stored: StoredItem) -> Result<Self>;
}

impl<K, V> DatabaseItem for TypedDatabaseItem<K, V>
where
    K: PrimaryKeyAttributes,
    V: Clone + Send + Sync + 'static,
{
    type Key = K;

    fn composite_primary_key(&self) -> &CompositePrimaryKey<K> {
        TypedDatabaseItem::composite_primary_key(self)
    }

    fn expected_version(&self) -> ExpectedVersion {
        TypedDatabaseItem::expected_version(self)
    }

    fn to_stored(&self) -> StoredItem {
        StoredItem {
            key: self.composite_primary_key().item_key(),
            key_schema: KeySchemaId::of::<K>(),
            create_date: self.create_date(),
            row_status: self.row_status(),
            row_value: RowValue::new(self.row_value().clone()),
        }
    }

    fn from_stored(stored: StoredItem) -> Result<Self> {
        stored.check_key_schema::<K>()?;

        let row_value = stored.row_value.downcast::<V>().ok_or_else(|| TableError::TypeMismatch {
            expected: std::any::type_name::<V>().to_string(),
            actual: stored.row_value.type_name().to_string(),
        })?;

        Ok(TypedDatabaseItem::from_parts(
            CompositePrimaryKey::from_item_key(stored.key),
            stored.create_date,
            stored.row_status,
            row_value,
        ))
    }
}

impl<K, P> DatabaseItem for PolymorphicDatabaseItem<K, P>
where
    K: PrimaryKeyAttributes,
    P: PossibleItemTypes,
{
    type Key = K;

    fn composite_primary_key(&self) -> &CompositePrimaryKey<K> {
        PolymorphicDatabaseItem::composite_primary_key(self)
    }

    fn expected_version(&self) -> ExpectedVersion {
        PolymorphicDatabaseItem::expected_version(self)
    }

    fn to_stored(&self) -> StoredItem {
        StoredItem {
            key: PolymorphicDatabaseItem::composite_primary_key(self).item_key(),
            key_schema: KeySchemaId::of::<K>(),
            create_date: self.create_date(),
            row_status: self.row_status(),
            row_value: self.row_value().clone().into_row_value(),
        }
    }

    fn from_stored(stored: StoredItem) -> Result<Self> {
        stored.check_key_schema::<K>()?;

        let row_value =
            P::from_row_value(&stored.row_value).ok_or_else(|| TableError::UnexpectedType {
                provided: stored.row_value.type_name().to_string(),
            })?;

        Ok(PolymorphicDatabaseItem::from_parts(
            CompositePrimaryKey::from_item_key(stored.key),
            stored.create_date,
            stored.row_status,
            row_value,
        ))
    }
}
