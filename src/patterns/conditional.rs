//! Read-transform-write with optimistic retries

use crate::config::RetryConfig;
use crate::error::{Result, TableError};
use crate::model::{CompositePrimaryKey, PrimaryKeyAttributes, TypedDatabaseItem};
use crate::table::CompositePrimaryKeyTable;

use super::retry::{retry_on_conflict, Attempt};

pub(super) fn conditionally_update<T, K, V, F>(
    table: &T,
    key: &CompositePrimaryKey<K>,
    retry: RetryConfig,
    mut transform: F,
) -> Result<TypedDatabaseItem<K, V>>
where
    T: CompositePrimaryKeyTable + ?Sized,
    K: PrimaryKeyAttributes,
    V: Clone + Send + Sync + 'static,
    F: FnMut(&V) -> Result<V>,
{
    retry_on_conflict(retry, &key.item_key(), || {
        let existing = table
            .get_item::<TypedDatabaseItem<K, V>>(key)?
            .ok_or_else(|| {
                TableError::conditional_check_failed(
                    key.partition_key(),
                    key.sort_key(),
                    "Item not present in database.",
                )
            })?;

        let updated_item = existing.create_updated_item(transform(existing.row_value())?);

        Ok(Attempt::from_primary_write(table.update_item(&updated_item, &existing))?
            .map(|()| updated_item))
    })
}
