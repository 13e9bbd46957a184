//! Versioned primary row with append-only history
//!
//! The primary row lives at `(partition_key, generate_sort_key(0))` and holds
//! a `RowWithItemVersion`. Every write also inserts a history row at
//! `(historical_partition_key, generate_sort_key(item_version))`, so history
//! keys are monotonic and never need to be read before appending.

use crate::config::RetryConfig;
use crate::error::Result;
use crate::model::{CompositePrimaryKey, PrimaryKeyAttributes, RowWithItemVersion, TypedDatabaseItem};
use crate::table::CompositePrimaryKeyTable;

use super::historical::clobber_with_historical_row;

pub(super) fn clobber_versioned_with_historical_row<T, K, V, G>(
    table: &T,
    partition_key: &str,
    historical_partition_key: &str,
    row_value: V,
    generate_sort_key: G,
    retry: RetryConfig,
) -> Result<TypedDatabaseItem<K, RowWithItemVersion<V>>>
where
    T: CompositePrimaryKeyTable + ?Sized,
    K: PrimaryKeyAttributes,
    V: Clone + Send + Sync + 'static,
    G: Fn(u64) -> String,
{
    let primary_key = CompositePrimaryKey::<K>::new(partition_key, generate_sort_key(0));

    let primary_item_provider = |existing: Option<&TypedDatabaseItem<K, RowWithItemVersion<V>>>| match existing {
        // Continue the existing row's versions with the new payload
        Some(existing) => {
            let current = existing.row_value();
            existing.create_updated_item(
                current.create_updated_item(current.item_version + 1, row_value.clone()),
            )
        }
        None => TypedDatabaseItem::new(primary_key.clone(), RowWithItemVersion::new(row_value.clone())),
    };

    let historical_item_provider = |primary: &TypedDatabaseItem<K, RowWithItemVersion<V>>| {
        let sort_key = generate_sort_key(primary.row_value().item_version);
        TypedDatabaseItem::new(
            CompositePrimaryKey::new(historical_partition_key, sort_key),
            primary.row_value().clone(),
        )
    };

    clobber_with_historical_row(
        table,
        &primary_key,
        primary_item_provider,
        historical_item_provider,
        retry,
    )
}
