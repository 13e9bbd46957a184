//! Primary writes paired with a historical (audit) row
//!
//! None of these are transactional. The primary write happens first; if the
//! historical insert then fails, the primary stays written and the error of
//! the historical step is returned. Treat the history as at-least-once.

use crate::config::RetryConfig;
use crate::error::{Result, TableError};
use crate::model::{CompositePrimaryKey, DatabaseItem, PrimaryKeyAttributes, TypedDatabaseItem};
use crate::table::CompositePrimaryKeyTable;

use super::retry::{retry_on_conflict, Attempt};

pub(super) fn insert_with_historical_row<T, P, H>(table: &T, primary_item: &P, historical_item: &H) -> Result<()>
where
    T: CompositePrimaryKeyTable + ?Sized,
    P: DatabaseItem,
    H: DatabaseItem,
{
    table.insert_item(primary_item)?;
    table.insert_item(historical_item)
}

pub(super) fn update_with_historical_row<T, P, H>(
    table: &T,
    primary_item: &P,
    existing_item: &P,
    historical_item: &H,
) -> Result<()>
where
    T: CompositePrimaryKeyTable + ?Sized,
    P: DatabaseItem,
    H: DatabaseItem,
{
    table.update_item(primary_item, existing_item)?;
    table.insert_item(historical_item)
}

pub(super) fn clobber_with_historical_row<T, K, V, FP, FH>(
    table: &T,
    key: &CompositePrimaryKey<K>,
    mut primary_item_provider: FP,
    mut historical_item_provider: FH,
    retry: RetryConfig,
) -> Result<TypedDatabaseItem<K, V>>
where
    T: CompositePrimaryKeyTable + ?Sized,
    K: PrimaryKeyAttributes,
    V: Clone + Send + Sync + 'static,
    FP: FnMut(Option<&TypedDatabaseItem<K, V>>) -> TypedDatabaseItem<K, V>,
    FH: FnMut(&TypedDatabaseItem<K, V>) -> TypedDatabaseItem<K, V>,
{
    retry_on_conflict(retry, &key.item_key(), || {
        let existing = table.get_item::<TypedDatabaseItem<K, V>>(key)?;
        let primary_item = primary_item_provider(existing.as_ref());

        if primary_item.composite_primary_key() != key {
            return Err(TableError::InvalidRequest(format!(
                "primary item provider returned {} for {}",
                primary_item.composite_primary_key().item_key(),
                key.item_key()
            )));
        }

        let primary_write = match &existing {
            Some(existing) => table.update_item(&primary_item, existing),
            None => table.insert_item(&primary_item),
        };
        if let Attempt::Conflict(e) = Attempt::from_primary_write(primary_write)? {
            return Ok(Attempt::Conflict(e));
        }

        // Past this point the primary is written; a failure here is final.
        let historical_item = historical_item_provider(&primary_item);
        table.insert_item(&historical_item)?;

        Ok(Attempt::Done(primary_item))
    })
}
