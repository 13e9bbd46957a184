//! Patterns Module
//!
//! Compound mutations built only from table primitives.
//!
//! ## Responsibilities
//! - Primary writes paired with a historical row
//! - Optimistic read-transform-write with bounded retries
//! - Versioned rows with append-only, monotonically keyed history
//!
//! ## Guarantees
//! - Only a `ConditionalCheckFailed` from the primary write is retried;
//!   every other error ends the pattern and is returned unchanged
//! - Nothing is rolled back: a failed historical insert leaves the primary
//!   write in place (at-least-once history, not a transaction)

mod conditional;
mod historical;
mod retry;
mod versioned;

use crate::config::RetryConfig;
use crate::error::Result;
use crate::model::{CompositePrimaryKey, DatabaseItem, PrimaryKeyAttributes, RowWithItemVersion, TypedDatabaseItem};
use crate::table::CompositePrimaryKeyTable;

/// Compound mutations, available on every table
pub trait MutationPatterns: CompositePrimaryKeyTable {
    /// Insert `primary_item`, then `historical_item`
    fn insert_item_with_historical_row<P, H>(&self, primary_item: &P, historical_item: &H) -> Result<()>
    where
        P: DatabaseItem,
        H: DatabaseItem,
    {
        historical::insert_with_historical_row(self, primary_item, historical_item)
    }

    /// Conditionally update the primary item, then insert `historical_item`
    fn update_item_with_historical_row<P, H>(
        &self,
        primary_item: &P,
        existing_item: &P,
        historical_item: &H,
    ) -> Result<()>
    where
        P: DatabaseItem,
        H: DatabaseItem,
    {
        historical::update_with_historical_row(self, primary_item, existing_item, historical_item)
    }

    /// Write whatever `primary_item_provider` makes of the current item, plus its history row
    ///
    /// The provider sees the item currently at `key` (or `None`) and must
    /// return an item for the same key. Inserts when nothing exists, updates
    /// otherwise; lost races re-read and re-run both providers.
    fn clobber_item_with_historical_row<K, V, FP, FH>(
        &self,
        key: &CompositePrimaryKey<K>,
        primary_item_provider: FP,
        historical_item_provider: FH,
        retry: RetryConfig,
    ) -> Result<TypedDatabaseItem<K, V>>
    where
        K: PrimaryKeyAttributes,
        V: Clone + Send + Sync + 'static,
        FP: FnMut(Option<&TypedDatabaseItem<K, V>>) -> TypedDatabaseItem<K, V>,
        FH: FnMut(&TypedDatabaseItem<K, V>) -> TypedDatabaseItem<K, V>,
    {
        historical::clobber_with_historical_row(
            self,
            key,
            primary_item_provider,
            historical_item_provider,
            retry,
        )
    }

    /// Apply `transform` to the payload at `key` under optimistic concurrency
    ///
    /// A missing item is a `ConditionalCheckFailed` and is not retried, nor
    /// is an error returned by `transform`. When every attempt loses its race
    /// the last `ConditionalCheckFailed` is returned.
    fn conditionally_update_item<K, V, F>(
        &self,
        key: &CompositePrimaryKey<K>,
        retry: RetryConfig,
        transform: F,
    ) -> Result<TypedDatabaseItem<K, V>>
    where
        K: PrimaryKeyAttributes,
        V: Clone + Send + Sync + 'static,
        F: FnMut(&V) -> Result<V>,
    {
        conditional::conditionally_update(self, key, retry, transform)
    }

    /// Overwrite the versioned row of `partition_key` and append its history row
    ///
    /// `generate_sort_key(0)` is the primary row's sort key and
    /// `generate_sort_key(n)` the history row of item version `n`.
    fn clobber_versioned_item_with_historical_row<K, V, G>(
        &self,
        partition_key: &str,
        historical_partition_key: &str,
        row_value: V,
        generate_sort_key: G,
        retry: RetryConfig,
    ) -> Result<TypedDatabaseItem<K, RowWithItemVersion<V>>>
    where
        K: PrimaryKeyAttributes,
        V: Clone + Send + Sync + 'static,
        G: Fn(u64) -> String,
    {
        versioned::clobber_versioned_with_historical_row(
            self,
            partition_key,
            historical_partition_key,
            row_value,
            generate_sort_key,
            retry,
        )
    }
}

impl<T: CompositePrimaryKeyTable + ?Sized> MutationPatterns for T {}
