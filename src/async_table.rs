//! Async adapter
//!
//! Exposes the table operations as futures for use inside a tokio runtime.
//! Each call is moved onto tokio's blocking pool with `spawn_blocking`, so a
//! table (which may hold its lock for a whole query) never stalls the async
//! executor. Results and errors are exactly those of the synchronous call;
//! a panic inside the blocking task comes back as `TableError::Unrecognized`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Result, TableError};
use crate::model::{CompositePrimaryKey, DatabaseItem, PrimaryKeyAttributes};
use crate::query::{AttributeCondition, QueryPage, QueryRequest};
use crate::table::{CompositePrimaryKeyTable, TableBackend};

/// Future-returning versions of the [`CompositePrimaryKeyTable`] operations
///
/// ## Usage
///
/// ```rust,ignore
/// let table = Arc::new(InMemoryTable::new());
/// table.insert_item_async(item).await?;
/// let fetched: Option<TypedDatabaseItem<_, Order>> = table.get_item_async(key).await?;
/// ```
#[async_trait]
pub trait AsyncCompositePrimaryKeyTable {
    async fn insert_item_async<I: DatabaseItem>(&self, item: I) -> Result<()>;

    async fn clobber_item_async<I: DatabaseItem>(&self, item: I) -> Result<()>;

    async fn update_item_async<I: DatabaseItem>(&self, new_item: I, existing_item: I) -> Result<()>;

    async fn get_item_async<I: DatabaseItem>(&self, key: CompositePrimaryKey<I::Key>) -> Result<Option<I>>;

    async fn delete_item_for_key_async<K: PrimaryKeyAttributes>(&self, key: CompositePrimaryKey<K>) -> Result<()>;

    async fn delete_existing_item_async<I: DatabaseItem>(&self, existing_item: I) -> Result<()>;

    async fn query_async<I: DatabaseItem>(
        &self,
        partition_key: String,
        sort_key_condition: Option<AttributeCondition>,
    ) -> Result<Vec<I>>;

    async fn query_page_async<I: DatabaseItem>(&self, request: QueryRequest) -> Result<QueryPage<I>>;
}

/// Run `f` against the table on the blocking pool
async fn run_blocking<T, R, F>(table: &Arc<T>, f: F) -> Result<R>
where
    T: TableBackend + ?Sized + 'static,
    R: Send + 'static,
    F: FnOnce(&T) -> Result<R> + Send + 'static,
{
    let table = Arc::clone(table);
    tokio::task::spawn_blocking(move || f(&*table))
        .await
        .map_err(|e| {
            tracing::error!("blocking table task failed: {}", e);
            TableError::unrecognized(&e)
        })?
}

#[async_trait]
impl<T> AsyncCompositePrimaryKeyTable for Arc<T>
where
    T: TableBackend + ?Sized + 'static,
{
    async fn insert_item_async<I: DatabaseItem>(&self, item: I) -> Result<()> {
        run_blocking(self, move |table| table.insert_item(&item)).await
    }

    async fn clobber_item_async<I: DatabaseItem>(&self, item: I) -> Result<()> {
        run_blocking(self, move |table| table.clobber_item(&item)).await
    }

    async fn update_item_async<I: DatabaseItem>(&self, new_item: I, existing_item: I) -> Result<()> {
        run_blocking(self, move |table| table.update_item(&new_item, &existing_item)).await
    }

    async fn get_item_async<I: DatabaseItem>(&self, key: CompositePrimaryKey<I::Key>) -> Result<Option<I>> {
        run_blocking(self, move |table| table.get_item::<I>(&key)).await
    }

    async fn delete_item_for_key_async<K: PrimaryKeyAttributes>(&self, key: CompositePrimaryKey<K>) -> Result<()> {
        run_blocking(self, move |table| table.delete_item_for_key(&key)).await
    }

    async fn delete_existing_item_async<I: DatabaseItem>(&self, existing_item: I) -> Result<()> {
        run_blocking(self, move |table| table.delete_existing_item(&existing_item)).await
    }

    async fn query_async<I: DatabaseItem>(
        &self,
        partition_key: String,
        sort_key_condition: Option<AttributeCondition>,
    ) -> Result<Vec<I>> {
        run_blocking(self, move |table| {
            table.query::<I>(&partition_key, sort_key_condition.as_ref())
        })
        .await
    }

    async fn query_page_async<I: DatabaseItem>(&self, request: QueryRequest) -> Result<QueryPage<I>> {
        run_blocking(self, move |table| table.query_page::<I>(&request)).await
    }
}
