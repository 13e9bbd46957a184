//! Simulated concurrent writers
//!
//! Wraps a backend and, for a bounded number of writes, performs a competing
//! write immediately before the caller's own so that the caller loses the
//! race. Makes optimistic retry loops testable without real threads.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::Result;
use crate::model::{ItemKey, StoredItem};
use crate::query::{QueryPage, QueryRequest};

use super::{DeleteMode, TableBackend, WriteMode};

/// Backend decorator that injects racing modifications
pub struct SimulateConcurrencyTable<T> {
    inner: T,

    /// How many competing writes to inject in total
    simulated_modifications: usize,

    /// Inject before inserts (competitor inserts the same item first)
    simulate_on_insert: bool,

    /// Inject before conditional updates (competitor bumps the stored version)
    simulate_on_update: bool,

    /// Competing writes injected so far
    performed: AtomicUsize,
}

impl<T: TableBackend> SimulateConcurrencyTable<T> {
    pub fn new(inner: T, simulated_modifications: usize) -> Self {
        Self {
            inner,
            simulated_modifications,
            simulate_on_insert: true,
            simulate_on_update: true,
            performed: AtomicUsize::new(0),
        }
    }

    pub fn simulate_on_insert(mut self, enabled: bool) -> Self {
        self.simulate_on_insert = enabled;
        self
    }

    pub fn simulate_on_update(mut self, enabled: bool) -> Self {
        self.simulate_on_update = enabled;
        self
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn performed_modifications(&self) -> usize {
        self.performed.load(Ordering::SeqCst)
    }

    /// Claim one of the remaining simulated modifications
    fn take_modification(&self) -> bool {
        let limit = self.simulated_modifications;
        self.performed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| (n < limit).then_some(n + 1))
            .is_ok()
    }
}

impl<T: TableBackend> TableBackend for SimulateConcurrencyTable<T> {
    fn read_item(&self, key: &ItemKey) -> Result<Option<StoredItem>> {
        self.inner.read_item(key)
    }

    fn read_items(&self, keys: &[ItemKey]) -> Result<Vec<StoredItem>> {
        self.inner.read_items(keys)
    }

    fn write_item(&self, item: StoredItem, mode: WriteMode) -> Result<()> {
        match mode {
            WriteMode::Insert if self.simulate_on_insert && self.take_modification() => {
                tracing::debug!("simulating concurrent insert of {}", item.key);
                self.inner.write_item(item.clone(), WriteMode::Insert)?;
            }
            WriteMode::ConditionalUpdate(_) if self.simulate_on_update && self.take_modification() => {
                if let Some(current) = self.inner.read_item(&item.key)? {
                    tracing::debug!("simulating concurrent update of {}", item.key);
                    let expected = current.expected_version();
                    self.inner
                        .write_item(current.with_next_version(), WriteMode::ConditionalUpdate(expected))?;
                }
            }
            _ => {}
        }

        self.inner.write_item(item, mode)
    }

    fn delete_item(&self, key: &ItemKey, mode: DeleteMode) -> Result<()> {
        self.inner.delete_item(key, mode)
    }

    fn range_query(&self, request: &QueryRequest) -> Result<QueryPage<StoredItem>> {
        self.inner.range_query(request)
    }
}
