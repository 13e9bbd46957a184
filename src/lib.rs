//! # dyntable
//!
//! A typed table layer over a partition-key/sort-key store with:
//! - Conditional writes under optimistic concurrency (row versions)
//! - Sort key range queries with cursor pagination
//! - Typed and polymorphic items sharing one partition
//! - Compound mutations that pair a primary write with a historical row
//! - An async adapter for tokio callers
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │        MutationPatterns          AsyncCompositePrimaryKey    │
//! │  (historical rows, retries)      Table (spawn_blocking)      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │               CompositePrimaryKeyTable                       │
//! │      (typed items, get / query / conditional writes)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  StoredItem (type-erased payload)
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────────┐
//!   │ InMemory    │◄─────────│ SimulateConcur-  │
//!   │ Table       │  wraps   │ rencyTable       │
//!   │ (Mutex)     │          │ (racing writers) │
//!   └──────┬──────┘          └──────────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │ Query       │
//!   │ (condition, │
//!   │  paginate)  │
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod model;
pub mod query;
pub mod table;
pub mod patterns;
pub mod async_table;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, TableError};
pub use config::{RetryConfig, TableConfig, DEFAULT_RETRIES};

pub use model::{
    CompositePrimaryKey, DatabaseItem, ExpectedVersion, ItemKey, KeySchemaId,
    PolymorphicDatabaseItem, PossibleItemTypes, PrimaryKeyAttributes, RowStatus, RowValue,
    RowWithItemVersion, StandardPrimaryKeyAttributes, StoredItem, TypedDatabaseItem,
};
pub use query::{AttributeCondition, QueryPage, QueryRequest};
pub use table::{
    CompositePrimaryKeyTable, DeleteMode, InMemoryTable, SimulateConcurrencyTable, TableBackend,
    WriteMode,
};
pub use patterns::MutationPatterns;
pub use async_table::AsyncCompositePrimaryKeyTable;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of dyntable
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
