//! Model Module
//!
//! Keys and item envelopes.
//!
//! ## Responsibilities
//! - Composite (partition, sort) keys tagged with their key schema
//! - Versioned, timestamped item envelopes (typed and polymorphic)
//! - The type-erased form a backend stores, with checked downcasts back out
//!
//! ## Item Lifecycle
//! ```text
//!   TypedDatabaseItem::new ──► insert_item      (row_version = 1)
//!            │
//!   create_updated_item ─────► update_item      (row_version + 1, create_date kept)
//!            │
//!   create_updated_item ─────► update_item      (row_version + 2, ...)
//! ```

mod item;
mod key;
mod polymorphic;
mod stored;

pub use item::{ExpectedVersion, RowStatus, RowWithItemVersion, TypedDatabaseItem};
pub use key::{CompositePrimaryKey, ItemKey, KeySchemaId, PrimaryKeyAttributes, StandardPrimaryKeyAttributes};
pub use polymorphic::{PolymorphicDatabaseItem, PossibleItemTypes, RowValue};
pub use stored::{DatabaseItem, StoredItem};
