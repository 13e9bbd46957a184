//! Query Module
//!
//! Sort-key range conditions and paginated query requests.
//!
//! ## Query Pipeline (in-memory engine)
//! ```text
//!   partition ──► filter by condition ──► ascending sort key order
//!                                                │
//!                     scan_index_forward=false ──┤ reverse
//!                                                ▼
//!                        skip(cursor offset) ──► take(limit) ──► QueryPage
//! ```

mod condition;
mod page;

pub use condition::{matches, AttributeCondition};
pub use page::{decode_offset_cursor, encode_offset_cursor, paginate, QueryPage, QueryRequest};
