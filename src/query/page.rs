//! Query requests and result pages
//!
//! The in-memory engine paginates by offset: it materializes the whole
//! filtered, ordered result set on every call and the cursor is the decimal
//! index of the next item. Other backends must use their own opaque cursor;
//! the only shared contract is "no cursor in = start, no cursor out = done".

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};
use super::condition::AttributeCondition;

/// A range query against one partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub partition_key: String,
    pub sort_key_condition: Option<AttributeCondition>,
    pub limit: Option<usize>,
    pub scan_index_forward: bool,
    pub exclusive_start_key: Option<String>,
}

impl QueryRequest {
    /// Ascending query over the whole partition, no limit
    pub fn new(partition_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key_condition: None,
            limit: None,
            scan_index_forward: true,
            exclusive_start_key: None,
        }
    }

    pub fn condition(mut self, condition: AttributeCondition) -> Self {
        self.sort_key_condition = Some(condition);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn scan_index_forward(mut self, forward: bool) -> Self {
        self.scan_index_forward = forward;
        self
    }

    pub fn exclusive_start_key(mut self, cursor: impl Into<String>) -> Self {
        self.exclusive_start_key = Some(cursor.into());
        self
    }

    /// Same request, continuing from `cursor`
    pub fn with_cursor(&self, cursor: Option<String>) -> Self {
        Self {
            exclusive_start_key: cursor,
            ..self.clone()
        }
    }
}

/// One page of query results
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage<T> {
    pub items: Vec<T>,
    /// Cursor for the next page; `None` when the result set is exhausted
    pub last_evaluated_key: Option<String>,
}

impl<T> QueryPage<T> {
    pub fn map_items<U>(self, f: impl FnMut(T) -> Result<U>) -> Result<QueryPage<U>> {
        Ok(QueryPage {
            items: self.items.into_iter().map(f).collect::<Result<Vec<_>>>()?,
            last_evaluated_key: self.last_evaluated_key,
        })
    }
}

pub fn encode_offset_cursor(offset: usize) -> String {
    offset.to_string()
}

/// Decode an offset cursor; absent means the start of the result set
pub fn decode_offset_cursor(cursor: Option<&str>) -> Result<usize> {
    match cursor {
        None => Ok(0),
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            TableError::InvalidRequest(format!("malformed pagination cursor: {:?}", raw))
        }),
    }
}

/// Slice an already filtered, ascending result set into the page `request` asks for
pub fn paginate<T>(mut items: Vec<T>, request: &QueryRequest) -> Result<QueryPage<T>> {
    if request.limit == Some(0) {
        return Err(TableError::InvalidRequest(
            "query limit must be greater than zero".to_string(),
        ));
    }

    if !request.scan_index_forward {
        items.reverse();
    }

    let start = decode_offset_cursor(request.exclusive_start_key.as_deref())?;
    let total = items.len();
    if start >= total {
        return Ok(QueryPage {
            items: Vec::new(),
            last_evaluated_key: None,
        });
    }

    let end = match request.limit {
        Some(limit) => start.saturating_add(limit).min(total),
        None => total,
    };

    let last_evaluated_key = (end < total).then(|| encode_offset_cursor(end));
    let items = items.into_iter().skip(start).take(end - start).collect();

    Ok(QueryPage {
        items,
        last_evaluated_key,
    })
}
