//! Page results.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Cursor;

/// One bounded page of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Page<T> {
    /// The records in this page, in forward sort order.
    pub items: Vec<T>,
    /// Whether more records exist past this page in the requested direction.
    pub has_more: bool,
    /// Cursor for the following page. Present only when paging forward and more records exist.
    pub next_cursor: Option<Cursor>,
    /// Cursor for the preceding page. Present only when paging backward and more records exist.
    pub prev_cursor: Option<Cursor>,
    /// Total count of records in the source (across all pages), if requested.
    pub total_count: Option<u64>,
}

impl<T> Page<T> {
    /// Creates an empty page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
            next_cursor: None,
            prev_cursor: None,
            total_count: None,
        }
    }

    /// Returns the number of records in this page.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether this page holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maps the items to a different type.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            has_more: self.has_more,
            next_cursor: self.next_cursor,
            prev_cursor: self.prev_cursor,
            total_count: self.total_count,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}
