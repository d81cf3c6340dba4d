//! Response bodies.

mod error_response;

pub use error_response::ErrorResponse;
use keypage_core::{Cursor, Page};
use schemars::JsonSchema;
use serde::Serialize;

/// JSON body of a paginated listing.
///
/// `next_cursor` and `prev_cursor` are always present and `null` when there
/// is no page in that direction; `total_count` is omitted unless requested.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct PageResponse<T> {
    /// Records of this page in listing order.
    pub data: Vec<T>,
    /// Cursor to pass as `after` for the following page.
    pub next_cursor: Option<Cursor>,
    /// Cursor to pass as `before` for the preceding page.
    pub prev_cursor: Option<Cursor>,
    /// Number of records in the whole listing, if requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

impl<T> PageResponse<T> {
    /// Creates a response from a page, mapping each record with `f`.
    pub fn from_page<R, F>(page: Page<R>, f: F) -> Self
    where
        F: FnMut(R) -> T,
    {
        Self {
            data: page.items.into_iter().map(f).collect(),
            next_cursor: page.next_cursor,
            prev_cursor: page.prev_cursor,
            total_count: page.total_count,
        }
    }
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self::from_page(page, std::convert::identity)
    }
}
