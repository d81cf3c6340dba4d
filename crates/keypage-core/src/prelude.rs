//! Prelude module for keypage-core.
//!
//! Re-exports the types needed to describe a record source and resolve pages
//! over it with a single `use` statement.

pub use crate::memory::MemorySource;
pub use crate::{
    Cursor, CursorDirection, FetchQuery, KeysetPaginator, OrderBy, Page, PageError, PageRequest,
    PageResult, PaginatorConfig, Predicate, Record, RecordSource, SortBy, SortOrder, SourceSchema,
    Value,
};
