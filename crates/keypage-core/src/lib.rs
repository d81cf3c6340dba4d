#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for page resolution.
///
/// Use this target for logging anchor lookups, boundary construction, and page trimming.
pub const TRACING_TARGET_PAGINATOR: &str = "keypage_core::paginator";

/// Tracing target for record source operations.
///
/// Use this target for logging fetches and counts issued against a record source.
pub const TRACING_TARGET_SOURCE: &str = "keypage_core::source";

mod config;
mod cursor;
mod error;
pub mod memory;
mod ordering;
mod page;
mod paginator;
pub mod predicate;
pub mod prelude;
mod request;
mod source;
mod value;

pub use crate::config::{DEFAULT_PER_PAGE, MAX_PER_PAGE, PaginatorConfig};
pub use crate::cursor::{Cursor, CursorDirection};
pub use crate::error::{ConfigError, PageError, PageResult};
pub use crate::ordering::{OrderBy, SortBy, SortOrder};
pub use crate::page::Page;
pub use crate::paginator::KeysetPaginator;
pub use crate::predicate::{Comparator, Predicate};
pub use crate::request::PageRequest;
pub use crate::source::{FetchQuery, Record, RecordSource, SourceSchema};
pub use crate::value::Value;
