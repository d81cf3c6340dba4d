//! Request extractors with JSON error rejections.

mod query;

pub use query::Query;
