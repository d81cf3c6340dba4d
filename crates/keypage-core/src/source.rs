//! Record source abstraction consumed by the paginator.

use std::future::Future;

use crate::{Cursor, Predicate, SortBy, Value};

/// Describes the fields a record source can filter and order by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSchema {
    key: String,
    cursor_key: String,
    fields: Vec<String>,
}

impl SourceSchema {
    /// Creates a schema whose unique `key` doubles as the cursor key.
    ///
    /// The key is always part of the field list, whether or not `fields` names it.
    pub fn new<I, F>(key: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        let key = key.into();
        let mut fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if !fields.contains(&key) {
            fields.push(key.clone());
        }

        Self {
            cursor_key: key.clone(),
            key,
            fields,
        }
    }

    /// Sets the field whose value is handed out as the cursor token.
    ///
    /// The field must be unique across the source; it is typically a public
    /// identifier distinct from the internal key.
    pub fn with_cursor_key(mut self, cursor_key: impl Into<String>) -> Self {
        let cursor_key = cursor_key.into();
        if !self.fields.contains(&cursor_key) {
            self.fields.push(cursor_key.clone());
        }
        self.cursor_key = cursor_key;
        self
    }

    /// Returns the unique tiebreaker field.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the field whose value is used as the cursor token.
    #[inline]
    pub fn cursor_key(&self) -> &str {
        &self.cursor_key
    }

    /// Returns all known fields.
    #[inline]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns whether `field` is known to this schema.
    #[inline]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|known| known == field)
    }
}

/// A record whose field values can be read by name.
pub trait Record {
    /// Returns the value of `field`, or `None` when the record has no such field.
    ///
    /// A field that exists but holds no value must be reported as
    /// `Some(Value::Null)`.
    fn value(&self, field: &str) -> Option<Value>;
}

/// A bounded, ordered fetch issued by the paginator.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchQuery {
    /// Extra predicate applied on top of the source's own filters.
    pub filter: Option<Predicate>,
    /// Total ordering to apply, already flipped for backward paging.
    pub order: Vec<SortBy>,
    /// Maximum number of rows to return.
    pub limit: u64,
}

/// A filterable, orderable record source.
///
/// Implementations carry the caller's base scope (visibility, tenancy and
/// similar filters) themselves; the paginator only ever narrows it further.
pub trait RecordSource: Send + Sync {
    /// The record type produced by this source.
    type Record: Record + Send;
    /// The error type returned by this source.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the schema describing filterable and orderable fields.
    fn schema(&self) -> &SourceSchema;

    /// Looks up one record by cursor token.
    ///
    /// The lookup must ignore the source's base filters: the anchor is only a
    /// positional reference and need not itself be visible in the page.
    fn find_by_cursor(
        &self,
        cursor: &Cursor,
    ) -> impl Future<Output = Result<Option<Self::Record>, Self::Error>> + Send;

    /// Returns the first `query.limit` records matching the base filters and
    /// `query.filter`, ordered by `query.order`.
    fn fetch(
        &self,
        query: FetchQuery,
    ) -> impl Future<Output = Result<Vec<Self::Record>, Self::Error>> + Send;

    /// Counts the records matching the base filters.
    fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send;
}

impl<S> RecordSource for &S
where
    S: RecordSource,
{
    type Error = S::Error;
    type Record = S::Record;

    fn schema(&self) -> &SourceSchema {
        (**self).schema()
    }

    fn find_by_cursor(
        &self,
        cursor: &Cursor,
    ) -> impl Future<Output = Result<Option<Self::Record>, Self::Error>> + Send {
        (**self).find_by_cursor(cursor)
    }

    fn fetch(
        &self,
        query: FetchQuery,
    ) -> impl Future<Output = Result<Vec<Self::Record>, Self::Error>> + Send {
        (**self).fetch(query)
    }

    fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send {
        (**self).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_includes_key_and_cursor_key() {
        let schema = SourceSchema::new("id", ["created_at"]).with_cursor_key("public_id");
        assert_eq!(schema.key(), "id");
        assert_eq!(schema.cursor_key(), "public_id");
        assert!(schema.contains("id"));
        assert!(schema.contains("public_id"));
        assert!(schema.contains("created_at"));
        assert!(!schema.contains("title"));
    }

    #[test]
    fn schema_defaults_cursor_key_to_key() {
        let schema = SourceSchema::new("id", ["id"]);
        assert_eq!(schema.cursor_key(), "id");
        assert_eq!(schema.fields().len(), 1);
    }
}
