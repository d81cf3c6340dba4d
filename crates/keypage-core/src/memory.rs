//! In-memory record source.
//!
//! Evaluates predicates and orderings directly against owned records. Used in
//! tests and for small, fully materialized collections.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::future::{Future, ready};

use crate::{
    Cursor, FetchQuery, Predicate, Record, RecordSource, SortBy, SortOrder, SourceSchema,
    TRACING_TARGET_SOURCE, Value,
};

/// A [`RecordSource`] over a vector of records.
#[derive(Debug, Clone)]
pub struct MemorySource<R> {
    schema: SourceSchema,
    records: Vec<R>,
    filter: Option<Predicate>,
}

impl<R> MemorySource<R>
where
    R: Record,
{
    /// Creates a source over `records` described by `schema`.
    pub fn new(schema: SourceSchema, records: impl IntoIterator<Item = R>) -> Self {
        Self {
            schema,
            records: records.into_iter().collect(),
            filter: None,
        }
    }

    /// Restricts the source to records matching `filter`.
    ///
    /// The filter applies to fetches and counts, but not to cursor lookups.
    pub fn with_filter(mut self, filter: Predicate) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Adds a record.
    pub fn insert(&mut self, record: R) {
        self.records.push(record);
    }

    /// Removes every record whose cursor field matches `cursor`.
    ///
    /// Returns the number of removed records.
    pub fn remove(&mut self, cursor: &Cursor) -> usize {
        let before = self.records.len();
        let cursor_key = self.schema.cursor_key().to_owned();
        self.records.retain(|record| !has_cursor(record, &cursor_key, cursor));
        before - self.records.len()
    }

    /// Returns all records, regardless of the filter.
    #[inline]
    pub fn records(&self) -> &[R] {
        &self.records
    }

    fn matches(&self, record: &R, filter: Option<&Predicate>) -> bool {
        let lookup = |field: &str| record.value(field);
        self.filter
            .iter()
            .chain(filter)
            .all(|predicate| predicate.evaluate(&lookup))
    }
}

impl<R> RecordSource for MemorySource<R>
where
    R: Record + Clone + Send + Sync,
{
    type Error = Infallible;
    type Record = R;

    fn schema(&self) -> &SourceSchema {
        &self.schema
    }

    fn find_by_cursor(
        &self,
        cursor: &Cursor,
    ) -> impl Future<Output = Result<Option<R>, Infallible>> + Send {
        let cursor_key = self.schema.cursor_key();
        let found = self
            .records
            .iter()
            .find(|record| has_cursor(*record, cursor_key, cursor))
            .cloned();

        ready(Ok(found))
    }

    fn fetch(&self, query: FetchQuery) -> impl Future<Output = Result<Vec<R>, Infallible>> + Send {
        let mut rows: Vec<&R> = self
            .records
            .iter()
            .filter(|record| self.matches(record, query.filter.as_ref()))
            .collect();

        rows.sort_by(|a, b| compare(*a, *b, &query.order));

        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        let rows: Vec<R> = rows.into_iter().take(limit).cloned().collect();

        tracing::trace!(
            target: TRACING_TARGET_SOURCE,
            rows = rows.len(),
            limit = query.limit,
            "Fetched in-memory rows"
        );

        ready(Ok(rows))
    }

    fn count(&self) -> impl Future<Output = Result<u64, Infallible>> + Send {
        let count = self
            .records
            .iter()
            .filter(|record| self.matches(record, None))
            .count();

        ready(Ok(count as u64))
    }
}

fn has_cursor<R: Record>(record: &R, cursor_key: &str, cursor: &Cursor) -> bool {
    record
        .value(cursor_key)
        .and_then(|value| value.to_cursor())
        .is_some_and(|token| &token == cursor)
}

fn compare<R: Record>(a: &R, b: &R, order: &[SortBy]) -> Ordering {
    for key in order {
        let left = a.value(&key.field).unwrap_or(Value::Null);
        let right = b.value(&key.field).unwrap_or(Value::Null);

        let ordering = match key.order {
            SortOrder::Asc => left.total_cmp(&right),
            SortOrder::Desc => right.total_cmp(&left),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}
