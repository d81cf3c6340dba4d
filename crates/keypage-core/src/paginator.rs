//! Keyset paginator.

use std::borrow::Cow;

use crate::{
    Cursor, CursorDirection, FetchQuery, Page, PageError, PageRequest, PageResult,
    PaginatorConfig, Predicate, Record, RecordSource, SortBy, TRACING_TARGET_PAGINATOR, Value,
};

/// Resolves bounded, bidirectional pages over a [`RecordSource`].
///
/// Each call fetches one row beyond the page size to learn whether more rows
/// exist, so no total count is needed to decide `has_more`. Backward pages are
/// fetched under the reversed ordering and flipped back before returning, so
/// items are always in forward order.
///
/// ## Example
///
/// ```rust,ignore
/// let paginator = KeysetPaginator::new(&posts);
/// let request = PageRequest::first(20).with_order(OrderBy::desc("created_at"));
///
/// let page = paginator.paginate(&request).await?;
/// if let Some(next) = page.next_cursor {
///     let next_page = paginator.paginate(&PageRequest::after(next, 20)).await?;
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct KeysetPaginator<'a, S> {
    source: &'a S,
    config: PaginatorConfig,
}

impl<'a, S> KeysetPaginator<'a, S>
where
    S: RecordSource,
{
    /// Creates a paginator with the default configuration.
    pub fn new(source: &'a S) -> Self {
        Self::with_config(source, PaginatorConfig::default())
    }

    /// Creates a paginator with a custom configuration.
    pub fn with_config(source: &'a S, config: PaginatorConfig) -> Self {
        Self { source, config }
    }

    /// Returns the paginator's configuration.
    #[inline]
    pub fn config(&self) -> &PaginatorConfig {
        &self.config
    }

    /// Returns the underlying record source.
    #[inline]
    pub fn source(&self) -> &'a S {
        self.source
    }

    /// Resolves one page for `request`.
    ///
    /// # Errors
    ///
    /// - [`PageError::InvalidOrdering`] for unknown or repeated sort fields.
    /// - [`PageError::ConflictingCursors`] when both cursors are supplied.
    /// - [`PageError::CursorNotFound`] for unresolvable cursors in strict mode.
    /// - [`PageError::MissingField`] when a record lacks a sort or cursor field.
    /// - [`PageError::Source`] when the source fails.
    pub async fn paginate(&self, request: &PageRequest) -> PageResult<Page<S::Record>, S::Error> {
        let keys = request.order.resolve(self.source.schema())?;
        let (direction, cursor) = request.direction()?;
        let limit = self.config.clamp_limit(request.limit);

        tracing::debug!(
            target: TRACING_TARGET_PAGINATOR,
            %direction,
            cursor = cursor.map(Cursor::as_str),
            limit,
            keys = keys.len(),
            "Resolving page"
        );

        let filter = match cursor {
            Some(cursor) => self.boundary(cursor, &keys, direction).await?,
            None => None,
        };

        let order = keys
            .iter()
            .map(|key| SortBy::new(key.field.clone(), key.order.for_direction(direction)))
            .collect();

        let query = FetchQuery {
            filter,
            order,
            limit: u64::from(limit) + 1,
        };

        let mut items = self.source.fetch(query).await.map_err(PageError::Source)?;

        let page_size = limit as usize;
        let has_more = items.len() > page_size;
        items.truncate(page_size);

        if direction.is_before() {
            items.reverse();
        }

        let (next_cursor, prev_cursor) = match (direction, has_more) {
            (CursorDirection::After, true) => (self.cursor_of(items.last())?, None),
            (CursorDirection::Before, true) => (None, self.cursor_of(items.first())?),
            (_, false) => (None, None),
        };

        let total_count = if request.include_count {
            Some(self.total_count().await?)
        } else {
            None
        };

        tracing::debug!(
            target: TRACING_TARGET_PAGINATOR,
            items = items.len(),
            has_more,
            "Resolved page"
        );

        Ok(Page {
            items,
            has_more,
            next_cursor,
            prev_cursor,
            total_count,
        })
    }

    /// Counts every record in the source, ignoring cursors.
    pub async fn total_count(&self) -> PageResult<u64, S::Error> {
        self.source.count().await.map_err(PageError::Source)
    }

    /// Resolves `cursor` to its anchor record and builds the boundary predicate.
    ///
    /// Returns `Ok(None)` for an unresolvable cursor in lenient mode, which
    /// restarts paging from the edge of the source.
    async fn boundary(
        &self,
        cursor: &Cursor,
        keys: &[SortBy],
        direction: CursorDirection,
    ) -> PageResult<Option<Predicate>, S::Error> {
        let Some(anchor) = self
            .source
            .find_by_cursor(cursor)
            .await
            .map_err(PageError::Source)?
        else {
            if self.config.strict_cursors {
                return Err(PageError::CursorNotFound(cursor.clone()));
            }

            tracing::warn!(
                target: TRACING_TARGET_PAGINATOR,
                cursor = cursor.as_str(),
                "Cursor does not resolve to a record, paging from the start"
            );

            return Ok(None);
        };

        let values = keys
            .iter()
            .map(|key| field_value(&anchor, &key.field))
            .collect::<PageResult<Vec<_>, S::Error>>()?;

        Ok(Some(Predicate::keyset(keys, &values, direction)))
    }

    fn cursor_of(&self, record: Option<&S::Record>) -> PageResult<Option<Cursor>, S::Error> {
        let Some(record) = record else {
            return Ok(None);
        };

        let cursor_key = self.source.schema().cursor_key();
        field_value(record, cursor_key)?
            .to_cursor()
            .map(Some)
            .ok_or_else(|| PageError::MissingField(Cow::Owned(cursor_key.to_owned())))
    }
}

fn field_value<R, E>(record: &R, field: &str) -> PageResult<Value, E>
where
    R: Record,
{
    record
        .value(field)
        .ok_or_else(|| PageError::MissingField(Cow::Owned(field.to_owned())))
}
