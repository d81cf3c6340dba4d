//! Per-request pagination parameters.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Cursor, CursorDirection, OrderBy, PageError};

/// Cursor pagination parameters for one page request.
///
/// Mirrors the conventional query-string shape: at most one of `after` and
/// `before`, an optional `limit`, and an ordering. The limit is clamped by
/// the paginator's configuration, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct PageRequest {
    /// Cursor of the record to page forward from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Cursor>,
    /// Cursor of the record to page backward from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Cursor>,
    /// Requested page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Requested ordering; the source's key is appended as tiebreaker.
    #[serde(default)]
    pub order: OrderBy,
    /// Whether to include the total count of the (uncursored) source.
    /// Set to `false` to skip the count query for better performance.
    #[serde(default)]
    pub include_count: bool,
}

impl PageRequest {
    /// Creates a request for the first page.
    #[inline]
    pub fn first(limit: i64) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Creates a request for the page following `cursor`.
    #[inline]
    pub fn after(cursor: impl Into<Cursor>, limit: i64) -> Self {
        Self {
            after: Some(cursor.into()),
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Creates a request for the page preceding `cursor`.
    #[inline]
    pub fn before(cursor: impl Into<Cursor>, limit: i64) -> Self {
        Self {
            before: Some(cursor.into()),
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Creates a request from raw query parameters, dropping blank cursors.
    pub fn from_params(after: Option<&str>, before: Option<&str>, limit: Option<i64>) -> Self {
        Self {
            after: Cursor::from_param(after),
            before: Cursor::from_param(before),
            limit,
            ..Self::default()
        }
    }

    /// Sets the ordering.
    #[inline]
    pub fn with_order(mut self, order: OrderBy) -> Self {
        self.order = order;
        self
    }

    /// Sets the page size.
    #[inline]
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Enables including the total count in the page.
    #[inline]
    pub fn with_count(mut self) -> Self {
        self.include_count = true;
        self
    }

    /// Returns the paging direction and its cursor, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::ConflictingCursors`] when both cursors are present.
    pub fn direction<E>(&self) -> Result<(CursorDirection, Option<&Cursor>), PageError<E>> {
        match (&self.after, &self.before) {
            (Some(_), Some(_)) => Err(PageError::ConflictingCursors),
            (None, Some(before)) => Ok((CursorDirection::Before, Some(before))),
            (after, None) => Ok((CursorDirection::After, after.as_ref())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;

    #[test]
    fn direction_defaults_to_after() {
        let request = PageRequest::default();
        let (direction, cursor) = request.direction::<Infallible>().unwrap();
        assert_eq!(direction, CursorDirection::After);
        assert!(cursor.is_none());
    }

    #[test]
    fn direction_from_cursor() {
        let request = PageRequest::before("p4", 2);
        let (direction, cursor) = request.direction::<Infallible>().unwrap();
        assert_eq!(direction, CursorDirection::Before);
        assert_eq!(cursor, Some(&Cursor::new("p4")));

        let request = PageRequest::after("p2", 2);
        let (direction, _) = request.direction::<Infallible>().unwrap();
        assert_eq!(direction, CursorDirection::After);
    }

    #[test]
    fn conflicting_cursors() {
        let request = PageRequest::from_params(Some("a"), Some("b"), None);
        assert!(matches!(
            request.direction::<Infallible>(),
            Err(PageError::ConflictingCursors)
        ));
    }

    #[test]
    fn blank_cursor_does_not_conflict() {
        let request = PageRequest::from_params(Some("a"), Some(""), Some(10));
        let (direction, cursor) = request.direction::<Infallible>().unwrap();
        assert_eq!(direction, CursorDirection::After);
        assert_eq!(cursor, Some(&Cursor::new("a")));
    }
}
