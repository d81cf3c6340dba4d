//! Error types for page resolution.

use std::borrow::Cow;

use crate::Cursor;

/// Errors that can occur while resolving a page.
///
/// Generic over the record source's own error type, which is carried
/// unchanged in [`PageError::Source`] so callers can inspect it.
#[derive(Debug, thiserror::Error)]
#[must_use = "pagination errors should be handled appropriately"]
pub enum PageError<E> {
    /// The ordering references an unknown field, repeats a field, or uses a
    /// malformed direction.
    ///
    /// This is a programmer error and is never recovered from internally.
    #[error("Invalid ordering: {0}")]
    InvalidOrdering(Cow<'static, str>),

    /// Both a `before` and an `after` cursor were supplied.
    #[error("Both `before` and `after` cursors were supplied")]
    ConflictingCursors,

    /// The cursor does not resolve to a record.
    ///
    /// Only returned when strict cursor resolution is enabled; otherwise an
    /// unresolvable cursor is treated as no cursor.
    #[error("Cursor `{0}` does not resolve to a record")]
    CursorNotFound(Cursor),

    /// A record did not expose a field required for paging.
    #[error("Record does not expose field `{0}`")]
    MissingField(Cow<'static, str>),

    /// The record source failed.
    #[error("Record source error: {0}")]
    Source(#[source] E),
}

impl<E> PageError<E> {
    /// Creates an invalid ordering error.
    #[inline]
    pub fn invalid_ordering(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidOrdering(message.into())
    }

    /// Returns whether the error was caused by the request rather than the source.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidOrdering(_) | Self::ConflictingCursors | Self::CursorNotFound(_)
        )
    }

    /// Maps the source error into another type, leaving other variants intact.
    pub fn map_source<F, U>(self, f: F) -> PageError<U>
    where
        F: FnOnce(E) -> U,
    {
        match self {
            Self::InvalidOrdering(message) => PageError::InvalidOrdering(message),
            Self::ConflictingCursors => PageError::ConflictingCursors,
            Self::CursorNotFound(cursor) => PageError::CursorNotFound(cursor),
            Self::MissingField(field) => PageError::MissingField(field),
            Self::Source(error) => PageError::Source(f(error)),
        }
    }
}

/// Invalid paginator configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid paginator configuration: {0}")]
pub struct ConfigError(pub Cow<'static, str>);

/// Specialized [`Result`] type for page resolution.
pub type PageResult<T, E> = Result<T, PageError<E>>;

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::fmt;

    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Boom {}

    #[test]
    fn source_error_is_preserved() {
        let error: PageError<Boom> = PageError::Source(Boom);
        assert_eq!(error.to_string(), "Record source error: boom");
        assert!(std::error::Error::source(&error).is_some());
        assert!(!error.is_client_error());
    }

    #[test]
    fn map_source_keeps_other_variants() {
        let error: PageError<Infallible> = PageError::invalid_ordering("unknown field `x`");
        let mapped: PageError<Boom> = error.map_source(|never| match never {});
        assert!(matches!(mapped, PageError::InvalidOrdering(_)));
        assert!(mapped.is_client_error());
    }
}
