//! Conversions from pagination and record source errors.

use std::convert::Infallible;

use keypage_core::PageError;
use keypage_postgres::PgError;

use crate::TRACING_TARGET_HANDLER;
use crate::handler::{Error, ErrorKind};

impl<E> From<PageError<E>> for Error
where
    E: Into<Error>,
{
    fn from(error: PageError<E>) -> Self {
        match error {
            PageError::ConflictingCursors => ErrorKind::BadRequest
                .with_message("Only one of `after` and `before` may be given")
                .with_resource("query"),
            PageError::CursorNotFound(cursor) => ErrorKind::UnprocessableEntity
                .with_message("The cursor does not identify a record")
                .with_resource("cursor")
                .with_context(format!("cursor `{cursor}`")),
            PageError::InvalidOrdering(reason) => ErrorKind::UnprocessableEntity
                .with_message("The requested ordering is not supported")
                .with_resource("sort")
                .with_context(reason),
            PageError::MissingField(field) => {
                tracing::error!(
                    target: TRACING_TARGET_HANDLER,
                    field = %field,
                    "Record does not expose a paging field"
                );
                ErrorKind::InternalServerError.into_error()
            }
            PageError::Source(error) => error.into(),
        }
    }
}

impl From<PgError> for Error {
    fn from(error: PgError) -> Self {
        if error.is_transient() {
            tracing::warn!(
                target: TRACING_TARGET_HANDLER,
                error = %error,
                "Record source temporarily unavailable"
            );
            return ErrorKind::ServiceUnavailable.into_error();
        }

        tracing::error!(
            target: TRACING_TARGET_HANDLER,
            error = %error,
            "Record source failed"
        );
        ErrorKind::InternalServerError.into_error()
    }
}

impl From<Infallible> for Error {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

#[cfg(test)]
mod tests {
    use keypage_core::Cursor;

    use super::*;

    #[test]
    fn client_errors() {
        let error = Error::from(PageError::<Infallible>::ConflictingCursors);
        assert_eq!(error.kind(), ErrorKind::BadRequest);

        let error = Error::from(PageError::<Infallible>::CursorNotFound(Cursor::new("p9")));
        assert_eq!(error.kind(), ErrorKind::UnprocessableEntity);
        assert_eq!(error.context(), Some("cursor `p9`"));

        let error = Error::from(PageError::<Infallible>::invalid_ordering("unknown field `x`"));
        assert_eq!(error.kind(), ErrorKind::UnprocessableEntity);
    }

    #[test]
    fn missing_field_is_internal() {
        let error = Error::from(PageError::<Infallible>::MissingField("created_at".into()));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert!(error.message().is_none());
    }

    #[test]
    fn source_errors() {
        let error = Error::from(PageError::Source(PgError::unknown_column("posts", "x")));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);

        let error = Error::from(PgError::Timeout(keypage_postgres::TimeoutType::Wait));
        assert_eq!(error.kind(), ErrorKind::ServiceUnavailable);
    }
}
