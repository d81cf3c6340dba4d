use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Query as AxumQuery};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use crate::TRACING_TARGET_EXTRACT;
use crate::handler::{Error, ErrorKind};

/// Query string extractor that rejects with a JSON [`Error`].
///
/// Behaves like [`axum::extract::Query`], but a malformed query string is
/// reported as a `400 Bad Request` naming the offending parameter instead of
/// a plain-text rejection.
///
/// # Examples
///
/// ```rust,no_run
/// use keypage_server::extract::Query;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Window {
///     after: Option<String>,
///     limit: Option<i64>,
/// }
///
/// // Route: /posts?after=p3&limit=10
/// async fn posts(Query(window): Query<Window>) -> String {
///     format!("{:?} {:?}", window.after, window.limit)
/// }
/// ```
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    /// Consumes the wrapper and returns the parsed parameters.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        AxumQuery::<T>::from_request_parts(parts, state)
            .await
            .map(|AxumQuery(query)| Query(query))
            .map_err(reject_query)
    }
}

/// Turns an axum query rejection into a bad request naming the failing parameter.
fn reject_query(rejection: QueryRejection) -> Error {
    tracing::debug!(
        target: TRACING_TARGET_EXTRACT,
        error = %rejection,
        "Query string rejected"
    );

    let QueryRejection::FailedToDeserializeQueryString(error) = rejection else {
        return ErrorKind::BadRequest.with_message("The query string could not be parsed");
    };

    let detail = error.body_text();
    let field = quoted_name(&detail);

    if detail.contains("missing field") {
        ErrorKind::BadRequest
            .with_message(format!(
                "Query parameter `{}` is required",
                field.unwrap_or("unknown")
            ))
            .with_resource("query")
    } else if detail.contains("duplicate field") {
        ErrorKind::BadRequest
            .with_message(format!(
                "Query parameter `{}` was given more than once",
                field.unwrap_or("unknown")
            ))
            .with_resource("query")
    } else if detail.contains("invalid digit")
        || detail.contains("invalid type")
        || detail.contains("number too large")
        || detail.contains("provided string was not")
    {
        ErrorKind::BadRequest
            .with_message("A query parameter has the wrong type")
            .with_resource("query")
            .with_context(detail)
    } else {
        ErrorKind::BadRequest
            .with_message("Invalid query parameters")
            .with_resource("query")
            .with_context(detail)
    }
}

/// Returns the first backtick-quoted name in a deserializer message.
fn quoted_name(message: &str) -> Option<&str> {
    let start = message.find('`')? + 1;
    let len = message[start..].find('`')?;
    Some(&message[start..start + len])
}
