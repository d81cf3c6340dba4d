//! Listing error type.

use std::borrow::Cow;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

type Text = Cow<'static, str>;

/// The error type returned by listing handlers and extractors.
///
/// The [`ErrorKind`] fixes the status code and error name. The message,
/// resource and context are rendered into the JSON body.
#[derive(Debug, Clone, Default)]
#[must_use = "errors do nothing unless turned into a response"]
pub struct Error {
    kind: ErrorKind,
    message: Option<Text>,
    resource: Option<Text>,
    context: Option<Text>,
}

impl Error {
    /// Creates an error of the given kind without details.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Sets the client-facing message.
    pub fn with_message(mut self, message: impl Into<Text>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Names the request parameter the error relates to.
    pub fn with_resource(mut self, resource: impl Into<Text>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Attaches detail such as the offending value.
    pub fn with_context(mut self, context: impl Into<Text>) -> Self {
        self.context = Some(context.into());
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[inline]
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Builds the JSON body.
    pub fn response(self) -> ErrorResponse {
        let body = ErrorResponse::new(self.kind);
        let body = match self.message {
            Some(message) => body.with_message(message),
            None => body,
        };
        let body = match self.resource {
            Some(resource) => body.with_resource(resource),
            None => body,
        };
        match self.context {
            Some(context) => body.with_context(context),
            None => body,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.status_code().as_u16(), self.kind)?;

        if let Some(resource) = &self.resource {
            write!(f, " in `{resource}`")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(context) = &self.context {
            write!(f, " ({context})")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.response().into_response()
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result of a listing handler or extractor.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Outcomes a listing endpoint can answer with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed query string or conflicting cursors.
    BadRequest,
    /// No route matched.
    NotFound,
    /// Well-formed parameters that cannot be honored.
    UnprocessableEntity,
    #[default]
    InternalServerError,
    /// The record source is temporarily unreachable.
    ServiceUnavailable,
}

impl ErrorKind {
    /// Wraps this kind into an [`Error`] without details.
    #[inline]
    pub fn into_error(self) -> Error {
        Error::new(self)
    }

    /// Creates an [`Error`] of this kind with a message.
    #[inline]
    pub fn with_message(self, message: impl Into<Text>) -> Error {
        Error::new(self).with_message(message)
    }

    pub fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns the stable, machine-readable name sent as `name`.
    pub fn name(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::UnprocessableEntity => "unprocessable_entity",
            Self::InternalServerError => "internal_server_error",
            Self::ServiceUnavailable => "service_unavailable",
        }
    }

    /// Returns the message sent when no detail is attached.
    pub fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "Invalid request data.",
            Self::NotFound => "Resource not found.",
            Self::UnprocessableEntity => "The request could not be processed.",
            Self::InternalServerError => "Internal server error.",
            Self::ServiceUnavailable => "Service unavailable.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_internal() {
        let error = Error::default();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn status_codes() {
        assert_eq!(ErrorKind::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorKind::UnprocessableEntity.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorKind::ServiceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn details_reach_the_body() {
        let error = ErrorKind::UnprocessableEntity
            .with_message("Unknown sort field")
            .with_resource("sort")
            .with_context("allowed: id");

        assert_eq!(error.message(), Some("Unknown sort field"));
        assert_eq!(error.resource(), Some("sort"));
        assert_eq!(error.context(), Some("allowed: id"));

        let body = error.response();
        assert_eq!(body.name, "unprocessable_entity");
        assert_eq!(
            body.message,
            "The request could not be processed. Unknown sort field"
        );
        assert_eq!(body.resource.as_deref(), Some("sort"));
    }

    #[test]
    fn display() {
        let error = ErrorKind::BadRequest
            .with_message("Conflicting cursors")
            .with_resource("query");

        assert_eq!(
            error.to_string(),
            "400 bad_request in `query`: Conflicting cursors"
        );
    }
}
