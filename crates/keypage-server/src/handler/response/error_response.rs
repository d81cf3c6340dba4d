use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use schemars::JsonSchema;
use serde::Serialize;

use crate::handler::ErrorKind;

/// JSON body of every error response.
///
/// The status code travels alongside the body and is not serialized.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ErrorResponse {
    /// Stable machine-readable error name.
    pub name: Cow<'static, str>,
    /// Message safe to show to clients.
    pub message: Cow<'static, str>,
    /// The request parameter the error relates to, such as `sort` or `cursor`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'static, str>>,
    /// Additional detail about what went wrong.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Cow<'static, str>>,

    #[serde(skip)]
    pub status: StatusCode,
}

impl ErrorResponse {
    /// Creates the default body of `kind`.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            name: Cow::Borrowed(kind.name()),
            message: Cow::Borrowed(kind.default_message()),
            resource: None,
            context: None,
            status: kind.status_code(),
        }
    }

    /// Appends `message` to the default message.
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        let base = self.message.trim_end_matches('.');
        self.message = Cow::Owned(format!("{base}. {}", message.into()));
        self
    }

    /// Sets the resource, nesting it under an existing one with `/`.
    pub fn with_resource(mut self, resource: impl Into<Cow<'static, str>>) -> Self {
        let resource = resource.into();
        self.resource = Some(match self.resource.take() {
            Some(parent) => Cow::Owned(format!("{parent}/{resource}")),
            None => resource,
        });
        self
    }

    /// Adds context, joining it to existing context with `; `.
    pub fn with_context(mut self, context: impl Into<Cow<'static, str>>) -> Self {
        let context = context.into();
        self.context = Some(match self.context.take() {
            Some(earlier) => Cow::Owned(format!("{earlier}; {context}")),
            None => context,
        });
        self
    }
}

impl From<ErrorKind> for ErrorResponse {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
