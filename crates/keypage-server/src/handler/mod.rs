//! Listing [`Router`]s and their handlers.
//!
//! A listing serves one [`RecordSource`] under one path. Query parameters are
//! validated against the listing's [`ListingConfig`], resolved into a page by
//! a [`KeysetPaginator`], and rendered as a [`PageResponse`].
//!
//! # Usage Example
//!
//! ```rust
//! use keypage_core::prelude::*;
//! use keypage_server::handler::{ListState, ListingConfig, routes};
//!
//! #[derive(Clone, serde::Serialize)]
//! struct Tag {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Record for Tag {
//!     fn value(&self, field: &str) -> Option<Value> {
//!         match field {
//!             "id" => Some(self.id.into()),
//!             "name" => Some(self.name.as_str().into()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let tags = MemorySource::new(SourceSchema::new("id", ["name"]), Vec::<Tag>::new());
//! let listing = ListingConfig::new(SortBy::asc("name")).with_sortable("id");
//!
//! let router: axum::Router = routes("/tags", ListState::new(tags, listing));
//! ```
//!
//! [`Router`]: axum::Router
//! [`RecordSource`]: keypage_core::RecordSource
//! [`KeysetPaginator`]: keypage_core::KeysetPaginator

mod error;
mod request;
mod response;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use keypage_core::{KeysetPaginator, RecordSource};
use serde::Serialize;

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::request::{CursorParams, ListingConfig};
pub use crate::handler::response::{ErrorResponse, PageResponse};
use crate::TRACING_TARGET_HANDLER;
use crate::extract::Query;

/// Shared state of one listing: its record source and pagination policy.
pub struct ListState<S> {
    source: Arc<S>,
    listing: Arc<ListingConfig>,
}

impl<S> ListState<S> {
    /// Creates the state of a listing over `source`.
    pub fn new(source: S, listing: ListingConfig) -> Self {
        Self {
            source: Arc::new(source),
            listing: Arc::new(listing),
        }
    }

    /// Returns the record source.
    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the listing configuration.
    #[inline]
    pub fn listing(&self) -> &ListingConfig {
        &self.listing
    }
}

impl<S> Clone for ListState<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            listing: Arc::clone(&self.listing),
        }
    }
}

/// Returns one page of the listing.
#[tracing::instrument(skip_all, fields(after = ?params.after, before = ?params.before))]
async fn list_records<S>(
    State(state): State<ListState<S>>,
    Query(params): Query<CursorParams>,
) -> Result<(StatusCode, Json<PageResponse<S::Record>>)>
where
    S: RecordSource + Send + Sync + 'static,
    S::Record: Serialize,
    S::Error: Into<Error>,
{
    tracing::debug!(target: TRACING_TARGET_HANDLER, "Listing records");

    let request = params.into_page_request(state.listing())?;
    let paginator = KeysetPaginator::with_config(state.source(), state.listing().paginator());
    let page = paginator.paginate(&request).await?;

    tracing::debug!(
        target: TRACING_TARGET_HANDLER,
        records = page.len(),
        has_more = page.has_more,
        "Records listed"
    );

    Ok((StatusCode::OK, Json(PageResponse::from(page))))
}

/// Answers requests that match no route.
pub async fn fallback() -> Error {
    ErrorKind::NotFound.into_error()
}

/// Returns a router serving the listing at `path`.
pub fn routes<S>(path: &str, state: ListState<S>) -> Router
where
    S: RecordSource + Send + Sync + 'static,
    S::Record: Serialize,
    S::Error: Into<Error>,
{
    Router::new()
        .route(path, get(list_records::<S>))
        .with_state(state)
}

#[cfg(test)]
mod test {
    use axum_test::TestServer;
    use keypage_core::prelude::*;
    use serde_json::{Value as Json, json};

    use super::*;

    #[derive(Debug, Clone, Serialize)]
    struct Post {
        id: i64,
        status: &'static str,
    }

    impl Record for Post {
        fn value(&self, field: &str) -> Option<Value> {
            match field {
                "id" => Some(self.id.into()),
                "status" => Some(self.status.into()),
                _ => None,
            }
        }
    }

    fn posts() -> MemorySource<Post> {
        let statuses = ["draft", "live", "draft", "live", "draft"];
        MemorySource::new(
            SourceSchema::new("id", ["status"]),
            statuses
                .into_iter()
                .zip(1..)
                .map(|(status, id)| Post { id, status }),
        )
    }

    fn listing() -> ListingConfig {
        ListingConfig::new(SortBy::asc("id"))
            .with_sortable("status")
            .with_paginator(PaginatorConfig::default().with_max_per_page(10))
    }

    /// Returns a new [`TestServer`] over the given listing.
    fn create_test_server_with(listing: ListingConfig) -> anyhow::Result<TestServer> {
        let router = routes("/posts", ListState::new(posts(), listing)).fallback(fallback);
        let server = TestServer::new(router)?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] over the default listing.
    fn create_test_server() -> anyhow::Result<TestServer> {
        create_test_server_with(listing())
    }

    fn ids(body: &Json) -> Vec<i64> {
        body["data"]
            .as_array()
            .map(|data| data.iter().filter_map(|post| post["id"].as_i64()).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn first_page() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/posts").add_query_param("limit", 2).await;
        response.assert_status_ok();

        let body: Json = response.json();
        assert_eq!(ids(&body), vec![1, 2]);
        assert_eq!(body["next_cursor"], json!("2"));
        assert_eq!(body["prev_cursor"], Json::Null);
        assert!(body.get("total_count").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn forward_walk() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .get("/posts")
            .add_query_param("after", "2")
            .add_query_param("limit", 2)
            .await;
        let body: Json = response.json();
        assert_eq!(ids(&body), vec![3, 4]);
        assert_eq!(body["next_cursor"], json!("4"));

        let response = server
            .get("/posts")
            .add_query_param("after", "4")
            .add_query_param("limit", 2)
            .await;
        let body: Json = response.json();
        assert_eq!(ids(&body), vec![5]);
        assert_eq!(body["next_cursor"], Json::Null);
        Ok(())
    }

    #[tokio::test]
    async fn backward_page() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .get("/posts")
            .add_query_param("before", "4")
            .add_query_param("limit", 2)
            .await;
        response.assert_status_ok();

        let body: Json = response.json();
        assert_eq!(ids(&body), vec![2, 3]);
        assert_eq!(body["prev_cursor"], json!("2"));
        assert_eq!(body["next_cursor"], Json::Null);
        Ok(())
    }

    #[tokio::test]
    async fn sort_and_count() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .get("/posts")
            .add_query_param("sort", "status")
            .add_query_param("direction", "desc")
            .add_query_param("include_count", true)
            .await;
        response.assert_status_ok();

        let body: Json = response.json();
        assert_eq!(ids(&body), vec![2, 4, 1, 3, 5]);
        assert_eq!(body["total_count"], json!(5));
        Ok(())
    }

    #[tokio::test]
    async fn conflicting_cursors() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .get("/posts")
            .add_query_param("after", "1")
            .add_query_param("before", "4")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Json = response.json();
        assert_eq!(body["name"], json!("bad_request"));
        assert_eq!(body["resource"], json!("query"));
        Ok(())
    }

    #[tokio::test]
    async fn oversized_limit() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/posts").add_query_param("limit", 11).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        Ok(())
    }

    #[tokio::test]
    async fn unsortable_field() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/posts").add_query_param("sort", "title").await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Json = response.json();
        assert_eq!(body["resource"], json!("sort"));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_limit() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/posts").add_query_param("limit", "ten").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_cursor() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server.get("/posts").add_query_param("after", "99").await;
        response.assert_status_ok();
        assert_eq!(ids(&response.json()), vec![1, 2, 3, 4, 5]);

        let strict = listing().with_paginator(PaginatorConfig::default().with_strict_cursors(true));
        let server = create_test_server_with(strict)?;
        let response = server.get("/posts").add_query_param("after", "99").await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_route() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/comments").await;
        response.assert_status_not_found();
        Ok(())
    }
}
