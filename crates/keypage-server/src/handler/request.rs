//! Listing query parameters and their validation.

use keypage_core::{OrderBy, PageRequest, PaginatorConfig, SortBy, SortOrder};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::handler::{ErrorKind, Result};

/// Query parameters accepted by every listing endpoint.
///
/// `?after=<cursor>&before=<cursor>&limit=<n>&sort=<field>&direction=asc|desc&include_count=true`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CursorParams {
    /// Return records that come after this cursor.
    pub after: Option<String>,
    /// Return records that come before this cursor.
    pub before: Option<String>,
    /// Maximum number of records to return.
    ///
    /// Zero or negative values fall back to the default page size.
    pub limit: Option<i64>,
    /// Field to sort by; must be one of the listing's sortable fields.
    pub sort: Option<String>,
    /// Sort direction, `asc` or `desc`.
    pub direction: Option<String>,
    /// Whether to include the total number of records.
    #[serde(default)]
    pub include_count: bool,
}

impl CursorParams {
    /// Validates the parameters against `listing` and builds the page request.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::UnprocessableEntity`] error when the limit
    /// exceeds the listing's maximum, the sort field is not sortable, or the
    /// direction is neither `asc` nor `desc`. Conflicting cursors are left
    /// for the paginator to reject.
    pub fn into_page_request(self, listing: &ListingConfig) -> Result<PageRequest> {
        let max = listing.paginator.max_per_page;
        if let Some(limit) = self.limit
            && limit > i64::from(max)
        {
            return Err(ErrorKind::UnprocessableEntity
                .with_message(format!("`limit` must not exceed {max}"))
                .with_resource("limit"));
        }

        let direction = match non_blank(self.direction.as_deref()) {
            Some(direction) => Some(direction.parse::<SortOrder>().map_err(|_| {
                ErrorKind::UnprocessableEntity
                    .with_message("`direction` must be `asc` or `desc`")
                    .with_resource("direction")
                    .with_context(format!("got `{direction}`"))
            })?),
            None => None,
        };

        let sort = match non_blank(self.sort.as_deref()) {
            Some(field) if !listing.is_sortable(field) => {
                return Err(ErrorKind::UnprocessableEntity
                    .with_message(format!("Cannot sort by `{field}`"))
                    .with_resource("sort")
                    .with_context(format!(
                        "sortable fields: {}",
                        listing.sortable_fields().join(", ")
                    )));
            }
            Some(field) => SortBy::new(field, direction.unwrap_or(listing.default_sort.order)),
            None => SortBy::new(
                listing.default_sort.field.clone(),
                direction.unwrap_or(listing.default_sort.order),
            ),
        };

        let mut request =
            PageRequest::from_params(self.after.as_deref(), self.before.as_deref(), self.limit)
                .with_order(OrderBy::from(vec![sort]));
        request.include_count = self.include_count;

        Ok(request)
    }
}

fn non_blank(param: Option<&str>) -> Option<&str> {
    param.map(str::trim).filter(|param| !param.is_empty())
}

/// Per-listing pagination policy.
///
/// ## Example
///
/// ```rust
/// use keypage_core::SortBy;
/// use keypage_server::handler::ListingConfig;
///
/// let listing = ListingConfig::new(SortBy::desc("created_at"))
///     .with_sortable("title")
///     .with_sortable("id");
///
/// assert!(listing.is_sortable("created_at"));
/// assert!(!listing.is_sortable("body"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingConfig {
    sortable_fields: Vec<String>,
    default_sort: SortBy,
    paginator: PaginatorConfig,
}

impl ListingConfig {
    /// Creates a listing sorted by `default_sort` when the request names no field.
    pub fn new(default_sort: SortBy) -> Self {
        Self {
            sortable_fields: vec![default_sort.field.clone()],
            default_sort,
            paginator: PaginatorConfig::default(),
        }
    }

    /// Allows clients to sort by `field`.
    pub fn with_sortable(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if !self.sortable_fields.contains(&field) {
            self.sortable_fields.push(field);
        }
        self
    }

    /// Sets the page size and cursor policy.
    #[inline]
    pub fn with_paginator(mut self, paginator: PaginatorConfig) -> Self {
        self.paginator = paginator;
        self
    }

    /// Returns whether clients may sort by `field`.
    #[inline]
    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable_fields.iter().any(|sortable| sortable == field)
    }

    /// Returns the fields clients may sort by.
    #[inline]
    pub fn sortable_fields(&self) -> &[String] {
        &self.sortable_fields
    }

    /// Returns the ordering used when the request names no sort field.
    #[inline]
    pub fn default_sort(&self) -> &SortBy {
        &self.default_sort
    }

    /// Returns the paginator configuration.
    #[inline]
    pub fn paginator(&self) -> PaginatorConfig {
        self.paginator
    }
}
