//! Composite orderings and tiebreaker injection.

use std::collections::HashSet;
use std::str::FromStr;

use derive_more::{Deref, IntoIterator};
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{CursorDirection, PageError, SourceSchema};

/// Sort order direction.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display,
    EnumString
)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortOrder {
    /// Ascending order (A-Z, oldest first, smallest first).
    #[default]
    Asc,
    /// Descending order (Z-A, newest first, largest first).
    Desc,
}

impl SortOrder {
    /// Returns the opposite direction.
    #[inline]
    pub fn reverse(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Returns the direction actually applied when paging in `direction`.
    ///
    /// Backward paging walks the ordering in reverse.
    #[inline]
    pub fn for_direction(self, direction: CursorDirection) -> Self {
        match direction {
            CursorDirection::After => self,
            CursorDirection::Before => self.reverse(),
        }
    }
}

/// A single `(field, direction)` sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SortBy {
    /// The field to sort by.
    pub field: String,
    /// The sort order direction.
    #[serde(default)]
    pub order: SortOrder,
}

impl SortBy {
    /// Creates a new sort key with the given field and order.
    #[inline]
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Creates a new sort key with ascending order.
    #[inline]
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    /// Creates a new sort key with descending order.
    #[inline]
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}

impl FromStr for SortBy {
    type Err = PageError<std::convert::Infallible>;

    /// Parses `field`, `field:asc` or `field:desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, order) = match s.split_once(':') {
            Some((field, order)) => {
                let order = order.trim().parse::<SortOrder>().map_err(|_| {
                    PageError::invalid_ordering(format!(
                        "malformed direction `{}` for field `{}`",
                        order.trim(),
                        field.trim()
                    ))
                })?;
                (field.trim(), order)
            }
            None => (s.trim(), SortOrder::Asc),
        };

        if field.is_empty() {
            return Err(PageError::invalid_ordering("empty field name"));
        }

        Ok(Self::new(field, order))
    }
}

/// An ordered list of sort keys.
///
/// The ordering a caller supplies does not need to be total; it is resolved
/// against a [`SourceSchema`] before use, which validates every field and
/// appends the schema's unique key as the final tiebreaker when it is not
/// already present. Without the tiebreaker, rows that tie on every sort key
/// could be skipped or repeated across pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Deref, IntoIterator)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(transparent)]
pub struct OrderBy(#[into_iterator(owned, ref)] Vec<SortBy>);

impl OrderBy {
    /// Creates an empty ordering, which resolves to the key ascending.
    #[inline]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates an ordering with a single ascending key.
    #[inline]
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new().then_asc(field)
    }

    /// Creates an ordering with a single descending key.
    #[inline]
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new().then_desc(field)
    }

    /// Appends a sort key.
    #[inline]
    pub fn then(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.0.push(SortBy::new(field, order));
        self
    }

    /// Appends an ascending sort key.
    #[inline]
    pub fn then_asc(self, field: impl Into<String>) -> Self {
        self.then(field, SortOrder::Asc)
    }

    /// Appends a descending sort key.
    #[inline]
    pub fn then_desc(self, field: impl Into<String>) -> Self {
        self.then(field, SortOrder::Desc)
    }

    /// Parses a comma-separated ordering such as `status:asc,created_at:desc`.
    ///
    /// A bare field name sorts ascending. An empty string yields an empty ordering.
    pub fn parse(input: &str) -> Result<Self, PageError<std::convert::Infallible>> {
        input
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse::<SortBy>)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Validates the ordering against `schema` and makes it total.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InvalidOrdering`] when a field is unknown to the
    /// schema or appears more than once.
    pub fn resolve<E>(&self, schema: &SourceSchema) -> Result<Vec<SortBy>, PageError<E>> {
        let mut seen = HashSet::with_capacity(self.0.len() + 1);

        for key in &self.0 {
            if !schema.contains(&key.field) {
                return Err(PageError::invalid_ordering(format!(
                    "unknown field `{}`",
                    key.field
                )));
            }

            if !seen.insert(key.field.as_str()) {
                return Err(PageError::invalid_ordering(format!(
                    "field `{}` appears more than once",
                    key.field
                )));
            }
        }

        let mut keys = self.0.clone();
        if !seen.contains(schema.key()) {
            keys.push(SortBy::asc(schema.key()));
        }

        Ok(keys)
    }
}

impl From<Vec<SortBy>> for OrderBy {
    fn from(keys: Vec<SortBy>) -> Self {
        Self(keys)
    }
}

impl FromIterator<SortBy> for OrderBy {
    fn from_iter<I: IntoIterator<Item = SortBy>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
