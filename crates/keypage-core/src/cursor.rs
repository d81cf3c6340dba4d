//! Cursor tokens and paging direction.

use std::fmt;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// An opaque token identifying one record's position within an ordering.
///
/// The token is the display form of the record's cursor-key value (its unique
/// public identifier). Callers hand it back verbatim on the next request; it
/// is resolved to a full record before any comparison takes place, so the
/// token itself never carries sort-key values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Creates a new cursor from its token.
    #[inline]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Creates a cursor from an optional request parameter.
    ///
    /// Missing and blank parameters both mean "no cursor".
    pub fn from_param(param: Option<&str>) -> Option<Self> {
        param
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(Self::new)
    }

    /// Returns the cursor token.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the cursor and returns its token.
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Cursor {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Cursor {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> Self {
        cursor.0
    }
}

impl AsRef<str> for Cursor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Direction of travel relative to the anchor record.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display,
    EnumString
)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CursorDirection {
    /// Forward: rows strictly after the anchor, in sort order.
    #[default]
    After,
    /// Backward: rows strictly before the anchor, returned in sort order.
    Before,
}

impl CursorDirection {
    /// Returns whether this is the forward direction.
    #[inline]
    pub fn is_after(self) -> bool {
        matches!(self, Self::After)
    }

    /// Returns whether this is the backward direction.
    #[inline]
    pub fn is_before(self) -> bool {
        matches!(self, Self::Before)
    }
}
