//! Table descriptors.

use keypage_core::{Cursor, SourceSchema, Value};
use strum::{AsRefStr, Display};

use crate::{PgError, PgResult};

/// Column types the record source can bind and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ColumnType {
    /// `boolean`.
    Bool,
    /// `smallint`, `integer` or `bigint`.
    Int,
    /// `real` or `double precision`.
    Float,
    /// `text` or `varchar`.
    Text,
    /// `uuid`.
    Uuid,
    /// `timestamptz`.
    Timestamp,
}

impl ColumnType {
    /// Parses a cursor token as a value of this type.
    ///
    /// Returns `None` when the token is not a valid value of this type.
    pub fn parse(self, token: &str) -> Option<Value> {
        match self {
            Self::Bool => token.parse::<bool>().ok().map(Value::Bool),
            Self::Int => token.parse::<i64>().ok().map(Value::Int),
            Self::Float => token.parse::<f64>().ok().map(Value::Float),
            Self::Text => Some(Value::Text(token.to_owned())),
            Self::Uuid => uuid::Uuid::parse_str(token).ok().map(Value::Uuid),
            Self::Timestamp => token.parse::<jiff::Timestamp>().ok().map(Value::Timestamp),
        }
    }
}

/// A declared column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgColumn {
    name: String,
    column_type: ColumnType,
}

impl PgColumn {
    /// Returns the column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the column type.
    #[inline]
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }
}

/// Describes a table the record source reads from.
///
/// Only declared columns can be selected, filtered or ordered by; any other
/// name is rejected before a statement is rendered.
///
/// ## Example
///
/// ```rust
/// use keypage_postgres::{ColumnType, PgTable};
///
/// let posts = PgTable::new("posts", "id", ColumnType::Int)
///     .column("public_id", ColumnType::Uuid)
///     .column("title", ColumnType::Text)
///     .column("created_at", ColumnType::Timestamp)
///     .with_cursor_key("public_id");
///
/// assert_eq!(posts.cursor_key(), "public_id");
/// assert!(posts.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgTable {
    name: String,
    columns: Vec<PgColumn>,
    key: String,
    cursor_key: String,
}

impl PgTable {
    /// Creates a table whose unique `key` column doubles as the cursor key.
    pub fn new(name: impl Into<String>, key: impl Into<String>, key_type: ColumnType) -> Self {
        let key = key.into();
        Self {
            name: name.into(),
            columns: Vec::new(),
            cursor_key: key.clone(),
            key: key.clone(),
        }
        .column(key, key_type)
    }

    /// Declares a column. Redeclaring a column replaces its type.
    pub fn column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        let name = name.into();
        match self.columns.iter_mut().find(|column| column.name == name) {
            Some(column) => column.column_type = column_type,
            None => self.columns.push(PgColumn { name, column_type }),
        }
        self
    }

    /// Sets the unique column whose values are handed out as cursors.
    pub fn with_cursor_key(mut self, cursor_key: impl Into<String>) -> Self {
        self.cursor_key = cursor_key.into();
        self
    }

    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unique tiebreaker column.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the cursor column.
    #[inline]
    pub fn cursor_key(&self) -> &str {
        &self.cursor_key
    }

    /// Returns the declared columns.
    #[inline]
    pub fn columns(&self) -> &[PgColumn] {
        &self.columns
    }

    /// Returns the type of a declared column.
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .map(PgColumn::column_type)
    }

    /// Parses `cursor` as a value of the cursor column's type.
    pub fn parse_cursor(&self, cursor: &Cursor) -> Option<Value> {
        self.column_type(&self.cursor_key)?.parse(cursor.as_str())
    }

    /// Checks that the table name is usable and the cursor key is declared.
    pub fn validate(&self) -> PgResult<()> {
        if self.name.is_empty() || self.name.split('.').any(str::is_empty) {
            return Err(PgError::Config(format!("invalid table name `{}`", self.name)));
        }

        if self.column_type(&self.cursor_key).is_none() {
            return Err(PgError::unknown_column(&self.name, &self.cursor_key));
        }

        Ok(())
    }

    /// Returns the pagination schema of this table.
    pub fn schema(&self) -> SourceSchema {
        SourceSchema::new(&self.key, self.columns.iter().map(|column| column.name.clone()))
            .with_cursor_key(&self.cursor_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posts() -> PgTable {
        PgTable::new("posts", "id", ColumnType::Int)
            .column("public_id", ColumnType::Uuid)
            .column("status", ColumnType::Text)
            .with_cursor_key("public_id")
    }

    #[test]
    fn key_is_declared() {
        let table = PgTable::new("posts", "id", ColumnType::Int);
        assert_eq!(table.column_type("id"), Some(ColumnType::Int));
        assert_eq!(table.cursor_key(), "id");
    }

    #[test]
    fn redeclaring_replaces_type() {
        let table = posts().column("status", ColumnType::Int);
        assert_eq!(table.columns().len(), 3);
        assert_eq!(table.column_type("status"), Some(ColumnType::Int));
    }

    #[test]
    fn schema_mirrors_columns() {
        let schema = posts().schema();
        assert_eq!(schema.key(), "id");
        assert_eq!(schema.cursor_key(), "public_id");
        assert!(schema.contains("status"));
        assert!(!schema.contains("title"));
    }

    #[test]
    fn cursor_parsing() {
        let table = posts();
        let id = uuid::Uuid::nil();
        assert_eq!(
            table.parse_cursor(&Cursor::new(id.to_string())),
            Some(Value::Uuid(id))
        );
        assert_eq!(table.parse_cursor(&Cursor::new("42")), None);

        let table = PgTable::new("posts", "id", ColumnType::Int);
        assert_eq!(table.parse_cursor(&Cursor::new("42")), Some(Value::Int(42)));
        assert_eq!(table.parse_cursor(&Cursor::new("forty-two")), None);
    }

    #[test]
    fn timestamp_cursor_round_trips() {
        let table = PgTable::new("events", "at", ColumnType::Timestamp);
        let at: jiff::Timestamp = "2024-05-01T12:30:00Z".parse().unwrap();
        let cursor = Value::Timestamp(at).to_cursor().unwrap();
        assert_eq!(table.parse_cursor(&cursor), Some(Value::Timestamp(at)));
    }

    #[test]
    fn validation() {
        assert!(posts().validate().is_ok());
        assert!(posts().with_cursor_key("slug").validate().is_err());
        assert!(PgTable::new("", "id", ColumnType::Int).validate().is_err());
        assert!(PgTable::new("public.", "id", ColumnType::Int).validate().is_err());
    }
}
