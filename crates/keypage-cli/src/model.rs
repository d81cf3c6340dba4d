//! The `posts` feed.

use diesel::QueryableByName;
use diesel::sql_types::{BigInt, Double, Nullable, Text, Timestamptz, Uuid as SqlUuid};
use jiff_diesel::Timestamp;
use keypage_core::{Record, SortBy, Value};
use keypage_postgres::{ColumnType, PgTable};
use keypage_server::handler::ListingConfig;
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// One row of the posts table.
///
/// The internal `id` breaks ordering ties; clients only ever see the public
/// identifier, which also serves as the cursor.
#[derive(Debug, Clone, QueryableByName, Serialize)]
pub struct Post {
    #[diesel(sql_type = BigInt)]
    #[serde(skip)]
    pub id: i64,
    #[diesel(sql_type = SqlUuid)]
    #[serde(rename = "id")]
    pub public_id: Uuid,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub status: String,
    #[diesel(sql_type = Nullable<Double>)]
    pub score: Option<f64>,
    #[diesel(sql_type = Timestamptz)]
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: Timestamp,
}

fn serialize_timestamp<S: Serializer>(at: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
    jiff::Timestamp::from(*at).serialize(serializer)
}

impl Record for Post {
    fn value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.into()),
            "public_id" => Some(self.public_id.into()),
            "title" => Some(self.title.as_str().into()),
            "status" => Some(self.status.as_str().into()),
            "score" => Some(self.score.map_or(Value::Null, Value::Float)),
            "created_at" => Some(jiff::Timestamp::from(self.created_at).into()),
            _ => None,
        }
    }
}

/// Describes the posts table named `name`.
pub fn posts_table(name: &str) -> PgTable {
    PgTable::new(name, "id", ColumnType::Int)
        .column("public_id", ColumnType::Uuid)
        .column("title", ColumnType::Text)
        .column("status", ColumnType::Text)
        .column("score", ColumnType::Float)
        .column("created_at", ColumnType::Timestamp)
        .with_cursor_key("public_id")
}

/// Newest posts first; clients may re-sort by any other public column.
pub fn posts_listing() -> ListingConfig {
    ListingConfig::new(SortBy::desc("created_at"))
        .with_sortable("title")
        .with_sortable("status")
        .with_sortable("score")
}
