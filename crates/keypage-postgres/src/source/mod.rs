//! PostgreSQL-backed [`RecordSource`].

mod render;
mod table;

use std::fmt;
use std::marker::PhantomData;

use diesel::pg::Pg;
use diesel::{OptionalExtension, QueryableByName};
use diesel_async::RunQueryDsl;
use keypage_core::{Cursor, FetchQuery, Predicate, Record, RecordSource, SourceSchema};
pub use render::SqlFragment;
pub use table::{ColumnType, PgColumn, PgTable};

use crate::{PgClient, PgError, PgResult, TRACING_TARGET_QUERY};

/// Pages rows of one table through a pooled [`PgClient`].
///
/// Rows are loaded by column name into `R`, so `R` must select exactly the
/// columns declared on the [`PgTable`] (it may ignore some of them). An
/// optional base predicate scopes fetches and counts, but never cursor
/// lookups: an anchor outside the scope still positions the page.
pub struct PgSource<R> {
    client: PgClient,
    table: PgTable,
    schema: SourceSchema,
    filter: Option<Predicate>,
    record: PhantomData<fn() -> R>,
}

impl<R> PgSource<R> {
    /// Creates a source over `table`.
    ///
    /// # Errors
    ///
    /// Returns an error when the table description is invalid.
    pub fn new(client: PgClient, table: PgTable) -> PgResult<Self> {
        table.validate()?;

        Ok(Self {
            client,
            schema: table.schema(),
            table,
            filter: None,
            record: PhantomData,
        })
    }

    /// Scopes fetches and counts to rows matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`PgError::UnknownColumn`] when the filter references an undeclared column.
    pub fn with_filter(mut self, filter: Predicate) -> PgResult<Self> {
        if let Some(field) = filter
            .fields()
            .into_iter()
            .find(|field| self.table.column_type(field).is_none())
        {
            return Err(PgError::unknown_column(self.table.name(), field));
        }

        self.filter = Some(filter);
        Ok(self)
    }

    /// Returns the table description.
    #[inline]
    pub fn table(&self) -> &PgTable {
        &self.table
    }

    /// Returns the base predicate, if any.
    #[inline]
    pub fn filter(&self) -> Option<&Predicate> {
        self.filter.as_ref()
    }

    /// Returns the underlying client.
    #[inline]
    pub fn client(&self) -> &PgClient {
        &self.client
    }
}

impl<R> PgSource<R>
where
    R: QueryableByName<Pg> + Send + 'static,
{
    async fn load(&self, fragment: SqlFragment) -> PgResult<Vec<R>> {
        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            table = self.table.name(),
            sql = fragment.sql(),
            binds = fragment.binds().len(),
            "Executing statement"
        );

        let mut conn = self.client.get_connection().await?;
        let rows = fragment.into_query().load::<R>(&mut *conn).await?;
        Ok(rows)
    }
}

impl<R> RecordSource for PgSource<R>
where
    R: QueryableByName<Pg> + Record + Send + 'static,
{
    type Error = PgError;
    type Record = R;

    fn schema(&self) -> &SourceSchema {
        &self.schema
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY, fields(table = self.table.name()))]
    async fn find_by_cursor(&self, cursor: &Cursor) -> PgResult<Option<R>> {
        let Some(value) = self.table.parse_cursor(cursor) else {
            tracing::debug!(
                target: TRACING_TARGET_QUERY,
                cursor_key = self.table.cursor_key(),
                "Cursor does not parse as the cursor column type"
            );
            return Ok(None);
        };

        let fragment = render::select_by_cursor(&self.table, value)?;
        let mut conn = self.client.get_connection().await?;
        let row = fragment
            .into_query()
            .get_result::<R>(&mut *conn)
            .await
            .optional()?;

        Ok(row)
    }

    #[tracing::instrument(
        skip(self, query),
        target = TRACING_TARGET_QUERY,
        fields(table = self.table.name(), limit = query.limit)
    )]
    async fn fetch(&self, query: FetchQuery) -> PgResult<Vec<R>> {
        let fragment = render::select_page(&self.table, self.filter.as_ref(), &query)?;
        let rows = self.load(fragment).await?;

        tracing::debug!(target: TRACING_TARGET_QUERY, rows = rows.len(), "Fetched rows");
        Ok(rows)
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY, fields(table = self.table.name()))]
    async fn count(&self) -> PgResult<u64> {
        #[derive(QueryableByName)]
        struct CountRow {
            #[diesel(sql_type = diesel::sql_types::BigInt)]
            count: i64,
        }

        let fragment = render::count(&self.table, self.filter.as_ref())?;
        let mut conn = self.client.get_connection().await?;
        let row: CountRow = fragment.into_query().get_result(&mut *conn).await?;

        Ok(u64::try_from(row.count).unwrap_or_default())
    }
}

impl<R> fmt::Debug for PgSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgSource")
            .field("table", &self.table)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use keypage_core::Value;

    use super::*;
    use crate::PgConfig;

    #[derive(Debug, QueryableByName)]
    struct Post {
        #[diesel(sql_type = diesel::sql_types::BigInt)]
        id: i64,
    }

    impl Record for Post {
        fn value(&self, field: &str) -> Option<Value> {
            (field == "id").then(|| self.id.into())
        }
    }

    fn client() -> PgClient {
        PgConfig::new("postgresql://localhost:1/feed").build().unwrap()
    }

    #[test]
    fn schema_follows_table() {
        let table = PgTable::new("posts", "id", ColumnType::Int).column("score", ColumnType::Float);
        let source = PgSource::<Post>::new(client(), table).unwrap();

        assert_eq!(source.schema().key(), "id");
        assert!(source.schema().contains("score"));
    }

    #[test]
    fn filter_columns_are_checked() {
        let table = PgTable::new("posts", "id", ColumnType::Int);
        let source = PgSource::<Post>::new(client(), table).unwrap();

        let result = source.with_filter(Predicate::eq("deleted", false));
        assert!(matches!(result, Err(PgError::UnknownColumn { .. })));
    }

    #[tokio::test]
    async fn unparsable_cursor_is_not_found() {
        let table = PgTable::new("posts", "id", ColumnType::Int);
        let source = PgSource::<Post>::new(client(), table).unwrap();

        // resolved without touching the unreachable database
        let found = source.find_by_cursor(&Cursor::new("not-a-number")).await.unwrap();
        assert!(found.is_none());
    }
}
