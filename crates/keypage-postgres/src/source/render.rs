//! Renders predicates and orderings into parameterized PostgreSQL statements.
//!
//! Comparisons follow the nulls-last total order of [`Value`], so that a
//! boundary predicate selects exactly the rows that sort after (or before)
//! the anchor under `ASC NULLS LAST` / `DESC NULLS FIRST` ordering:
//!
//! | predicate  | non-null `v`                   | `NULL`            |
//! |------------|--------------------------------|-------------------|
//! | `x > v`    | `("x" > $n OR "x" IS NULL)`    | `FALSE`           |
//! | `x < v`    | `"x" < $n`                     | `"x" IS NOT NULL` |
//! | `x ≡ v`    | `"x" = $n`                     | `"x" IS NULL`     |
//!
//! Identifiers are quoted and must be declared on the [`PgTable`]; values are
//! always bound, never spliced into the statement text.

use std::fmt::Write;

use diesel::pg::Pg;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{BigInt, Bool, Double, Nullable, Text, Timestamptz};
use keypage_core::{Comparator, FetchQuery, Predicate, SortBy, SortOrder, Value};

use super::PgTable;
use crate::{PgError, PgResult};

/// Boxed raw query with its parameters bound.
pub type BoundQuery = BoxedSqlQuery<'static, Pg, SqlQuery>;

/// A rendered statement and the values bound to its `$n` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    sql: String,
    binds: Vec<Value>,
}

impl SqlFragment {
    /// Returns the statement text.
    #[inline]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the bound values, in placeholder order.
    #[inline]
    pub fn binds(&self) -> &[Value] {
        &self.binds
    }

    /// Converts the fragment into an executable query.
    pub fn into_query(self) -> BoundQuery {
        let query = diesel::sql_query(self.sql).into_boxed::<Pg>();
        self.binds.into_iter().fold(query, bind_value)
    }
}

fn bind_value(query: BoundQuery, value: Value) -> BoundQuery {
    match value {
        Value::Null => query.bind::<Nullable<Text>, _>(None::<String>),
        Value::Bool(value) => query.bind::<Bool, _>(value),
        Value::Int(value) => query.bind::<BigInt, _>(value),
        Value::Float(value) => query.bind::<Double, _>(value),
        Value::Text(value) => query.bind::<Text, _>(value),
        Value::Uuid(value) => query.bind::<diesel::sql_types::Uuid, _>(value),
        Value::Timestamp(value) => {
            query.bind::<Timestamptz, _>(jiff_diesel::Timestamp::from(value))
        }
    }
}

/// Renders `SELECT <columns> FROM <table> WHERE <base AND filter> ORDER BY .. LIMIT $n`.
pub fn select_page(
    table: &PgTable,
    base: Option<&Predicate>,
    query: &FetchQuery,
) -> PgResult<SqlFragment> {
    let mut writer = SqlWriter::new(table);
    writer.select();
    writer.filter(base.into_iter().chain(query.filter.as_ref()))?;
    writer.order_by(&query.order)?;
    writer.push(" LIMIT ");
    writer.bind(Value::Int(i64::try_from(query.limit).unwrap_or(i64::MAX)));
    Ok(writer.finish())
}

/// Renders a single-row lookup by cursor value, ignoring any base filter.
pub fn select_by_cursor(table: &PgTable, cursor: Value) -> PgResult<SqlFragment> {
    let mut writer = SqlWriter::new(table);
    writer.select();
    writer.filter([&Predicate::eq(table.cursor_key(), cursor)])?;
    writer.push(" LIMIT 1");
    Ok(writer.finish())
}

/// Renders `SELECT COUNT(*) AS count FROM <table> WHERE <base>`.
pub fn count(table: &PgTable, base: Option<&Predicate>) -> PgResult<SqlFragment> {
    let mut writer = SqlWriter::new(table);
    writer.push("SELECT COUNT(*) AS count FROM ");
    writer.table();
    writer.filter(base)?;
    Ok(writer.finish())
}

struct SqlWriter<'a> {
    table: &'a PgTable,
    sql: String,
    binds: Vec<Value>,
}

impl<'a> SqlWriter<'a> {
    fn new(table: &'a PgTable) -> Self {
        Self {
            table,
            sql: String::with_capacity(128),
            binds: Vec::new(),
        }
    }

    fn finish(self) -> SqlFragment {
        SqlFragment {
            sql: self.sql,
            binds: self.binds,
        }
    }

    fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    fn bind(&mut self, value: Value) {
        self.binds.push(value);
        let _ = write!(self.sql, "${}", self.binds.len());
    }

    fn ident(&mut self, name: &str) {
        self.sql.push('"');
        self.sql.push_str(&name.replace('"', "\"\""));
        self.sql.push('"');
    }

    fn table(&mut self) {
        let table = self.table;
        for (index, part) in table.name().split('.').enumerate() {
            if index > 0 {
                self.sql.push('.');
            }
            self.ident(part);
        }
    }

    fn check(&self, name: &str) -> PgResult<()> {
        match self.table.column_type(name) {
            Some(_) => Ok(()),
            None => Err(PgError::unknown_column(self.table.name(), name)),
        }
    }

    fn column(&mut self, name: &str) -> PgResult<()> {
        self.check(name)?;
        self.ident(name);
        Ok(())
    }

    fn select(&mut self) {
        let table = self.table;
        self.push("SELECT ");
        for (index, column) in table.columns().iter().enumerate() {
            if index > 0 {
                self.push(", ");
            }
            self.ident(column.name());
        }
        self.push(" FROM ");
        self.table();
    }

    fn filter<'p>(&mut self, predicates: impl IntoIterator<Item = &'p Predicate>) -> PgResult<()> {
        let predicate = Predicate::all(predicates.into_iter().cloned());
        if matches!(predicate, Predicate::True) {
            return Ok(());
        }

        self.push(" WHERE ");
        self.predicate(&predicate)
    }

    fn predicate(&mut self, predicate: &Predicate) -> PgResult<()> {
        match predicate {
            Predicate::True => self.push("TRUE"),
            Predicate::Eq { field, value } => {
                self.column(field)?;
                if value.is_null() {
                    self.push(" IS NULL");
                } else {
                    self.push(" = ");
                    self.bind(value.clone());
                }
            }
            Predicate::Compare { field, op, value } => self.compare(field, *op, value)?,
            Predicate::And(predicates) => self.group(predicates, " AND ", "TRUE")?,
            Predicate::Or(predicates) => self.group(predicates, " OR ", "FALSE")?,
        }

        Ok(())
    }

    fn compare(&mut self, field: &str, op: Comparator, value: &Value) -> PgResult<()> {
        match (op, value.is_null()) {
            // nothing sorts after NULL
            (Comparator::Gt, true) => {
                self.check(field)?;
                self.push("FALSE");
            }
            (Comparator::Lt, true) => {
                self.column(field)?;
                self.push(" IS NOT NULL");
            }
            // nulls sort after every value, so only `>` must also admit them
            (op, false) => {
                let admits_null = op == Comparator::Gt;
                if admits_null {
                    self.push("(");
                }
                self.column(field)?;
                self.push(" ");
                self.push(op.as_sql());
                self.push(" ");
                self.bind(value.clone());
                if admits_null {
                    self.push(" OR ");
                    self.column(field)?;
                    self.push(" IS NULL)");
                }
            }
        }

        Ok(())
    }

    fn group(&mut self, predicates: &[Predicate], separator: &str, empty: &str) -> PgResult<()> {
        if predicates.is_empty() {
            self.push(empty);
            return Ok(());
        }

        self.push("(");
        for (index, predicate) in predicates.iter().enumerate() {
            if index > 0 {
                self.push(separator);
            }
            self.predicate(predicate)?;
        }
        self.push(")");

        Ok(())
    }

    fn order_by(&mut self, order: &[SortBy]) -> PgResult<()> {
        for (index, key) in order.iter().enumerate() {
            self.push(if index == 0 { " ORDER BY " } else { ", " });
            self.column(&key.field)?;
            self.push(match key.order {
                SortOrder::Asc => " ASC NULLS LAST",
                SortOrder::Desc => " DESC NULLS FIRST",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use keypage_core::CursorDirection;

    use super::*;
    use crate::ColumnType;

    fn posts() -> PgTable {
        PgTable::new("posts", "id", ColumnType::Int)
            .column("public_id", ColumnType::Text)
            .column("status", ColumnType::Text)
            .column("archived_at", ColumnType::Timestamp)
            .with_cursor_key("public_id")
    }

    fn fetch(filter: Option<Predicate>, order: Vec<SortBy>, limit: u64) -> FetchQuery {
        FetchQuery {
            filter,
            order,
            limit,
        }
    }

    #[test]
    fn first_page() {
        let query = fetch(None, vec![SortBy::asc("id")], 3);
        let fragment = select_page(&posts(), None, &query).unwrap();

        assert_eq!(
            fragment.sql(),
            r#"SELECT "id", "public_id", "status", "archived_at" FROM "posts" ORDER BY "id" ASC NULLS LAST LIMIT $1"#
        );
        assert_eq!(fragment.binds(), &[Value::Int(3)]);
    }

    #[test]
    fn keyset_boundary() {
        let keys = [SortBy::asc("status"), SortBy::desc("id")];
        let anchor = [Value::from("open"), Value::Int(7)];
        let boundary = Predicate::keyset(&keys, &anchor, CursorDirection::After);
        let query = fetch(Some(boundary), keys.to_vec(), 11);

        let fragment = select_page(&posts(), None, &query).unwrap();
        assert_eq!(
            fragment.sql(),
            concat!(
                r#"SELECT "id", "public_id", "status", "archived_at" FROM "posts" "#,
                r#"WHERE (("status" > $1 OR "status" IS NULL) OR ("status" = $2 AND "id" < $3)) "#,
                r#"ORDER BY "status" ASC NULLS LAST, "id" DESC NULLS FIRST LIMIT $4"#,
            )
        );
        assert_eq!(
            fragment.binds(),
            &[
                Value::from("open"),
                Value::from("open"),
                Value::Int(7),
                Value::Int(11)
            ]
        );
    }

    #[test]
    fn null_anchor_values() {
        let keys = [SortBy::asc("archived_at"), SortBy::asc("id")];
        let anchor = [Value::Null, Value::Int(3)];

        let after = Predicate::keyset(&keys, &anchor, CursorDirection::After);
        let fragment = select_page(&posts(), None, &fetch(Some(after), vec![], 5)).unwrap();
        assert!(
            fragment
                .sql()
                .contains(r#"WHERE (FALSE OR ("archived_at" IS NULL AND ("id" > $1 OR "id" IS NULL)))"#)
        );

        let before = Predicate::keyset(&keys, &anchor, CursorDirection::Before);
        let fragment = select_page(&posts(), None, &fetch(Some(before), vec![], 5)).unwrap();
        assert!(
            fragment
                .sql()
                .contains(r#"WHERE ("archived_at" IS NOT NULL OR ("archived_at" IS NULL AND "id" < $1))"#)
        );
    }

    #[test]
    fn base_filter_is_combined() {
        let base = Predicate::eq("status", "open");
        let query = fetch(Some(Predicate::gt("id", 10)), vec![SortBy::asc("id")], 2);

        let fragment = select_page(&posts(), Some(&base), &query).unwrap();
        assert!(
            fragment
                .sql()
                .contains(r#"WHERE ("status" = $1 AND ("id" > $2 OR "id" IS NULL))"#)
        );
    }

    #[test]
    fn cursor_lookup_ignores_base_filter() {
        let fragment = select_by_cursor(&posts(), Value::from("p-1")).unwrap();
        assert_eq!(
            fragment.sql(),
            r#"SELECT "id", "public_id", "status", "archived_at" FROM "posts" WHERE "public_id" = $1 LIMIT 1"#
        );
        assert_eq!(fragment.binds(), &[Value::from("p-1")]);
    }

    #[test]
    fn count_statement() {
        let fragment = count(&posts(), None).unwrap();
        assert_eq!(fragment.sql(), r#"SELECT COUNT(*) AS count FROM "posts""#);

        let base = Predicate::eq("archived_at", Value::Null);
        let fragment = count(&posts(), Some(&base)).unwrap();
        assert_eq!(
            fragment.sql(),
            r#"SELECT COUNT(*) AS count FROM "posts" WHERE "archived_at" IS NULL"#
        );
        assert!(fragment.binds().is_empty());
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let query = fetch(None, vec![SortBy::asc("title\"; DROP TABLE posts; --")], 1);
        assert!(matches!(
            select_page(&posts(), None, &query),
            Err(PgError::UnknownColumn { .. })
        ));

        let query = fetch(Some(Predicate::lt("nope", 1)), vec![], 1);
        assert!(matches!(
            select_page(&posts(), None, &query),
            Err(PgError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn qualified_table_names_are_quoted() {
        let table = PgTable::new("feed.posts", "id", ColumnType::Int);
        let fragment = count(&table, None).unwrap();
        assert_eq!(fragment.sql(), r#"SELECT COUNT(*) AS count FROM "feed"."posts""#);
    }
}
