#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for rendered statements and row counts.
pub const TRACING_TARGET_QUERY: &str = "keypage_postgres::query";

/// Tracing target for the connection pool.
pub const TRACING_TARGET_CONNECTION: &str = "keypage_postgres::connection";

mod client;
mod error;
mod source;

pub use diesel_async::AsyncPgConnection as PgConnection;

pub use crate::client::{ConnectionPool, PgClient, PgConfig, PgPoolStatus, PooledConnection};
pub use crate::error::{PgError, PgResult, TimeoutType};
pub use crate::source::{ColumnType, PgColumn, PgSource, PgTable, SqlFragment};
