//! Pooled PostgreSQL client.

mod pg_client;
mod pg_config;
mod pool;

use deadpool::managed::{Object, Pool};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
pub use pg_client::{PgClient, PgPoolStatus};
pub use pg_config::PgConfig;

type Manager = AsyncDieselConnectionManager<AsyncPgConnection>;

/// Connection pool behind a [`PgClient`].
pub type ConnectionPool = Pool<Manager>;

/// Connection checked out of the pool.
pub type PooledConnection = Object<Manager>;
