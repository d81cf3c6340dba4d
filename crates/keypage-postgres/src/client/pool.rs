//! Builds the deadpool connection pool and its hooks.

use std::time::Instant;

use deadpool::managed::{Hook, HookResult, Metrics, Pool};
use diesel::ConnectionResult;
use diesel_async::pooled_connection::{
    AsyncDieselConnectionManager, ManagerConfig, PoolError, PoolableConnection,
};
use diesel_async::{AsyncConnection, AsyncPgConnection};
use futures::FutureExt;
use futures::future::BoxFuture;

use super::ConnectionPool;
use super::pg_config::mask_url;
use crate::{PgConfig, PgError, PgResult, TRACING_TARGET_CONNECTION};

/// Builds a lazily connecting pool sized and timed by `config`.
pub(super) fn build(config: &PgConfig) -> PgResult<ConnectionPool> {
    let mut manager_config = ManagerConfig::default();
    manager_config.custom_setup = Box::new(establish);
    let manager = AsyncDieselConnectionManager::new_with_config(&config.url, manager_config);

    Pool::builder(manager)
        .max_size(config.pool_size as usize)
        .wait_timeout(config.acquire_timeout())
        .create_timeout(config.acquire_timeout())
        .recycle_timeout(config.idle_timeout())
        .runtime(deadpool::Runtime::Tokio1)
        .pre_recycle(Hook::sync_fn(log_recycle))
        .build()
        .map_err(|error| PgError::Pool(error.to_string().into()))
}

/// Opens a connection, logging the masked address and how long it took.
fn establish<C>(url: &str) -> BoxFuture<'_, ConnectionResult<C>>
where
    C: AsyncConnection + 'static,
{
    let start = Instant::now();

    async move {
        let result = C::establish(url).await;
        let elapsed_ms = start.elapsed().as_millis();

        if let Err(error) = &result {
            tracing::error!(
                target: TRACING_TARGET_CONNECTION,
                url = %mask_url(url),
                elapsed_ms,
                error = %error,
                "Could not open a database connection"
            );
        } else {
            tracing::debug!(
                target: TRACING_TARGET_CONNECTION,
                url = %mask_url(url),
                elapsed_ms,
                "Opened a database connection"
            );
        }

        result
    }
    .boxed()
}

/// Notes broken connections before the pool's own recycle check drops them.
fn log_recycle(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    if conn.is_broken() {
        tracing::warn!(
            target: TRACING_TARGET_CONNECTION,
            recycled = metrics.recycle_count,
            age = ?metrics.age(),
            "Returning connection is broken"
        );
    }

    Ok(())
}
