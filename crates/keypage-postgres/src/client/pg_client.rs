use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use diesel_async::RunQueryDsl;

use super::{ConnectionPool, PooledConnection, pool};
use crate::{PgConfig, PgError, PgResult, TRACING_TARGET_CONNECTION};

/// Acquisitions slower than this are logged as a sign of pool pressure.
const SLOW_ACQUIRE: Duration = Duration::from_millis(100);

/// Point-in-time counters of the connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgPoolStatus {
    /// Maximum number of connections the pool may hold.
    pub max_size: usize,
    /// Connections currently open, idle or checked out.
    pub size: usize,
    /// Idle connections ready to be checked out.
    pub available: usize,
    /// Callers waiting for a connection.
    pub waiting: usize,
}

impl PgPoolStatus {
    /// Returns whether a new page query would have to wait for a connection.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.waiting > 0 || (self.available == 0 && self.size >= self.max_size)
    }
}

/// Shared handle to the pool the record source reads through.
///
/// Clones share one pool.
#[derive(Clone)]
pub struct PgClient {
    pool: ConnectionPool,
    config: Arc<PgConfig>,
}

impl PgClient {
    /// Builds the pool without opening any connection.
    ///
    /// # Errors
    ///
    /// Returns [`PgError::Pool`] when the pool cannot be built.
    pub fn new(config: PgConfig) -> PgResult<Self> {
        let pool = pool::build(&config)?;

        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            url = %config.url_masked(),
            pool_size = config.pool_size,
            "Database pool created"
        );

        Ok(Self {
            pool,
            config: Arc::new(config),
        })
    }

    /// Validates `config`, builds the pool and runs `SELECT 1` through it.
    ///
    /// Fails fast at startup instead of on the first page request.
    #[tracing::instrument(
        skip(config),
        target = TRACING_TARGET_CONNECTION,
        fields(url = %config.url_masked())
    )]
    pub async fn connect(config: PgConfig) -> PgResult<Self> {
        #[derive(diesel::QueryableByName)]
        struct Ping {
            #[diesel(sql_type = diesel::sql_types::Integer)]
            #[allow(dead_code)]
            one: i32,
        }

        let client = config.build()?;
        let mut conn = client.get_connection().await?;

        diesel::sql_query("SELECT 1 AS one")
            .get_result::<Ping>(&mut *conn)
            .await
            .inspect_err(|error| {
                tracing::error!(
                    target: TRACING_TARGET_CONNECTION,
                    error = %error,
                    "Database did not answer the startup check"
                );
            })?;

        Ok(client)
    }

    /// Checks a connection out of the pool.
    ///
    /// Waits at most the configured acquire timeout.
    pub async fn get_connection(&self) -> PgResult<PooledConnection> {
        let start = Instant::now();
        let result = self.pool.get().await;
        let elapsed = start.elapsed();

        match result {
            Ok(conn) => {
                if elapsed > SLOW_ACQUIRE {
                    tracing::warn!(
                        target: TRACING_TARGET_CONNECTION,
                        elapsed = ?elapsed,
                        status = ?self.pool_status(),
                        "Slow connection acquisition"
                    );
                }
                Ok(conn)
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_CONNECTION,
                    elapsed = ?elapsed,
                    error = %error,
                    "Could not acquire a pooled connection"
                );
                Err(PgError::from(error))
            }
        }
    }

    /// Returns the pool's current counters.
    pub fn pool_status(&self) -> PgPoolStatus {
        let status = self.pool.status();
        PgPoolStatus {
            max_size: status.max_size,
            size: status.size,
            available: status.available,
            waiting: status.waiting,
        }
    }

    /// Returns the configuration the pool was built from.
    #[inline]
    pub fn config(&self) -> &PgConfig {
        &self.config
    }
}

impl fmt::Debug for PgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgClient")
            .field("config", &self.config)
            .field("pool", &self.pool_status())
            .finish()
    }
}
