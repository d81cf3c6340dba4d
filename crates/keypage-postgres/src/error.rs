//! Errors of the PostgreSQL record source.

use std::borrow::Cow;

pub use deadpool::managed::TimeoutType;
use diesel::ConnectionError;
use diesel_async::pooled_connection::PoolError;
use diesel_async::pooled_connection::deadpool::PoolError as DeadpoolError;

use crate::TRACING_TARGET_CONNECTION;

/// Errors returned by [`PgSource`] and [`PgClient`].
///
/// [`PgSource`]: crate::PgSource
/// [`PgClient`]: crate::PgClient
#[derive(Debug, thiserror::Error)]
#[must_use = "database errors should be handled appropriately"]
pub enum PgError {
    /// Invalid pool or table configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A predicate or ordering named a column the table does not declare.
    #[error("unknown column `{column}` on table `{table}`")]
    UnknownColumn {
        /// The table being queried.
        table: String,
        /// The rejected column name.
        column: String,
    },

    /// No pooled connection became available in time.
    #[error("timed out waiting for a database connection ({0:?})")]
    Timeout(TimeoutType),

    /// Opening or keeping a connection failed.
    #[error("database connection failed: {0}")]
    Connection(#[from] ConnectionError),

    /// A page, lookup or count statement failed to execute.
    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),

    /// The pool could not be built or was closed.
    #[error("connection pool failure: {0}")]
    Pool(Cow<'static, str>),
}

impl PgError {
    /// Creates a [`PgError::UnknownColumn`].
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Returns whether retrying the same page later may succeed.
    ///
    /// Pool timeouts and dropped connections are transient; bad statements,
    /// unknown columns and configuration mistakes are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Connection(ConnectionError::BadConnection(_))
        )
    }
}

impl From<DeadpoolError> for PgError {
    fn from(error: DeadpoolError) -> Self {
        match error {
            DeadpoolError::Timeout(timeout) => Self::Timeout(timeout),
            DeadpoolError::Backend(PoolError::ConnectionError(error)) => Self::Connection(error),
            DeadpoolError::Backend(PoolError::QueryError(error)) => Self::Query(error),
            DeadpoolError::Closed => Self::Pool("the pool is closed".into()),
            DeadpoolError::NoRuntimeSpecified => Self::Pool("no async runtime configured".into()),
            DeadpoolError::PostCreateHook(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_CONNECTION,
                    error = %error,
                    "New connection rejected by post-create hook"
                );
                Self::Pool(error.to_string().into())
            }
        }
    }
}

/// Result of a PostgreSQL source or client operation.
pub type PgResult<T, E = PgError> = Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pool_and_connection_failures_are_transient() {
        assert!(PgError::Timeout(TimeoutType::Wait).is_transient());
        assert!(
            PgError::Connection(ConnectionError::BadConnection("reset".into())).is_transient()
        );
        assert!(!PgError::unknown_column("posts", "nope").is_transient());
        assert!(!PgError::Config("empty".into()).is_transient());
    }

    #[test]
    fn unknown_column_is_quoted() {
        let error = PgError::unknown_column("posts", "title; DROP TABLE posts");
        assert_eq!(
            error.to_string(),
            "unknown column `title; DROP TABLE posts` on table `posts`"
        );
    }

    #[test]
    fn closed_pool_is_not_transient() {
        let error = PgError::from(DeadpoolError::Closed);
        assert!(matches!(error, PgError::Pool(_)));
        assert!(!error.is_transient());
        assert_eq!(error.to_string(), "connection pool failure: the pool is closed");
    }

    #[test]
    fn query_and_connection_failures_keep_their_source() {
        let query = PgError::from(diesel::result::Error::NotFound);
        assert!(matches!(query, PgError::Query(_)));
        assert!(query.to_string().starts_with("query failed: "));

        let connection = PgError::from(ConnectionError::BadConnection("reset".into()));
        assert_eq!(connection.to_string(), "database connection failed: reset");
    }
}
