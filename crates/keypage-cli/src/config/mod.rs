//! CLI configuration.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig        # Host, port, shutdown
//! ├── paginator: PaginatorConfig  # Page sizes, cursor strictness
//! ├── postgres: PgConfig          # Connection pool
//! └── posts_table                 # Table the feed reads from
//! ```
//!
//! Every option can be given as a flag or an environment variable; run with
//! `--help` for the full list.
//!
//! ```bash
//! keypage-cli --database-url "postgresql://..." --port 8080 --page-max-limit 50
//!
//! DATABASE_URL="postgresql://..." PORT=8080 PAGE_STRICT_CURSORS=true keypage-cli
//! ```

mod server;

use anyhow::Context;
use clap::Parser;
use keypage_core::PaginatorConfig;
use keypage_postgres::PgConfig;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Log filter used when `RUST_LOG` is unset; includes one line per request.
const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Command line and environment of the feed server.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "keypage", version)]
#[command(about = "Serves a cursor-paginated posts feed from PostgreSQL")]
pub struct Cli {
    #[clap(flatten)]
    pub server: ServerConfig,

    #[clap(flatten)]
    pub paginator: PaginatorConfig,

    #[clap(flatten)]
    pub postgres: PgConfig,

    /// Table the posts feed reads from, optionally schema-qualified
    #[arg(long, env = "POSTS_TABLE", default_value = "posts")]
    pub posts_table: String,
}

impl Cli {
    /// Parses arguments after loading `.env`, whose variables then act as
    /// defaults for every `env =` option.
    pub fn init() -> Self {
        load_env_file();
        Self::parse()
    }

    /// Installs the global subscriber, filtered by `RUST_LOG`.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }

    /// Validates the listener, the page size policy and the pool.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server.validate().context("invalid server configuration")?;
        self.paginator
            .validate()
            .context("invalid paginator configuration")?;
        self.postgres
            .validate()
            .context("invalid database configuration")
    }

    /// Logs the effective configuration, with the database password masked.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            dotenv = cfg!(feature = "dotenv"),
            "Starting keypage"
        );

        self.server.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            posts_table = %self.posts_table,
            default_per_page = self.paginator.default_per_page,
            max_per_page = self.paginator.max_per_page,
            strict_cursors = self.paginator.strict_cursors,
            url = %self.postgres.url_masked(),
            pool_size = self.postgres.pool_size,
            acquire_timeout_secs = ?self.postgres.acquire_timeout_secs,
            idle_timeout_secs = ?self.postgres.idle_timeout_secs,
            "Feed configuration"
        );
    }
}

#[cfg(feature = "dotenv")]
fn load_env_file() {
    match dotenvy::dotenv() {
        Err(error) if !error.not_found() => {
            eprintln!("Warning: ignoring unreadable .env file: {error}");
        }
        _ => {}
    }
}

#[cfg(not(feature = "dotenv"))]
fn load_env_file() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "keypage",
            "--database-url",
            "postgresql://localhost/feed",
            "--port",
            "8080",
            "--page-max-limit",
            "40",
            "--page-strict-cursors",
        ])
        .unwrap();

        assert_eq!(cli.server.port, 8080);
        assert_eq!(cli.paginator.max_per_page, 40);
        assert!(cli.paginator.strict_cursors);
        assert_eq!(cli.posts_table, "posts");
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn rejects_inconsistent_page_sizes() {
        let cli = Cli::try_parse_from([
            "keypage",
            "--database-url",
            "postgresql://localhost/feed",
            "--page-default-limit",
            "80",
            "--page-max-limit",
            "40",
        ])
        .unwrap();

        assert!(cli.validate().is_err());
    }
}
