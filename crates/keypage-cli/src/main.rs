#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod model;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use keypage_postgres::{PgClient, PgSource};
use keypage_server::handler::{ListState, fallback, routes};
use tower_http::trace::TraceLayer;

use crate::config::Cli;
use crate::model::{Post, posts_listing, posts_table};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = server::TRACING_TARGET_STARTUP;
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = server::TRACING_TARGET_SHUTDOWN;
pub const TRACING_TARGET_CONFIG: &str = "keypage_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "Application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = format!("{error:#}"),
            "Application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();
    cli.validate()?;

    let router = create_router(&cli).await?;

    if let Err(error) = server::serve(router, cli.server).await {
        if let Some(suggestion) = error.suggestion() {
            tracing::info!(target: TRACING_TARGET_SERVER_STARTUP, suggestion, "Hint");
        }
        return Err(error.into());
    }

    Ok(())
}

/// Connects to the database and builds the `/posts` router.
async fn create_router(cli: &Cli) -> anyhow::Result<Router> {
    let client = PgClient::connect(cli.postgres.clone())
        .await
        .context("failed to connect to the database")?;

    let posts = PgSource::<Post>::new(client, posts_table(&cli.posts_table))
        .context("invalid posts table")?;
    let listing = posts_listing().with_paginator(cli.paginator);

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        table = %cli.posts_table,
        sortable = ?listing.sortable_fields(),
        "Serving posts feed at /posts"
    );

    let router = routes("/posts", ListState::new(posts, listing))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}
