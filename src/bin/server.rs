// Shelfstock - Library Shelf Inventory Service
// Copyright (C) 2025 Shelfstock contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

//! Server binary: open the database, load the signing key, serve the API.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelfstock::api::{self, ApiState};
use shelfstock::auth::TokenService;
use shelfstock::storage::Database;

/// Library shelf inventory service
#[derive(Parser)]
#[command(name = "shelfstock-server", about = "Library shelf inventory service")]
struct Cli {
    /// Address to bind the API server
    #[arg(long, default_value = "0.0.0.0:5000", env = "SHELFSTOCK_BIND")]
    bind: String,

    /// Path to the SQLite database file
    #[arg(long, default_value = "./shelfstock.db", env = "SHELFSTOCK_DB")]
    database: PathBuf,

    /// Path to the token signing key file (created on first start)
    #[arg(long, default_value = "./shelfstock.key", env = "SHELFSTOCK_KEY")]
    key_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelfstock=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let db = Database::new(&cli.database)
        .await
        .with_context(|| format!("opening database at {}", cli.database.display()))?;
    info!(path = %cli.database.display(), "database ready");

    let tokens = TokenService::load_or_init(&cli.key_file)
        .with_context(|| format!("loading signing key from {}", cli.key_file.display()))?;

    let app = api::router(ApiState::new(db.clone(), tokens));

    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("binding {}", cli.bind))?;
    info!(bind = %cli.bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    info!("shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
    }
}
