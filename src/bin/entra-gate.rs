// ABOUTME: HTTP host binary gating an application behind Azure AD tenant sign-in
// ABOUTME: Loads configuration, initializes logging, sweeps idle sessions, and serves the router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Entra Gate Server Binary
//!
//! Serves the sign-in gate over HTTP. Configuration comes from the process
//! environment and an optional `.env` file.

use anyhow::Result;
use clap::Parser;
use entra_gate::{
    auth::AuthFlowController,
    config::AppConfig,
    constants::defaults,
    logging::LoggingConfig,
    routes::{self, AppState},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "entra-gate")]
#[command(about = "Entra Gate - Azure AD sign-in restricted to allowed tenants")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    LoggingConfig::from_app_config(&config).init()?;

    info!("Starting Entra Gate");
    info!("{}", config.summary());

    let controller = Arc::new(AuthFlowController::from_config(&config.auth)?);
    let state = AppState::new(controller);

    let max_idle =
        chrono::Duration::from_std(Duration::from_secs(config.session_idle_timeout_secs))?;
    let sweeper = state.sessions.spawn_idle_sweeper(
        Duration::from_secs(defaults::SESSION_SWEEP_INTERVAL_SECS),
        max_idle,
    );

    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {addr}");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {e}");
        return Err(e.into());
    }

    sweeper.abort();
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received");
}
