//! fuzzfleet autoscaler
//!
//! Runs the pool autoscale loop on a fixed interval and serves health,
//! service info and the latest tick report over HTTP.

use std::sync::Arc;

use anyhow::{Context, Result};
use fuzzfleet_autoscaler::{
    api, config,
    scaling::{AutoscaleWorker, Reconciler, TickHistory},
    state::AppState,
    store::{FleetStores, InMemoryFleet},
};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::Config::from_env()?;

    // Initialize tracing (prefer RUST_LOG, fallback to FUZZFLEET_LOG_LEVEL)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting fuzzfleet autoscaler");
    info!(
        listen_addr = %config.listen_addr,
        tick_interval_secs = config.tick_interval.as_secs(),
        failure_policy = ?config.failure_policy,
        "Configuration loaded"
    );

    let fleet = match &config.seed_file {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read seed file {}", path.display()))?;
            let fleet = InMemoryFleet::from_json(&json)
                .with_context(|| format!("failed to parse seed file {}", path.display()))?;
            info!(seed_file = %path.display(), "Fleet seeded");
            fleet
        }
        None => {
            warn!("No seed file configured, starting with an empty fleet");
            InMemoryFleet::new()
        }
    };
    let stores = FleetStores::shared(Arc::new(fleet));

    // Create shutdown channel for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Start autoscale worker in background
    let history = Arc::new(TickHistory::new());
    let autoscale_worker = AutoscaleWorker::new(
        Reconciler::new(stores, config.failure_policy),
        config.tick_interval,
        history.clone(),
    );
    let autoscale_handle = tokio::spawn({
        let shutdown_rx = shutdown_rx.clone();
        async move {
            autoscale_worker.run(shutdown_rx).await;
        }
    });

    // Build and run the server
    let state = AppState::new(config.deployment.clone(), history);
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Listening for connections");

    // Spawn the server with graceful shutdown
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let mut shutdown_rx = shutdown_rx;
                loop {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await
    });

    // Wait for shutdown signal (Ctrl+C)
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = server_handle => {
            match result {
                Ok(Ok(())) => info!("Server exited normally"),
                Ok(Err(e)) => error!(error = %e, "Server error"),
                Err(e) => error!(error = %e, "Server task panicked"),
            }
        }
    }

    // Signal shutdown to the worker
    let _ = shutdown_tx.send(true);

    info!("Waiting for autoscale worker to shut down...");
    let shutdown_timeout = std::time::Duration::from_secs(10);
    if let Err(e) = tokio::time::timeout(shutdown_timeout, autoscale_handle).await {
        warn!(error = %e, "Autoscale worker did not shut down in time");
    }

    info!("Autoscaler shutdown complete");
    Ok(())
}
