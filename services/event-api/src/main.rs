//! Event registration API server.
//!
//! Serves the HAL event resources over HTTP, backed by Postgres when
//! `DATABASE_URL` is set and by an in-memory store otherwise.

use std::sync::Arc;

use anyhow::Result;
use evreg_api::{
    api,
    assembler::{EventResourceAssembler, LinkBuilder},
    config,
    db::{Database, EventStore, InMemoryEventStore},
    identity::BearerTokenResolver,
    state::AppState,
};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::Config::from_env()?;

    // Prefer RUST_LOG, fall back to EVREG_LOG_LEVEL
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting event registration API");
    info!(listen_addr = %config.listen_addr, "Configuration loaded");

    let store: Arc<dyn EventStore> = match &config.database {
        Some(db_config) => {
            let db = match Database::connect(db_config).await {
                Ok(db) => {
                    info!("Database connection established");
                    db
                }
                Err(e) => {
                    error!(error = %e, "Failed to connect to database");
                    return Err(e.into());
                }
            };

            if config.dev_mode {
                info!("Running database migrations (dev mode)");
                if let Err(e) = db.run_migrations().await {
                    error!(error = %e, "Failed to run migrations");
                    return Err(e.into());
                }
            }

            Arc::new(db.event_store())
        }
        None => {
            warn!("DATABASE_URL not set; events are kept in memory and lost on exit");
            Arc::new(InMemoryEventStore::new())
        }
    };

    let assembler = EventResourceAssembler::new(LinkBuilder::new(config.public_url.clone()));
    let state = AppState::new(store, Arc::new(BearerTokenResolver), assembler);
    let app = api::create_router(state);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Listening for connections");

    let mut server_handle = tokio::spawn(async move {
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

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = &mut server_handle => {
            match result {
                Ok(Ok(())) => info!("Server exited normally"),
                Ok(Err(e)) => error!(error = %e, "Server error"),
                Err(e) => error!(error = %e, "Server task panicked"),
            }
        }
    }

    let _ = shutdown_tx.send(true);

    if !server_handle.is_finished() {
        let shutdown_timeout = std::time::Duration::from_secs(10);
        if let Err(e) = tokio::time::timeout(shutdown_timeout, server_handle).await {
            warn!(error = %e, "HTTP server did not shut down in time");
        }
    }

    info!("Event registration API shutdown complete");
    Ok(())
}
