//! Todo REST service binary.
//!
//! # Environment Variables
//!
//! - `SERVICE_TYPE`: `redis` (default) | `jdbc` | `memory`
//! - `REDIS_HOST` / `REDIS_PORT` / `REDIS_KEY`: Redis hash location
//! - `DATABASE_URL`: sqlx URL (required when `SERVICE_TYPE=jdbc`)
//! - `TODO_CONFIG`: optional JSON config file with dotted keys
//! - `HOST` / `PORT`: listen address (default `0.0.0.0:8082`)
//! - `RUST_LOG`: log filter (default `todo_server=debug,tower_http=debug`)

use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_server::{app, store, AppState, Config};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "configuration error");
            std::process::exit(1);
        }
    };
    tracing::info!(service_type = %config.store.service_type(), "configuration loaded");

    let store = match store::connect(&config.store) {
        Ok(store) => store,
        Err(error) => {
            tracing::error!(%error, "failed to create store");
            std::process::exit(1);
        }
    };
    let state = AppState::initialize(store).await;

    let address = config.listen_addr();
    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, "failed to bind to {address}");
            std::process::exit(1);
        }
    };
    match listener.local_addr() {
        Ok(address) => tracing::info!("listening on {address}"),
        Err(error) => tracing::warn!(%error, "could not determine local address"),
    }

    if let Err(error) = axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "server error");
        std::process::exit(1);
    }
    tracing::info!("server shutdown complete");
}

/// Completes on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
