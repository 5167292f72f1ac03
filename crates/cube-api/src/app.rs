//! Application builder: wires stores, sessions, and the provider into an
//! Axum app and serves it.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tracing::info;

use cube_auth::ServiceRegistry;
use cube_auth::bootstrap::{self, DefaultStores};
use cube_core::config::{AppConfig, DatabaseProvider};
use cube_core::error::AppError;
use cube_database::DatabasePool;
use cube_database::repositories::UserRepository;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Builds the application state for `config`, opening the configured
/// database and cache.
pub async fn build_state(config: &AppConfig) -> Result<AppState, AppError> {
    let cache = cube_cache::connect(&config.cache).await?;

    let stores = match config.database.provider {
        DatabaseProvider::Memory => {
            info!("Using in-memory user store");
            DefaultStores::in_memory().await?
        }
        DatabaseProvider::Postgres => {
            let db = DatabasePool::connect(&config.database).await?;
            if config.database.run_migrations {
                cube_database::migration::run_migrations(db.pool()).await?;
            }
            let reset = UserRepository::new(db.pool().clone()).reset_online().await?;
            info!(reset, "Cleared stale online flags");
            DefaultStores::postgres(&db)
        }
    };

    let mut registry = ServiceRegistry::new();
    bootstrap::register_defaults(&mut registry, config, stores, Arc::clone(&cache))?;
    AppState::from_registry(registry, cache).await
}

/// Runs the Cube server until Ctrl+C or SIGTERM.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting Cube membership server");

    let state = build_state(&config).await?;
    let app = build_app(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(%addr, "Cube server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("Cube server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
