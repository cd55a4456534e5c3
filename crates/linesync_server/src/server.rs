//! HTTP server wiring.

use crate::assets::StaticAssets;
use crate::config::ServerConfig;
use crate::coordinator::SyncCoordinator;
use crate::error::ServerResult;
use crate::handler::{
    access_log, handle_fallback, handle_manifest, handle_service_worker, handle_sync, AppState,
};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use linesync_store::{ObjectStore, ObjectStoreClient};
use std::sync::Arc;
use tokio::signal;

/// Builds the router for the sync server.
///
/// `POST` on any path syncs; `GET` serves the manifest, the service worker
/// or, for every other path, the index page.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/app.webmanifest", get(handle_manifest).post(handle_sync))
        .route("/sw.js", get(handle_service_worker).post(handle_sync))
        .fallback(handle_fallback)
        .layer(middleware::from_fn(access_log))
        .with_state(state)
}

/// The sync server.
///
/// # Example
///
/// ```
/// use linesync_server::{ServerConfig, SyncServer};
///
/// let server = SyncServer::new(ServerConfig::default()).unwrap();
/// let app = server.router();
/// # drop(app);
/// ```
pub struct SyncServer {
    config: ServerConfig,
    state: AppState,
}

impl SyncServer {
    /// Creates a server backed by the object store described in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store client cannot be built or the asset
    /// directory cannot be read.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = ObjectStoreClient::new(config.store.clone())?;
        if store.is_remote() {
            tracing::info!(
                bucket = %config.store.bucket,
                domain = %config.store.domain,
                "using object store"
            );
        }
        Self::with_store(config, Arc::new(store))
    }

    /// Creates a server backed by an existing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset directory cannot be read.
    pub fn with_store(config: ServerConfig, store: Arc<dyn ObjectStore>) -> ServerResult<Self> {
        let assets = match &config.assets_dir {
            Some(dir) => StaticAssets::from_dir(dir)?,
            None => StaticAssets::bundled(),
        };
        let coordinator = Arc::new(SyncCoordinator::new(store, config.lock_strategy));
        let state = AppState::new(coordinator, assets);

        Ok(Self { config, state })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the sync coordinator.
    pub fn coordinator(&self) -> &Arc<SyncCoordinator> {
        &self.state.coordinator
    }

    /// Returns the router serving this server's state.
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Runs the HTTP server until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or the server fails.
    pub async fn run(&self) -> ServerResult<()> {
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(
            addr = %listener.local_addr()?,
            lock_strategy = ?self.config.lock_strategy,
            "listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("server shut down gracefully");
        Ok(())
    }
}

/// Resolves on SIGTERM or SIGINT (Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
