//! HTTP server exposing the archive endpoints.
//!
//! Routes are mounted under the configured base URL:
//! `POST {base}/jupyterlab-zip/zip` and `POST {base}/jupyterlab-zip/unzip`,
//! each also reachable with a trailing slash. There is no XSRF check on
//! either route, so keep the listener on a trusted interface.

pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::core::archiver::Archiver;
use crate::core::extractor::Extractor;
use crate::utils::error::Result;

const ROUTE_PREFIX: &str = "jupyterlab-zip";

/// Shared, read-only state handed to every request.
pub struct AppState {
    pub archiver: Archiver,
    pub extractor: Extractor,
}

impl AppState {
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let root = config.root()?;
        Ok(Self {
            archiver: Archiver::new(root.clone()),
            extractor: Extractor::new(root, config.on_conflict),
        })
    }
}

/// Joins `base_url` and the endpoint name into a route path.
pub fn route_path(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        ROUTE_PREFIX,
        endpoint
    )
}

pub fn router(state: Arc<AppState>, base_url: &str) -> Router {
    let zip_route = route_path(base_url, "zip");
    let unzip_route = route_path(base_url, "unzip");

    Router::new()
        .route("/health", get(handlers::health))
        .route(&zip_route, post(handlers::create_archive))
        .route(&format!("{}/", zip_route), post(handlers::create_archive))
        .route(&unzip_route, post(handlers::extract_archive))
        .route(&format!("{}/", unzip_route), post(handlers::extract_archive))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub struct Server {
    config: ServiceConfig,
    state: Arc<AppState>,
}

impl Server {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let state = Arc::new(AppState::from_config(&config)?);
        Ok(Self { config, state })
    }

    pub fn router(&self) -> Router {
        router(self.state.clone(), &self.config.base_url)
    }

    /// Serves until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let router = self.router();

        tracing::info!(
            "Installing zip handlers: {}, {}",
            route_path(&self.config.base_url, "zip"),
            route_path(&self.config.base_url, "unzip")
        );
        tracing::info!(
            addr = %self.config.addr,
            root = %self.state.archiver.root().path().display(),
            on_conflict = ?self.state.extractor.on_conflict(),
            "Starting archive server"
        );
        if !self.config.addr.ip().is_loopback() {
            tracing::warn!("Listening on a non-loopback address; the endpoints have no XSRF protection");
        }
        if !self.config.enforce_root_containment {
            tracing::warn!("Root containment disabled; clients may read and write outside the root");
        }

        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
