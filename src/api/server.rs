//! HTTP server startup and shutdown.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::errors::{Error, Result};

/// Bind and serve the router until ctrl-c.
pub async fn start_server(config: &ServerConfig, router: Router) -> Result<()> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| Error::config(format!("Invalid server address: {}", e)))?;

    let router = apply_layers(router, config);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::internal(format!("Failed to bind server on {}: {}", addr, e)))?;

    info!(address = %addr, "Starting HTTP server");

    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Shutdown signal listener failed");
            }
        })
        .await
        .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

    info!("Server shutdown completed");
    Ok(())
}

/// Attach request tracing and, when enabled, permissive CORS.
pub fn apply_layers(router: Router, config: &ServerConfig) -> Router {
    let router = router.layer(TraceLayer::new_for_http());

    if config.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
