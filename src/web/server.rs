//! Web server for map visualization
//!
//! Provides an HTTP server using Axum to serve the map UI and JSON API
//! endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::map::CollaborationMap;
use crate::render::to_geojson;
use crate::report::MapSummary;

use super::routes;

/// Shared application state
pub struct AppState {
    pub geojson: Value,
    pub summary: MapSummary,
}

impl AppState {
    pub fn new(map: &CollaborationMap) -> Self {
        Self {
            geojson: to_geojson(map),
            summary: MapSummary::from_map(map),
        }
    }
}

/// Configuration for the web server
pub struct ServerConfig {
    pub port: u16,
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            open_browser: true,
        }
    }
}

/// Build the application router
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .merge(routes::static_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the web server and serve the map
pub async fn start_server(
    map: &CollaborationMap,
    config: ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let state = Arc::new(AppState::new(map));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;

    let url = format!("http://localhost:{}", config.port);
    eprintln!("Starting web server at {}", url);
    info!(%addr, "web server listening");

    if config.open_browser {
        eprintln!("Opening browser...");
        if let Err(e) = open::that(&url) {
            eprintln!("Warning: Could not open browser: {}", e);
            eprintln!("Please open {} manually", url);
        }
    }

    eprintln!("Press Ctrl+C to stop the server");

    axum::serve(listener, app(state)).await?;

    Ok(())
}
