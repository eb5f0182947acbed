//! Web visualization module for collab-map
//!
//! Serves the collaboration map as an interactive Leaflet page backed by
//! JSON endpoints:
//! - `/api/map` - GeoJSON document (markers and edge polylines)
//! - `/api/summary` - aggregated totals
//! - `/api/health` - liveness check

pub mod routes;
pub mod server;

pub use server::{ServerConfig, start_server};
