//! Bug Battle · Debugging Practice Backend
//!
//! - Axum HTTP + WebSocket API
//! - Broken-snippet catalog by level (built-in seeds + optional TOML bank)
//! - Pure grading core: whitespace-insensitive check, line-diff hints, simulated runs
//! - In-memory sessions tracking points, badges and progress
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                  : u16 (default 3000)
//!   RUN_DELAY_MS          : cosmetic delay before a simulated run replies (default 800)
//!   CHALLENGE_CONFIG_PATH : path to TOML config (run delay + optional challenge bank)
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod seeds;
mod grading;
mod session;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (catalog, session store, run delay).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "bugbattle", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "bugbattle", "HTTP server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "bugbattle", error = %e, "Failed to listen for Ctrl+C");
    std::future::pending::<()>().await;
  }
  info!(target: "bugbattle", "Shutdown signal received");
}
