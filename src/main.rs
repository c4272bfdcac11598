//! Praxis · Token-Rewarded Exercise Backend
//!
//! - Axum HTTP API for parameterized questions, grading, and token rewards
//! - Optional external code-execution judge (via environment or TOML config)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   JUDGE_BASE_URL    : enables judge integration if present
//!   JUDGE_AUTH_TOKEN  : optional judge auth header
//!   JUDGE_LANGUAGE_ID : judge language id (default 62, Java)
//!   CONFIG_PATH       : path to TOML config (judge + content bank)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod variables;
mod config;
mod seeds;
mod state;
mod protocol;
mod report;
mod grader;
mod judge;
mod ledger;
mod pipeline;
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

  // Build shared application state (in-memory stores, judge client).
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
  info!(target: "praxis_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
