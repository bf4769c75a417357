// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Query Guard Service
//!
//! Validates and rate-limits tool requests before they reach the query
//! backend. Callers POST the raw request fields to `/validate` and forward
//! the returned, sanitized fields only when the guard answers 200.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `MAX_QUERY_LENGTH`: Max query characters (default: 500)
//! - `MAX_CONTEXT_LENGTH`: Max context characters (default: 1000)
//! - `RATE_LIMIT_WINDOW_MS`: Rate limit window (default: 60000)
//! - `MAX_REQUESTS_PER_WINDOW`: Requests per client per window (default: 60)
//! - `REPETITION_RATIO_THRESHOLD`: Minimum unique word ratio for context (default: 0.2)
//! - `METRICS_ENABLED`: Expose `/metrics` (default: true)
//! - `ADMIN_TOKEN`: Bearer token for `PATCH /config` (default: unset, updates refused)

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use query_guard::{
    clock::SystemClock,
    config::{Config, ValidationConfig},
    handlers::{router, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = load_config();
    info!(
        bind_addr = %config.bind_addr,
        max_query_length = config.validation.max_query_length,
        max_context_length = config.validation.max_context_length,
        rate_limit_window_ms = config.validation.rate_limit_window_ms,
        max_requests_per_window = config.validation.max_requests_per_window,
        "Starting query guard"
    );

    let state = Arc::new(AppState::new(config.clone(), Arc::new(SystemClock))?);

    // Checks already sweep opportunistically; this covers idle periods.
    // Cadence follows the live window.
    let sweep_state = state.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(sweep_state.live_config().sweep_interval()).await;
            sweep_state.limiter.sweep();
            sweep_state.refresh_tracked_clients();
        }
    });

    let app = router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Load configuration from environment variables.
fn load_config() -> Config {
    let defaults = ValidationConfig::default();
    let mut config = Config {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        validation: ValidationConfig {
            max_query_length: env_or("MAX_QUERY_LENGTH", defaults.max_query_length),
            max_context_length: env_or("MAX_CONTEXT_LENGTH", defaults.max_context_length),
            rate_limit_window_ms: env_or("RATE_LIMIT_WINDOW_MS", defaults.rate_limit_window_ms),
            max_requests_per_window: env_or(
                "MAX_REQUESTS_PER_WINDOW",
                defaults.max_requests_per_window,
            ),
            repetition_ratio_threshold: env_or(
                "REPETITION_RATIO_THRESHOLD",
                defaults.repetition_ratio_threshold,
            ),
        },
        ..Default::default()
    };
    config.metrics.enabled = env_or("METRICS_ENABLED", config.metrics.enabled);
    config.admin_token = std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());
    config
}
