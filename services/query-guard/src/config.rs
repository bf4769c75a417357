// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the query guard.
//!
//! [`ValidationConfig`] is the live, process-wide limit set shared by the
//! validator, the facade and the rate limiter through a [`ConfigHandle`].
//! Runtime changes go through [`ConfigUpdate`], which only overrides the
//! fields it carries.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::info;

/// Configuration for the query guard service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Validation and rate limiting limits
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Bearer token required by `PATCH /config`. Runtime updates are
    /// refused when unset.
    #[serde(default, skip_serializing)]
    pub admin_token: Option<String>,
}

/// Limits applied to incoming tool requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum query length in characters (default: 500)
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,

    /// Maximum context length in characters (default: 1000)
    #[serde(default = "default_max_context_length")]
    pub max_context_length: usize,

    /// Rate limit window in milliseconds (default: 60000)
    #[serde(default = "default_rate_limit_window_ms")]
    pub rate_limit_window_ms: u64,

    /// Requests admitted per client per window (default: 60)
    #[serde(default = "default_max_requests_per_window")]
    pub max_requests_per_window: u32,

    /// Unique/total word ratio a context string must exceed (default: 0.2)
    #[serde(default = "default_repetition_ratio_threshold")]
    pub repetition_ratio_threshold: f64,
}

/// Partial override of [`ValidationConfig`]. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    pub max_query_length: Option<usize>,
    pub max_context_length: Option<usize>,
    pub rate_limit_window_ms: Option<u64>,
    pub max_requests_per_window: Option<u32>,
    pub repetition_ratio_threshold: Option<f64>,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_query_length() -> usize {
    500
}

fn default_max_context_length() -> usize {
    1000
}

fn default_rate_limit_window_ms() -> u64 {
    60_000
}

fn default_max_requests_per_window() -> u32 {
    60
}

fn default_repetition_ratio_threshold() -> f64 {
    0.2
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            validation: ValidationConfig::default(),
            metrics: MetricsConfig::default(),
            admin_token: None,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_query_length: default_max_query_length(),
            max_context_length: default_max_context_length(),
            rate_limit_window_ms: default_rate_limit_window_ms(),
            max_requests_per_window: default_max_requests_per_window(),
            repetition_ratio_threshold: default_repetition_ratio_threshold(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl ValidationConfig {
    /// Get the rate limit window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }

    /// Pause between idle sweeps: one window, never under a second.
    pub fn sweep_interval(&self) -> Duration {
        self.window_duration().max(Duration::from_secs(1))
    }

    /// Merge `update` over this config.
    pub fn apply(&mut self, update: &ConfigUpdate) {
        if let Some(v) = update.max_query_length {
            self.max_query_length = v;
        }
        if let Some(v) = update.max_context_length {
            self.max_context_length = v;
        }
        if let Some(v) = update.rate_limit_window_ms {
            self.rate_limit_window_ms = v;
        }
        if let Some(v) = update.max_requests_per_window {
            self.max_requests_per_window = v;
        }
        if let Some(v) = update.repetition_ratio_threshold {
            self.repetition_ratio_threshold = v;
        }
    }
}

/// Shared handle to the live [`ValidationConfig`].
///
/// Cloning the handle shares the underlying config; every holder observes
/// updates made through any other clone.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<ValidationConfig>>,
}

impl ConfigHandle {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copy of the current config.
    pub fn snapshot(&self) -> ValidationConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply a partial update and return the merged config.
    pub fn update(&self, update: &ConfigUpdate) -> ValidationConfig {
        let mut config = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        config.apply(update);
        info!(
            max_query_length = config.max_query_length,
            max_context_length = config.max_context_length,
            rate_limit_window_ms = config.rate_limit_window_ms,
            max_requests_per_window = config.max_requests_per_window,
            repetition_ratio_threshold = config.repetition_ratio_threshold,
            "Validation config updated"
        );
        config.clone()
    }
}
