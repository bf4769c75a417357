// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for the guard service.

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Metrics registered on a registry owned by the service.
#[derive(Clone)]
pub struct GuardMetrics {
    registry: Registry,
    pub admitted: IntCounter,
    pub rate_limited: IntCounter,
    pub validation_failures: IntCounterVec,
    pub security_rejections: IntCounter,
    pub tracked_clients: IntGauge,
}

impl GuardMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let admitted = IntCounter::new(
            "query_guard_requests_admitted_total",
            "Requests that passed rate limiting and validation",
        )?;
        let rate_limited = IntCounter::new(
            "query_guard_requests_rate_limited_total",
            "Requests rejected by the per-client rate limiter",
        )?;
        let validation_failures = IntCounterVec::new(
            Opts::new(
                "query_guard_validation_failures_total",
                "Requests rejected by field validation",
            ),
            &["code"],
        )?;
        let security_rejections = IntCounter::new(
            "query_guard_security_rejections_total",
            "Requests rejected by the security scanner",
        )?;
        let tracked_clients = IntGauge::new(
            "query_guard_tracked_clients",
            "Clients currently holding a rate limit record",
        )?;

        registry.register(Box::new(admitted.clone()))?;
        registry.register(Box::new(rate_limited.clone()))?;
        registry.register(Box::new(validation_failures.clone()))?;
        registry.register(Box::new(security_rejections.clone()))?;
        registry.register(Box::new(tracked_clients.clone()))?;

        Ok(Self {
            registry,
            admitted,
            rate_limited,
            validation_failures,
            security_rejections,
            tracked_clients,
        })
    }

    /// Text exposition of every registered metric.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
