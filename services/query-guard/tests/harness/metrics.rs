// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Metrics collection for attack simulation results.

use std::collections::HashMap;

/// Possible outcomes for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Allowed,
    RateLimited,
    ValidationFailed,
    SecurityBlocked,
    ContextRejected,
}

/// Collects metrics during attack simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    /// Count of requests by outcome
    outcomes: HashMap<Outcome, usize>,
    /// Count of requests by client
    requests_per_client: HashMap<String, usize>,
    /// Admitted requests by client
    allowed_per_client: HashMap<String, usize>,
    /// Simulated duration in milliseconds
    duration_ms: i64,
}

impl AttackMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request outcome.
    pub fn record(&mut self, outcome: Outcome, client: &str) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.requests_per_client.entry(client.to_string()).or_insert(0) += 1;
        if outcome == Outcome::Allowed {
            *self.allowed_per_client.entry(client.to_string()).or_insert(0) += 1;
        }
    }

    /// Mark the end of an attack.
    pub fn finish(&mut self, duration_ms: i64) {
        self.duration_ms = duration_ms;
    }

    /// Get total request count.
    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Get count for a specific outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Get block rate (ratio of blocked to total).
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        let allowed = self.count(Outcome::Allowed);
        (total - allowed) as f64 / total as f64
    }

    /// Most requests admitted for any single client.
    pub fn max_allowed_per_client(&self) -> usize {
        self.allowed_per_client.values().copied().max().unwrap_or(0)
    }

    /// Get number of unique clients that made requests.
    pub fn unique_clients(&self) -> usize {
        self.requests_per_client.len()
    }

    /// Generate a summary report.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests(),
            allowed: self.count(Outcome::Allowed),
            rate_limited: self.count(Outcome::RateLimited),
            validation_failed: self.count(Outcome::ValidationFailed),
            security_blocked: self.count(Outcome::SecurityBlocked),
            context_rejected: self.count(Outcome::ContextRejected),
            duration_ms: self.duration_ms,
            block_rate: self.block_rate(),
            unique_clients: self.unique_clients(),
            max_allowed_per_client: self.max_allowed_per_client(),
        }
    }
}

/// Summary report of attack metrics.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub allowed: usize,
    pub rate_limited: usize,
    pub validation_failed: usize,
    pub security_blocked: usize,
    pub context_rejected: usize,
    pub duration_ms: i64,
    pub block_rate: f64,
    pub unique_clients: usize,
    pub max_allowed_per_client: usize,
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Attack Metrics Report ===")?;
        writeln!(f, "Simulated time:    {} ms", self.duration_ms)?;
        writeln!(f, "Total Requests:    {}", self.total_requests)?;
        writeln!(f)?;
        writeln!(f, "--- Outcomes ---")?;
        writeln!(f, "Allowed:           {}", self.allowed)?;
        writeln!(f, "Rate Limited:      {}", self.rate_limited)?;
        writeln!(f, "Validation Failed: {}", self.validation_failed)?;
        writeln!(f, "Security Blocked:  {}", self.security_blocked)?;
        writeln!(f, "Context Rejected:  {}", self.context_rejected)?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate * 100.0)?;
        writeln!(f)?;
        writeln!(f, "--- Distribution ---")?;
        writeln!(f, "Unique Clients:    {}", self.unique_clients)?;
        writeln!(f, "Max per Client:    {}", self.max_allowed_per_client)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let mut metrics = AttackMetrics::new();

        metrics.record(Outcome::Allowed, "client-a");
        metrics.record(Outcome::Allowed, "client-a");
        metrics.record(Outcome::RateLimited, "client-a");
        metrics.record(Outcome::Allowed, "client-b");

        assert_eq!(metrics.total_requests(), 4);
        assert_eq!(metrics.count(Outcome::Allowed), 3);
        assert_eq!(metrics.unique_clients(), 2);
        assert_eq!(metrics.max_allowed_per_client(), 2);
    }

    #[test]
    fn test_block_rate() {
        let mut metrics = AttackMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Allowed, "c");
        }
        for _ in 0..7 {
            metrics.record(Outcome::RateLimited, "c");
        }

        assert!((metrics.block_rate() - 0.7).abs() < 0.01);
    }
}
