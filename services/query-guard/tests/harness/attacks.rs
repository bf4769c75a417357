// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Attack simulation patterns for security testing.

/// What each simulated request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Ordinary timetable queries
    Benign,
    /// Queries carrying injection markers
    Injection,
    /// Full-width look-alikes of injection markers
    FullwidthBypass,
    /// Queries longer than the configured maximum
    Oversized,
    /// Whitespace-only queries
    Empty,
    /// Benign query with a spam-shaped context
    RepetitiveContext,
}

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Simulated milliseconds between requests
    pub interval_ms: i64,
    /// Number of unique client identifiers to rotate through
    pub unique_clients: usize,
    /// Request content
    pub payload: Payload,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            interval_ms: 100,
            unique_clients: 1,
            payload: Payload::Benign,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Single client flood - basic DoS from one identifier.
    pub fn single_client_flood() -> Self {
        Self {
            total_requests: 200,
            interval_ms: 10,
            ..Default::default()
        }
    }

    /// Distributed flood - many identifiers, a few requests each.
    pub fn distributed_flood() -> Self {
        Self {
            total_requests: 500,
            interval_ms: 5,
            unique_clients: 100,
            ..Default::default()
        }
    }

    /// Slow drip - stay under the per-window limit.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 120,
            // 1.1s apart is about 54 per minute, under the default 60
            interval_ms: 1_100,
            ..Default::default()
        }
    }

    /// Script and URI injection attempts.
    pub fn injection_probe() -> Self {
        Self {
            total_requests: 50,
            unique_clients: 10,
            payload: Payload::Injection,
            ..Default::default()
        }
    }

    /// Injection markers spelled with full-width characters.
    pub fn fullwidth_bypass() -> Self {
        Self {
            total_requests: 30,
            unique_clients: 10,
            payload: Payload::FullwidthBypass,
            ..Default::default()
        }
    }

    /// Oversized queries.
    pub fn oversized_payloads() -> Self {
        Self {
            total_requests: 50,
            unique_clients: 5,
            payload: Payload::Oversized,
            ..Default::default()
        }
    }

    /// Empty queries.
    pub fn empty_payloads() -> Self {
        Self {
            total_requests: 50,
            unique_clients: 5,
            payload: Payload::Empty,
            ..Default::default()
        }
    }

    /// Context strings made of one repeated token.
    pub fn spam_context() -> Self {
        Self {
            total_requests: 50,
            unique_clients: 10,
            payload: Payload::RepetitiveContext,
            ..Default::default()
        }
    }

    /// Simulated duration of the attack in milliseconds.
    pub fn simulated_duration_ms(&self) -> i64 {
        self.total_requests as i64 * self.interval_ms
    }
}
