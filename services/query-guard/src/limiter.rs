// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter keyed by client identifier.
//!
//! Each client gets a counter that resets once its window has run for
//! longer than `rate_limit_window_ms`. Stale clients are evicted by an
//! opportunistic sweep that piggybacks on regular checks.
//!
//! Being a fixed window, a client can land up to twice the per-window
//! limit across a window boundary (a full window's worth at the end of one
//! window and another at the start of the next).

use crate::clock::Clock;
use crate::config::{ConfigHandle, ValidationConfig};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until the current window expires
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Per-client window state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRateRecord {
    pub client_id: String,
    pub window_start: DateTime<Utc>,
    pub request_count: u32,
}

impl ClientRateRecord {
    fn new(client_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            client_id: client_id.to_string(),
            window_start: now,
            request_count: 1,
        }
    }

    fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.window_start).num_milliseconds()
    }

    fn is_expired(&self, now: DateTime<Utc>, window_ms: i64) -> bool {
        self.elapsed_ms(now) > window_ms
    }

    fn reset_in(&self, now: DateTime<Utc>, window_ms: i64) -> Duration {
        let left = (window_ms - self.elapsed_ms(now)).max(0);
        Duration::from_millis(left as u64)
    }
}

#[derive(Debug)]
struct LimiterState {
    records: HashMap<String, ClientRateRecord>,
    last_sweep: DateTime<Utc>,
}

/// Thread-safe rate limiter.
///
/// The whole table sits behind one lock so that sweep, lookup and update
/// of a check happen as a single step. Two concurrent callers can never
/// both observe `count < max` for the same slot.
pub struct RateLimiter {
    /// Live limits
    config: ConfigHandle,
    /// Time source
    clock: Arc<dyn Clock>,
    /// Client table and sweep bookkeeping
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    /// Create a new rate limiter over the shared config.
    pub fn new(config: ConfigHandle, clock: Arc<dyn Clock>) -> Self {
        let last_sweep = clock.now();
        Self {
            config,
            clock,
            state: Mutex::new(LimiterState {
                records: HashMap::new(),
                last_sweep,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LimiterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit or reject one request from `client_id`.
    pub fn check_rate_limit(&self, client_id: &str) -> bool {
        self.check(client_id).is_allowed()
    }

    /// Admit or reject one request, reporting quota details.
    pub fn check(&self, client_id: &str) -> RateLimitResult {
        let config = self.config.snapshot();
        let window_ms = window_ms(&config);
        let max = config.max_requests_per_window;
        let now = self.clock.now();

        let mut guard = self.lock();
        let state = &mut *guard;

        if (now - state.last_sweep).num_milliseconds() > window_ms {
            sweep_locked(state, now, window_ms);
        }

        match state.records.get_mut(client_id) {
            Some(record) if !record.is_expired(now, window_ms) => {
                if record.request_count < max {
                    record.request_count += 1;
                    RateLimitResult::Allowed {
                        remaining: max - record.request_count,
                        reset_in: record.reset_in(now, window_ms),
                    }
                } else {
                    let retry_after = record.reset_in(now, window_ms);
                    debug!(client = %client_id, count = record.request_count, ?retry_after, "Client rate limit exceeded");
                    RateLimitResult::Limited { retry_after }
                }
            }
            _ => {
                if max == 0 {
                    debug!(client = %client_id, "Rate limit is zero, rejecting");
                    return RateLimitResult::Limited {
                        retry_after: config.window_duration(),
                    };
                }
                state
                    .records
                    .insert(client_id.to_string(), ClientRateRecord::new(client_id, now));
                RateLimitResult::Allowed {
                    remaining: max - 1,
                    reset_in: config.window_duration(),
                }
            }
        }
    }

    /// Evict every client whose window is stale. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let window_ms = window_ms(&self.config.snapshot());
        let now = self.clock.now();
        let mut state = self.lock();
        sweep_locked(&mut state, now, window_ms)
    }

    /// Drop all client state.
    pub fn reset(&self) {
        let now = self.clock.now();
        let mut state = self.lock();
        state.records.clear();
        state.last_sweep = now;
    }

    /// Number of clients currently holding a record.
    pub fn tracked_clients(&self) -> usize {
        self.lock().records.len()
    }

    /// Copy of the record for `client_id`, if any.
    pub fn record(&self, client_id: &str) -> Option<ClientRateRecord> {
        self.lock().records.get(client_id).cloned()
    }
}

fn window_ms(config: &ValidationConfig) -> i64 {
    i64::try_from(config.rate_limit_window_ms).unwrap_or(i64::MAX)
}

fn sweep_locked(state: &mut LimiterState, now: DateTime<Utc>, window_ms: i64) -> usize {
    let before = state.records.len();
    state
        .records
        .retain(|_, record| !record.is_expired(now, window_ms));
    state.last_sweep = now;
    let evicted = before - state.records.len();
    if evicted > 0 {
        info!(evicted, remaining = state.records.len(), "Evicted stale rate limit records");
    }
    evicted
}
