// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Query Guard
//!
//! This crate provides input validation and abuse prevention for tool
//! endpoints that accept a free-text query and an optional context string:
//!
//! - Type, emptiness and length checks per field
//! - Sanitization (control characters, whitespace, length cap, NFKC)
//! - Denylist scanning for injection markers and repetitive context
//! - Per-client fixed-window rate limiting with stale-entry eviction
//! - Batch validation that reports every failure
//!
//! The security scan is a heuristic. Anything downstream that interprets
//! request text must still handle it as data.

pub mod clock;
pub mod config;
pub mod facade;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod sanitizer;
pub mod scanner;
pub mod timefmt;
pub mod validator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, ConfigHandle, ConfigUpdate, ValidationConfig};
pub use facade::{get_validation_error, BatchInput, BatchValidation, ToolInputs, ValidationFacade};
pub use limiter::{RateLimitResult, RateLimiter};
pub use scanner::SecurityScanner;
pub use validator::{InputValidator, ValidationError};
