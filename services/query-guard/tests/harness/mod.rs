// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for query guard attack simulation.
//!
//! This module provides utilities for simulating abusive traffic against
//! the validator, scanner and rate limiter under a simulated clock.

pub mod attacks;
pub mod generators;
pub mod metrics;
