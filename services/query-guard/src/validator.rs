// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Field validator for tool requests.
//!
//! Implements the checks applied to every raw field before it reaches
//! business logic:
//! - Type check (fields arrive as JSON values and must be strings)
//! - Emptiness check on the trimmed value
//! - Length check against a per-field maximum
//! - Format predicates for train numbers, station names, dates and times

use crate::clock::Clock;
use crate::config::ConfigHandle;
use chrono::{Months, NaiveDate};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Name of the primary query field.
pub const QUERY_FIELD: &str = "query";

/// Name of the optional context field.
pub const CONTEXT_FIELD: &str = "context";

const MAX_STATION_NAME_CHARS: usize = 20;

/// Which side of the API boundary an over-length field is blamed on.
///
/// An over-long `query` is the caller's mistake and is reported as an API
/// error; any other field is reported as a system error. Error presentation
/// downstream branches on this prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthScope {
    Api,
    System,
}

impl LengthScope {
    fn for_field(field: &str) -> Self {
        if field == QUERY_FIELD {
            Self::Api
        } else {
            Self::System
        }
    }
}

impl fmt::Display for LengthScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => write!(f, "API"),
            Self::System => write!(f, "System"),
        }
    }
}

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid type for {field}: expected a string, got {actual}")]
    TypeMismatch { field: String, actual: &'static str },

    #[error("{field} cannot be empty")]
    EmptyInput { field: String },

    #[error("{scope} error: {field} exceeds the maximum length of {max} characters (got {actual})")]
    LengthExceeded {
        field: String,
        max: usize,
        actual: usize,
        scope: LengthScope,
    },
}

impl ValidationError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::EmptyInput { .. } => "EMPTY_INPUT",
            Self::LengthExceeded { .. } => "LENGTH_EXCEEDED",
        }
    }

    /// Field the error refers to.
    pub fn field(&self) -> &str {
        match self {
            Self::TypeMismatch { field, .. }
            | Self::EmptyInput { field }
            | Self::LengthExceeded { field, .. } => field,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Validate a raw field value and return it trimmed.
///
/// Internal whitespace is left untouched. Length is counted in characters
/// on the trimmed value.
pub fn validate_api_input(value: &Value, field_name: &str, max_length: usize) -> Result<String> {
    let Value::String(raw) = value else {
        let actual = json_type_name(value);
        debug!(field = %field_name, actual, "Type mismatch");
        return Err(ValidationError::TypeMismatch {
            field: field_name.to_string(),
            actual,
        });
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        debug!(field = %field_name, "Empty input");
        return Err(ValidationError::EmptyInput {
            field: field_name.to_string(),
        });
    }

    let length = trimmed.chars().count();
    if length > max_length {
        debug!(field = %field_name, length, max_length, "Input too long");
        return Err(ValidationError::LengthExceeded {
            field: field_name.to_string(),
            max: max_length,
            actual: length,
            scope: LengthScope::for_field(field_name),
        });
    }

    Ok(trimmed.to_string())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 1-4 digits with an optional letter suffix, e.g. `123` or `1234A`.
pub fn validate_train_number(input: &str) -> bool {
    let digits = input.bytes().take_while(u8::is_ascii_digit).count();
    let suffix = &input.as_bytes()[digits..];
    (1..=4).contains(&digits)
        && match suffix {
            [] => true,
            [c] => c.is_ascii_alphabetic(),
            _ => false,
        }
}

/// Station names: CJK ideographs, Latin letters, spaces, hyphens and
/// parentheses (ASCII or full-width), at most 20 characters.
pub fn validate_station_name(input: &str) -> bool {
    let count = input.chars().count();
    !input.trim().is_empty()
        && count <= MAX_STATION_NAME_CHARS
        && input.chars().all(is_station_char)
}

fn is_station_char(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | 'a'..='z'
        | 'A'..='Z'
        | ' '
        | '-'
        | '('
        | ')'
        | '（'
        | '）')
}

/// `YYYY-MM-DD`, a real calendar date, no more than one year away from `today`.
pub fn validate_date_format(input: &str, today: NaiveDate) -> bool {
    let bytes = input.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return false;
    }

    let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") else {
        return false;
    };

    let earliest = today.checked_sub_months(Months::new(12)).unwrap_or(NaiveDate::MIN);
    let latest = today.checked_add_months(Months::new(12)).unwrap_or(NaiveDate::MAX);
    (earliest..=latest).contains(&date)
}

/// `HH:mm` on a 24-hour clock, both parts zero-padded.
pub fn validate_time_format(input: &str) -> bool {
    match input.as_bytes() {
        [h1, h2, b':', m1, m2] if [h1, h2, m1, m2].iter().all(|b| b.is_ascii_digit()) => {
            let hours = (h1 - b'0') * 10 + (h2 - b'0');
            let minutes = (m1 - b'0') * 10 + (m2 - b'0');
            hours < 24 && minutes < 60
        }
        _ => false,
    }
}

/// Validator bound to the live config and a clock.
#[derive(Clone)]
pub struct InputValidator {
    config: ConfigHandle,
    clock: Arc<dyn Clock>,
}

impl InputValidator {
    /// Create a new validator over the shared config.
    pub fn new(config: ConfigHandle, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Validate an arbitrary field against an explicit maximum.
    pub fn validate_api_input(
        &self,
        value: &Value,
        field_name: &str,
        max_length: usize,
    ) -> Result<String> {
        validate_api_input(value, field_name, max_length)
    }

    /// Validate the `query` field against the configured maximum.
    pub fn validate_query_field(&self, value: &Value) -> Result<String> {
        let max = self.config.snapshot().max_query_length;
        validate_api_input(value, QUERY_FIELD, max)
    }

    /// Validate the `context` field against the configured maximum.
    pub fn validate_context_field(&self, value: &Value) -> Result<String> {
        let max = self.config.snapshot().max_context_length;
        validate_api_input(value, CONTEXT_FIELD, max)
    }

    /// Date check relative to the validator's clock.
    pub fn validate_date_format(&self, input: &str) -> bool {
        validate_date_format(input, self.clock.now().date_naive())
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }
}
