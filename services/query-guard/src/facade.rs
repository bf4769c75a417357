// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request-level validation built from the field validator and sanitizer.

use crate::config::{ConfigHandle, ConfigUpdate, ValidationConfig};
use crate::sanitizer;
use crate::validator::{InputValidator, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Validated tool request fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInputs {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// One entry of a batch validation request.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchInput {
    pub value: Value,
    pub field_name: String,
    pub max_length: usize,
}

impl BatchInput {
    pub fn new(value: impl Into<Value>, field_name: &str, max_length: usize) -> Self {
        Self {
            value: value.into(),
            field_name: field_name.to_string(),
            max_length,
        }
    }
}

/// Outcome of [`ValidationFacade::validate_batch`].
///
/// `validated_inputs` lines up with the inputs, holding `""` where an entry
/// failed. `errors` only lists the failures, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub validated_inputs: Vec<String>,
}

/// Validation entry point for tool requests.
#[derive(Clone)]
pub struct ValidationFacade {
    validator: InputValidator,
}

impl ValidationFacade {
    pub fn new(validator: InputValidator) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &InputValidator {
        &self.validator
    }

    fn config(&self) -> &ConfigHandle {
        self.validator.config()
    }

    /// Validate `query` and, when present, `context`. The query is checked
    /// first, so its error wins when both fields are bad.
    pub fn validate_tool_inputs(&self, query: &Value, context: Option<&Value>) -> Result<ToolInputs> {
        let query = self.validator.validate_query_field(query)?;
        let context = context
            .map(|c| self.validator.validate_context_field(c))
            .transpose()?;
        Ok(ToolInputs { query, context })
    }

    /// Validate every entry, collecting failures instead of stopping at the first.
    pub fn validate_batch(&self, inputs: &[BatchInput]) -> BatchValidation {
        let mut errors = Vec::new();
        let validated_inputs: Vec<String> = inputs
            .iter()
            .map(|input| {
                self.validator
                    .validate_api_input(&input.value, &input.field_name, input.max_length)
                    .unwrap_or_else(|err| {
                        errors.push(err.to_string());
                        String::new()
                    })
            })
            .collect();

        debug!(total = inputs.len(), failed = errors.len(), "Batch validated");
        BatchValidation {
            valid: errors.is_empty(),
            errors,
            validated_inputs,
        }
    }

    /// Sanitize free text against the live query length cap.
    pub fn sanitize_input(&self, input: &str) -> String {
        sanitizer::sanitize_input(input, self.config().snapshot().max_query_length)
    }

    pub fn update_config(&self, update: &ConfigUpdate) -> ValidationConfig {
        self.config().update(update)
    }
}

/// Append end-user suggestions for `field_name` to an error message.
pub fn get_validation_error(field_name: &str, error_message: &str) -> String {
    let suggestions = suggestions_for(field_name);
    let mut message = String::with_capacity(error_message.len() + 128);
    message.push_str(error_message);
    message.push_str("\n\nSuggestions:");
    for suggestion in suggestions {
        message.push_str("\n• ");
        message.push_str(suggestion);
    }
    message
}

fn suggestions_for(field_name: &str) -> &'static [&'static str] {
    match field_name {
        "query" => &[
            "Describe the trip in one sentence, e.g. \"台北到花蓮的火車\"",
            "Keep the query under the maximum length",
            "Leave out markup, links and code",
        ],
        "context" => &[
            "Add only details that narrow the search, e.g. \"明天早上\"",
            "Avoid repeating the same words",
            "Leave out markup, links and code",
        ],
        "train_number" | "trainNumber" => &[
            "Use 1 to 4 digits, optionally followed by one letter, e.g. \"152\" or \"1234A\"",
            "Do not include the train type",
        ],
        "station" | "station_name" | "stationName" => &[
            "Use the station name in Chinese or English, e.g. \"台北\" or \"Taipei\"",
            "Check the spelling against the official station list",
        ],
        "date" => &[
            "Use the YYYY-MM-DD format, e.g. \"2026-10-19\"",
            "Pick a date within one year of today",
        ],
        "time" => &[
            "Use 24-hour HH:mm format, e.g. \"08:30\" or \"18:05\"",
        ],
        _ => &[
            "Check the input format and try again",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::config::ValidationConfig;
    use crate::validator::{ValidationError, CONTEXT_FIELD, QUERY_FIELD};
    use serde_json::json;
    use std::sync::Arc;

    fn facade() -> ValidationFacade {
        let config = ConfigHandle::new(ValidationConfig::default());
        ValidationFacade::new(InputValidator::new(config, Arc::new(SystemClock)))
    }

    #[test]
    fn test_tool_inputs_pass_through_trimmed() {
        let inputs = facade()
            .validate_tool_inputs(&json!("台北到花蓮的火車"), Some(&json!("明天早上")))
            .unwrap();
        assert_eq!(inputs.query, "台北到花蓮的火車");
        assert_eq!(inputs.context.as_deref(), Some("明天早上"));
    }

    #[test]
    fn test_context_is_optional() {
        let inputs = facade().validate_tool_inputs(&json!(" 台中 "), None).unwrap();
        assert_eq!(inputs, ToolInputs { query: "台中".into(), context: None });
    }

    #[test]
    fn test_long_query_rejected_with_limit_in_message() {
        let err = facade()
            .validate_tool_inputs(&json!("x".repeat(501)), None)
            .unwrap_err();
        assert!(matches!(err, ValidationError::LengthExceeded { max: 500, .. }));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_query_error_takes_precedence() {
        let err = facade()
            .validate_tool_inputs(&json!(""), Some(&json!(7)))
            .unwrap_err();
        assert_eq!(err.field(), QUERY_FIELD);

        let err = facade()
            .validate_tool_inputs(&json!("ok"), Some(&json!(7)))
            .unwrap_err();
        assert_eq!(err.field(), CONTEXT_FIELD);
        assert_eq!(err.code(), "TYPE_MISMATCH");
    }

    #[test]
    fn test_batch_collects_every_failure() {
        let result = facade().validate_batch(&[
            BatchInput::new("台北", "station", 20),
            BatchInput::new("   ", "context", 100),
            BatchInput::new(" 08:30 ", "time", 5),
        ]);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.validated_inputs, vec!["台北", "", "08:30"]);
    }

    #[test]
    fn test_batch_keeps_going_after_failures() {
        let result = facade().validate_batch(&[
            BatchInput::new(1, "a", 10),
            BatchInput::new("fine", "b", 10),
            BatchInput::new("far too long", "c", 3),
        ]);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[1].starts_with("System error"));
        assert_eq!(result.validated_inputs, vec!["", "fine", ""]);
    }

    #[test]
    fn test_empty_batch_is_valid() {
        let result = facade().validate_batch(&[]);
        assert!(result.valid);
        assert!(result.validated_inputs.is_empty());
    }

    #[test]
    fn test_sanitize_uses_live_limit() {
        let facade = facade();
        facade.update_config(&ConfigUpdate {
            max_query_length: Some(3),
            ..Default::default()
        });
        assert_eq!(facade.sanitize_input("  台 北  到花蓮"), "台 北");
    }

    #[test]
    fn test_validation_error_suggestions() {
        let message = get_validation_error("query", "query cannot be empty");
        assert!(message.starts_with("query cannot be empty\n\nSuggestions:"));
        assert_eq!(message.matches("\n• ").count(), 3);

        let fallback = get_validation_error("unknown", "bad");
        assert!(fallback.ends_with("• Check the input format and try again"));
    }
}
