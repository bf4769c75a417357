// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the query guard service.
//!
//! The service sits in front of a tool endpoint: callers submit the raw
//! request fields with a client identifier and get back either the
//! validated, sanitized fields or a rejection explaining why.

use crate::clock::Clock;
use crate::config::{Config, ConfigHandle, ConfigUpdate, ValidationConfig};
use crate::facade::{get_validation_error, BatchInput, BatchValidation, ValidationFacade};
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::metrics::GuardMetrics;
use crate::sanitizer;
use crate::scanner::SecurityScanner;
use crate::timefmt::{self, TimeRange};
use crate::validator::{
    validate_station_name, validate_time_format, validate_train_number, InputValidator,
    CONTEXT_FIELD, QUERY_FIELD,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failure while assembling the service state.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Invalid security pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Metrics registration failed: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Shared application state.
pub struct AppState {
    pub facade: ValidationFacade,
    pub limiter: RateLimiter,
    pub scanner: SecurityScanner,
    pub metrics: GuardMetrics,
    pub clock: Arc<dyn Clock>,
    pub config: Config,
}

impl AppState {
    /// Build every component over one shared [`ConfigHandle`].
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> Result<Self, SetupError> {
        let handle = ConfigHandle::new(config.validation.clone());
        let validator = InputValidator::new(handle.clone(), clock.clone());
        Ok(Self {
            facade: ValidationFacade::new(validator),
            limiter: RateLimiter::new(handle.clone(), clock.clone()),
            scanner: SecurityScanner::new(handle)?,
            metrics: GuardMetrics::new()?,
            clock,
            config,
        })
    }

    /// Current validation limits, including runtime updates.
    pub fn live_config(&self) -> ValidationConfig {
        self.facade.validator().config().snapshot()
    }

    /// Copy the limiter's table size into the gauge.
    pub fn refresh_tracked_clients(&self) {
        let tracked = self.limiter.tracked_clients();
        self.metrics
            .tracked_clients
            .set(i64::try_from(tracked).unwrap_or(i64::MAX));
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Tool request to validate.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub client_id: String,
    #[serde(default)]
    pub query: Value,
    #[serde(default)]
    pub context: Option<Value>,
}

/// Keyword hints found in the context.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Hints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<(String, String)>,
}

/// Validated tool request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub remaining: u32,
    pub hints: Hints,
}

/// Formats checked by `/formats`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    TrainNumber,
    StationName,
    Date,
    Time,
}

impl FormatKind {
    fn field_name(self) -> &'static str {
        match self {
            Self::TrainNumber => "train_number",
            Self::StationName => "station_name",
            Self::Date => "date",
            Self::Time => "time",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FormatRequest {
    pub kind: FormatKind,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FormatResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Build the router. Tracing and other layers are added by the caller.
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/validate", post(validate))
        .route("/validate/batch", post(validate_batch))
        .route("/formats", post(check_format))
        .route("/config", patch(update_config));

    if state.config.metrics.enabled {
        router = router.route(&state.config.metrics.path, get(metrics));
    }

    router.with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "query-guard",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn rejection(status: StatusCode, code: &str, error: String) -> Response {
    (
        status,
        Json(ErrorResponse {
            error,
            code: code.to_string(),
            retry_after_secs: None,
        }),
    )
        .into_response()
}

/// Validate one tool request and charge it against the client's quota.
pub async fn validate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValidateRequest>,
) -> Response {
    debug!(client = %req.client_id, "Processing validation request");

    let inputs = match state
        .facade
        .validate_tool_inputs(&req.query, req.context.as_ref())
    {
        Ok(inputs) => inputs,
        Err(err) => {
            info!(client = %req.client_id, code = err.code(), error = %err, "Validation failed");
            state
                .metrics
                .validation_failures
                .with_label_values(&[err.code()])
                .inc();
            let message = get_validation_error(err.field(), &err.to_string());
            return rejection(StatusCode::BAD_REQUEST, err.code(), message);
        }
    };

    let remaining = match state.limiter.check(&req.client_id) {
        RateLimitResult::Allowed { remaining, .. } => remaining,
        RateLimitResult::Limited { retry_after } => {
            // Round up so clients never retry inside the window
            let retry_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            info!(client = %req.client_id, retry_after_secs = retry_secs, "Request rate limited");
            state.metrics.rate_limited.inc();
            return (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_secs.to_string())],
                Json(ErrorResponse {
                    error: "Too many requests".to_string(),
                    code: "RATE_LIMITED".to_string(),
                    retry_after_secs: Some(retry_secs),
                }),
            )
                .into_response();
        }
    };

    // Scan before sanitizing, which would strip markers such as null bytes
    if let Some(pattern) = state.scanner.find_security_risk(&inputs.query) {
        warn!(client = %req.client_id, pattern, "Query rejected by security scan");
        state.metrics.security_rejections.inc();
        return rejection(
            StatusCode::BAD_REQUEST,
            "SECURITY_RISK",
            get_validation_error(QUERY_FIELD, "Query contains disallowed content"),
        );
    }
    let query = state.facade.sanitize_input(&inputs.query);

    let context = match inputs.context {
        Some(raw) => {
            if !state.scanner.validate_context(&raw) {
                warn!(client = %req.client_id, "Context rejected");
                state.metrics.security_rejections.inc();
                return rejection(
                    StatusCode::BAD_REQUEST,
                    "CONTEXT_REJECTED",
                    get_validation_error(
                        CONTEXT_FIELD,
                        "Context looks like spam or contains disallowed content",
                    ),
                );
            }
            let max = state.live_config().max_context_length;
            Some(sanitizer::sanitize_input(&raw, max))
        }
        None => None,
    };

    let hints = context
        .as_deref()
        .map(|text| context_hints(text, &state))
        .unwrap_or_default();

    state.metrics.admitted.inc();
    (
        StatusCode::OK,
        Json(ValidateResponse {
            query,
            context,
            remaining,
            hints,
        }),
    )
        .into_response()
}

fn context_hints(text: &str, state: &AppState) -> Hints {
    let today = state.clock.now().date_naive();
    Hints {
        date: timefmt::parse_date_hint(text, today).map(|d| d.format("%Y-%m-%d").to_string()),
        time_range: timefmt::parse_time_range_hint(text)
            .map(|TimeRange { start, end }| (start.to_string(), end.to_string())),
    }
}

/// Validate a list of fields, reporting every failure.
pub async fn validate_batch(
    State(state): State<Arc<AppState>>,
    Json(inputs): Json<Vec<BatchInput>>,
) -> Json<BatchValidation> {
    let result = state.facade.validate_batch(&inputs);
    if !result.valid {
        debug!(failed = result.errors.len(), "Batch contained invalid inputs");
    }
    Json(result)
}

/// Check a single value against one of the domain formats.
pub async fn check_format(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FormatRequest>,
) -> Json<FormatResponse> {
    let valid = match req.kind {
        FormatKind::TrainNumber => validate_train_number(&req.value),
        FormatKind::StationName => validate_station_name(&req.value),
        FormatKind::Date => state.facade.validator().validate_date_format(&req.value),
        FormatKind::Time => validate_time_format(&req.value),
    };

    let field = req.kind.field_name();
    Json(FormatResponse {
        valid,
        message: (!valid)
            .then(|| get_validation_error(field, &format!("Invalid {field} format"))),
    })
}

/// Apply a partial config update. Requires `Authorization: Bearer <admin token>`.
pub async fn update_config(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(update): Json<ConfigUpdate>,
) -> Response {
    let Some(expected) = state.config.admin_token.as_deref() else {
        warn!("Config update refused: no admin token configured");
        return rejection(
            StatusCode::FORBIDDEN,
            "CONFIG_UPDATES_DISABLED",
            "Runtime config updates are disabled".to_string(),
        );
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if !presented.is_some_and(|token| tokens_match(token, expected)) {
        warn!("Config update refused: bad or missing credentials");
        return rejection(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "Missing or invalid admin token".to_string(),
        );
    }

    let merged = state.facade.update_config(&update);
    (StatusCode::OK, Json(merged)).into_response()
}

// Compares every byte so timing does not reveal the matching prefix.
fn tokens_match(presented: &str, expected: &str) -> bool {
    presented.len() == expected.len()
        && presented
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    state.refresh_tracked_clients();
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
