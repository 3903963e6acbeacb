//! Response types for the ledger API.
//!
//! Every body is an envelope: `{"success": true, "data": ...}` on success and
//! `{"success": false, "error": {...}}` on failure.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// The response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// True when the operation succeeded.
    pub success: bool,
    /// The payload on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// The error on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    /// A success envelope.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    /// A failure envelope.
    pub fn failure(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::failure(self.error))).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            EngineError::ConfigurationMissing { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiError::with_details(
                    "CONFIGURATION_MISSING",
                    message,
                    "An administrator must create the global schedule first",
                ),
            ),
            EngineError::InvalidInterval { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_INTERVAL", message),
            ),
            EngineError::ValidationError { field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details("VALIDATION_ERROR", message, field),
            ),
            EngineError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
            }
            EngineError::InvalidStateTransition { .. } => (
                StatusCode::CONFLICT,
                ApiError::new("INVALID_STATE_TRANSITION", message),
            ),
            EngineError::ConcurrencyConflict { .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "CONCURRENCY_CONFLICT",
                    message,
                    "The record changed while the request was processed; retry",
                ),
            ),
            EngineError::InsufficientBalance { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("INSUFFICIENT_BALANCE", message),
            ),
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::StoreUnavailable { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("STORE_UNAVAILABLE", "Store unavailable", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details")); // Should be skipped when None
    }

    #[test]
    fn test_envelopes() {
        let ok = serde_json::to_value(ApiResponse::ok(42)).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "data": 42}));

        let failed =
            serde_json::to_value(ApiResponse::failure(ApiError::new("NOT_FOUND", "gone"))).unwrap();
        assert_eq!(
            failed,
            serde_json::json!({"success": false, "error": {"code": "NOT_FOUND", "message": "gone"}})
        );
    }

    #[test]
    fn test_status_mapping() {
        let cases = vec![
            (
                EngineError::validation("minutes", "must be positive"),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                EngineError::not_found("overtime_entry", "x"),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                EngineError::InvalidStateTransition {
                    entity: "overtime_entry".to_string(),
                    id: "x".to_string(),
                    from: "APROBADO".to_string(),
                    to: "APROBADO".to_string(),
                },
                StatusCode::CONFLICT,
                "INVALID_STATE_TRANSITION",
            ),
            (
                EngineError::InsufficientBalance {
                    employee_id: "emp_001".to_string(),
                    requested: 20,
                    available: 15,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
                "INSUFFICIENT_BALANCE",
            ),
            (
                EngineError::ConfigurationMissing {
                    message: "no schedule".to_string(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
                "CONFIGURATION_MISSING",
            ),
            (
                EngineError::StoreUnavailable {
                    message: "down".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_UNAVAILABLE",
            ),
        ];

        for (error, status, code) in cases {
            let response: ApiErrorResponse = error.into();
            assert_eq!(response.status, status);
            assert_eq!(response.error.code, code);
        }
    }

    #[test]
    fn test_invalid_interval_is_bad_request() {
        let at = NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        let response: ApiErrorResponse = EngineError::InvalidInterval {
            start: at,
            end: at,
            message: "empty".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "INVALID_INTERVAL");
    }
}
