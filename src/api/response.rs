//! Response types for the crew roster API.
//!
//! This module defines the response bodies and the mapping from
//! [`RosterError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorClass, RosterError};
use crate::models::{Assignment, SkillWarning, SwapRequest};
use crate::store::MaterializeReport;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
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

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<RosterError> for ApiErrorResponse {
    fn from(error: RosterError) -> Self {
        let (status, code, hint) = match error.class() {
            ErrorClass::Validation => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Correct the request and try again",
            ),
            ErrorClass::Configuration => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CONFIGURATION_ERROR",
                "The request refers to something the facility configuration does not define",
            ),
            ErrorClass::Permission => (
                StatusCode::FORBIDDEN,
                "PERMISSION_DENIED",
                "The actor lacks authority for this action",
            ),
            ErrorClass::Consistency => (
                StatusCode::CONFLICT,
                "CONSISTENCY_ERROR",
                "The change was refused and nothing was modified",
            ),
            ErrorClass::NotFound => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "The referenced record does not exist",
            ),
        };
        ApiErrorResponse {
            status,
            error: ApiError::with_details(code, error.to_string(), hint),
        }
    }
}

/// Response body for `POST /rotation/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationResponse {
    /// The pattern used.
    pub pattern: String,
    /// Its cycle length in days.
    pub cycle_length: u32,
    /// One row per (date, crew), date ascending then crew ascending.
    pub assignments: Vec<Assignment>,
}

/// Response body for `POST /rotation/materialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterializeResponse {
    /// Rows in the generated table.
    pub assignments: usize,
    /// What was written.
    pub report: MaterializeReport,
}

/// Response body for `GET /swaps/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapDetails {
    /// The swap request.
    pub swap: SwapRequest,
    /// Skill mismatches an approver would be shown now.
    pub skill_warnings: Vec<SkillWarning>,
}

/// Response body for `POST /overtime/import`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    /// Rows that were new.
    pub imported: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_error_classes_map_to_statuses() {
        let cases = [
            (RosterError::validation("page", "bad"), StatusCode::BAD_REQUEST),
            (
                RosterError::PatternNotFound {
                    name: "x".to_string(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                RosterError::PermissionDenied {
                    actor: "sup_b".to_string(),
                    scope: "crew A".to_string(),
                },
                StatusCode::FORBIDDEN,
            ),
            (RosterError::consistency("taken"), StatusCode::CONFLICT),
            (RosterError::not_found("swap request", "x"), StatusCode::NOT_FOUND),
        ];
        for (error, status) in cases {
            let response: ApiErrorResponse = error.into();
            assert_eq!(response.status, status);
        }
    }

    #[test]
    fn test_error_message_is_preserved() {
        let response: ApiErrorResponse = RosterError::PatternNotFound {
            name: "5-on-2-off".to_string(),
        }
        .into();
        assert_eq!(response.error.code, "CONFIGURATION_ERROR");
        assert!(response.error.message.contains("5-on-2-off"));
        assert!(response.error.details.is_some());
    }
}
