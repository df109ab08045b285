//! API error envelope and the single DomainError -> status translator

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::domain::DomainError;

/// Error envelope returned to callers: `{"error": ..., "message"?: ...}`
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Internal error text preserved for the audit pipeline. Attached to the
/// response as an extension; never serialized to the caller.
#[derive(Debug, Clone)]
pub struct AuditErrorMessage(pub String);

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorBody,
    /// Original error text, retained only for the audit record
    pub audit_message: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, message: Option<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                error: error.into(),
                message,
            },
            audit_message: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Validation error",
            Some(message.into()),
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found", Some(message.into()))
    }

    /// Generic 500; the detailed text goes to the audit record, not the caller
    pub fn internal(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ApiErrorBody {
                error: "Internal server error".to_string(),
                message: None,
            },
            audit_message: Some(detail),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::AuthenticationMissing { message } => Self::new(
                StatusCode::UNAUTHORIZED,
                "API key required",
                Some(message),
            ),
            DomainError::AuthenticationInvalid { message } => {
                Self::new(StatusCode::FORBIDDEN, "Invalid API key", Some(message))
            }
            DomainError::RateLimitExceeded { message } => Self::new(
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded",
                Some(message),
            ),
            DomainError::AuthorizationDenied { message } => {
                Self::new(StatusCode::FORBIDDEN, "Permission denied", Some(message))
            }
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Storage { message } => {
                error!(detail = %message, "Store failure");
                Self::internal(message)
            }
            DomainError::Internal { message } => {
                error!(detail = %message, "Internal failure");
                Self::internal(message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();

        if let Some(detail) = self.audit_message {
            response.extensions_mut().insert(AuditErrorMessage(detail));
        }

        response
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.body.error)
    }
}

impl std::error::Error for ApiError {}
