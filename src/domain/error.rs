use thiserror::Error;

/// Core domain errors
///
/// Each variant maps to exactly one HTTP status at the API boundary; see
/// `api::types::ApiError`.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("API key required: {message}")]
    AuthenticationMissing { message: String },

    #[error("Invalid API key: {message}")]
    AuthenticationInvalid { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded { message: String },

    #[error("Permission denied: {message}")]
    AuthorizationDenied { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn authentication_missing(message: impl Into<String>) -> Self {
        Self::AuthenticationMissing {
            message: message.into(),
        }
    }

    pub fn authentication_invalid(message: impl Into<String>) -> Self {
        Self::AuthenticationInvalid {
            message: message.into(),
        }
    }

    pub fn rate_limit_exceeded(message: impl Into<String>) -> Self {
        Self::RateLimitExceeded {
            message: message.into(),
        }
    }

    pub fn authorization_denied(message: impl Into<String>) -> Self {
        Self::AuthorizationDenied {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
