//! Error types shared by every HTTP surface.
//!
//! `ApiError` is what handlers and services return; its `IntoResponse`
//! implementation decides the status code and body shape so handlers never
//! build error responses by hand.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Common result type for services and handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Field name → message, returned as-is for validation failures
pub type FieldErrors = BTreeMap<String, String>;

/// Body used for every non-validation error (and for plain acknowledgements)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse {
    pub message: String,
    pub status: bool,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: true,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{resource} not found with {field}: {value}")]
    NotFound {
        resource: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{0}")]
    Api(String),

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid username or password")]
    BadCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

impl ApiError {
    pub fn not_found(resource: &'static str, field: &'static str, value: impl ToString) -> Self {
        ApiError::NotFound {
            resource,
            field,
            value: value.to_string(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        ApiError::Api(message.into())
    }

    /// Error code for programmatic handling and log correlation
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "RESOURCE_NOT_FOUND",
            ApiError::Api(_) => "API_ERROR",
            ApiError::Validation(_) => "VALIDATION_FAILED",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::BadCredentials => "BAD_CREDENTIALS",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::Io(_) => "IO_ERROR",
            ApiError::PasswordHash(_) => "PASSWORD_HASH_ERROR",
        }
    }

    /// Whether the failure was caused by the caller rather than the server
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            ApiError::Database(_) | ApiError::Io(_) | ApiError::PasswordHash(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Api(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::BadCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Database(_) | ApiError::Io(_) | ApiError::PasswordHash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.is_user_error() {
            tracing::debug!(
                event = "api.request_rejected",
                code = self.error_code(),
                error = %self,
            );
        } else {
            tracing::error!(
                event = "api.request_failed",
                code = self.error_code(),
                error = %self,
            );
        }

        match self {
            ApiError::Validation(fields) => (status, Json(fields)).into_response(),
            ApiError::Database(_) | ApiError::Io(_) | ApiError::PasswordHash(_) => (
                status,
                Json(ApiResponse::failed(format!("Internal server error: {}", self))),
            )
                .into_response(),
            other => (status, Json(ApiResponse::failed(other.to_string()))).into_response(),
        }
    }
}

// Malformed bodies, query strings and path segments surface as 400 with the
// usual `{message, status}` body instead of axum's plain-text rejections.

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Api(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Api(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Api(rejection.body_text())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found at '{path}'")]
    ConfigNotFound { path: String },

    #[error("Failed to parse config file: {message}")]
    ConfigParseError { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("IO error reading config: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            ConfigError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            ConfigError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            ConfigError::IoError { .. } => "CONFIG_IO_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_format() {
        let error = ApiError::not_found("Cart", "email", "a@b.com");
        assert_eq!(error.to_string(), "Cart not found with email: a@b.com");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.error_code(), "RESOURCE_NOT_FOUND");
        assert!(error.is_user_error());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::api("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Validation(FieldErrors::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Forbidden("no".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        let db = ApiError::from(sqlx::Error::RowNotFound);
        assert_eq!(db.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!db.is_user_error());
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::InvalidConfiguration {
            message: "page size must be positive".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration: page size must be positive"
        );
        assert_eq!(error.error_code(), "INVALID_CONFIGURATION");
    }
}
