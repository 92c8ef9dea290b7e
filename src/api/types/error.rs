//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, ValidationErrors};

/// Error categories reported in the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    ValidationError,
    NotFoundError,
    ServerError,
    ServiceUnavailableError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::ValidationError => write!(f, "validation_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ServerError => write!(f, "server_error"),
            Self::ServiceUnavailableError => write!(f, "service_unavailable_error"),
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// One rejected field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

/// Error detail structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    code: None,
                    details: None,
                },
            },
        }
    }

    /// Add error code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    /// Malformed request body
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    /// Well-formed body with invalid fields
    pub fn validation(errors: &ValidationErrors) -> Self {
        let details = errors
            .errors()
            .iter()
            .map(|e| FieldError {
                field: e.field.clone(),
                reason: e.reason.clone(),
            })
            .collect();

        let mut err = Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            ApiErrorType::ValidationError,
            format!("Invalid prediction request: {}", errors),
        )
        .with_code("invalid_features");
        err.response.error.details = Some(details);
        err
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorType::ServiceUnavailableError,
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::Validation(errors) => Self::validation(errors),
            DomainError::ModelUnavailable { message } => {
                Self::unavailable(message).with_code("model_unavailable")
            }
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Cache { message } => Self::unavailable(message).with_code("cache_unavailable"),
            DomainError::Artifact { message }
            | DomainError::Configuration { message }
            | DomainError::Internal { message } => Self::internal(message),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;

    #[test]
    fn test_validation_error_carries_details() {
        let errors = ValidationErrors::from(vec![
            ValidationError::new("year", "must be between 1980 and 2026 (got 1900)"),
            ValidationError::new("engine_cc", "must be greater than 0 (got -5)"),
        ]);

        let err: ApiError = DomainError::from(errors).into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);

        let details = err.response.error.details.as_ref().unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].field, "year");
        assert_eq!(details[1].field, "engine_cc");
    }

    #[test]
    fn test_domain_error_conversion() {
        let cases = [
            (DomainError::model_unavailable("no model"), StatusCode::SERVICE_UNAVAILABLE),
            (DomainError::not_found("missing"), StatusCode::NOT_FOUND),
            (DomainError::cache("disabled"), StatusCode::SERVICE_UNAVAILABLE),
            (DomainError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::artifact("corrupt"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (domain_err, status) in cases {
            let api_err: ApiError = domain_err.into();
            assert_eq!(api_err.status, status);
        }
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::unavailable("Model not loaded").with_code("model_unavailable");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["error"]["type"], "service_unavailable_error");
        assert_eq!(json["error"]["code"], "model_unavailable");
        assert_eq!(json["error"]["message"], "Model not loaded");
        assert!(json["error"].get("details").is_none());
    }
}
