use thiserror::Error;

use super::prediction::ValidationErrors;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    #[error("Model unavailable: {message}")]
    ModelUnavailable { message: String },

    #[error("Artifact error: {message}")]
    Artifact { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn model_unavailable(message: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            message: message.into(),
        }
    }

    pub fn artifact(message: impl Into<String>) -> Self {
        Self::Artifact {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Label used for the `errors_total` metric
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::ModelUnavailable { .. } => "model_unavailable",
            Self::Artifact { .. } => "artifact",
            Self::NotFound { .. } => "not_found",
            Self::Configuration { .. } => "configuration",
            Self::Cache { .. } => "cache_unavailable",
            Self::Internal { .. } => "internal",
        }
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::ValidationError;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Prediction log 'abc' not found");
        assert_eq!(error.to_string(), "Not found: Prediction log 'abc' not found");
    }

    #[test]
    fn test_model_unavailable_error() {
        let error = DomainError::model_unavailable("Model is not loaded");
        assert_eq!(error.to_string(), "Model unavailable: Model is not loaded");
        assert_eq!(error.metric_label(), "model_unavailable");
    }

    #[test]
    fn test_validation_error_from_field_errors() {
        let errors = ValidationErrors::from(vec![ValidationError::new("year", "is required")]);
        let error: DomainError = errors.into();

        assert_eq!(error.metric_label(), "validation");
        assert!(error.to_string().contains("year: is required"));
    }
}
