//! Prediction request body extractor

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use super::error::{ApiError, ApiErrorType};

/// Untyped JSON body of `POST /predict`
///
/// Missing fields and wrong types are left for `FeatureVector::validate`,
/// so the only rejections here are unreadable bodies (400) and a missing
/// `application/json` content type (415).
#[derive(Debug)]
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<Value>::from_request(req, state)
            .await
            .map(|Json(value)| JsonBody(value))
            .map_err(reject)
    }
}

fn reject(rejection: JsonRejection) -> ApiError {
    let error = match rejection {
        JsonRejection::MissingJsonContentType(_) => ApiError::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiErrorType::InvalidRequestError,
            "Missing Content-Type header. Expected 'application/json'.",
        ),
        JsonRejection::JsonSyntaxError(err) => {
            ApiError::bad_request(format!("Invalid JSON syntax: {}", err.body_text()))
        }
        other => ApiError::new(
            other.status(),
            ApiErrorType::InvalidRequestError,
            format!("Failed to read request body: {}", other.body_text()),
        ),
    };

    error.with_code("json_parse_error")
}
