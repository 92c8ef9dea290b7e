//! Prediction endpoints

use axum::extract::{Path, State};
use axum::Json;

use crate::api::types::{ApiError, JsonBody};
use crate::domain::PredictionResult;

use super::state::AppState;

/// `POST /predict`
///
/// The body is accepted as untyped JSON so that missing fields and wrong
/// types are reported per field by validation instead of by the extractor.
pub async fn predict(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Json<PredictionResult>, ApiError> {
    let result = state.prediction_service.predict(&body).await?;
    Ok(Json(result))
}

/// `GET /prediction-logs/{prediction_id}`
pub async fn get_prediction_log(
    State(state): State<AppState>,
    Path(prediction_id): Path<String>,
) -> Result<Json<PredictionResult>, ApiError> {
    let result = state.prediction_service.find_log(&prediction_id).await?;
    Ok(Json(result))
}
