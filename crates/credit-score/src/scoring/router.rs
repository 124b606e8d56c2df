use std::sync::Arc;

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::Serialize;
use serde_json::Value;

use super::decision::{CreditClass, PredictionResult, Probabilities, POOR_THRESHOLD};
use super::model::ModelLoader;
use super::record::RawRecord;
use super::service::CreditScoreService;
use crate::error::AppError;

pub const PREDICT_PATH: &str = "/api/predict";
pub const PREDICT_V1_PATH: &str = "/api/v1/credit-score/predict";

/// Body returned to the prediction form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<CreditClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_index: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<PredictionDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionDetails {
    pub risk_threshold_used: f64,
    pub probabilities: Probabilities,
}

impl PredictResponse {
    pub fn success(result: &PredictionResult) -> Self {
        Self {
            success: true,
            prediction: Some(result.label),
            class_index: Some(result.class_index),
            details: Some(PredictionDetails {
                risk_threshold_used: POOR_THRESHOLD,
                probabilities: result.probabilities,
            }),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            prediction: None,
            class_index: None,
            details: None,
            error: Some(message.into()),
        }
    }
}

/// Client-side problems with the request body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("No data provided")]
    MissingInput,
    #[error("Invalid request body")]
    InvalidBody,
}

/// Routes serving predictions; both paths share one handler.
pub fn prediction_router<L: ModelLoader>(service: Arc<CreditScoreService<L>>) -> Router {
    Router::new()
        .route(PREDICT_PATH, post(predict_handler::<L>))
        .route(PREDICT_V1_PATH, post(predict_handler::<L>))
        .with_state(service)
}

pub(crate) async fn predict_handler<L: ModelLoader>(
    State(service): State<Arc<CreditScoreService<L>>>,
    body: Bytes,
) -> Result<Json<PredictResponse>, AppError> {
    let record = parse_record(&body)?;
    let result = service.predict(&record).await?;
    Ok(Json(PredictResponse::success(&result)))
}

pub fn parse_record(body: &[u8]) -> Result<RawRecord, RequestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RequestError::MissingInput);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => {
            serde_json::from_value(value).map_err(|_| RequestError::InvalidBody)
        }
        Ok(value) if is_blank(&value) => Err(RequestError::MissingInput),
        Ok(_) | Err(_) => Err(RequestError::InvalidBody),
    }
}

/// `null`, `false`, zero and the empty string carry no record at all.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
