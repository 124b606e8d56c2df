use tracing::debug;

use super::decision::{decide, DecisionError, PredictionResult};
use super::features::encode;
use super::lazy::LazyModel;
use super::model::{select_scores, ModelError, ModelLoader, ScoringModel};
use super::record::RawRecord;

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("scoring model unavailable: {0}")]
    ModelUnavailable(ModelError),
    #[error("invalid model output: {0}")]
    InvalidModelOutput(String),
}

impl From<ModelError> for PredictionError {
    fn from(value: ModelError) -> Self {
        if value.is_unavailable() {
            Self::ModelUnavailable(value)
        } else {
            Self::InvalidModelOutput(value.to_string())
        }
    }
}

impl From<DecisionError> for PredictionError {
    fn from(value: DecisionError) -> Self {
        Self::InvalidModelOutput(value.to_string())
    }
}

/// Encoder, lazily loaded model, and decision rule composed per request.
pub struct CreditScoreService<L: ModelLoader> {
    model: LazyModel<L>,
    output_name: Option<String>,
}

impl<L: ModelLoader> CreditScoreService<L> {
    pub fn new(model: LazyModel<L>, output_name: Option<String>) -> Self {
        Self { model, output_name }
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_loaded()
    }

    /// Load the model now instead of on the first prediction.
    pub async fn warm_up(&self) -> Result<(), PredictionError> {
        self.model.get().await?;
        Ok(())
    }

    pub async fn predict(&self, record: &RawRecord) -> Result<PredictionResult, PredictionError> {
        let features = encode(record);
        let model = self.model.get().await?;

        let outputs = tokio::task::spawn_blocking(move || model.score(&features))
            .await
            .map_err(|join_error| {
                ModelError::Inference(format!("inference task aborted: {join_error}"))
            })??;

        let scores = select_scores(&outputs, self.output_name.as_deref())?;
        let result = decide(scores)?;

        debug!(
            label = %result.label,
            good = result.probabilities.good,
            poor = result.probabilities.poor,
            standard = result.probabilities.standard,
            "credit score predicted"
        );

        Ok(result)
    }
}
