use std::time::Duration;

use super::features::FeatureVector;

/// One named output of a scoring run.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    pub name: String,
    /// Flattened values, `None` when the output is not a float tensor
    /// (for example an integer label column).
    pub values: Option<Vec<f32>>,
}

impl ModelOutput {
    pub fn scores(name: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            values: Some(values),
        }
    }

    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("scoring model failed to load: {0}")]
    Load(String),
    #[error("scoring model did not finish loading within {0:?}")]
    LoadTimeout(Duration),
    #[error("scoring model failed to run: {0}")]
    Inference(String),
    #[error("model output '{requested}' not found (available: {available})")]
    MissingOutput { requested: String, available: String },
    #[error("model produced no outputs")]
    NoOutputs,
    #[error("model output '{0}' does not carry float scores")]
    NonNumericOutput(String),
}

impl ModelError {
    /// Failures of the model itself, as opposed to output it did produce
    /// but that cannot be interpreted.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ModelError::Load(_) | ModelError::LoadTimeout(_) | ModelError::Inference(_)
        )
    }
}

/// Opaque classifier: one feature row in, named outputs back.
pub trait ScoringModel: Send + Sync {
    fn score(&self, features: &FeatureVector) -> Result<Vec<ModelOutput>, ModelError>;
}

impl<M: ScoringModel + ?Sized> ScoringModel for std::sync::Arc<M> {
    fn score(&self, features: &FeatureVector) -> Result<Vec<ModelOutput>, ModelError> {
        (**self).score(features)
    }
}

/// Builds a [`ScoringModel`]; may be slow and is run off the async executor.
pub trait ModelLoader: Send + Sync + 'static {
    type Model: ScoringModel + 'static;

    fn load(&self) -> Result<Self::Model, ModelError>;
}

/// Pick the output carrying class scores.
///
/// An explicit name must match exactly. Without one, a lone output is used
/// as-is and otherwise the second declared output is taken, which is where
/// converted classifiers put their score array after the label column.
pub fn select_scores<'a>(
    outputs: &'a [ModelOutput],
    requested: Option<&str>,
) -> Result<&'a [f32], ModelError> {
    let selected = match requested {
        Some(name) => outputs
            .iter()
            .find(|output| output.name == name)
            .ok_or_else(|| ModelError::MissingOutput {
                requested: name.to_string(),
                available: outputs
                    .iter()
                    .map(|output| output.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })?,
        None => match outputs {
            [] => return Err(ModelError::NoOutputs),
            [only] => only,
            [_, second, ..] => second,
        },
    };

    selected
        .values
        .as_deref()
        .ok_or_else(|| ModelError::NonNumericOutput(selected.name.clone()))
}
