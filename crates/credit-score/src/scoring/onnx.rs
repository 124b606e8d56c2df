use std::path::{Path, PathBuf};

use tract_onnx::prelude::*;
use tracing::info;

use super::features::{FeatureVector, FEATURE_COUNT};
use super::model::{ModelError, ModelLoader, ModelOutput, ScoringModel};

type Plan = TypedSimplePlan<TypedModel>;

/// ONNX classifier executed with tract, optimized for a single `[1, 15]` row.
pub struct OnnxModel {
    plan: Plan,
    output_names: Vec<String>,
}

impl OnnxModel {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let describe = |err: TractError| ModelError::Load(format!("{}: {err:#}", path.display()));

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, FEATURE_COUNT]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(describe)?;

        let graph = plan.model();
        let output_names = graph
            .output_outlets()
            .map_err(describe)?
            .iter()
            .map(|outlet| {
                graph
                    .outlet_label(*outlet)
                    .map(str::to_string)
                    .unwrap_or_else(|| graph.node(outlet.node).name.clone())
            })
            .collect::<Vec<_>>();

        info!(path = %path.display(), outputs = ?output_names, "scoring model loaded");

        Ok(Self { plan, output_names })
    }
}

impl ScoringModel for OnnxModel {
    fn score(&self, features: &FeatureVector) -> Result<Vec<ModelOutput>, ModelError> {
        let row = features.to_f32();
        let input = Tensor::from_shape(&[1, FEATURE_COUNT], row.as_slice())
            .map_err(|err| ModelError::Inference(format!("{err:#}")))?;

        let results = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|err| ModelError::Inference(format!("{err:#}")))?;

        Ok(self
            .output_names
            .iter()
            .zip(results.iter())
            .map(|(name, value)| ModelOutput {
                name: name.clone(),
                values: value.as_slice::<f32>().ok().map(<[f32]>::to_vec),
            })
            .collect())
    }
}

/// Loads an [`OnnxModel`] from a file on first use.
#[derive(Debug, Clone)]
pub struct OnnxLoader {
    path: PathBuf,
}

impl OnnxLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelLoader for OnnxLoader {
    type Model = OnnxModel;

    fn load(&self) -> Result<Self::Model, ModelError> {
        if !self.path.is_file() {
            return Err(ModelError::Load(format!(
                "{} does not exist or is not a file",
                self.path.display()
            )));
        }
        OnnxModel::from_path(&self.path)
    }
}
