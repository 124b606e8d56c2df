//! Credit score pipeline: raw form record → feature vector → opaque model →
//! risk-first verdict.

pub mod decision;
pub mod features;
mod lazy;
pub mod model;
mod onnx;
pub mod record;
pub mod router;
mod service;

#[cfg(test)]
mod tests;

pub use decision::{
    classify, decide, softmax, CreditClass, DecisionError, PredictionResult, Probabilities,
    POOR_THRESHOLD,
};
pub use features::{encode, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use lazy::LazyModel;
pub use model::{select_scores, ModelError, ModelLoader, ModelOutput, ScoringModel};
pub use onnx::{OnnxLoader, OnnxModel};
pub use record::{CreditMix, PaymentOfMinAmount, RawField, RawRecord};
pub use router::{parse_record, prediction_router, PredictResponse, RequestError};
pub use service::{CreditScoreService, PredictionError};
