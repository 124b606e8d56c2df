//! Credit score prediction: feature encoding, model scoring, and the
//! risk-first decision rule applied to the model's class probabilities.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
