use crate::infra::build_service;
use clap::Args;
use credit_score::config::AppConfig;
use credit_score::error::AppError;
use credit_score::scoring::{
    encode, parse_record, CreditClass, PredictResponse, PredictionResult, RawRecord,
    POOR_THRESHOLD,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// JSON file holding one applicant record, as posted by the form
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Override the configured ONNX model path
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Print the HTTP response body instead of a readable summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let PredictArgs { input, model, json } = args;

    let mut config = AppConfig::load()?;
    if let Some(path) = model {
        config.model.path = path;
    }

    let body = tokio::fs::read(&input).await?;
    let record = parse_record(&body)?;
    let service = build_service(&config.model);
    let result = service.predict(&record).await?;

    if json {
        let payload = serde_json::to_string_pretty(&PredictResponse::success(&result))?;
        println!("{payload}");
    } else {
        println!("{}", render_prediction(&record, &result));
    }

    Ok(())
}

fn render_prediction(record: &RawRecord, result: &PredictionResult) -> String {
    let mut lines = vec![
        format!("Credit score: {} (class {})", result.label, result.class_index),
        format!("Risk threshold for Poor: {POOR_THRESHOLD}"),
        String::new(),
        "Class probabilities".to_string(),
    ];

    for class in CreditClass::ALL {
        let probability = result.probabilities.of(class);
        let marker = if class == result.label { " <" } else { "" };
        lines.push(format!(
            "- {:<8} {:>6.2}% {}{}",
            class.label(),
            probability * 100.0,
            "#".repeat((probability * 40.0).round() as usize),
            marker
        ));
    }

    lines.push(String::new());
    lines.push("Encoded features".to_string());
    for (name, value) in encode(record).named() {
        lines.push(format!("- {name}: {value:.4}"));
    }

    lines.join("\n")
}
